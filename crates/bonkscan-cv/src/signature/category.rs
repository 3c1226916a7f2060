//! Coarse color category of a cell, from a fixed rule table

use super::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorCategory {
    Black,
    Gray,
    White,
    Yellow,
    Red,
    Orange,
    Green,
    Cyan,
    Blue,
    Purple,
    Mixed,
}

impl fmt::Display for ColorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColorCategory::Black => "black",
            ColorCategory::Gray => "gray",
            ColorCategory::White => "white",
            ColorCategory::Yellow => "yellow",
            ColorCategory::Red => "red",
            ColorCategory::Orange => "orange",
            ColorCategory::Green => "green",
            ColorCategory::Cyan => "cyan",
            ColorCategory::Blue => "blue",
            ColorCategory::Purple => "purple",
            ColorCategory::Mixed => "mixed",
        };
        f.write_str(s)
    }
}

/// A single classification rule; rules are tried in table order.
pub struct CategoryRule {
    pub category: ColorCategory,
    pub matches: fn(f64, f64, f64) -> bool,
}

const GRAY_SPREAD: f64 = 30.0;

fn is_neutral(r: f64, g: f64, b: f64) -> bool {
    (r - g).abs() < GRAY_SPREAD && (g - b).abs() < GRAY_SPREAD && (r - b).abs() < GRAY_SPREAD
}

fn brightness(r: f64, g: f64, b: f64) -> f64 {
    (r + g + b) / 3.0
}

/// Decision table: neutral colors by brightness, then channel dominance.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: ColorCategory::White,
        matches: |r, g, b| is_neutral(r, g, b) && brightness(r, g, b) > 200.0,
    },
    CategoryRule {
        category: ColorCategory::Black,
        matches: |r, g, b| is_neutral(r, g, b) && brightness(r, g, b) < 50.0,
    },
    CategoryRule {
        category: ColorCategory::Gray,
        matches: is_neutral,
    },
    CategoryRule {
        category: ColorCategory::Yellow,
        matches: |r, g, b| r > 150.0 && g > 150.0 && b < 100.0 && (r - g).abs() < 40.0,
    },
    CategoryRule {
        category: ColorCategory::Orange,
        matches: |r, g, b| r > g && r > b && g > b * 1.3,
    },
    CategoryRule {
        category: ColorCategory::Red,
        matches: |r, g, b| r > g && r > b,
    },
    CategoryRule {
        category: ColorCategory::Cyan,
        matches: |r, g, b| g > r && g > b && b > r * 1.3,
    },
    CategoryRule {
        category: ColorCategory::Green,
        matches: |r, g, b| g > r && g > b,
    },
    CategoryRule {
        category: ColorCategory::Purple,
        matches: |r, g, b| b > r && b > g && r > g * 1.3,
    },
    CategoryRule {
        category: ColorCategory::Blue,
        matches: |r, g, b| b > r && b > g,
    },
];

/// Classify an average color. Colors no rule claims are [`ColorCategory::Mixed`].
pub fn classify_color(color: Rgb) -> ColorCategory {
    let (r, g, b) = (color.r as f64, color.g as f64, color.b as f64);
    CATEGORY_RULES
        .iter()
        .find(|rule| (rule.matches)(r, g, b))
        .map(|rule| rule.category)
        .unwrap_or(ColorCategory::Mixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_colors_by_brightness() {
        assert_eq!(classify_color(Rgb::new(240, 235, 245)), ColorCategory::White);
        assert_eq!(classify_color(Rgb::new(10, 20, 15)), ColorCategory::Black);
        assert_eq!(classify_color(Rgb::new(120, 128, 110)), ColorCategory::Gray);
    }

    #[test]
    fn test_dominant_channel_rules() {
        assert_eq!(classify_color(Rgb::new(255, 152, 0)), ColorCategory::Orange);
        assert_eq!(classify_color(Rgb::new(200, 40, 40)), ColorCategory::Red);
        assert_eq!(classify_color(Rgb::new(220, 210, 40)), ColorCategory::Yellow);
        assert_eq!(classify_color(Rgb::new(76, 175, 80)), ColorCategory::Green);
        assert_eq!(classify_color(Rgb::new(20, 200, 180)), ColorCategory::Cyan);
        assert_eq!(classify_color(Rgb::new(33, 150, 243)), ColorCategory::Blue);
        assert_eq!(classify_color(Rgb::new(156, 39, 176)), ColorCategory::Purple);
    }

    #[test]
    fn test_ties_fall_through_to_mixed() {
        // Red and green tied above blue: no dominant channel, not yellow.
        assert_eq!(classify_color(Rgb::new(140, 140, 20)), ColorCategory::Mixed);
    }
}
