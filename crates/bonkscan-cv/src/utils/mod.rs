//! Utility modules

pub mod image;
pub mod nms;
pub mod similarity;

pub use self::image::{ImageUtils, PixelView};
pub use nms::suppress_overlaps;
pub use similarity::{grayscale_variance, palette_similarity, structural_similarity};
