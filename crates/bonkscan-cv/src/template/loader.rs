//! Icon loading with multiple search strategies

use super::IconTemplate;
use crate::signature::{Rgb, SignatureConfig};
use bonkscan_core::{CatalogEntity, CatalogIndex};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("no icon found for entity `{id}`")]
    NotFound { id: String },
    #[error("failed to decode icon {path:?}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Resolves catalog entities to icon files under one or more directories
pub struct IconLoader {
    icon_dirs: Vec<PathBuf>,
    supported_extensions: Vec<String>,
    background: Rgb,
    signature: SignatureConfig,
}

impl IconLoader {
    pub fn new() -> Self {
        Self {
            icon_dirs: Vec::new(),
            supported_extensions: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "webp".to_string(),
            ],
            background: Rgb::new(32, 32, 32),
            signature: SignatureConfig::default(),
        }
    }

    pub fn add_icon_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.icon_dirs.push(dir.as_ref().to_path_buf());
        self
    }

    pub fn add_extension(mut self, ext: impl Into<String>) -> Self {
        self.supported_extensions.push(ext.into());
        self
    }

    /// Background and palette settings applied to every loaded icon
    pub fn with_appearance(mut self, background: Rgb, signature: SignatureConfig) -> Self {
        self.background = background;
        self.signature = signature;
        self
    }

    /// Load the icon of one entity
    pub fn load_icon(&self, entity: &Arc<CatalogEntity>) -> Result<IconTemplate, TemplateError> {
        let path = self
            .generate_icon_candidates(entity)
            .iter()
            .find_map(|candidate| self.find_icon_file(candidate))
            .ok_or_else(|| TemplateError::NotFound { id: entity.id.clone() })?;

        let image = image::open(&path)
            .map_err(|source| TemplateError::Decode { path: path.clone(), source })?
            .to_rgba8();

        let template =
            IconTemplate::new(Arc::clone(entity), image, self.background, &self.signature);
        Ok(template.with_source(path))
    }

    /// Load every icon the catalog references; missing or broken icons are skipped.
    pub fn load_all(&self, catalog: &CatalogIndex) -> Vec<IconTemplate> {
        let mut templates = Vec::with_capacity(catalog.len());
        let mut missing = 0usize;

        for entity in catalog {
            match self.load_icon(entity) {
                Ok(template) => templates.push(template),
                Err(TemplateError::NotFound { id }) => {
                    missing += 1;
                    debug!(%id, "no icon");
                }
                Err(err) => {
                    missing += 1;
                    warn!(error = %err, "skipping icon");
                }
            }
        }

        info!(loaded = templates.len(), missing, "loaded icon templates");
        templates
    }

    /// Relative paths to try, most specific first
    fn generate_icon_candidates(&self, entity: &CatalogEntity) -> Vec<String> {
        let mut candidates = Vec::new();

        if let Some(image) = entity.image.as_deref().filter(|s| !s.is_empty()) {
            candidates.push(image.to_string());
            if let Some(file_name) = Path::new(image).file_name() {
                candidates.push(file_name.to_string_lossy().into_owned());
            }
        }

        let slug = entity.name.trim().to_lowercase().replace([' ', '-', '\''], "_");
        for ext in &self.supported_extensions {
            candidates.push(format!("{}/{}.{}", entity.kind.collection(), entity.id, ext));
            candidates.push(format!("{}.{}", entity.id, ext));
            if !slug.is_empty() {
                candidates.push(format!("{}.{}", slug, ext));
            }
        }

        candidates
    }

    /// Find a candidate in the icon directories, falling back to a
    /// case-insensitive scan of the candidate's directory.
    fn find_icon_file(&self, candidate: &str) -> Option<PathBuf> {
        for dir in &self.icon_dirs {
            let path = dir.join(candidate);
            if path.is_file() {
                return Some(path);
            }

            let (Some(parent), Some(wanted)) = (path.parent(), path.file_name()) else {
                continue;
            };
            let wanted = wanted.to_string_lossy().to_lowercase();
            if let Ok(entries) = fs::read_dir(parent) {
                for entry in entries.flatten() {
                    if entry.file_name().to_string_lossy().to_lowercase() == wanted {
                        return Some(entry.path());
                    }
                }
            }
        }

        None
    }
}

impl Default for IconLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonkscan_core::EntityKind;
    use image::{Rgba, RgbaImage};

    fn write_icon(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbaImage::from_pixel(4, 4, Rgba([200, 40, 40, 255])).save(path).unwrap();
    }

    #[test]
    fn test_kind_directory_and_case_insensitive_lookup() {
        let dir = tempfile::tempdir().unwrap();
        write_icon(&dir.path().join("weapons").join("Bone_Sword.PNG"));

        let loader = IconLoader::new().add_icon_dir(dir.path());
        let entity = Arc::new(CatalogEntity::new("bone_sword", "Bone Sword", EntityKind::Weapon));
        let icon = loader.load_icon(&entity).unwrap();
        assert_eq!(icon.image.dimensions(), (4, 4));
        assert!(icon.source.is_some());
        assert_eq!(icon.palette.len(), 1);
    }

    #[test]
    fn test_image_field_takes_priority() {
        let dir = tempfile::tempdir().unwrap();
        write_icon(&dir.path().join("custom.png"));

        let loader = IconLoader::new().add_icon_dir(dir.path());
        let entity = Arc::new(
            CatalogEntity::new("anvil", "Anvil", EntityKind::Item)
                .with_image("https://example.org/img/custom.png"),
        );
        let icon = loader.load_icon(&entity).unwrap();
        assert_eq!(icon.source.unwrap().file_name().unwrap(), "custom.png");
    }

    #[test]
    fn test_missing_and_broken_icons_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
        write_icon(&dir.path().join("ok.png"));

        let catalog = CatalogIndex::from_entities([
            CatalogEntity::new("broken", "Broken", EntityKind::Item),
            CatalogEntity::new("ok", "Ok", EntityKind::Item),
            CatalogEntity::new("ghost", "Ghost", EntityKind::Item),
        ]);
        let loader = IconLoader::new().add_icon_dir(dir.path());

        assert!(matches!(
            loader.load_icon(catalog.get("ghost").unwrap()),
            Err(TemplateError::NotFound { .. })
        ));
        assert!(matches!(
            loader.load_icon(catalog.get("broken").unwrap()),
            Err(TemplateError::Decode { .. })
        ));

        let all = loader.load_all(&catalog);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].entity.id, "ok");
    }
}
