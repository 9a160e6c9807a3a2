//! Gallery configuration.
//!
//! Compile-time defaults, optionally overridden by a `gallery.toml` placed
//! next to the executable or in the working directory. Values are fixed for
//! the lifetime of a gallery; there is no reload.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::GalleryError;

/// Default number of ring tiles (and paired columns).
pub const DEFAULT_COUNT: usize = 8;
/// Default carousel radius in world units.
pub const DEFAULT_RADIUS: f32 = 1.4;
/// Number of distinct source images tiles cycle through.
pub const IMAGE_SOURCES: usize = 10;

const CONFIG_FILE: &str = "gallery.toml";

/// Construction-time gallery settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalleryConfig {
    pub count: usize,
    pub radius: f32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            radius: DEFAULT_RADIUS,
        }
    }
}

impl GalleryConfig {
    /// Reject settings the layout can't honor.
    pub fn validate(&self) -> Result<(), GalleryError> {
        if self.count == 0 {
            return Err(GalleryError::EmptyGallery(self.count));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(GalleryError::InvalidRadius(self.radius));
        }
        Ok(())
    }

    /// Load `gallery.toml` from the exe directory, then the CWD.
    /// A missing file or missing keys fall back to defaults.
    pub fn load() -> Self {
        candidate_dirs()
            .iter()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|path| path.is_file())
            .map(|path| Self::from_file(&path))
            .unwrap_or_default()
    }

    fn from_file(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Could not read {}: {e}", path.display());
                return Self::default();
            }
        };
        match Self::parse(&text) {
            Ok(cfg) => {
                log::info!("Loaded {} (count={}, radius={})", path.display(), cfg.count, cfg.radius);
                cfg
            }
            Err(e) => {
                log::warn!("Ignoring malformed {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Parse TOML text. Unspecified keys keep their defaults.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let raw: TomlConfig = toml::from_str(text)?;
        Ok(Self {
            count: raw.gallery.count,
            radius: raw.gallery.radius,
        })
    }
}

// ── TOML schema ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    gallery: TomlGallery,
}

#[derive(Deserialize, Debug)]
struct TomlGallery {
    #[serde(default = "default_count")]
    count: usize,
    #[serde(default = "default_radius")]
    radius: f32,
}

impl Default for TomlGallery {
    fn default() -> Self {
        Self {
            count: default_count(),
            radius: default_radius(),
        }
    }
}

fn default_count() -> usize { DEFAULT_COUNT }
fn default_radius() -> f32 { DEFAULT_RADIUS }

/// Exe directory first, then the working directory (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = GalleryConfig::default();
        assert_eq!(cfg.count, 8);
        assert_eq!(cfg.radius, 1.4);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_gallery_is_rejected() {
        let cfg = GalleryConfig { count: 0, ..Default::default() };
        assert_eq!(cfg.validate(), Err(GalleryError::EmptyGallery(0)));
    }

    #[test]
    fn bad_radius_is_rejected() {
        for radius in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let cfg = GalleryConfig { radius, ..Default::default() };
            assert!(matches!(cfg.validate(), Err(GalleryError::InvalidRadius(_))));
        }
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = GalleryConfig::parse("[gallery]\ncount = 12\n").unwrap();
        assert_eq!(cfg.count, 12);
        assert_eq!(cfg.radius, DEFAULT_RADIUS);

        let empty = GalleryConfig::parse("").unwrap();
        assert_eq!(empty, GalleryConfig::default());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(GalleryConfig::parse("[gallery\ncount = ").is_err());
        assert!(GalleryConfig::parse("[gallery]\ncount = -3\n").is_err());
    }
}
