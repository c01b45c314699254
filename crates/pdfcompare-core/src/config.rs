//! Comparison options
//!
//! Options can be built in code or loaded from a TOML file. Every field has
//! a default, so an empty file is valid:
//!
//! ```toml
//! pixel_threshold = 0.1
//! max_text_samples = 5
//! render_scale = 1.5
//! raster_failure_policy = "abort"
//! include_anti_aliasing = false
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::CompareError;
use crate::pixel::{MatchOptions, DEFAULT_THRESHOLD};
use crate::text::DEFAULT_MAX_SAMPLES;

/// Scale at which pages are rasterized
pub const DEFAULT_RENDER_SCALE: f32 = 1.5;

/// What to do when a single page cannot be rasterized
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RasterFailurePolicy {
    /// Fail the whole comparison
    #[default]
    Abort,
    /// Log a warning and compare the page as empty
    Degrade,
}

/// Options for a document comparison
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompareOptions {
    /// Per-pixel color tolerance in [0, 1] (default: 0.1)
    #[serde(default = "default_pixel_threshold")]
    pub pixel_threshold: f64,
    /// Example words per text divergence category (default: 5)
    #[serde(default = "default_max_text_samples")]
    pub max_text_samples: usize,
    /// Scale passed to the rasterizer (default: 1.5)
    #[serde(default = "default_render_scale")]
    pub render_scale: f32,
    /// Handling of per-page rasterization failures (default: abort)
    #[serde(default)]
    pub raster_failure_policy: RasterFailurePolicy,
    /// Count anti-aliased pixels as mismatches (default: false)
    #[serde(default)]
    pub include_anti_aliasing: bool,
}

fn default_pixel_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_max_text_samples() -> usize {
    DEFAULT_MAX_SAMPLES
}

fn default_render_scale() -> f32 {
    DEFAULT_RENDER_SCALE
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            pixel_threshold: DEFAULT_THRESHOLD,
            max_text_samples: DEFAULT_MAX_SAMPLES,
            render_scale: DEFAULT_RENDER_SCALE,
            raster_failure_policy: RasterFailurePolicy::default(),
            include_anti_aliasing: false,
        }
    }
}

impl CompareOptions {
    /// Load options from a TOML file and validate them
    ///
    /// # Arguments
    ///
    /// * `path` - TOML file, missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file cannot be read or parsed and
    /// `InvalidOptions` if a value is out of range.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CompareError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CompareError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_str(&content)
    }

    /// Parse options from a TOML string and validate them
    ///
    /// # Errors
    ///
    /// Returns `Config` for malformed TOML or unknown enum values and
    /// `InvalidOptions` if a value is out of range.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, CompareError> {
        let options: Self = toml::from_str(s)
            .map_err(|e| CompareError::Config(format!("Failed to parse options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `InvalidOptions` when `pixel_threshold` is outside [0, 1],
    /// `max_text_samples` is zero, or `render_scale` is not a positive number.
    pub fn validate(&self) -> Result<(), CompareError> {
        if !(0.0..=1.0).contains(&self.pixel_threshold) {
            return Err(CompareError::InvalidOptions(format!(
                "pixel_threshold must be within [0, 1], got {}",
                self.pixel_threshold
            )));
        }
        if self.max_text_samples == 0 {
            return Err(CompareError::InvalidOptions(
                "max_text_samples must be at least 1".to_string(),
            ));
        }
        if !(self.render_scale.is_finite() && self.render_scale > 0.0) {
            return Err(CompareError::InvalidOptions(format!(
                "render_scale must be positive, got {}",
                self.render_scale
            )));
        }
        Ok(())
    }

    /// Pixel matching settings derived from these options
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            threshold: self.pixel_threshold,
            include_anti_aliasing: self.include_anti_aliasing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let options = CompareOptions::from_str("").unwrap();
        assert_eq!(options, CompareOptions::default());
        assert_eq!(options.pixel_threshold, 0.1);
        assert_eq!(options.max_text_samples, 5);
    }

    #[test]
    fn test_parse_all_fields() {
        let toml = r#"
            pixel_threshold = 0.25
            max_text_samples = 10
            render_scale = 2.0
            raster_failure_policy = "degrade"
            include_anti_aliasing = true
        "#;
        let options = CompareOptions::from_str(toml).unwrap();
        assert_eq!(options.pixel_threshold, 0.25);
        assert_eq!(options.max_text_samples, 10);
        assert_eq!(options.render_scale, 2.0);
        assert_eq!(options.raster_failure_policy, RasterFailurePolicy::Degrade);
        assert!(options.include_anti_aliasing);
    }

    #[test]
    fn test_threshold_out_of_range() {
        let err = CompareOptions::from_str("pixel_threshold = 1.5").unwrap_err();
        assert!(matches!(err, CompareError::InvalidOptions(_)));
    }

    #[test]
    fn test_zero_scale_rejected() {
        let options = CompareOptions {
            render_scale: 0.0,
            ..CompareOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_zero_sample_cap_rejected() {
        let err = CompareOptions::from_str("max_text_samples = 0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid options: max_text_samples must be at least 1"
        );
    }

    #[test]
    fn test_malformed_toml() {
        let err = CompareOptions::from_str("pixel_threshold = ").unwrap_err();
        assert!(matches!(err, CompareError::Config(_)));
    }

    #[test]
    fn test_unknown_policy() {
        assert!(CompareOptions::from_str("raster_failure_policy = \"skip\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compare.toml");
        std::fs::write(&path, "max_text_samples = 3\n").unwrap();
        let options = CompareOptions::from_file(&path).unwrap();
        assert_eq!(options.max_text_samples, 3);

        let missing = CompareOptions::from_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(CompareError::Config(_))));
    }
}
