use crate::error::EditorError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Largest canvas a session accepts, in pixels (16384 x 16384).
pub const MAX_CANVAS_PIXELS: u64 = 16384 * 16384;

/// Session-wide settings. Every field has a default, so a JSON file only needs
/// the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub width: u32,
    pub height: u32,
    pub history_depth: usize,
    /// Milliseconds between spray ticks while the pointer is held.
    pub spray_interval_ms: u64,
    /// Dots per unit of spray radius per tick.
    pub spray_density: u32,
    pub pen_width_factor: f32,
    pub marker_alpha_factor: f32,
    pub marker_blur_radius: f32,
    /// `{n}` is replaced with the new layer count.
    pub layer_name_pattern: String,
    /// Undo records the restored canvas as a new history entry, which also
    /// empties the redo side.
    pub undo_pushes_snapshot: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            width: 2000,
            height: 2000,
            history_depth: 30,
            spray_interval_ms: 30,
            spray_density: 5,
            pen_width_factor: 1.5,
            marker_alpha_factor: 0.7,
            marker_blur_radius: 3.0,
            layer_name_pattern: "Layer {n}".to_string(),
            undo_pushes_snapshot: true,
        }
    }
}

impl EditorConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, EditorError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| EditorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), EditorError> {
        let pixels = self.width as u64 * self.height as u64;
        if pixels == 0 || pixels > MAX_CANVAS_PIXELS {
            return Err(EditorError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.history_depth == 0 {
            return Err(EditorError::Config("history_depth must be at least 1".into()));
        }
        if self.spray_interval_ms == 0 {
            return Err(EditorError::Config("spray_interval_ms must be positive".into()));
        }
        for (name, value) in [
            ("pen_width_factor", self.pen_width_factor),
            ("marker_blur_radius", self.marker_blur_radius),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EditorError::Config(format!("{name} must be a non-negative number")));
            }
        }
        if !(0.0..=1.0).contains(&self.marker_alpha_factor) {
            return Err(EditorError::Config("marker_alpha_factor must be within 0..=1".into()));
        }
        Ok(())
    }

    pub fn spray_interval(&self) -> Duration {
        Duration::from_millis(self.spray_interval_ms)
    }

    pub fn layer_name(&self, n: usize) -> String {
        self.layer_name_pattern.replace("{n}", &n.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_editor() {
        let config = EditorConfig::default();
        assert_eq!((config.width, config.height), (2000, 2000));
        assert_eq!(config.history_depth, 30);
        assert_eq!(config.spray_interval(), Duration::from_millis(30));
        assert_eq!(config.layer_name(3), "Layer 3");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EditorConfig::from_json_str(r#"{ "width": 640, "history_depth": 5 }"#).unwrap();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 2000);
        assert_eq!(config.history_depth, 5);
        assert_eq!(config.spray_density, 5);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            EditorConfig::from_json_str(r#"{ "width": 0 }"#),
            Err(EditorError::InvalidDimensions { width: 0, .. })
        ));
        assert!(matches!(
            EditorConfig::from_json_str(r#"{ "history_depth": 0 }"#),
            Err(EditorError::Config(_))
        ));
        assert!(matches!(
            EditorConfig::from_json_str(r#"{ "marker_alpha_factor": 2.0 }"#),
            Err(EditorError::Config(_))
        ));
        assert!(matches!(EditorConfig::from_json_str("not json"), Err(EditorError::Config(_))));
    }

    #[test]
    fn rejects_oversized_canvas() {
        assert!(matches!(
            EditorConfig::from_json_str(r#"{ "width": 4294967295, "height": 4294967295 }"#),
            Err(EditorError::InvalidDimensions { width: 4294967295, .. })
        ));
        let config = EditorConfig::default().with_size(16385, 16384);
        assert!(matches!(config.validate(), Err(EditorError::InvalidDimensions { .. })));
        assert!(EditorConfig::default().with_size(16384, 1).validate().is_ok());
    }

    #[test]
    fn huge_history_depth_still_starts_a_session() {
        let config =
            EditorConfig::from_json_str(r#"{ "width": 8, "height": 8, "history_depth": 18446744073709551615 }"#)
                .unwrap();
        let session = crate::EditorSession::with_seed(config, 1).unwrap();
        assert_eq!(session.history().max_depth(), usize::MAX);
        assert_eq!(session.history().undo_len(), 1);
    }

    #[test]
    fn json_round_trip() {
        let config = EditorConfig::default().with_size(10, 20);
        let back = EditorConfig::from_json_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EditorConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, EditorError::Io { .. }));
    }
}
