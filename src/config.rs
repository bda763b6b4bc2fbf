use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Modules handed to the widget factory when no override is configured
pub const DEFAULT_WIDGET_MODULES: &[&str] = &["properties-panel", "properties-provider"];

/// Application configuration.
///
/// Persisted together with the UI preferences through `eframe::App::save`, so
/// any field added later must have a sensible default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Store key holding the serialized document collection
    pub documents_key: String,
    /// Store key holding the id of the active document
    pub current_id_key: String,
    /// Location of the native store file. `None` uses the platform data dir.
    pub store_path: Option<PathBuf>,
    /// Quiet period after the last edit before an auto-save runs
    pub autosave_delay_secs: f64,
    /// Scale applied to the SVG's declared size when rasterizing
    pub raster_scale: f32,
    /// Size used when the SVG declares neither a viewBox nor width/height
    pub raster_fallback_size: [f32; 2],
    /// Extension of the primary download, without the dot
    pub primary_extension: String,
    /// Module names passed to the widget factory
    pub widget_modules: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            documents_key: "bpmn-diagrams".to_owned(),
            current_id_key: "bpmn-current-diagram-id".to_owned(),
            store_path: None,
            autosave_delay_secs: 0.5,
            raster_scale: 2.0,
            raster_fallback_size: [800.0, 600.0],
            primary_extension: "bpmn".to_owned(),
            widget_modules: DEFAULT_WIDGET_MODULES.iter().map(|m| (*m).to_owned()).collect(),
        }
    }
}

impl AppConfig {
    /// Resolve where the native store file lives
    #[cfg(not(target_arch = "wasm32"))]
    pub fn resolved_store_path(&self) -> PathBuf {
        if let Some(path) = &self.store_path {
            return path.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(env!("CARGO_PKG_NAME"))
            .join("store.json")
    }
}
