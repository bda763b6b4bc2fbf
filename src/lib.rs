#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod config;
pub mod coordinator;
pub mod document;
pub mod editor;
pub mod error;
pub mod export;
pub mod id_generator;
pub mod panels;
pub mod storage;
pub mod templates;
pub mod util;
pub mod widget;

pub use app::DiagramApp;
pub use config::AppConfig;
pub use coordinator::{Coordinator, Debouncer, SessionState};
pub use document::Document;
pub use editor::{CancelToken, EditorAdapter, EditorApi};
pub use error::{ExportError, StorageError, StorageResult, StoreError, WidgetError};
pub use storage::{DiagramStorage, KeyValueStore, MemoryStore};
pub use templates::{ExampleTemplate, EMPTY_DIAGRAM, EXAMPLES};
pub use widget::{CommandStack, DiagramWidget, MountPoint, WidgetFactory};
