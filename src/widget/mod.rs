//! The diagramming widget seam.
//!
//! The editor never depends on a concrete widget. It sees the narrow
//! capability set below: construct from two mount points, destroy, listen for
//! command-stack changes, import, export in two formats and reach an undo/redo
//! control. [`SourceWidget`] is the implementation shipped with the app.

mod history;
mod listeners;
mod preview;
mod source;

use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::error::WidgetError;

pub use history::EditHistory;
pub use listeners::{ChangeListener, ChangeListeners};
pub use preview::{DiagramPreview, EdgeView, ShapeKind, ShapeView};
pub use source::{SourceWidget, SourceWidgetFactory};

/// Identity of a region the widget draws into.
///
/// Two mount points are the same mount point iff their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MountPoint(pub egui::Id);

impl MountPoint {
    pub fn new(source: impl std::hash::Hash) -> Self {
        Self(egui::Id::new(source))
    }
}

/// Undo/redo control exposed by a live widget
pub trait CommandStack {
    fn undo(&self);
    fn redo(&self);
    fn can_undo(&self) -> bool;
    fn can_redo(&self) -> bool;
}

/// A live diagramming widget instance.
///
/// Async operations return `'static` futures so callers can hold them across
/// frames without borrowing the widget.
pub trait DiagramWidget {
    /// Register a listener fired after every editing mutation
    fn on_command_stack_changed(&self, listener: ChangeListener);

    /// Replace the widget's diagram with `content`
    fn import(&self, content: &str) -> LocalBoxFuture<'static, Result<(), WidgetError>>;

    /// Serialize the diagram in its primary (full-fidelity) format
    fn export_primary(&self) -> LocalBoxFuture<'static, Result<Option<String>, WidgetError>>;

    /// Render the diagram as an SVG document
    fn export_svg(&self) -> LocalBoxFuture<'static, Result<Option<String>, WidgetError>>;

    fn command_stack(&self) -> Rc<dyn CommandStack>;

    /// Release everything the widget holds. Called exactly once.
    fn destroy(&self);

    /// Draw into the canvas mount point
    fn canvas_ui(&self, _ui: &mut egui::Ui) {}

    /// Draw into the side panel mount point
    fn panel_ui(&self, _ui: &mut egui::Ui) {}
}

/// Builds widget instances for the editor adapter
pub trait WidgetFactory {
    fn create(
        &self,
        canvas: MountPoint,
        panel: MountPoint,
        modules: &[String],
    ) -> Result<Rc<dyn DiagramWidget>, WidgetError>;
}
