use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use crate::widget::{CommandStack, DiagramWidget};

/// Slot holding the adapter's live widget, if any
pub(crate) type LiveWidget = Rc<RefCell<Option<Rc<dyn DiagramWidget>>>>;

/// The editor's capability surface.
///
/// Cheap to clone. Every call looks at the adapter's live instance at call
/// time, so a handle taken before a reconstruction talks to the new widget.
/// Failures are logged and surface as `None`.
#[derive(Clone)]
pub struct EditorApi {
    live: LiveWidget,
}

impl std::fmt::Debug for EditorApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorApi")
            .field("live", &self.live.borrow().is_some())
            .finish()
    }
}

impl EditorApi {
    pub(crate) fn new(live: LiveWidget) -> Self {
        Self { live }
    }

    /// Whether a widget instance is currently live
    pub fn is_live(&self) -> bool {
        self.live.borrow().is_some()
    }

    /// Export the full serialized document.
    ///
    /// Resolves to `None` with no live widget, on export failure, or when the
    /// widget produced nothing.
    pub fn export_primary(&self) -> impl Future<Output = Option<String>> + use<> + 'static {
        let widget = self.live.borrow().clone();
        async move {
            let export = widget?.export_primary();
            match export.await {
                Ok(content) => content.filter(|content| !content.is_empty()),
                Err(err) => {
                    log::error!("Failed to export diagram: {}", err);
                    None
                }
            }
        }
    }

    /// Export an SVG rendering, with the same `None` cases as
    /// [`export_primary`](Self::export_primary)
    pub fn export_svg(&self) -> impl Future<Output = Option<String>> + use<> + 'static {
        let widget = self.live.borrow().clone();
        async move {
            let export = widget?.export_svg();
            match export.await {
                Ok(svg) => svg.filter(|svg| !svg.is_empty()),
                Err(err) => {
                    log::error!("Failed to export SVG: {}", err);
                    None
                }
            }
        }
    }

    /// The live widget's undo/redo control
    pub fn command_stack(&self) -> Option<Rc<dyn CommandStack>> {
        self.live.borrow().as_ref().map(|widget| widget.command_stack())
    }
}
