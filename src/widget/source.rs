use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use super::{ChangeListener, ChangeListeners, CommandStack, DiagramPreview, DiagramWidget, EditHistory, MountPoint, WidgetFactory};
use crate::error::WidgetError;

/// Module name that enables the markup editor in the side panel
const PANEL_MODULE: &str = "properties-panel";

#[derive(Debug, Default)]
struct SourceState {
    text: String,
    preview: DiagramPreview,
    parse_error: Option<String>,
    history: EditHistory,
    destroyed: bool,
}

impl SourceState {
    /// Replace the text and refresh the preview. A parse failure keeps the
    /// last good preview and records the error.
    fn set_text(&mut self, text: String) {
        match DiagramPreview::parse(&text) {
            Ok(preview) => {
                self.preview = preview;
                self.parse_error = None;
            }
            Err(err) => self.parse_error = Some(err),
        }
        self.text = text;
    }
}

/// Built-in widget: edits the markup as text in the side panel and draws a
/// read-only preview of the diagram-interchange shapes on the canvas.
pub struct SourceWidget {
    canvas: MountPoint,
    panel: MountPoint,
    show_panel: bool,
    state: Rc<RefCell<SourceState>>,
    listeners: Rc<ChangeListeners>,
}

impl SourceWidget {
    pub fn new(canvas: MountPoint, panel: MountPoint, modules: &[String]) -> Self {
        Self {
            canvas,
            panel,
            show_panel: modules.iter().any(|m| m == PANEL_MODULE),
            state: Rc::new(RefCell::new(SourceState::default())),
            listeners: Rc::new(ChangeListeners::new()),
        }
    }

    /// Current markup, for tests and debugging
    pub fn text(&self) -> String {
        self.state.borrow().text.clone()
    }

    /// Why the current text has no up-to-date preview, if it doesn't
    pub fn parse_error(&self) -> Option<String> {
        self.state.borrow().parse_error.clone()
    }

    /// Apply a user edit: record it, refresh the preview, notify listeners
    pub fn edit(&self, text: String) {
        {
            let mut state = self.state.borrow_mut();
            if state.destroyed || state.text == text {
                return;
            }
            let before = state.text.clone();
            state.history.record(before, text.clone());
            state.set_text(text);
        }
        self.listeners.emit();
    }
}

impl DiagramWidget for SourceWidget {
    fn on_command_stack_changed(&self, listener: ChangeListener) {
        self.listeners.subscribe(listener);
    }

    fn import(&self, content: &str) -> LocalBoxFuture<'static, Result<(), WidgetError>> {
        let state = self.state.clone();
        let content = content.to_owned();
        async move {
            let mut state = state.borrow_mut();
            if state.destroyed {
                return Err(WidgetError::Destroyed);
            }
            // Malformed markup still opens as text, otherwise the previous
            // document would stay loaded and get saved under this one
            state.preview = DiagramPreview::default();
            state.set_text(content);
            state.history.clear();
            match &state.parse_error {
                Some(err) => log::warn!("Imported diagram that doesn't parse: {}", err),
                None => log::debug!("Imported diagram with {} shapes", state.preview.shapes.len()),
            }
            Ok(())
        }
        .boxed_local()
    }

    fn export_primary(&self) -> LocalBoxFuture<'static, Result<Option<String>, WidgetError>> {
        let state = self.state.clone();
        async move {
            let state = state.borrow();
            if state.destroyed {
                return Err(WidgetError::Destroyed);
            }
            Ok(Some(state.text.clone()).filter(|text| !text.is_empty()))
        }
        .boxed_local()
    }

    fn export_svg(&self) -> LocalBoxFuture<'static, Result<Option<String>, WidgetError>> {
        let state = self.state.clone();
        async move {
            let state = state.borrow();
            if state.destroyed {
                return Err(WidgetError::Destroyed);
            }
            if state.text.is_empty() {
                return Ok(None);
            }
            let preview = DiagramPreview::parse(&state.text).map_err(WidgetError::Export)?;
            Ok(Some(preview.to_svg()))
        }
        .boxed_local()
    }

    fn command_stack(&self) -> Rc<dyn CommandStack> {
        Rc::new(SourceCommandStack {
            state: self.state.clone(),
            listeners: self.listeners.clone(),
        })
    }

    fn destroy(&self) {
        let mut state = self.state.borrow_mut();
        state.destroyed = true;
        state.history.clear();
        self.listeners.clear();
        log::debug!("Source widget on {:?} destroyed", self.canvas);
    }

    fn canvas_ui(&self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
        let rect = response.rect;
        painter.rect_filled(rect, 0.0, egui::Color32::from_gray(248));

        let state = self.state.borrow();
        if state.preview.is_empty() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Nothing to draw",
                egui::FontId::proportional(14.0),
                egui::Color32::GRAY,
            );
        } else {
            state.preview.paint(&painter, rect.shrink(8.0));
        }
    }

    fn panel_ui(&self, ui: &mut egui::Ui) {
        if !self.show_panel {
            return;
        }
        let (mut text, parse_error) = {
            let state = self.state.borrow();
            (state.text.clone(), state.parse_error.clone())
        };

        ui.heading("Source");
        if let Some(err) = parse_error {
            ui.colored_label(ui.visuals().error_fg_color, format!("Preview out of date: {}", err));
        }
        egui::ScrollArea::vertical().show(ui, |ui| {
            let response = ui.add(
                egui::TextEdit::multiline(&mut text)
                    .id_salt(self.panel.0)
                    .code_editor()
                    .desired_width(f32::INFINITY),
            );
            if response.changed() {
                self.edit(text);
            }
        });
    }
}

/// Undo/redo over the source widget's edit history
struct SourceCommandStack {
    state: Rc<RefCell<SourceState>>,
    listeners: Rc<ChangeListeners>,
}

impl SourceCommandStack {
    fn apply(&self, step: impl FnOnce(&mut EditHistory) -> Option<String>) {
        let changed = {
            let mut state = self.state.borrow_mut();
            if state.destroyed {
                return;
            }
            match step(&mut state.history) {
                Some(text) => {
                    state.set_text(text);
                    true
                }
                None => false,
            }
        };
        if changed {
            self.listeners.emit();
        }
    }
}

impl CommandStack for SourceCommandStack {
    fn undo(&self) {
        self.apply(EditHistory::undo);
    }

    fn redo(&self) {
        self.apply(EditHistory::redo);
    }

    fn can_undo(&self) -> bool {
        self.state.borrow().history.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.state.borrow().history.can_redo()
    }
}

/// Creates [`SourceWidget`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceWidgetFactory;

impl WidgetFactory for SourceWidgetFactory {
    fn create(
        &self,
        canvas: MountPoint,
        panel: MountPoint,
        modules: &[String],
    ) -> Result<Rc<dyn DiagramWidget>, WidgetError> {
        if canvas == panel {
            return Err(WidgetError::Construction(
                "canvas and panel must be distinct mount points".to_owned(),
            ));
        }
        log::info!("Creating source widget with modules {:?}", modules);
        Ok(Rc::new(SourceWidget::new(canvas, panel, modules)))
    }
}
