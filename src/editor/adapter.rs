use std::cell::RefCell;
use std::rc::Rc;

use futures::executor::LocalSpawner;
use futures::task::LocalSpawnExt;

use super::api::{EditorApi, LiveWidget};
use super::CancelToken;
use crate::config::DEFAULT_WIDGET_MODULES;
use crate::widget::{DiagramWidget, MountPoint, WidgetFactory};

/// Callback slot shared with the widget's change listener
type ChangedCallback = Rc<RefCell<Option<Box<dyn FnMut()>>>>;

/// Content the caller wants shown: a document key and its markup
#[derive(Debug, Clone, PartialEq, Eq)]
struct Content {
    key: String,
    body: String,
}

/// Owns the lifecycle of the diagramming widget.
///
/// # Lifecycle
///
/// - A widget exists only while both mount points are present.
/// - It is rebuilt iff a mount point's identity changes, never because the
///   content changed.
/// - Content is imported on construction and again whenever the requested
///   key or body changes by value.
/// - Teardown destroys the live widget before anything new is created and
///   cancels any import still in flight.
pub struct EditorAdapter {
    factory: Box<dyn WidgetFactory>,
    spawner: LocalSpawner,
    modules: Vec<String>,
    mounts: Option<(MountPoint, MountPoint)>,
    live: LiveWidget,
    on_changed: ChangedCallback,
    /// Content most recently requested by the caller
    requested: Option<Content>,
    /// Content the live widget was last asked to import
    applied: Option<Content>,
    pending_import: Option<CancelToken>,
    last_import_error: Rc<RefCell<Option<String>>>,
}

impl EditorAdapter {
    pub fn new(factory: impl WidgetFactory + 'static, spawner: LocalSpawner) -> Self {
        Self {
            factory: Box::new(factory),
            spawner,
            modules: DEFAULT_WIDGET_MODULES.iter().map(|m| (*m).to_owned()).collect(),
            mounts: None,
            live: Rc::new(RefCell::new(None)),
            on_changed: Rc::new(RefCell::new(None)),
            requested: None,
            applied: None,
            pending_import: None,
            last_import_error: Rc::new(RefCell::new(None)),
        }
    }

    /// Override the module list handed to the factory on the next construction
    pub fn with_modules(mut self, modules: Vec<String>) -> Self {
        self.modules = modules;
        self
    }

    /// The capability surface. Handles stay valid across reconstructions.
    pub fn api(&self) -> EditorApi {
        EditorApi::new(self.live.clone())
    }

    pub fn is_live(&self) -> bool {
        self.live.borrow().is_some()
    }

    /// Error from the most recent import that completed without being cancelled
    pub fn last_import_error(&self) -> Option<String> {
        self.last_import_error.borrow().clone()
    }

    /// Set the callback fired on every command-stack change.
    ///
    /// The widget's listener always dispatches to the latest callback, so
    /// swapping it never rebuilds the widget.
    pub fn set_on_changed(&mut self, callback: impl FnMut() + 'static) {
        *self.on_changed.borrow_mut() = Some(Box::new(callback));
    }

    pub fn clear_on_changed(&mut self) {
        *self.on_changed.borrow_mut() = None;
    }

    /// Report the current mount points. Call every frame.
    pub fn mount(&mut self, canvas: Option<MountPoint>, panel: Option<MountPoint>) {
        let next = canvas.zip(panel);
        if next == self.mounts {
            return;
        }

        self.teardown();
        self.mounts = next;
        if let Some((canvas, panel)) = next {
            self.construct(canvas, panel);
        }
    }

    /// Request that `body` be shown for document `key`. Call every frame.
    ///
    /// Imports only when the pair differs by value from what the live widget
    /// last received. Empty bodies are never imported.
    pub fn load(&mut self, key: &str, body: &str) {
        let unchanged = self
            .requested
            .as_ref()
            .is_some_and(|content| content.key == key && content.body == body);
        if !unchanged {
            self.requested = Some(Content {
                key: key.to_owned(),
                body: body.to_owned(),
            });
        }
        self.sync_content();
    }

    /// Forget the requested content (nothing is being edited)
    pub fn unload(&mut self) {
        self.requested = None;
    }

    /// Destroy the live widget, if any, and cancel its in-flight import
    pub fn teardown(&mut self) {
        if let Some(token) = self.pending_import.take() {
            token.cancel();
        }
        self.applied = None;
        self.mounts = None;

        let widget = self.live.borrow_mut().take();
        if let Some(widget) = widget {
            widget.destroy();
            log::info!("Diagram widget destroyed");
        }
    }

    pub fn canvas_ui(&self, ui: &mut egui::Ui) {
        let widget = self.live.borrow().clone();
        if let Some(widget) = widget {
            widget.canvas_ui(ui);
        }
    }

    pub fn panel_ui(&self, ui: &mut egui::Ui) {
        let widget = self.live.borrow().clone();
        if let Some(widget) = widget {
            widget.panel_ui(ui);
        }
    }

    fn construct(&mut self, canvas: MountPoint, panel: MountPoint) {
        let widget: Rc<dyn DiagramWidget> = match self.factory.create(canvas, panel, &self.modules) {
            Ok(widget) => widget,
            Err(err) => {
                log::error!("Failed to create diagram widget: {}", err);
                return;
            }
        };

        let on_changed = self.on_changed.clone();
        widget.on_command_stack_changed(Rc::new(move || {
            if let Some(callback) = on_changed.borrow_mut().as_mut() {
                callback();
            }
        }));

        *self.live.borrow_mut() = Some(widget);
        log::info!("Diagram widget created");
        self.sync_content();
    }

    fn sync_content(&mut self) {
        if self.requested == self.applied {
            return;
        }
        let Some(widget) = self.live.borrow().clone() else {
            return;
        };
        let Some(content) = self.requested.clone() else {
            return;
        };
        if content.body.is_empty() {
            return;
        }

        if let Some(previous) = self.pending_import.take() {
            previous.cancel();
        }
        let token = CancelToken::new();
        self.pending_import = Some(token.clone());
        self.applied = Some(content.clone());

        log::debug!("Importing diagram {}", content.key);
        let import = widget.import(&content.body);
        let last_error = self.last_import_error.clone();
        let task = async move {
            let result = import.await;
            if token.is_cancelled() {
                return;
            }
            match result {
                Ok(()) => *last_error.borrow_mut() = None,
                Err(err) => {
                    log::error!("Failed to import diagram {}: {}", content.key, err);
                    *last_error.borrow_mut() = Some(err.to_string());
                }
            }
        };
        if let Err(err) = self.spawner.spawn_local(task) {
            log::error!("Failed to schedule diagram import: {}", err);
        }
    }
}

impl Drop for EditorAdapter {
    fn drop(&mut self) {
        self.teardown();
    }
}
