use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;

use crate::config::AppConfig;
use crate::coordinator::Coordinator;
use crate::document::Document;
use crate::editor::EditorAdapter;
use crate::export;
use crate::panels::{self, ListAction, ToolbarAction, ToolbarView};
use crate::storage::{self, DiagramStorage, KeyValueStore};
use crate::templates;
use crate::widget::SourceWidgetFactory;

/// We derive Deserialize/Serialize so we can persist app state on shutdown.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct DiagramApp {
    config: AppConfig,
    examples_open: bool,
    // Storage handles, the widget and pending tasks live for this run only
    #[serde(skip)]
    runtime: Option<Runtime>,
}

impl Default for DiagramApp {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            examples_open: true,
            runtime: None,
        }
    }
}

impl DiagramApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut app: Self = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        app.runtime = Some(Runtime::new(&app.config));
        app
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl eframe::App for DiagramApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let Some(runtime) = self.runtime.as_mut() else {
            return;
        };
        runtime.pool.run_until_stalled();
        if runtime.coordinator.revision() != runtime.listing_revision {
            runtime.coordinator.ensure_selection_valid();
            runtime.refresh_listing();
        }

        let focused = ctx.memory(|mem| mem.focused().is_some());
        if !focused {
            runtime.handle_shortcuts(ctx);
        }

        let (can_undo, can_redo) = runtime.undo_state();
        let toolbar_action = panels::toolbar(
            ctx,
            ToolbarView {
                current_name: runtime.coordinator.current_name(),
                can_undo,
                can_redo,
            },
        );
        if let Some(action) = toolbar_action {
            runtime.handle_toolbar(action, &self.config);
        }

        runtime.fault_banner(ctx);

        let list_action = panels::diagram_list(
            ctx,
            &runtime.listing,
            runtime.coordinator.current_id().as_deref(),
            templates::EXAMPLES,
            &mut self.examples_open,
        );
        if let Some(action) = list_action {
            runtime.handle_list(action);
        }

        panels::central_panel(ctx, &mut runtime.adapter, runtime.coordinator.editing_content());

        let now = ctx.input(|i| i.time);
        runtime.end_frame(now);
        if let Some(remaining) = runtime.coordinator.autosave_remaining(now) {
            ctx.request_repaint_after(Duration::from_secs_f64(remaining));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(runtime) = self.runtime.as_mut() {
            runtime.coordinator.shutdown();
            runtime.adapter.teardown();
        }
    }
}

/// Everything that only exists while the app runs
struct Runtime {
    pool: LocalPool,
    spawner: LocalSpawner,
    adapter: EditorAdapter,
    coordinator: Coordinator<Box<dyn KeyValueStore>>,
    /// Change notifications from the widget since the last frame
    changes: Rc<Cell<u32>>,
    listing: Vec<Document>,
    listing_revision: u64,
    /// Failure to show in the banner until dismissed
    fault: Rc<RefCell<Option<String>>>,
}

impl Runtime {
    fn new(config: &AppConfig) -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();

        let mut adapter = EditorAdapter::new(SourceWidgetFactory, spawner.clone())
            .with_modules(config.widget_modules.clone());
        let changes = Rc::new(Cell::new(0));
        let counter = changes.clone();
        adapter.set_on_changed(move || counter.set(counter.get() + 1));

        let storage = Rc::new(DiagramStorage::with_config(storage::open_platform_store(config), config));
        let coordinator = Coordinator::new(storage, adapter.api(), spawner.clone(), config);
        let listing = coordinator.storage().list();
        let listing_revision = coordinator.revision();

        Self {
            pool,
            spawner,
            adapter,
            coordinator,
            changes,
            listing,
            listing_revision,
            fault: Rc::new(RefCell::new(None)),
        }
    }

    fn refresh_listing(&mut self) {
        self.listing = self.coordinator.storage().list();
        self.listing_revision = self.coordinator.revision();
    }

    fn undo_state(&self) -> (bool, bool) {
        self.coordinator
            .editor()
            .command_stack()
            .map(|stack| (stack.can_undo(), stack.can_redo()))
            .unwrap_or((false, false))
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let redo = ctx.input_mut(|i| {
            i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::Z)
        });
        let undo = !redo && ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z));
        if redo {
            self.step_history(false);
        } else if undo {
            self.step_history(true);
        }
    }

    fn handle_toolbar(&mut self, action: ToolbarAction, config: &AppConfig) {
        match action {
            ToolbarAction::New => {
                if let Err(err) = self.coordinator.create() {
                    self.report(format!("Could not create a diagram: {}", err));
                }
            }
            ToolbarAction::Save => {
                let save = self.coordinator.save();
                let fault = self.fault.clone();
                self.spawn(async move {
                    if let Err(err) = save.await {
                        log::error!("Save failed: {}", err);
                        *fault.borrow_mut() = Some(format!("Save failed: {}", err));
                    }
                });
            }
            ToolbarAction::DownloadPrimary => {
                let exported = self.coordinator.editor().export_primary();
                let file_name = export::download_file_name(self.coordinator.current_name(), &config.primary_extension);
                let fault = self.fault.clone();
                self.spawn(async move {
                    let Some(content) = exported.await else {
                        return;
                    };
                    if let Err(err) = export::deliver(&file_name, content.as_bytes(), export::PRIMARY_MIME) {
                        log::error!("Download of {} failed: {}", file_name, err);
                        *fault.borrow_mut() = Some(format!("Download failed: {}", err));
                    }
                });
            }
            ToolbarAction::DownloadPng => {
                let exported = self.coordinator.editor().export_svg();
                let file_name = export::download_file_name(self.coordinator.current_name(), "png");
                let scale = config.raster_scale;
                let fallback = config.raster_fallback_size;
                let fault = self.fault.clone();
                self.spawn(async move {
                    let Some(svg) = exported.await else {
                        return;
                    };
                    let delivered = export::rasterize_png(&svg, scale, fallback)
                        .and_then(|png| export::deliver(&file_name, &png, export::PNG_MIME));
                    if let Err(err) = delivered {
                        log::error!("PNG export of {} failed: {}", file_name, err);
                        *fault.borrow_mut() = Some(format!("PNG export failed: {}", err));
                    }
                });
            }
            ToolbarAction::Undo => self.step_history(true),
            ToolbarAction::Redo => self.step_history(false),
        }
    }

    fn step_history(&self, undo: bool) {
        let Some(stack) = self.coordinator.editor().command_stack() else {
            return;
        };
        if undo {
            stack.undo();
        } else {
            stack.redo();
        }
    }

    fn handle_list(&mut self, action: ListAction) {
        let result = match action {
            ListAction::Select(id) => self.coordinator.select(&id).map(|_| ()),
            ListAction::Delete(id) => self.coordinator.delete(&id),
            ListAction::LoadExample(index) => {
                if let Some(example) = templates::EXAMPLES.get(index) {
                    self.coordinator.load_example(example);
                }
                Ok(())
            }
        };
        if let Err(err) = result {
            self.report(format!("Storage write failed: {}", err));
        }
    }

    /// Feed this frame's edits to the auto-save timer and run ready tasks
    fn end_frame(&mut self, now: f64) {
        if self.changes.replace(0) > 0 {
            self.coordinator.notify_changed(now);
        }
        self.coordinator.poll_autosave(now);
        self.pool.run_until_stalled();

        if let Some(fault) = self.coordinator.take_fault() {
            *self.fault.borrow_mut() = Some(fault);
        }
    }

    fn fault_banner(&self, ctx: &egui::Context) {
        let Some(message) = self.fault.borrow().clone() else {
            return;
        };
        egui::TopBottomPanel::top("fault_banner").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(ui.visuals().error_fg_color, message);
                if ui.small_button("Dismiss").clicked() {
                    *self.fault.borrow_mut() = None;
                }
            });
        });
    }

    fn report(&self, message: String) {
        log::error!("{}", message);
        *self.fault.borrow_mut() = Some(message);
    }

    fn spawn(&self, task: impl std::future::Future<Output = ()> + 'static) {
        if let Err(err) = self.spawner.spawn_local(task) {
            log::error!("Failed to schedule task: {}", err);
        }
    }
}
