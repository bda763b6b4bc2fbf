use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use futures::executor::LocalSpawner;
use futures::task::LocalSpawnExt;

use super::{Debouncer, SessionState};
use crate::config::AppConfig;
use crate::document::Document;
use crate::editor::EditorApi;
use crate::error::StorageResult;
use crate::storage::{DiagramStorage, KeyValueStore};
use crate::templates::{self, ExampleTemplate};

/// Mediates between UI intents, document storage and the editor.
///
/// Owns the session state, the editing buffer (the content last loaded from
/// storage or a template) and the auto-save timer. Storage write failures on
/// the create/select/delete/save paths are returned to the caller; auto-save
/// failures are logged and kept as a fault for the UI to show.
pub struct Coordinator<S: KeyValueStore> {
    storage: Rc<DiagramStorage<S>>,
    editor: EditorApi,
    spawner: LocalSpawner,
    session: Rc<RefCell<SessionState>>,
    buffer: String,
    current_name: Option<String>,
    autosave: Debouncer,
    revision: Rc<Cell<u64>>,
    fault: Rc<RefCell<Option<String>>>,
}

impl<S: KeyValueStore + 'static> Coordinator<S> {
    /// Start a session, restoring the persisted selection if it still
    /// resolves. A stale pointer is cleared.
    pub fn new(
        storage: Rc<DiagramStorage<S>>,
        editor: EditorApi,
        spawner: LocalSpawner,
        config: &AppConfig,
    ) -> Self {
        let mut coordinator = Self {
            storage,
            editor,
            spawner,
            session: Rc::new(RefCell::new(SessionState::NoSelection)),
            buffer: String::new(),
            current_name: None,
            autosave: Debouncer::new(config.autosave_delay_secs),
            revision: Rc::new(Cell::new(0)),
            fault: Rc::new(RefCell::new(None)),
        };
        coordinator.restore();
        coordinator
    }

    fn restore(&mut self) {
        let Some(id) = self.storage.current_id() else {
            return;
        };
        match self.storage.get(&id) {
            Some(doc) => {
                log::info!("Restored diagram {} ({})", doc.name, doc.id);
                self.enter_editing(doc);
            }
            None => {
                log::warn!("Current diagram {} no longer exists, clearing selection", id);
                if let Err(err) = self.storage.set_current_id(None) {
                    log::error!("Failed to clear stale selection: {}", err);
                }
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.borrow().clone()
    }

    /// Id of the persisted document being edited
    pub fn current_id(&self) -> Option<String> {
        self.session.borrow().current_id().map(str::to_owned)
    }

    /// Display name of whatever is being edited, draft included
    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    /// Key and content the editor should show, `None` when nothing is open
    pub fn editing_content(&self) -> Option<(String, &str)> {
        let key = self.session.borrow().content_key()?.to_owned();
        Some((key, self.buffer.as_str()))
    }

    pub fn storage(&self) -> &DiagramStorage<S> {
        &self.storage
    }

    pub fn editor(&self) -> &EditorApi {
        &self.editor
    }

    /// Bumped on every persisted change; views cache listings against it
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    /// Take the last auto-save failure, if any
    pub fn take_fault(&self) -> Option<String> {
        self.fault.borrow_mut().take()
    }

    /// Create, persist and open a new empty diagram.
    ///
    /// The name counts the documents that exist right now, so deleting and
    /// creating again can repeat a name.
    pub fn create(&mut self) -> StorageResult<Document> {
        self.flush_pending();

        let name = format!("Diagram {}", self.storage.len() + 1);
        let doc = Document::new(name, templates::EMPTY_DIAGRAM);
        self.storage.save(&doc)?;
        self.storage.set_current_id(Some(&doc.id))?;
        log::info!("Created diagram {} ({})", doc.name, doc.id);

        self.enter_editing(doc.clone());
        self.bump_revision();
        Ok(doc)
    }

    /// Open an existing document. Returns `Ok(false)` if `id` doesn't resolve.
    pub fn select(&mut self, id: &str) -> StorageResult<bool> {
        let Some(doc) = self.storage.get(id) else {
            log::warn!("Ignoring selection of unknown diagram {}", id);
            return Ok(false);
        };
        if self.session.borrow().content_key() != Some(id) {
            self.flush_pending();
        }
        self.storage.set_current_id(Some(id))?;
        self.enter_editing(doc);
        Ok(true)
    }

    /// Delete a document; deleting the open one closes the editor
    pub fn delete(&mut self, id: &str) -> StorageResult<()> {
        self.storage.delete(id)?;
        if self.session.borrow().current_id() == Some(id) {
            self.autosave.cancel();
            self.leave_editing();
        }
        log::info!("Deleted diagram {}", id);
        self.bump_revision();
        Ok(())
    }

    /// Open an example as an unsaved draft. Nothing is persisted until a
    /// manual save.
    pub fn load_example(&mut self, example: &ExampleTemplate) {
        self.flush_pending();
        *self.session.borrow_mut() = SessionState::Draft {
            id: crate::id_generator::generate_id(),
            name: example.name.to_owned(),
        };
        self.buffer = example.content.to_owned();
        self.current_name = Some(example.name.to_owned());
        log::info!("Loaded example {}", example.name);
    }

    /// Drop the selection if its document has disappeared from storage.
    /// Returns true if the session changed.
    pub fn ensure_selection_valid(&mut self) -> bool {
        let Some(id) = self.current_id() else {
            return false;
        };
        if self.storage.get(&id).is_some() {
            return false;
        }
        log::warn!("Diagram {} disappeared from storage", id);
        self.autosave.cancel();
        self.leave_editing();
        if let Err(err) = self.storage.set_current_id(None) {
            log::error!("Failed to clear stale selection: {}", err);
        }
        true
    }

    /// Export the editor's content and persist it against the open document.
    ///
    /// Resolves to `Ok(true)` when something was written. No-op with nothing
    /// open, an empty export, or a document that vanished meanwhile. Saving a
    /// draft persists it as a new document and selects it.
    pub fn save(&self) -> impl Future<Output = StorageResult<bool>> + use<S> + 'static {
        let target = self.session.borrow().clone();
        let export = self.editor.export_primary();
        let storage = self.storage.clone();
        let session = self.session.clone();
        let revision = self.revision.clone();

        async move {
            if target.is_idle() {
                return Ok(false);
            }
            let Some(content) = export.await else {
                log::debug!("Nothing to save: editor produced no content");
                return Ok(false);
            };

            match target {
                SessionState::Editing { id } => {
                    let Some(doc) = storage.get(&id) else {
                        log::warn!("Not saving {}: the diagram no longer exists", id);
                        return Ok(false);
                    };
                    storage.save(&doc.revised(content))?;
                    log::info!("Saved diagram {}", doc.name);
                }
                SessionState::Draft { id, name } => {
                    // An earlier save of the same draft may already have landed
                    let doc = match storage.get(&id) {
                        Some(existing) => existing.revised(content),
                        None => Document::with_id(id.clone(), name.clone(), content),
                    };
                    storage.save(&doc)?;
                    let still_open = matches!(&*session.borrow(), SessionState::Draft { id: open, .. } if *open == id);
                    if still_open {
                        storage.set_current_id(Some(&id))?;
                        *session.borrow_mut() = SessionState::Editing { id };
                    }
                    log::info!("Saved draft {} as a new diagram", name);
                }
                SessionState::NoSelection => return Ok(false),
            }

            revision.set(revision.get() + 1);
            Ok(true)
        }
    }

    /// Called for every change notification from the editor
    pub fn notify_changed(&mut self, now: f64) {
        self.autosave.restart(now);
    }

    /// Run the trailing edge of the auto-save debounce.
    ///
    /// Returns true if a save was scheduled on the spawner.
    pub fn poll_autosave(&mut self, now: f64) -> bool {
        if !self.autosave.poll(now) {
            return false;
        }
        if !self.session.borrow().is_editing() {
            return false;
        }
        self.spawn_save("Auto-save")
    }

    /// Seconds until a pending auto-save fires
    pub fn autosave_remaining(&self, now: f64) -> Option<f64> {
        self.autosave.remaining(now)
    }

    /// Cancel the pending auto-save. No save fires afterwards.
    pub fn shutdown(&mut self) {
        if self.autosave.is_pending() {
            log::debug!("Discarding pending auto-save");
        }
        self.autosave.cancel();
    }

    /// Save immediately if an auto-save is pending, before the session moves
    /// to another document.
    ///
    /// The save task is spawned before the caller's next import, and the
    /// local pool first polls tasks in spawn order, so it exports the old
    /// document's content.
    fn flush_pending(&mut self) {
        if self.autosave.is_pending() {
            self.autosave.cancel();
            if self.session.borrow().is_editing() {
                self.spawn_save("Pending auto-save");
            }
        }
    }

    fn spawn_save(&self, label: &'static str) -> bool {
        let save = self.save();
        let fault = self.fault.clone();
        let task = async move {
            if let Err(err) = save.await {
                log::error!("{} failed: {}", label, err);
                *fault.borrow_mut() = Some(format!("{} failed: {}", label, err));
            }
        };
        match self.spawner.spawn_local(task) {
            Ok(()) => true,
            Err(err) => {
                log::error!("Failed to schedule {}: {}", label, err);
                false
            }
        }
    }

    fn enter_editing(&mut self, doc: Document) {
        *self.session.borrow_mut() = SessionState::Editing { id: doc.id };
        self.current_name = Some(doc.name);
        self.buffer = doc.content;
    }

    fn leave_editing(&mut self) {
        *self.session.borrow_mut() = SessionState::NoSelection;
        self.current_name = None;
        self.buffer.clear();
    }

    fn bump_revision(&self) {
        self.revision.set(self.revision.get() + 1);
    }
}

impl<S: KeyValueStore> Drop for Coordinator<S> {
    fn drop(&mut self) {
        self.autosave.cancel();
    }
}
