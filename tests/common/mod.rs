#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use eframe_diagram::widget::ChangeListener;
use eframe_diagram::{CommandStack, DiagramWidget, MountPoint, WidgetError, WidgetFactory};
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use futures::FutureExt;

/// Everything a test can observe about, and script for, the fake widgets
#[derive(Default)]
pub struct Recorder {
    pub created: Cell<usize>,
    pub destroyed: Cell<usize>,
    pub modules: RefCell<Vec<String>>,
    pub mounts: RefCell<Vec<(MountPoint, MountPoint)>>,
    /// Every body handed to `import`, in call order
    pub imports: RefCell<Vec<String>>,
    /// What the live widget currently holds; exported as the primary format
    pub content: RefCell<String>,
    pub svg: RefCell<Option<String>>,
    pub fail_create: Cell<bool>,
    pub fail_import: Cell<bool>,
    pub fail_export: Cell<bool>,
    /// When set, imports wait until [`Recorder::release_import`]
    pub hold_imports: Cell<bool>,
    held: RefCell<Vec<oneshot::Sender<()>>>,
    listeners: RefCell<Vec<ChangeListener>>,
    pub undos: Cell<usize>,
    pub redos: Cell<usize>,
}

impl Recorder {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Simulate a user edit inside the widget
    pub fn edit(&self, content: &str) {
        *self.content.borrow_mut() = content.to_owned();
        self.fire_change();
    }

    pub fn fire_change(&self) {
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn held_imports(&self) -> usize {
        self.held.borrow().len()
    }

    /// Let the oldest held import complete
    pub fn release_import(&self) {
        let sender = self.held.borrow_mut().remove(0);
        let _ = sender.send(());
    }

    pub fn import_count(&self) -> usize {
        self.imports.borrow().len()
    }
}

pub struct FakeFactory {
    pub recorder: Rc<Recorder>,
}

impl WidgetFactory for FakeFactory {
    fn create(
        &self,
        canvas: MountPoint,
        panel: MountPoint,
        modules: &[String],
    ) -> Result<Rc<dyn DiagramWidget>, WidgetError> {
        if self.recorder.fail_create.get() {
            return Err(WidgetError::Construction("scripted failure".to_owned()));
        }
        self.recorder.created.set(self.recorder.created.get() + 1);
        *self.recorder.modules.borrow_mut() = modules.to_vec();
        self.recorder.mounts.borrow_mut().push((canvas, panel));
        Ok(Rc::new(FakeWidget {
            recorder: self.recorder.clone(),
            destroyed: Cell::new(false),
        }))
    }
}

pub struct FakeWidget {
    recorder: Rc<Recorder>,
    destroyed: Cell<bool>,
}

impl DiagramWidget for FakeWidget {
    fn on_command_stack_changed(&self, listener: ChangeListener) {
        self.recorder.listeners.borrow_mut().push(listener);
    }

    fn import(&self, content: &str) -> LocalBoxFuture<'static, Result<(), WidgetError>> {
        self.recorder.imports.borrow_mut().push(content.to_owned());
        let recorder = self.recorder.clone();
        let content = content.to_owned();
        let fail = self.recorder.fail_import.get();

        let gate = if self.recorder.hold_imports.get() {
            let (tx, rx) = oneshot::channel();
            self.recorder.held.borrow_mut().push(tx);
            Some(rx)
        } else {
            None
        };

        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if fail {
                return Err(WidgetError::Import("scripted failure".to_owned()));
            }
            *recorder.content.borrow_mut() = content;
            Ok(())
        }
        .boxed_local()
    }

    fn export_primary(&self) -> LocalBoxFuture<'static, Result<Option<String>, WidgetError>> {
        let result = if self.recorder.fail_export.get() {
            Err(WidgetError::Export("scripted failure".to_owned()))
        } else {
            Ok(Some(self.recorder.content.borrow().clone()))
        };
        async move { result }.boxed_local()
    }

    fn export_svg(&self) -> LocalBoxFuture<'static, Result<Option<String>, WidgetError>> {
        let result = Ok(self.recorder.svg.borrow().clone());
        async move { result }.boxed_local()
    }

    fn command_stack(&self) -> Rc<dyn CommandStack> {
        Rc::new(FakeStack {
            recorder: self.recorder.clone(),
        })
    }

    fn destroy(&self) {
        assert!(!self.destroyed.replace(true), "widget destroyed twice");
        self.recorder.destroyed.set(self.recorder.destroyed.get() + 1);
        self.recorder.listeners.borrow_mut().clear();
    }
}

struct FakeStack {
    recorder: Rc<Recorder>,
}

impl CommandStack for FakeStack {
    fn undo(&self) {
        self.recorder.undos.set(self.recorder.undos.get() + 1);
    }

    fn redo(&self) {
        self.recorder.redos.set(self.recorder.redos.get() + 1);
    }

    fn can_undo(&self) -> bool {
        true
    }

    fn can_redo(&self) -> bool {
        false
    }
}

pub fn canvas() -> MountPoint {
    MountPoint::new("canvas")
}

pub fn panel() -> MountPoint {
    MountPoint::new("panel")
}
