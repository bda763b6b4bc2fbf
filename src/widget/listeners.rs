use std::cell::RefCell;
use std::rc::Rc;

/// Callback fired when the widget's command stack changes
pub type ChangeListener = Rc<dyn Fn()>;

/// A small broadcast list of change listeners
#[derive(Default)]
pub struct ChangeListeners {
    listeners: RefCell<Vec<ChangeListener>>,
}

impl std::fmt::Debug for ChangeListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeListeners")
            .field("listeners", &format!("<{} listeners>", self.listeners.borrow().len()))
            .finish()
    }
}

impl ChangeListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener to receive notifications
    pub fn subscribe(&self, listener: ChangeListener) {
        self.listeners.borrow_mut().push(listener);
    }

    /// Notify every listener.
    ///
    /// The list is snapshotted first, so a listener may subscribe or clear
    /// without tripping the `RefCell`.
    pub fn emit(&self) {
        let snapshot: Vec<ChangeListener> = self.listeners.borrow().clone();
        for listener in snapshot {
            listener();
        }
    }

    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
