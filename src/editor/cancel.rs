use std::cell::Cell;
use std::rc::Rc;

/// Cancellation flag for one asynchronous widget operation.
///
/// The owner keeps one clone and cancels it at teardown; the task keeps the
/// other and checks it before applying any effect of its result.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}
