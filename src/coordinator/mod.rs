mod debounce;
mod session;
mod state;

pub use debounce::Debouncer;
pub use session::Coordinator;
pub use state::SessionState;
