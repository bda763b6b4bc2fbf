mod adapter;
mod api;
mod cancel;

pub use adapter::EditorAdapter;
pub use api::EditorApi;
pub use cancel::CancelToken;
