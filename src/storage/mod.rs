mod backend;
mod service;

pub use backend::{KeyValueStore, MemoryStore};
pub use service::DiagramStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use backend::FileStore;

#[cfg(target_arch = "wasm32")]
pub use backend::LocalStore;

/// Open the persistent store for this platform.
///
/// Falls back to an in-memory store (with a warning) when the platform store
/// can't be opened, so the editor stays usable for the session.
pub fn open_platform_store(config: &crate::config::AppConfig) -> Box<dyn KeyValueStore> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let path = config.resolved_store_path();
        log::info!("Using diagram store at {}", path.display());
        Box::new(FileStore::new(path))
    }

    #[cfg(target_arch = "wasm32")]
    {
        let _ = config;
        match LocalStore::open() {
            Ok(store) => Box::new(store),
            Err(err) => {
                log::warn!("localStorage unavailable, diagrams will not persist: {}", err);
                Box::new(MemoryStore::new())
            }
        }
    }
}
