pub mod models;

mod memory;
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
mod file_store;
#[cfg(not(target_arch = "wasm32"))]
pub use file_store::{session_dir, FileStore};

pub use models::{Session, UserProfile};

/// Async interface for persisting the client-side [`Session`].
///
/// Implementations are whole-value: `save` replaces the stored session in its
/// entirety and `clear` removes every field at once, so readers never observe
/// a partially written or partially cleared session. No token validation or
/// expiry tracking happens here; an access token is only discovered to be
/// stale when the server rejects it.
pub trait SessionStore {
    fn load(&self) -> impl std::future::Future<Output = Option<Session>> + Send;
    fn save(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = ()> + Send;
    fn clear(&self) -> impl std::future::Future<Output = ()> + Send;
}
