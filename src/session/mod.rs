//! Credential persistence and the session context built on top of it.

pub mod claims;
pub mod provider;
pub mod token_store;

pub use provider::{SessionHandle, SessionProvider, SessionSnapshot};
pub use token_store::{FileTokenStore, MemoryTokenStore, SharedTokenStore, TokenStore, TOKEN_KEY};
