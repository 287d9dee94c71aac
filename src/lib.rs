pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod pages;
pub mod routing;
pub mod session;
pub mod tui;

pub use adapters::{ApiClient, AuthEvent, BackendApi, DemoTransport, ReqwestTransport, Transport};
pub use config::AppConfig;
pub use error::{DeskError, Result};
pub use routing::{GuardDecision, Route};
pub use session::{
    FileTokenStore, MemoryTokenStore, SessionHandle, SessionProvider, SessionSnapshot,
    SharedTokenStore, TokenStore,
};
