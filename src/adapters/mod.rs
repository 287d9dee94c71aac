pub mod api_client;
pub mod backend;
pub mod demo;
pub mod transport;

pub use api_client::{ApiClient, AuthEvent};
pub use backend::BackendApi;
pub use demo::{DemoTransport, DEMO_PASSWORD, DEMO_TOKEN, DEMO_USERNAME};
pub use transport::{ApiRequest, ApiResponse, RequestBody, ReqwestTransport, Transport};
