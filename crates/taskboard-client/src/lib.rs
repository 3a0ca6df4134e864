pub mod envelope;
pub mod gateway;
pub mod http;

pub mod mock;

pub use gateway::TaskGateway;
pub use http::HttpTaskGateway;
pub use mock::{MockCall, MockGateway, MockResponse};
