//! Production adapters for the ports of `duw_domain`: a blocking HTTP
//! transport, the GitHub backup of the store file and the environment
//! settings source.
pub mod env;
pub mod errors;
pub mod github;
pub mod http;

pub use env::EnvConfigSource;
pub use errors::ProviderError;
pub use github::{GitHubBackupSync, RemoteRef};
pub use http::HttpTransport;
