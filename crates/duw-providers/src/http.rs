// Archivo: http.rs
// Blocking reqwest implementation of the `Transport` port.
use crate::errors::ProviderError;
use duw_domain::Transport;
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

const USER_AGENT: &str = "duw-collector/0.1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP transport. Failures and non-2xx answers are logged and reported as an
/// empty body.
///
/// The blocking client must not be used from inside an async runtime.
pub struct HttpTransport {
  client: Client,
  token: Option<String>,
}

impl HttpTransport {
  pub fn new() -> Result<Self, ProviderError> {
    let client = Client::builder().user_agent(USER_AGENT)
                                  .timeout(REQUEST_TIMEOUT)
                                  .connect_timeout(CONNECT_TIMEOUT)
                                  .build()?;
    Ok(Self { client, token: None })
  }

  /// Sends `Authorization: Bearer <token>` with every request.
  pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
    self.token = Some(token.into());
    self
  }

  fn send(&self, method: &str, url: &str, request: RequestBuilder) -> Vec<u8> {
    let request = match &self.token {
      Some(token) => request.bearer_auth(token),
      None => request,
    };
    match execute(url, request) {
      Ok(body) => {
        debug!("{} {} -> {} bytes", method, url, body.len());
        body
      }
      Err(e) => {
        warn!("{} {} failed: {}", method, url, e);
        Vec::new()
      }
    }
  }
}

fn execute(url: &str, request: RequestBuilder) -> Result<Vec<u8>, ProviderError> {
  let response = request.send()?;
  let status = response.status();
  if !status.is_success() {
    return Err(ProviderError::Status { url: url.to_string(),
                                       status: status.as_u16() });
  }
  Ok(response.bytes()?.to_vec())
}

impl Transport for HttpTransport {
  fn get(&self, url: &str) -> Vec<u8> {
    self.send("GET", url, self.client.get(url))
  }

  fn put(&self, url: &str, body: &[u8]) -> Vec<u8> {
    let request = self.client
                      .put(url)
                      .header(CONTENT_TYPE, "application/json")
                      .body(body.to_vec());
    self.send("PUT", url, request)
  }

  fn patch(&self, url: &str, body: &[u8]) -> Vec<u8> {
    let request = self.client
                      .patch(url)
                      .header(CONTENT_TYPE, "application/json")
                      .body(body.to_vec());
    self.send("PATCH", url, request)
  }
}
