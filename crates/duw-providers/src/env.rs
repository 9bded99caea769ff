// Archivo: env.rs
use duw_domain::ConfigSource;

/// Settings read from the process environment. A `.env` file in the working
/// directory, when present, is loaded first and never overrides variables
/// that are already set.
#[derive(Debug, Clone, Copy)]
pub struct EnvConfigSource;

impl EnvConfigSource {
  pub fn new() -> Self {
    dotenvy::dotenv().ok();
    Self
  }
}

impl Default for EnvConfigSource {
  fn default() -> Self {
    Self::new()
  }
}

impl ConfigSource for EnvConfigSource {
  fn lookup(&self, name: &str) -> Option<String> {
    std::env::var(name).ok()
  }
}
