//! Application configuration

pub mod prompts;

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the assistant backend.
    pub api_url: String,
    /// Directory holding the chat blob and theme scalar.
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            api_url: env::var("MEDIKA_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".into()),
            data_dir: env::var("MEDIKA_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
        })
    }
}
