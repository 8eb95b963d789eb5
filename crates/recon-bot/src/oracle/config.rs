use super::OracleFault;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const STOCKFISH_ENV_VAR: &str = "STOCKFISH_EXECUTABLE";

/// Where the engine executable lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleConfig {
    executable: PathBuf,
}

impl OracleConfig {
    pub fn new(executable: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let executable = executable.into();
        if executable.as_os_str().is_empty() || !executable.is_file() {
            return Err(ConfigError::NotFound { path: executable });
        }
        Ok(Self { executable })
    }

    /// Reads the executable path from `STOCKFISH_EXECUTABLE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub(crate) fn from_reader<F>(mut read: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let raw = read(STOCKFISH_ENV_VAR)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .ok_or(ConfigError::MissingVariable {
                var: STOCKFISH_ENV_VAR,
            })?;
        Self::new(raw)
    }
}

/// Fatal problems found while constructing the agent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {var} must point to the engine executable")]
    MissingVariable { var: &'static str },
    #[error("no engine executable found at {path:?}")]
    NotFound { path: PathBuf },
    #[error("failed to start engine {path:?}: {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: OracleFault,
    },
}
