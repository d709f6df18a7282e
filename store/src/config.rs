use std::path::PathBuf;

/// Which engine backs the stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local, lost on restart
    Memory,
    /// fjall keyspace rooted at the given directory
    Disk(PathBuf),
}

/// Configuration for the rate and webhook stores
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
        }
    }
}

impl StoreConfig {
    /// Create a store configuration from environment variables.
    ///
    /// `STORE_PATH` selects the disk backend; without it data is kept in
    /// memory.
    pub fn from_env() -> Self {
        match std::env::var("STORE_PATH") {
            Ok(path) if !path.trim().is_empty() => Self {
                backend: StoreBackend::Disk(PathBuf::from(path)),
            },
            _ => Self::default(),
        }
    }
}
