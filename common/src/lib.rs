pub mod error;
pub mod models;
pub mod rebase;
pub mod trigger;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Reference currency the upstream provider anchors its tables to when it
/// does not say otherwise.
pub const DEFAULT_ANCHOR_CURRENCY: &str = "EUR";
