pub mod error;
pub mod utils;

pub use error::{DiffpackError, ProviderError, Result};
pub use utils::{ParseWithDefault, truncate_chars};
