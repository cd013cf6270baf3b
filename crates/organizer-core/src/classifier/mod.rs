mod openrouter;
mod payload;

pub use openrouter::OpenRouterClassifier;
pub use payload::parse_categorizations;

use crate::error::Error;
use crate::model::{Categorization, Entry};

/// External oracle mapping source entries to target paths.
///
/// Implementations may omit entries or return several targets per entry.
/// An `Err` aborts the pass before anything is cleaned or recorded.
pub trait Classifier: Send + Sync {
    fn classify(&self, items: &[Entry]) -> Result<Vec<Categorization>, Error>;
}
