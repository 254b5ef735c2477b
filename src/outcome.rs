use crate::error::UpdateError;
use std::fmt;
use std::path::Path;

/// Result of trying to update a single descriptor file
#[derive(Debug)]
pub enum Outcome {
    /// At least one version field was rewritten and the file saved
    Updated,
    /// No recognized version field; the file was not touched
    Skipped,
    Failed(UpdateError),
}

impl Outcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, Outcome::Updated)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// The line shown to the user for `path`
    pub fn describe(&self, path: &Path) -> String {
        match self {
            Outcome::Updated => format!("✅ Updated: {}", path.display()),
            Outcome::Skipped => format!("⏭️ Skipped (no matching tags): {}", path.display()),
            Outcome::Failed(err) => format!("❌ Error processing {}: {}", path.display(), err),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Updated => f.write_str("updated"),
            Outcome::Skipped => f.write_str("skipped"),
            Outcome::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}
