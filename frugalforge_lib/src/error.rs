//! Error types for the library layer.

use std::fmt;

use crate::assemble::AssembleError;
use crate::client::FetchError;
use crate::skill_line::SkillLineError;
use crate::store::StoreError;

/// Fatal errors of a pipeline run. Anything that only skips a record is
/// counted in the run summary instead.
#[derive(Debug)]
pub enum ForgeError {
    /// A resource could not be fetched or cached.
    Fetch(FetchError),
    /// A datapack file could not be read or written.
    Store(StoreError),
    /// The scraped data failed an integrity check.
    Assemble(AssembleError),
    /// The skill-line CSV export could not be read.
    SkillLine(SkillLineError),
}

impl fmt::Display for ForgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "Fetch error: {}", e),
            Self::Store(e) => write!(f, "Datapack error: {}", e),
            Self::Assemble(e) => write!(f, "Integrity error: {}", e),
            Self::SkillLine(e) => write!(f, "CSV error: {}", e),
        }
    }
}

impl std::error::Error for ForgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Store(e) => Some(e),
            Self::Assemble(e) => Some(e),
            Self::SkillLine(e) => Some(e),
        }
    }
}

impl From<FetchError> for ForgeError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

impl From<StoreError> for ForgeError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<AssembleError> for ForgeError {
    fn from(e: AssembleError) -> Self {
        Self::Assemble(e)
    }
}

impl From<SkillLineError> for ForgeError {
    fn from(e: SkillLineError) -> Self {
        Self::SkillLine(e)
    }
}
