//! Error kinds for pagination and assembly
//!
//! Every kind is recoverable by running a fresh pass; none of them should
//! reach the renderer as a crash.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The rendering surface is not mounted yet
    #[error("measurement surface is not available")]
    MeasurementUnavailable,

    /// A single logical line is taller than the page budget
    #[error("logical line of {chars} chars exceeds the page budget ({height:.1}px > {budget:.1}px)")]
    OversizedLine { chars: usize, height: f32, budget: f32 },

    /// A topic has no text
    #[error("topic '{topic}' in chapter '{chapter}' is empty")]
    EmptyContent { chapter: String, topic: String },

    /// Pagination results and store disagree about which topics exist
    #[error("pagination results for '{chapter}/{topic}' do not match the content store")]
    InconsistentStore { chapter: String, topic: String },

    /// Assembly withheld because some topics are still pending
    #[error("{pending} topic(s) still waiting for measurement")]
    NotReady { pending: usize },

    /// A pass is already running
    #[error("a recompute pass is already in progress")]
    Busy,

    /// Config or store JSON could not be parsed
    #[error("invalid JSON: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub fn inconsistent(chapter: impl Into<String>, topic: impl Into<String>) -> Self {
        Self::InconsistentStore {
            chapter: chapter.into(),
            topic: topic.into(),
        }
    }

    /// Whether a later pass can be expected to clear this error
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::MeasurementUnavailable
                | Error::InconsistentStore { .. }
                | Error::NotReady { .. }
                | Error::Busy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::inconsistent("Physics", "Optics");
        assert_eq!(
            err.to_string(),
            "pagination results for 'Physics/Optics' do not match the content store"
        );
        assert_eq!(
            Error::NotReady { pending: 2 }.to_string(),
            "2 topic(s) still waiting for measurement"
        );
    }

    #[test]
    fn test_transient() {
        assert!(Error::MeasurementUnavailable.is_transient());
        assert!(Error::Busy.is_transient());
        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(!Error::from(parse).is_transient());
    }
}
