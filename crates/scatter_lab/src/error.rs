//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias.
//! Variants cover invalid configuration, unusable scatter targets, empty item lists, texture job
//! submission and polling failures, remote job failures, IO, and generic errors.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid scatter target: {0}")]
    InvalidTarget(String),

    #[error("no scatter items defined")]
    NoItems,

    #[error("failed to start texture generation: {0}")]
    Submission(String),

    #[error("error checking generation status: {0}")]
    Poll(String),

    #[error("texture generation failed: {0}")]
    RemoteFailure(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns `true` for errors that end a generation job rather than preventing it from starting.
    pub fn is_terminal_job_failure(&self) -> bool {
        matches!(self, Error::Poll(_) | Error::RemoteFailure(_))
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_uses_other_variant() {
        let err: Error = String::from("boom").into();
        matches!(err, Error::Other(_))
            .then_some(())
            .expect("expected Other variant");
    }

    #[test]
    fn from_str_allocates_owned_message() {
        let err: Error = "issue".into();
        assert!(matches!(err, Error::Other(ref msg) if msg == "issue"));
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(Error::NoItems.to_string(), "no scatter items defined");
        assert_eq!(
            Error::InvalidTarget("target must be a mesh".into()).to_string(),
            "invalid scatter target: target must be a mesh"
        );
        assert_eq!(
            Error::Submission("API token not set".into()).to_string(),
            "failed to start texture generation: API token not set"
        );
    }

    #[test]
    fn only_poll_and_remote_errors_end_a_job() {
        assert!(Error::Poll("timeout".into()).is_terminal_job_failure());
        assert!(Error::RemoteFailure("failed".into()).is_terminal_job_failure());
        assert!(!Error::Submission("no token".into()).is_terminal_job_failure());
        assert!(!Error::NoItems.is_terminal_job_failure());
    }
}
