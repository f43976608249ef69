//! Error types for the desktop pet.
//!
//! This module provides a unified error type for all fallible operations in
//! desktop-pet-core: loading the character portrait, validating the
//! configuration, parsing textual commands, and host surface failures.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for desktop-pet-core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read the character image from disk.
    #[error("failed to read character image '{path}': {source}")]
    ImageReadError {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The character image could not be decoded.
    #[error("failed to decode character image '{path}': {source}")]
    ImageDecodeError {
        /// The path containing undecodable data.
        path: PathBuf,
        /// The underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem.
        message: String,
    },

    /// A textual command could not be understood.
    #[error("unknown command: '{input}'")]
    UnknownCommand {
        /// The input that failed to parse.
        input: String,
    },

    /// The display surface rejected an operation.
    #[error("display surface error: {message}")]
    SurfaceError {
        /// Description of what went wrong.
        message: String,
    },

    /// An error that doesn't fit other categories.
    #[error("{message}")]
    Other {
        /// Description of the error.
        message: String,
    },
}

impl Error {
    /// Create a new `ConfigError` with the given message.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new `UnknownCommand` error for the given input.
    pub fn unknown_command(input: impl Into<String>) -> Self {
        Self::UnknownCommand {
            input: input.into(),
        }
    }

    /// Create a new `SurfaceError` with the given message.
    pub fn surface_error(message: impl Into<String>) -> Self {
        Self::SurfaceError {
            message: message.into(),
        }
    }

    /// Create a new `Other` error with the given message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// A specialized `Result` type for desktop-pet-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::config_error("wander interval must be non-zero");
        assert!(err.to_string().contains("wander interval must be non-zero"));

        let err = Error::unknown_command("dance");
        assert_eq!(err.to_string(), "unknown command: 'dance'");

        let err = Error::surface_error("viewport closed");
        assert!(err.to_string().contains("viewport closed"));

        let err = Error::other("something unexpected");
        assert_eq!(err.to_string(), "something unexpected");
    }

    #[test]
    fn test_image_read_error_keeps_path() {
        let err = Error::ImageReadError {
            path: PathBuf::from("character.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let message = err.to_string();
        assert!(message.contains("character.png"));
        assert!(message.contains("gone"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
