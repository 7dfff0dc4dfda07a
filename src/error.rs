//! # Error Types
//!
//! This module defines the error type returned while loading and validating the
//! static data a viewing session is built from.
//!
//! Only session *loading* can fail. Once a session exists, every lookup is total:
//! an unknown block resolves to "no position", a player that is not ready skips the
//! tick, and a block with no time entry simply does not seek.
//!
//! ## Error Types
//! - `NotFound` - a music, video or score document does not exist
//! - `ParseError` - a document exists but does not have the expected shape
//! - `DataError` - a document parsed but violates a block/time invariant
//! - `ConfigError` - the synchronizer configuration is invalid
//!
//! ## Usage
//! ```rust
//! use simulscore::{open_session, SyncConfig, SyncError};
//!
//! match open_session("data/music", "Z9999", None, None, &SyncConfig::default()) {
//!     Ok(engine) => println!("{} movements", engine.music().movements.len()),
//!     Err(SyncError::NotFound { kind, id }) => eprintln!("no {} named {}", kind, id),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// A requested document is absent from the data store.
    ///
    /// # Example
    /// ```
    /// # use simulscore::SyncError;
    /// let err = SyncError::NotFound {
    ///     kind: "video",
    ///     id: "A0001/xyz".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "video not found: A0001/xyz");
    /// ```
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A document could not be decoded.
    #[error("Parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    /// A document decoded but its contents are inconsistent.
    ///
    /// # Example
    /// ```
    /// # use simulscore::SyncError;
    /// let err = SyncError::DataError {
    ///     music_id: "A0001".to_string(),
    ///     message: "time entries are not sorted at index 3".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Invalid data for music A0001: time entries are not sorted at index 3"
    /// );
    /// ```
    #[error("Invalid data for music {music_id}: {message}")]
    DataError { music_id: String, message: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}
