//! Error types for mark resolution.

use crate::unit::LoadError;
use std::time::Duration;

/// Errors raised while resolving hydration marks.
#[derive(Debug, thiserror::Error)]
pub enum MarkError {
	/// A requested mark was not covered by any triggered load.
	///
	/// The server recorded a mark the client registry cannot explain, which
	/// points at diverging build configurations between the two.
	#[error(
		"unknown mark({0}) has been used. Client and server should share the same build configuration."
	)]
	UnknownMark(String),

	/// A triggered load failed, aborting the session.
	#[error("failed to load {mark}: {source}")]
	LoadFailed {
		/// Canonical key of the entry whose load failed
		mark: String,
		/// Error reported by the loader
		#[source]
		source: LoadError,
	},

	/// Nested registrations kept appearing past the configured wave limit.
	#[error("mark resolution did not reach a fixed point within {0} waves")]
	WaveLimitExceeded(usize),

	/// The session exceeded the configured timeout.
	#[error("mark resolution timed out after {0:?}")]
	Timeout(Duration),

	/// The hydration payload could not be decoded.
	#[error(transparent)]
	Payload(#[from] PayloadError),
}

/// Errors raised while encoding or decoding a hydration payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
	/// The payload is not a JSON array of strings.
	#[error("invalid hydration payload: {0}")]
	Json(#[from] serde_json::Error),

	/// The surrounding markup could not be interpreted.
	#[error("malformed hydration payload: {0}")]
	Malformed(String),
}

/// Errors raised while loading or validating settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	/// A setting carried a value that could not be parsed.
	#[error("invalid value for {key}: {value}")]
	InvalidValue {
		/// Setting name
		key: String,
		/// Offending raw value
		value: String,
	},

	/// The settings are well-formed but inconsistent.
	#[error("Validation error: {0}")]
	ValidationError(String),

	/// A settings file could not be read.
	#[error("File error: {0}")]
	FileError(String),

	/// A settings file could not be parsed.
	#[error("Parse error: {0}")]
	ParseError(String),

	/// The settings file extension is not supported.
	#[error("Unsupported format: {0}")]
	UnsupportedFormat(String),
}
