//! Loadable settings
//!
//! Settings can be built in code, loaded from `REINHARDT_LOADABLE_*`
//! environment variables, or read from a `.toml` / `.json` file.

use crate::error::SettingsError;
use crate::payload::MARKS_GLOBAL_VAR;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Settings for mark resolution and payload emission.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadableSettings {
	/// Global variable the hydration payload is assigned to
	#[serde(default = "default_global_var")]
	pub global_var: String,

	/// Reject requested marks that no load covered
	#[serde(default = "default_strict")]
	pub strict: bool,

	/// Upper bound for one resolution session, in milliseconds
	#[serde(default)]
	pub timeout_ms: Option<u64>,

	/// Maximum number of load waves per session, unbounded when unset
	#[serde(default)]
	pub max_waves: Option<usize>,
}

fn default_global_var() -> String {
	MARKS_GLOBAL_VAR.to_string()
}

fn default_strict() -> bool {
	true
}

impl Default for LoadableSettings {
	fn default() -> Self {
		Self {
			global_var: default_global_var(),
			strict: default_strict(),
			timeout_ms: None,
			max_waves: None,
		}
	}
}

impl LoadableSettings {
	/// Creates settings with defaults.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the global variable name.
	pub fn global_var(mut self, var: impl Into<String>) -> Self {
		self.global_var = var.into();
		self
	}

	/// Sets strict mode.
	pub fn strict(mut self, strict: bool) -> Self {
		self.strict = strict;
		self
	}

	/// Sets the session timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout_ms = Some(timeout.as_millis().try_into().unwrap_or(u64::MAX));
		self
	}

	/// Sets the wave limit.
	pub fn max_waves(mut self, max_waves: usize) -> Self {
		self.max_waves = Some(max_waves);
		self
	}

	/// Returns the session timeout, if any.
	pub fn session_timeout(&self) -> Option<Duration> {
		self.timeout_ms.map(Duration::from_millis)
	}

	/// Validate settings
	///
	pub fn validate(&self) -> Result<(), SettingsError> {
		if !is_js_identifier(&self.global_var) {
			return Err(SettingsError::ValidationError(format!(
				"global_var must be a JavaScript identifier, got {:?}",
				self.global_var
			)));
		}

		if self.max_waves == Some(0) {
			return Err(SettingsError::ValidationError(
				"max_waves must be at least 1".to_string(),
			));
		}

		Ok(())
	}

	/// Load settings from environment variables
	///
	pub fn from_env() -> Result<Self, SettingsError> {
		let mut settings = Self::default();

		if let Ok(var) = std::env::var("REINHARDT_LOADABLE_GLOBAL_VAR") {
			settings.global_var = var;
		}

		if let Ok(strict) = std::env::var("REINHARDT_LOADABLE_STRICT") {
			settings.strict = parse_bool("REINHARDT_LOADABLE_STRICT", &strict)?;
		}

		if let Ok(timeout) = std::env::var("REINHARDT_LOADABLE_TIMEOUT_MS") {
			settings.timeout_ms = Some(parse_number("REINHARDT_LOADABLE_TIMEOUT_MS", &timeout)?);
		}

		if let Ok(waves) = std::env::var("REINHARDT_LOADABLE_MAX_WAVES") {
			settings.max_waves = Some(parse_number("REINHARDT_LOADABLE_MAX_WAVES", &waves)?);
		}

		settings.validate()?;
		Ok(settings)
	}

	/// Load settings from a configuration file
	///
	pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
		let path = path.into();
		let contents = std::fs::read_to_string(&path).map_err(|e| {
			SettingsError::FileError(format!("Failed to read {}: {}", path.display(), e))
		})?;

		let settings: LoadableSettings = match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => toml::from_str(&contents)
				.map_err(|e| SettingsError::ParseError(format!("TOML parse error: {}", e)))?,
			Some("json") => serde_json::from_str(&contents)
				.map_err(|e| SettingsError::ParseError(format!("JSON parse error: {}", e)))?,
			_ => {
				return Err(SettingsError::UnsupportedFormat(
					"Supported formats: .toml, .json".to_string(),
				));
			}
		};

		settings.validate()?;
		Ok(settings)
	}
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SettingsError> {
	match value.trim().to_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(SettingsError::InvalidValue {
			key: key.to_string(),
			value: value.to_string(),
		}),
	}
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SettingsError> {
	value
		.trim()
		.parse()
		.map_err(|_| SettingsError::InvalidValue {
			key: key.to_string(),
			value: value.to_string(),
		})
}

fn is_js_identifier(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
			chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
		}
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serial_test::serial;
	use std::io::Write;

	const ENV_KEYS: [&str; 4] = [
		"REINHARDT_LOADABLE_GLOBAL_VAR",
		"REINHARDT_LOADABLE_STRICT",
		"REINHARDT_LOADABLE_TIMEOUT_MS",
		"REINHARDT_LOADABLE_MAX_WAVES",
	];

	fn clear_env() {
		// SAFETY: Setting environment variables is unsafe in multi-threaded programs.
		// Callers use #[serial] to ensure exclusive access to environment variables.
		unsafe {
			for key in ENV_KEYS {
				std::env::remove_var(key);
			}
		}
	}

	#[rstest]
	fn test_default_settings() {
		let settings = LoadableSettings::default();
		assert_eq!(settings.global_var, MARKS_GLOBAL_VAR);
		assert!(settings.strict);
		assert_eq!(settings.session_timeout(), None);
		assert_eq!(settings.max_waves, None);
		assert!(settings.validate().is_ok());
	}

	#[rstest]
	fn test_builder_setters() {
		let settings = LoadableSettings::new()
			.global_var("MARKS")
			.strict(false)
			.timeout(Duration::from_millis(250))
			.max_waves(3);

		assert_eq!(settings.global_var, "MARKS");
		assert!(!settings.strict);
		assert_eq!(settings.session_timeout(), Some(Duration::from_millis(250)));
		assert_eq!(settings.max_waves, Some(3));
	}

	#[rstest]
	#[case("__MARKS__", true)]
	#[case("$marks", true)]
	#[case("marks2", true)]
	#[case("2marks", false)]
	#[case("window.marks", false)]
	#[case("", false)]
	fn test_validate_global_var(#[case] var: &str, #[case] valid: bool) {
		let settings = LoadableSettings::new().global_var(var);
		assert_eq!(settings.validate().is_ok(), valid);
	}

	#[rstest]
	fn test_validate_rejects_zero_waves() {
		let settings = LoadableSettings::new().max_waves(0);
		assert!(matches!(
			settings.validate(),
			Err(SettingsError::ValidationError(_))
		));
	}

	#[rstest]
	fn test_deserialize_partial() {
		let settings: LoadableSettings = serde_json::from_str(r#"{"strict": false}"#).unwrap();
		assert!(!settings.strict);
		assert_eq!(settings.global_var, MARKS_GLOBAL_VAR);
		assert_eq!(settings.max_waves, None);
	}

	#[rstest]
	#[serial(loadable_env)]
	fn test_from_env() {
		// Arrange
		clear_env();
		// SAFETY: Setting environment variables is unsafe in multi-threaded programs.
		// This test uses #[serial] to ensure exclusive access to environment variables.
		unsafe {
			std::env::set_var("REINHARDT_LOADABLE_GLOBAL_VAR", "APP_MARKS");
			std::env::set_var("REINHARDT_LOADABLE_STRICT", "off");
			std::env::set_var("REINHARDT_LOADABLE_TIMEOUT_MS", "1500");
			std::env::set_var("REINHARDT_LOADABLE_MAX_WAVES", "8");
		}

		// Act
		let settings = LoadableSettings::from_env();
		clear_env();

		// Assert
		let settings = settings.unwrap();
		assert_eq!(settings.global_var, "APP_MARKS");
		assert!(!settings.strict);
		assert_eq!(settings.session_timeout(), Some(Duration::from_millis(1500)));
		assert_eq!(settings.max_waves, Some(8));
	}

	#[rstest]
	#[serial(loadable_env)]
	fn test_from_env_invalid_number() {
		clear_env();
		// SAFETY: Setting environment variables is unsafe in multi-threaded programs.
		// This test uses #[serial] to ensure exclusive access to environment variables.
		unsafe {
			std::env::set_var("REINHARDT_LOADABLE_MAX_WAVES", "many");
		}

		let result = LoadableSettings::from_env();
		clear_env();

		assert!(matches!(result, Err(SettingsError::InvalidValue { .. })));
	}

	#[rstest]
	fn test_from_toml_file() {
		// Arrange
		let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
		writeln!(file, "global_var = \"PAGE_MARKS\"\ntimeout_ms = 500").unwrap();

		// Act
		let settings = LoadableSettings::from_file(file.path()).unwrap();

		// Assert
		assert_eq!(settings.global_var, "PAGE_MARKS");
		assert_eq!(settings.session_timeout(), Some(Duration::from_millis(500)));
		assert!(settings.strict);
	}

	#[rstest]
	fn test_from_file_unsupported_extension() {
		let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();

		let result = LoadableSettings::from_file(file.path());

		assert!(matches!(result, Err(SettingsError::UnsupportedFormat(_))));
	}
}
