//! Process environment as a configuration source.

use super::ConfigSource;

/// Reads properties from process environment variables, by exact name.
///
/// The environment is read on every lookup, but nothing is reported when it changes,
/// so a [`DynamicConfig`](crate::DynamicConfig) only sees the value present when a
/// property was first requested.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvConfigSource;

impl EnvConfigSource {
	/// Creates the source.
	pub fn new() -> Self {
		Self
	}
}

impl ConfigSource for EnvConfigSource {
	fn get(&self, name: &str) -> Option<String> {
		// `var` panics on names the platform cannot represent.
		if name.is_empty() || name.contains(['=', '\0']) {
			return None;
		}
		std::env::var(name).ok()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_reads_inherited_variable() {
		let inherited = std::env::vars_os().find_map(|(name, value)| {
			let name = name.into_string().ok()?;
			(!name.is_empty() && !name.contains('=')).then_some((name, value.into_string().ok()?))
		});
		let Some((name, value)) = inherited else {
			return;
		};
		assert_eq!(EnvConfigSource.get(&name), Some(value));
	}

	#[test]
	fn test_unrepresentable_names_are_absent() {
		assert_eq!(EnvConfigSource.get(""), None);
		assert_eq!(EnvConfigSource.get("A=B"), None);
		assert_eq!(EnvConfigSource.get("NUL\0NAME"), None);
	}

	#[test]
	fn test_missing_variable_is_absent() {
		assert_eq!(EnvConfigSource.get("MIMER_CONFIG_SURELY_UNSET_VARIABLE_7F3A"), None);
	}
}
