//! Process-scoped runtime overrides read once at startup.

use std::path::PathBuf;

/// Environment variable overriding the storage home directory.
pub const HOME_ENV: &str = "UIPO_HOME";
/// Ambient on-premise user id.
pub const USERNAME_ENV: &str = "UIPO_USERNAME";
/// Ambient on-premise password.
pub const PASSWORD_ENV: &str = "UIPO_PASSWORD";

/// Environment-derived values and global execution flags.
///
/// Never persisted. Built once in `main` and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeOverrides {
	/// Alternate storage root (`UIPO_HOME`).
	pub home: Option<PathBuf>,
	/// Platform home directory candidate from `HOME` or the windows equivalents.
	pub platform_home: Option<PathBuf>,
	pub username: Option<String>,
	pub password: Option<String>,
	pub https_proxy: Option<String>,
	/// Verbosity level from repeated `-v` flags.
	pub verbose: u8,
	/// Skip TLS certificate verification (`--unsafe`).
	pub insecure: bool,
}

impl RuntimeOverrides {
	/// Reads overrides from the process environment.
	pub fn from_env() -> Self {
		Self::from_vars(|name| std::env::var(name).ok())
	}

	/// Builds overrides from an arbitrary variable lookup. Empty values count as unset.
	pub fn from_vars<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

		Self {
			home: get(HOME_ENV).map(PathBuf::from),
			platform_home: platform_home(&get),
			username: get(USERNAME_ENV),
			password: get(PASSWORD_ENV),
			https_proxy: get("HTTPS_PROXY").or_else(|| get("https_proxy")),
			verbose: 0,
			insecure: false,
		}
	}

	/// Applies the global `-v` / `--unsafe` flags.
	pub fn with_flags(mut self, verbose: u8, insecure: bool) -> Self {
		self.verbose = verbose;
		self.insecure = insecure;
		self
	}
}

#[cfg(windows)]
fn platform_home(get: &dyn Fn(&str) -> Option<String>) -> Option<PathBuf> {
	let drive = get("HOMEDRIVE").unwrap_or_default();
	let path = get("HOMEPATH").unwrap_or_default();
	if !drive.is_empty() || !path.is_empty() {
		return Some(PathBuf::from(format!("{drive}{path}")));
	}
	get("USERPROFILE").map(PathBuf::from)
}

#[cfg(not(windows))]
fn platform_home(get: &dyn Fn(&str) -> Option<String>) -> Option<PathBuf> {
	get("HOME").map(PathBuf::from)
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn vars(pairs: &[(&str, &str)]) -> RuntimeOverrides {
		let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
		RuntimeOverrides::from_vars(|name| map.get(name).cloned())
	}

	#[test]
	fn reads_known_variables() {
		let overrides = vars(&[
			(HOME_ENV, "/srv/uipo"),
			(USERNAME_ENV, "admin"),
			(PASSWORD_ENV, "secret"),
			("https_proxy", "http://proxy:3128"),
		]);

		assert_eq!(overrides.home, Some(PathBuf::from("/srv/uipo")));
		assert_eq!(overrides.username.as_deref(), Some("admin"));
		assert_eq!(overrides.password.as_deref(), Some("secret"));
		assert_eq!(overrides.https_proxy.as_deref(), Some("http://proxy:3128"));
		assert!(!overrides.insecure);
	}

	#[test]
	fn empty_values_are_unset() {
		let overrides = vars(&[(HOME_ENV, ""), (USERNAME_ENV, "")]);
		assert_eq!(overrides.home, None);
		assert_eq!(overrides.username, None);
	}

	#[test]
	fn uppercase_proxy_wins() {
		let overrides = vars(&[("HTTPS_PROXY", "http://upper:1"), ("https_proxy", "http://lower:2")]);
		assert_eq!(overrides.https_proxy.as_deref(), Some("http://upper:1"));
	}

	#[cfg(not(windows))]
	#[test]
	fn platform_home_comes_from_home() {
		let overrides = vars(&[("HOME", "/home/robot")]);
		assert_eq!(overrides.platform_home, Some(PathBuf::from("/home/robot")));
	}

	#[test]
	fn flags_are_applied() {
		let overrides = vars(&[]).with_flags(2, true);
		assert_eq!(overrides.verbose, 2);
		assert!(overrides.insecure);
	}
}
