//! Storage location for the session record.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::overrides::RuntimeOverrides;

/// Directory created under the resolved home.
pub const CONFIG_DIR_NAME: &str = ".uipo";
/// Canonical record file inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.json";
/// Prefix of in-flight temporary files. Leftovers are removed on load.
pub const TEMP_PREFIX: &str = "temp-config";

/// Resolved paths of the config store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
	pub dir: PathBuf,
	pub file: PathBuf,
}

impl StorePaths {
	/// Resolves the storage directory: `UIPO_HOME`, then the platform home
	/// variables, then the OS home directory.
	pub fn resolve(overrides: &RuntimeOverrides) -> Result<Self> {
		let home = overrides
			.home
			.clone()
			.or_else(|| overrides.platform_home.clone())
			.or_else(dirs::home_dir)
			.ok_or(Error::NoHomeDirectory)?;
		Ok(Self::in_home(&home))
	}

	pub fn in_home(home: &Path) -> Self {
		Self::in_dir(home.join(CONFIG_DIR_NAME))
	}

	pub fn in_dir(dir: PathBuf) -> Self {
		let file = dir.join(CONFIG_FILE_NAME);
		Self { dir, file }
	}

	/// Glob matching abandoned temporary files. The directory part is escaped.
	pub fn temp_glob(&self) -> String {
		let dir = glob::Pattern::escape(&self.dir.to_string_lossy());
		let sep = std::path::MAIN_SEPARATOR;
		format!("{dir}{sep}{TEMP_PREFIX}?*")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn uipo_home_takes_priority() {
		let overrides = RuntimeOverrides {
			home: Some(PathBuf::from("/override")),
			platform_home: Some(PathBuf::from("/home/user")),
			..Default::default()
		};
		let paths = StorePaths::resolve(&overrides).unwrap();
		assert_eq!(paths.dir, PathBuf::from("/override/.uipo"));
		assert_eq!(paths.file, PathBuf::from("/override/.uipo/config.json"));
	}

	#[test]
	fn falls_back_to_platform_home() {
		let overrides = RuntimeOverrides {
			platform_home: Some(PathBuf::from("/home/user")),
			..Default::default()
		};
		let paths = StorePaths::resolve(&overrides).unwrap();
		assert_eq!(paths.dir, PathBuf::from("/home/user/.uipo"));
	}

	#[test]
	fn temp_glob_uses_fixed_prefix() {
		let paths = StorePaths::in_dir(PathBuf::from("/data/.uipo"));
		assert!(paths.temp_glob().ends_with("temp-config?*"));
	}

	#[test]
	fn temp_glob_escapes_directory() {
		let paths = StorePaths::in_dir(PathBuf::from("/data/[odd]/.uipo"));
		assert!(paths.temp_glob().contains("[[]odd[]]"));
	}
}
