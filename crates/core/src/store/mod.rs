//! On-disk persistence of the [`SessionRecord`].
//!
//! The record lives at `<home>/.uipo/config.json` (see [`StorePaths`]) as
//! pretty-printed JSON with fields in declaration order. Writes go through
//! [`atomic::write_atomic`] so a reader never observes a partial file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::overrides::RuntimeOverrides;
use crate::record::SessionRecord;

pub mod atomic;
pub mod paths;

#[cfg(test)]
mod tests;

pub use atomic::{Interrupt, InterruptGuard, WriteError};
pub use paths::StorePaths;

/// Exit status used when a signal aborts a persist.
pub const INTERRUPTED_EXIT_CODE: i32 = 2;

/// Owner of the session record's on-disk representation.
#[derive(Debug, Clone)]
pub struct ConfigStore {
	paths: StorePaths,
}

impl ConfigStore {
	/// Resolves the storage location from environment overrides.
	pub fn resolve(overrides: &RuntimeOverrides) -> Result<Self> {
		Ok(Self {
			paths: StorePaths::resolve(overrides)?,
		})
	}

	/// Uses `dir` directly as the storage directory.
	pub fn at(dir: impl Into<PathBuf>) -> Self {
		Self {
			paths: StorePaths::in_dir(dir.into()),
		}
	}

	pub fn dir(&self) -> &Path {
		&self.paths.dir
	}

	pub fn path(&self) -> &Path {
		&self.paths.file
	}

	/// Loads the cached record.
	///
	/// A missing or empty file yields [`SessionRecord::new`]; unparseable
	/// content is [`Error::ConfigCorrupt`]. Leftover temporary files from an
	/// interrupted write are removed first, best effort.
	pub fn load(&self) -> Result<SessionRecord> {
		self.remove_stale_temp_files();

		let path = self.path();
		let content = match fs::read(path) {
			Ok(content) => content,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
				debug!(target = "uipo.store", path = %path.display(), "no cached config, using defaults");
				return Ok(SessionRecord::new());
			}
			Err(err) => return Err(err.into()),
		};

		if content.iter().all(u8::is_ascii_whitespace) {
			debug!(target = "uipo.store", path = %path.display(), "cached config is empty, using defaults");
			return Ok(SessionRecord::new());
		}

		let record = serde_json::from_slice(&content).map_err(|source| Error::ConfigCorrupt {
			path: path.to_path_buf(),
			source,
		})?;
		info!(target = "uipo.store", path = %path.display(), "configuration loaded");
		Ok(record)
	}

	/// Persists `record`, replacing the canonical file atomically.
	///
	/// A termination signal received before the rename removes the temporary
	/// file and exits the process with [`INTERRUPTED_EXIT_CODE`].
	pub async fn persist(&self, record: &SessionRecord) -> Result<()> {
		let mut guard = InterruptGuard::install().map_err(|source| self.persist_failed(source))?;

		match self.persist_until(record, guard.recv()).await {
			Err(WriteError::Interrupted(signal)) => {
				warn!(target = "uipo.store", %signal, "config write interrupted, temporary file removed");
				std::process::exit(INTERRUPTED_EXIT_CODE);
			}
			Err(WriteError::Io(source)) => Err(self.persist_failed(source)),
			Ok(()) => Ok(()),
		}
	}

	/// Persists `record` unless `interrupt` resolves first.
	///
	/// Unlike [`persist`](Self::persist) this reports the interruption to the
	/// caller instead of exiting.
	pub async fn persist_until<I>(&self, record: &SessionRecord, interrupt: I) -> std::result::Result<(), WriteError>
	where
		I: std::future::Future<Output = Interrupt>,
	{
		let encoded = encode(record).map_err(|err| WriteError::Io(err.into()))?;
		atomic::write_atomic(self.dir(), self.path(), &encoded, interrupt).await?;
		debug!(target = "uipo.store", path = %self.path().display(), bytes = encoded.len(), "config persisted");
		Ok(())
	}

	fn persist_failed(&self, source: std::io::Error) -> Error {
		Error::PersistFailed {
			path: self.path().to_path_buf(),
			source,
		}
	}

	fn remove_stale_temp_files(&self) {
		let pattern = self.paths.temp_glob();
		let entries = match glob::glob(&pattern) {
			Ok(entries) => entries,
			Err(err) => {
				warn!(target = "uipo.store", %pattern, error = %err, "invalid temp file pattern");
				return;
			}
		};

		for path in entries.flatten() {
			match fs::remove_file(&path) {
				Ok(()) => debug!(target = "uipo.store", path = %path.display(), "removed stale temp config"),
				Err(err) => warn!(target = "uipo.store", path = %path.display(), error = %err, "could not remove stale temp config"),
			}
		}
	}
}

/// Stable encoding: pretty JSON in field declaration order plus a trailing newline.
pub fn encode(record: &SessionRecord) -> serde_json::Result<Vec<u8>> {
	let mut encoded = serde_json::to_vec_pretty(record)?;
	encoded.push(b'\n');
	Ok(encoded)
}
