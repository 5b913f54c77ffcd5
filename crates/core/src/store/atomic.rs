//! Crash-safe file replacement guarded against termination signals.
//!
//! The write goes to a uniquely named temporary file in the target directory
//! and is renamed over the canonical path. While the write is in flight an
//! [`InterruptGuard`] listens for hangup, interrupt, quit and terminate; if one
//! arrives before the rename, the temporary file is removed and the write is
//! abandoned. The canonical file is therefore either the previous version or
//! the complete new one.

use std::fmt;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::paths::TEMP_PREFIX;

/// Termination signal observed by an [`InterruptGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
	Hangup,
	Interrupt,
	Quit,
	Terminate,
}

impl fmt::Display for Interrupt {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Interrupt::Hangup => "SIGHUP",
			Interrupt::Interrupt => "SIGINT",
			Interrupt::Quit => "SIGQUIT",
			Interrupt::Terminate => "SIGTERM",
		};
		f.write_str(name)
	}
}

/// Listener for termination signals, registered for the duration of one write.
///
/// Dropping the guard stops delivery to it. Tokio keeps its process-level
/// handler installed afterwards, so the guard is only created for the final
/// persist of an invocation.
#[cfg(unix)]
pub struct InterruptGuard {
	hangup: tokio::signal::unix::Signal,
	interrupt: tokio::signal::unix::Signal,
	quit: tokio::signal::unix::Signal,
	terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl InterruptGuard {
	pub fn install() -> io::Result<Self> {
		use tokio::signal::unix::{SignalKind, signal};

		Ok(Self {
			hangup: signal(SignalKind::hangup())?,
			interrupt: signal(SignalKind::interrupt())?,
			quit: signal(SignalKind::quit())?,
			terminate: signal(SignalKind::terminate())?,
		})
	}

	/// Resolves with the first termination signal received.
	pub async fn recv(&mut self) -> Interrupt {
		tokio::select! {
			_ = self.hangup.recv() => Interrupt::Hangup,
			_ = self.interrupt.recv() => Interrupt::Interrupt,
			_ = self.quit.recv() => Interrupt::Quit,
			_ = self.terminate.recv() => Interrupt::Terminate,
		}
	}
}

#[cfg(not(unix))]
pub struct InterruptGuard {
	ctrl_c: tokio::signal::windows::CtrlC,
	ctrl_close: tokio::signal::windows::CtrlClose,
}

#[cfg(not(unix))]
impl InterruptGuard {
	pub fn install() -> io::Result<Self> {
		Ok(Self {
			ctrl_c: tokio::signal::windows::ctrl_c()?,
			ctrl_close: tokio::signal::windows::ctrl_close()?,
		})
	}

	pub async fn recv(&mut self) -> Interrupt {
		tokio::select! {
			_ = self.ctrl_c.recv() => Interrupt::Interrupt,
			_ = self.ctrl_close.recv() => Interrupt::Hangup,
		}
	}
}

/// Why an atomic write did not complete.
#[derive(Debug)]
pub enum WriteError {
	Io(io::Error),
	/// A signal arrived first; the temporary file has been removed.
	Interrupted(Interrupt),
}

impl From<io::Error> for WriteError {
	fn from(err: io::Error) -> Self {
		WriteError::Io(err)
	}
}

/// Creates `dir` (owner-only on unix) if it does not exist.
pub fn ensure_private_dir(dir: &Path) -> io::Result<()> {
	let mut builder = std::fs::DirBuilder::new();
	builder.recursive(true);
	#[cfg(unix)]
	{
		use std::os::unix::fs::DirBuilderExt;
		builder.mode(0o700);
	}
	builder.create(dir)
}

/// Writes `contents` to `target` through a same-directory temporary file,
/// abandoning the write if `interrupt` resolves before the rename.
///
/// `interrupt` is polled first on every wake-up, so a signal that is already
/// pending wins over the remaining write steps.
pub async fn write_atomic<I>(dir: &Path, target: &Path, contents: &[u8], interrupt: I) -> Result<(), WriteError>
where
	I: Future<Output = Interrupt>,
{
	ensure_private_dir(dir)?;

	// tempfile creates the file with mode 0600 on unix.
	let temp = tempfile::Builder::new().prefix(TEMP_PREFIX).tempfile_in(dir)?;
	let (file, temp_path) = temp.into_parts();
	let cleanup: PathBuf = temp_path.to_path_buf();
	debug!(target = "uipo.store", temp = %cleanup.display(), "writing temporary config");

	let write = async move {
		let mut file = tokio::fs::File::from_std(file);
		file.write_all(contents).await?;
		file.flush().await?;
		file.sync_all().await?;
		drop(file);
		temp_path.persist(target).map_err(|err| err.error)
	};

	tokio::select! {
		biased;
		signal = interrupt => {
			// The dropped write future unlinks its TempPath as well.
			let _ = std::fs::remove_file(&cleanup);
			Err(WriteError::Interrupted(signal))
		}
		result = write => result.map_err(WriteError::Io),
	}
}
