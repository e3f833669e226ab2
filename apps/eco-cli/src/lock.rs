// lock.rs — Per-user critical section around a read-evaluate-write pass.
//
// Two concurrent passes for the same user could both see an achievement as
// missing and record it twice. The lock file is created with create-new
// semantics, so only one process holds it; it is removed when the guard
// drops. A second process fails fast instead of waiting.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub struct UserLock {
    path: PathBuf,
}

impl UserLock {
    pub fn acquire(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => anyhow::bail!(
                "user is busy: another evaluation holds {} (remove it if no ecotrack process is running)",
                path.display()
            ),
            Err(e) => return Err(e.into()),
        };
        writeln!(file, "{}", std::process::id())?;
        tracing::debug!("acquired user lock {}", path.display());
        Ok(Self { path })
    }
}

impl Drop for UserLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("failed to release user lock {}: {}", self.path.display(), e);
        }
    }
}
