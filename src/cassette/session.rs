//! Recording session managing per-port cassette recorders.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::warn;

use super::recorder::CassetteRecorder;

/// Manages one `CassetteRecorder` per port for a recording session.
///
/// All cassettes are stored in a timestamped directory beneath the
/// directory the session was opened at.
pub struct RecordingSession {
    /// Recorder for clock interactions.
    pub clock: Arc<Mutex<CassetteRecorder>>,
    /// Recorder for filesystem interactions.
    pub fs: Arc<Mutex<CassetteRecorder>>,
    /// Recorder for random draws.
    pub random: Arc<Mutex<CassetteRecorder>>,
    /// Recorder for version-control interactions.
    pub vcs: Arc<Mutex<CassetteRecorder>>,
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Opens a session writing to `<base>/<timestamp>/`.
    ///
    /// `repo_path` is only consulted to stamp the cassettes with the
    /// repository's HEAD at recording time.
    ///
    /// # Errors
    ///
    /// Returns an error if the session directory already exists or cannot
    /// be created.
    pub fn new(base: &Path, repo_path: &Path) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f").to_string();
        let output_dir = base.join(&timestamp);

        if output_dir.exists() {
            let dir = output_dir.display();
            return Err(format!("Cassette directory already exists: {dir}"));
        }
        std::fs::create_dir_all(&output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let commit = head_commit(repo_path);
        let make_recorder = |port: &str| -> Arc<Mutex<CassetteRecorder>> {
            let path = output_dir.join(format!("{port}.cassette.yaml"));
            let name = format!("{timestamp}-{port}");
            Arc::new(Mutex::new(CassetteRecorder::new(path, name, &commit)))
        };

        Ok(Self {
            clock: make_recorder("clock"),
            fs: make_recorder("fs"),
            random: make_recorder("random"),
            vcs: make_recorder("vcs"),
            output_dir,
        })
    }

    /// Directory the cassettes are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Finish all recorders and write cassette files to disk.
    ///
    /// Every recording adapter must have been dropped first.
    ///
    /// # Errors
    ///
    /// Returns an error if an adapter still holds a recorder or a cassette
    /// file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        fn finish_one(arc: Arc<Mutex<CassetteRecorder>>, port: &str) -> Result<(), String> {
            let recorder = Arc::try_unwrap(arc)
                .map_err(|_| format!("Recording adapter for {port} still has references"))?
                .into_inner()
                .map_err(|e| format!("Recorder lock for {port} poisoned: {e}"))?;
            recorder
                .finish()
                .map_err(|e| format!("Failed to write {port} cassette: {e}"))?;
            Ok(())
        }

        finish_one(self.clock, "clock")?;
        finish_one(self.fs, "fs")?;
        finish_one(self.random, "random")?;
        finish_one(self.vcs, "vcs")?;

        Ok(self.output_dir)
    }
}

/// HEAD of the repository at `repo_path`, or "unknown" when unavailable.
fn head_commit(repo_path: &Path) -> String {
    let hash = std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(repo_path)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string());

    hash.unwrap_or_else(|| {
        warn!(repo = %repo_path.display(), "could not read HEAD for cassette stamp");
        "unknown".to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_creates_output_directory_and_finishes() {
        let base = tempfile::tempdir().unwrap();
        let session = RecordingSession::new(base.path(), base.path()).unwrap();
        let dir = session.output_dir().to_path_buf();
        assert!(dir.exists());

        let written = session.finish().unwrap();
        assert_eq!(written, dir);
        for port in ["clock", "fs", "random", "vcs"] {
            let cassette = dir.join(format!("{port}.cassette.yaml"));
            assert!(cassette.exists(), "{port} cassette missing");
        }
    }

    #[test]
    fn head_commit_outside_repository_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(head_commit(dir.path()), "unknown");
    }
}
