//! Cassette configuration for composable per-port replay.

use std::path::{Path, PathBuf};

use super::format::Cassette;
use super::replayer::CassetteReplayer;

/// Per-port cassette file paths. Ports without a cassette path panic if
/// called during replay.
#[derive(Debug, Clone, Default)]
pub struct CassetteConfig {
    /// Path to the clock port cassette file.
    pub clock: Option<PathBuf>,
    /// Path to the filesystem port cassette file.
    pub fs: Option<PathBuf>,
    /// Path to the random port cassette file.
    pub random: Option<PathBuf>,
    /// Path to the version-control port cassette file.
    pub vcs: Option<PathBuf>,
}

/// Per-port replayers, each with its own interaction stream.
pub struct PortReplayers {
    /// Replayer for the clock port.
    pub clock: Option<CassetteReplayer>,
    /// Replayer for the filesystem port.
    pub fs: Option<CassetteReplayer>,
    /// Replayer for the random port.
    pub random: Option<CassetteReplayer>,
    /// Replayer for the version-control port.
    pub vcs: Option<CassetteReplayer>,
}

impl CassetteConfig {
    /// Returns a config where all port paths are `None`.
    #[must_use]
    pub fn panic_on_unspecified() -> Self {
        Self::default()
    }

    /// Returns a config pointing at the per-port files a recording session
    /// writes into `dir` (`clock.cassette.yaml`, `fs.cassette.yaml`, ...).
    #[must_use]
    pub fn from_session_dir(dir: &Path) -> Self {
        let port = |name: &str| {
            let path = dir.join(format!("{name}.cassette.yaml"));
            path.exists().then_some(path)
        };
        Self {
            clock: port("clock"),
            fs: port("fs"),
            random: port("random"),
            vcs: port("vcs"),
        }
    }

    /// Load a cassette file and create a replayer over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_cassette(path: &Path) -> Result<CassetteReplayer, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        let cassette: Cassette = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
        Ok(CassetteReplayer::new(&cassette))
    }

    /// Load all configured per-port cassette files and create replayers.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn load_all(&self) -> Result<PortReplayers, String> {
        Ok(PortReplayers {
            clock: self.clock.as_deref().map(Self::load_cassette).transpose()?,
            fs: self.fs.as_deref().map(Self::load_cassette).transpose()?,
            random: self.random.as_deref().map(Self::load_cassette).transpose()?,
            vcs: self.vcs.as_deref().map(Self::load_cassette).transpose()?,
        })
    }
}
