//! Service context bundling all port trait objects.

use std::path::Path;

use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::random::LiveRandom;
use crate::adapters::live::vcs::LiveGitExecutor;
use crate::adapters::recording::{
    RecordingClock, RecordingFileSystem, RecordingRandom, RecordingVcsExecutor,
};
use crate::adapters::replaying::{
    ReplayingClock, ReplayingFileSystem, ReplayingRandom, ReplayingVcsExecutor,
};
use crate::cassette::config::CassetteConfig;
use crate::cassette::format::Cassette;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::session::RecordingSession;
use crate::config::Settings;
use crate::ports::{Clock, FileSystem, RandomSource, VcsExecutor, VcsOutput};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up different adapter implementations (live, replaying, recording).
pub struct ServiceContext {
    /// Clock for obtaining the current time.
    pub clock: Box<dyn Clock>,
    /// Filesystem for the commit log.
    pub fs: Box<dyn FileSystem>,
    /// Random draws for generated schedules.
    pub random: Box<dyn RandomSource>,
    /// Executor for git commands.
    pub vcs: Box<dyn VcsExecutor>,
}

fn live_random(settings: &Settings) -> LiveRandom {
    settings
        .seed
        .map_or_else(LiveRandom::new, LiveRandom::seeded)
}

impl ServiceContext {
    /// Creates a live context: system clock, real disk, OS-seeded (or
    /// `--seed`-seeded) RNG and the `git` binary.
    #[must_use]
    pub fn live(settings: &Settings) -> Self {
        Self {
            clock: Box::new(LiveClock),
            fs: Box::new(LiveFileSystem),
            random: Box::new(live_random(settings)),
            vcs: Box::new(LiveGitExecutor::new(settings.timeout)),
        }
    }

    /// Creates a live context whose every port interaction is captured by
    /// `session`.
    ///
    /// The context must be dropped before the session is finished.
    #[must_use]
    pub fn recording(session: &RecordingSession, settings: &Settings) -> Self {
        let clock = RecordingClock::new(Box::new(LiveClock), session.clock.clone());
        let fs = RecordingFileSystem::new(Box::new(LiveFileSystem), session.fs.clone());
        let rng = Box::new(live_random(settings));
        let random = RecordingRandom::new(rng, session.random.clone());
        let git = Box::new(LiveGitExecutor::new(settings.timeout));
        let vcs = RecordingVcsExecutor::new(git, session.vcs.clone());
        Self {
            clock: Box::new(clock),
            fs: Box::new(fs),
            random: Box::new(random),
            vcs: Box::new(vcs),
        }
    }

    /// Creates a replaying context from a monolithic cassette file.
    ///
    /// Each port gets its own replayer over the same cassette, so per-port
    /// cursors are independent.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        let cassette: Cassette = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;

        Ok(Self {
            clock: Box::new(ReplayingClock::new(CassetteReplayer::new(&cassette))),
            fs: Box::new(ReplayingFileSystem::new(CassetteReplayer::new(&cassette))),
            random: Box::new(ReplayingRandom::new(CassetteReplayer::new(&cassette))),
            vcs: Box::new(ReplayingVcsExecutor::new(CassetteReplayer::new(&cassette))),
        })
    }

    /// Creates a replaying context from per-port cassette files.
    ///
    /// Ports without a configured cassette file use a panicking adapter that
    /// fails with a clear message when called.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn replaying_from(config: &CassetteConfig) -> Result<Self, String> {
        let replayers = config.load_all()?;

        Ok(Self {
            clock: match replayers.clock {
                Some(r) => Box::new(ReplayingClock::new(r)),
                None => Box::new(PanickingClock),
            },
            fs: match replayers.fs {
                Some(r) => Box::new(ReplayingFileSystem::new(r)),
                None => Box::new(PanickingFileSystem),
            },
            random: match replayers.random {
                Some(r) => Box::new(ReplayingRandom::new(r)),
                None => Box::new(PanickingRandom),
            },
            vcs: match replayers.vcs {
                Some(r) => Box::new(ReplayingVcsExecutor::new(r)),
                None => Box::new(PanickingVcsExecutor),
            },
        })
    }
}

// --- Panicking adapters for unspecified ports ---

struct PanickingClock;
impl Clock for PanickingClock {
    fn now(&self) -> chrono::NaiveDateTime {
        panic!("Clock port not configured in CassetteConfig: no cassette loaded for clock");
    }
}

struct PanickingFileSystem;
impl FileSystem for PanickingFileSystem {
    fn read_to_string(
        &self,
        _path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        panic!("FileSystem port not configured in CassetteConfig: no cassette loaded for fs");
    }
    fn write(
        &self,
        _path: &Path,
        _contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        panic!("FileSystem port not configured in CassetteConfig: no cassette loaded for fs");
    }
    fn exists(&self, _path: &Path) -> bool {
        panic!("FileSystem port not configured in CassetteConfig: no cassette loaded for fs");
    }
}

struct PanickingRandom;
impl RandomSource for PanickingRandom {
    fn unit(&self) -> f64 {
        panic!("RandomSource port not configured in CassetteConfig: no cassette loaded for random");
    }
    fn between(&self, _low: u32, _high: u32) -> u32 {
        panic!("RandomSource port not configured in CassetteConfig: no cassette loaded for random");
    }
}

struct PanickingVcsExecutor;
impl VcsExecutor for PanickingVcsExecutor {
    fn run(
        &self,
        _args: &[&str],
        _cwd: &Path,
        _env: &[(&str, &str)],
    ) -> Result<VcsOutput, Box<dyn std::error::Error + Send + Sync>> {
        panic!("VcsExecutor port not configured in CassetteConfig: no cassette loaded for vcs");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::Interaction;
    use chrono::Utc;
    use serde_json::json;

    fn write_cassette(path: &Path, interactions: Vec<Interaction>) {
        let cassette = Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions,
        };
        let yaml = serde_yaml::to_string(&cassette).unwrap();
        std::fs::write(path, yaml).unwrap();
    }

    fn interaction(seq: u64, port: &str, method: &str, output: serde_json::Value) -> Interaction {
        Interaction {
            seq,
            port: port.into(),
            method: method.into(),
            input: json!({}),
            output,
        }
    }

    #[test]
    fn replaying_context_from_monolithic_cassette() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("full.cassette.yaml");
        let status = json!({"ok": {"success": true, "output": "On branch main"}});
        write_cassette(
            &path,
            vec![
                interaction(0, "clock", "now", json!("2024-06-15T10:30:00")),
                interaction(1, "random", "between", json!(4)),
                interaction(2, "vcs", "run", status),
            ],
        );

        let ctx = ServiceContext::replaying(&path).unwrap();
        assert_eq!(ctx.clock.now().to_string(), "2024-06-15 10:30:00");
        assert_eq!(ctx.random.between(0, 10), 4);
        let out = ctx.vcs.run(&["status"], Path::new("."), &[]).unwrap();
        assert_eq!(out, VcsOutput::ok("On branch main"));
    }

    #[test]
    fn replaying_from_per_port_cassettes() {
        let dir = tempfile::tempdir().unwrap();
        let clock_path = dir.path().join("clock.cassette.yaml");
        let now = interaction(0, "clock", "now", json!("2024-01-01T00:00:00"));
        write_cassette(&clock_path, vec![now]);

        let config = CassetteConfig {
            clock: Some(clock_path),
            ..CassetteConfig::default()
        };
        let ctx = ServiceContext::replaying_from(&config).unwrap();
        assert_eq!(ctx.clock.now().to_string(), "2024-01-01 00:00:00");
    }

    #[test]
    #[should_panic(expected = "not configured in CassetteConfig")]
    fn unspecified_port_panics_with_clear_message() {
        let config = CassetteConfig::panic_on_unspecified();
        let ctx = ServiceContext::replaying_from(&config).unwrap();
        let _ = ctx.random.unit();
    }

    #[test]
    fn seeded_live_context_is_reproducible() {
        let settings = Settings {
            seed: Some(7),
            ..Settings::default()
        };
        let a = ServiceContext::live(&settings);
        let b = ServiceContext::live(&settings);
        let draws_a: Vec<u32> = (0..5).map(|_| a.random.between(0, 100)).collect();
        let draws_b: Vec<u32> = (0..5).map(|_| b.random.between(0, 100)).collect();
        assert_eq!(draws_a, draws_b);
    }
}
