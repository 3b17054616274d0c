//! Record-replay round trip through the whole planning and commit path.
//!
//! A cassette scripts the clock, the random draws, the log file and git.
//! Replaying it twice must plan and execute the same batch both times.

use std::path::Path;

use serde_json::json;

use gridstamp::cassette::recorder::CassetteRecorder;
use gridstamp::context::ServiceContext;
use gridstamp::grid::{format_timestamp, FillOptions, GridMapper, WeekStart};
use gridstamp::schedule::{ExecutionReport, PushOutcome, PushPolicy, RequestState, Scheduler};

fn record_session(path: &Path) {
    let mut recorder = CassetteRecorder::new(path, "fill-session", "abc123");

    // Saturday, so the whole one-week window is in the past.
    recorder.record("clock", "now", json!({}), json!("2024-06-15T12:00:00"));

    // Seven Bernoulli draws against p = 0.5: days 0, 2 and 6 are active.
    for draw in [0.1, 0.9, 0.1, 0.9, 0.9, 0.9, 0.1] {
        recorder.record("random", "unit", json!({}), json!(draw));
    }
    let range = json!({"low": 1, "high": 2});
    for count in [2, 1, 1] {
        recorder.record("random", "between", range.clone(), json!(count));
    }

    let log_path = json!({"path": "/art/data.json"});
    let empty_log = json!({"ok": "[]"});
    for (i, exists) in [false, true, true, true].into_iter().enumerate() {
        recorder.record("fs", "exists", log_path.clone(), json!(exists));
        if exists {
            recorder.record("fs", "read_to_string", log_path.clone(), empty_log.clone());
        }
        let write = json!({"path": "/art/data.json", "seq": i});
        recorder.record("fs", "write", write, json!({"ok": null}));
    }

    // add + commit for each of the four requests; the second commit fails.
    let commits = [true, false, true, true];
    for ok in commits {
        let staged = json!({"ok": {"success": true, "output": ""}});
        recorder.record("vcs", "run", json!({"args": ["add"]}), staged);
        let output = if ok { "" } else { "index.lock exists" };
        recorder.record(
            "vcs",
            "run",
            json!({"args": ["commit"]}),
            json!({"ok": {"success": ok, "output": output}}),
        );
    }

    recorder.finish().expect("recording should succeed");
}

fn replay(path: &Path) -> ExecutionReport {
    let ctx = ServiceContext::replaying(path).unwrap();
    let mapper = GridMapper::new(
        ctx.clock.as_ref(),
        ctx.random.as_ref(),
        WeekStart::Sunday,
        1,
    );
    let options = FillOptions {
        weeks: 1,
        min_count: 1,
        max_count: 2,
        frequency: 0.5,
        ..FillOptions::default()
    };
    let plan = mapper.random_fill(&options).unwrap();
    assert_eq!(plan.skipped, 0);

    Scheduler::new(
        ctx.fs.as_ref(),
        ctx.vcs.as_ref(),
        Path::new("/art"),
        Path::new("/art/data.json"),
        Path::new("data.json"),
    )
    .execute(&plan.requests, PushPolicy::None)
}

#[test]
fn replayed_fill_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let cassette = dir.path().join("fill.cassette.yaml");
    record_session(&cassette);

    let first = replay(&cassette);

    let dates: Vec<String> = first
        .outcomes
        .iter()
        .map(|o| format_timestamp(o.request.timestamp))
        .collect();
    assert_eq!(
        dates,
        [
            "2024-06-09 12:00:00",
            "2024-06-09 12:00:00",
            "2024-06-11 12:00:00",
            "2024-06-15 12:00:00",
        ]
    );
    assert_eq!(first.success_count, 3);
    let states: Vec<RequestState> = first.outcomes.iter().map(|o| o.state).collect();
    assert_eq!(
        states,
        [
            RequestState::NotPushed,
            RequestState::CommitFailed,
            RequestState::NotPushed,
            RequestState::NotPushed,
        ]
    );
    assert_eq!(first.push, PushOutcome::Skipped);

    let second = replay(&cassette);
    assert_eq!(first, second, "replays diverged");
}
