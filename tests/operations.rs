// tests/operations.rs
//
// Concrete operations against fake tools written as `sh` scripts.
#![cfg(unix)]

mod common;
use crate::common::{RecordingListener, fake_tool, init_tracing, wait_until, with_timeout};

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde_json::json;

use swbridge::exec::{ProcessRunner, RunResult, RunnerOptions};
use swbridge::ops::profiles::ProfileSettings;
use swbridge::ops::{
    ApplyProfile, DrawSuspension, InsertHardpoints, Profile, SetVisibility, SuspensionSet,
    VisibilityCommand,
};
use swbridge::protocol::LineEvent;
use swbridge::types::{SuspensionTarget, Visibility};

fn runner() -> ProcessRunner {
    ProcessRunner::new(RunnerOptions::default())
}

#[tokio::test]
async fn set_visibility_passes_arguments_through() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(
        dir.path(),
        "SuspensionTools.exe",
        r#"echo "STATE:UpdatingVisibility"; echo "args: $*""#,
    );
    let op = SetVisibility {
        executable: tool,
        command: VisibilityCommand::Suspension {
            target: SuspensionTarget::NonChassis,
            visibility: Visibility::Hide,
            filter: None,
        },
    };
    let listener = RecordingListener::new();

    let result = with_timeout(runner().start(&op, listener.clone())).await;

    assert_eq!(
        result,
        RunResult::success("Visualization control completed successfully")
    );
    assert!(
        listener
            .events()
            .contains(&LineEvent::State("Updating visibility...".into()))
    );
    assert_eq!(listener.logs().last().unwrap(), "args: vis nonchassis hide");
}

#[tokio::test]
async fn invalid_inputs_fail_before_launch() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let op = InsertHardpoints {
        executable: PathBuf::from("/not/launched"),
        json_path: dir.path().join("missing.json"),
        marker_path: dir.path().join("marker.txt"),
    };
    let listener = RecordingListener::new();

    let result = with_timeout(runner().start(&op, listener.clone())).await;

    assert!(!result.succeeded);
    assert!(result.message.starts_with("Invalid input: JSON file not found"));
    assert!(result.message.contains("Marker file must be a .sldprt file"));
    assert!(listener.events().is_empty());
}

#[tokio::test]
async fn profile_counts_failed_entries() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    // Fails every `hide`. Its own counts must not touch the per-entry ones.
    let tool = fake_tool(
        dir.path(),
        "SuspensionTools.exe",
        r#"echo TOTAL:50; echo PROGRESS:50; [ "$3" = hide ] && exit 4; echo ok"#,
    );

    let mut suspension = BTreeMap::new();
    suspension.insert("chassis".to_string(), false);
    suspension.insert("wheels".to_string(), true);
    let profile = Profile::new(
        "half",
        ProfileSettings {
            suspension,
            ..Default::default()
        },
    );
    let op = ApplyProfile {
        executable: tool,
        profile,
    };
    let listener = RecordingListener::new();

    let result = with_timeout(runner().start(&op, listener.clone())).await;

    assert_eq!(result, RunResult::failure("1 of 2 visibility commands failed"));
    let progress: Vec<LineEvent> = listener
        .events()
        .into_iter()
        .filter(|e| matches!(e, LineEvent::Progress { .. }))
        .collect();
    assert_eq!(
        progress,
        vec![
            LineEvent::Progress { current: 0, total: 2 },
            LineEvent::Progress { current: 1, total: 2 },
            LineEvent::Progress { current: 2, total: 2 },
        ]
    );
    assert!(
        listener
            .logs()
            .contains(&"'vis chassis hide' failed with exit code 4".to_string())
    );
}

#[tokio::test]
async fn draw_front_advances_one_per_item_and_continues_after_failure() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let calls = dir.path().join("calls.log");
    let runner_exe = fake_tool(
        dir.path(),
        "CoordinateRunner.exe",
        &format!(
            r#"echo "$@" >> '{}'; [ "$1" = BAD_FRONT ] && exit 2; echo "Created $1""#,
            calls.display()
        ),
    );

    let front = dir.path().join("front.json");
    let data = json!({
        "Double A-Arm": {
            "BAD": [1.0, 2.0, 3.0],
            "P": [10.0, 20.0, 30.0]
        },
        "Wheels": {
            "Half Track": {"left": 600.0},
            "Tire Diameter": {"left": 500.0},
            "Lateral Offset": {"left": 0.0},
            "Vertical Offset": {"left": 0.0},
            "Longitudinal Offset": {"left": 0.0},
            "Static Camber": {"left": -1.0},
            "Static Toe": {"left": 0.5}
        }
    });
    fs::write(&front, data.to_string()).unwrap();

    let op = DrawSuspension {
        runner: runner_exe,
        set: SuspensionSet::Front { front },
    };
    let listener = RecordingListener::new();

    let result = with_timeout(runner().start(&op, listener.clone())).await;

    assert_eq!(result, RunResult::failure("1 of 4 coordinate systems failed"));

    let progress: Vec<(u64, u64)> = listener
        .events()
        .into_iter()
        .filter_map(|e| match e {
            LineEvent::Progress { current, total } => Some((current, total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![(0, 4), (1, 4), (2, 4), (3, 4), (4, 4)]);

    let logs = listener.logs();
    assert!(logs.contains(&"=== Inserting Front Hardpoints ===".to_string()));
    assert!(logs.contains(&"Error inserting BAD_FRONT: exit code 2".to_string()));
    assert!(logs.contains(&"Created FR_wheel".to_string()));

    let calls = fs::read_to_string(calls).unwrap();
    let calls: Vec<&str> = calls.lines().collect();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[1], "P_FRONT 10 20 30 0 0 0");
    assert_eq!(calls[3], "FR_wheel 0 -600 250 1 0 -0.5");
}

#[tokio::test]
async fn draw_aborted_mid_item_stops_all_reporting() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let runner_exe = fake_tool(
        dir.path(),
        "CoordinateRunner.exe",
        r#"echo "started $1"; exec sleep 30"#,
    );

    let front = dir.path().join("front.json");
    let data = json!({
        "Double A-Arm": {"P": [10.0, 20.0, 30.0]},
        "Wheels": {
            "Half Track": {"left": 600.0},
            "Tire Diameter": {"left": 500.0},
            "Lateral Offset": {"left": 0.0},
            "Vertical Offset": {"left": 0.0},
            "Longitudinal Offset": {"left": 0.0},
            "Static Camber": {"left": 0.0},
            "Static Toe": {"left": 0.0}
        }
    });
    fs::write(&front, data.to_string()).unwrap();

    let op = DrawSuspension {
        runner: runner_exe,
        set: SuspensionSet::Front { front },
    };
    let listener = RecordingListener::new();
    let runner = runner();
    let handle = runner.abort_handle();

    let watcher = listener.clone();
    tokio::spawn(async move {
        wait_until(|| watcher.logs().iter().any(|l| l == "started P_FRONT")).await;
        handle.abort();
    });

    let result = with_timeout(runner.start(&op, listener.clone())).await;

    assert_eq!(result, RunResult::aborted());
    let events = listener.events();
    assert_eq!(
        events.last(),
        Some(&LineEvent::Log("Operation aborted by user".into()))
    );
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, LineEvent::Log(l) if l.starts_with("Error inserting")))
    );
    let progress: Vec<&LineEvent> = events
        .iter()
        .filter(|e| matches!(e, LineEvent::Progress { .. }))
        .collect();
    assert_eq!(progress, vec![&LineEvent::Progress { current: 0, total: 3 }]);
    assert!(!listener.logs().iter().any(|l| l == "started FL_wheel"));
}
