// tests/cli_wiring.rs

mod common;
use crate::common::builders::ConfigBuilder;

use clap::Parser;

use swbridge::cli::CliArgs;
use swbridge::exec::RunResult;
use swbridge::ops::{Operation, ProfileStore, ToolPaths};
use swbridge::types::OperationKind;
use swbridge::{EXIT_ABORTED, build_operation, exit_code};

fn plan_for(argv: &[&str]) -> Vec<String> {
    let args = CliArgs::try_parse_from(argv).unwrap();
    let cfg = ConfigBuilder::new()
        .executable("tool")
        .coordinate_runner("runner")
        .build();
    let op = build_operation(&args.command, &cfg, &ToolPaths::from_config(&cfg))
        .unwrap()
        .expect("an operation");
    op.plan().unwrap().iter().map(|i| i.to_string()).collect()
}

#[test]
fn subcommands_map_to_tool_invocations() {
    assert_eq!(
        plan_for(&["swbridge", "vis", "front_wheels", "show"]),
        vec!["tool vis frontwheels show"]
    );
    assert_eq!(
        plan_for(&["swbridge", "marker", "vis", "name", "hide", "UCA"]),
        vec!["tool marker vis name hide UCA"]
    );
    assert_eq!(
        plan_for(&["swbridge", "hardpoints", "pose", "front.json", "Full Bump"]),
        vec!["tool hardpoints pose front.json Full Bump"]
    );
    assert_eq!(plan_for(&["swbridge", "release"]), vec!["tool release"]);
    assert_eq!(
        plan_for(&["swbridge", "coord", "Origin", "1", "-2", "3"]),
        vec!["runner Origin 1 -2 3 0 0 0"]
    );
}

#[test]
fn hardpoints_add_falls_back_to_configured_marker() {
    let args = CliArgs::try_parse_from(["swbridge", "hardpoints", "add", "front.json"]).unwrap();

    let without = ConfigBuilder::new().executable("tool").build();
    assert!(build_operation(&args.command, &without, &ToolPaths::from_config(&without)).is_err());

    let with = ConfigBuilder::new()
        .executable("tool")
        .marker_part("Marker.SLDPRT")
        .build();
    let op = build_operation(&args.command, &with, &ToolPaths::from_config(&with))
        .unwrap()
        .unwrap();
    assert_eq!(op.kind(), OperationKind::CoordinateInsertion);
    assert_eq!(
        op.plan().unwrap()[0].to_string(),
        "tool hardpoints add front.json Marker.SLDPRT"
    );
}

#[test]
fn profile_save_then_apply() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = ConfigBuilder::new()
        .executable("tool")
        .profiles_dir(dir.path())
        .build();
    let tools = ToolPaths::from_config(&cfg);

    let save = CliArgs::try_parse_from([
        "swbridge", "profile", "save", "clean", "--suspension", "chassis=hide", "--marker",
        "all=show", "--category", "UCA=hide",
    ])
    .unwrap();
    assert!(build_operation(&save.command, &cfg, &tools).unwrap().is_none());
    assert_eq!(ProfileStore::new(dir.path()).list().unwrap(), vec!["clean"]);

    let apply = CliArgs::try_parse_from(["swbridge", "profile", "apply", "clean"]).unwrap();
    let op = build_operation(&apply.command, &cfg, &tools).unwrap().unwrap();
    assert_eq!(op.kind(), OperationKind::ProfileApplication);
    let plan: Vec<String> = op.plan().unwrap().iter().map(|i| i.to_string()).collect();
    assert_eq!(
        plan,
        vec![
            "tool vis chassis hide",
            "tool marker vis all show",
            "tool vis substring hide UCA",
        ]
    );

    let bad = CliArgs::try_parse_from(["swbridge", "profile", "save", "x", "--marker", "left=show"])
        .unwrap();
    assert!(build_operation(&bad.command, &cfg, &tools).is_err());
    assert_eq!(ProfileStore::new(dir.path()).list().unwrap(), vec!["clean"]);
}

#[test]
fn exit_codes() {
    assert_eq!(exit_code(Some(&RunResult::success("ok"))), 0);
    assert_eq!(exit_code(Some(&RunResult::failure("Command failed with exit code 2"))), 1);
    assert_eq!(exit_code(Some(&RunResult::aborted())), EXIT_ABORTED);
    assert_eq!(exit_code(None), 1);
}
