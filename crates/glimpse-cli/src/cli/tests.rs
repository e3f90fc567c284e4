use super::*;
use clap::Parser;
use std::path::PathBuf;

#[test]
fn parses_snapshot_with_flags() {
    let cli = Cli::try_parse_from([
        "glimpse",
        "snapshot",
        "graph.json",
        "--schema",
        "schema.toml",
        "--max-objects",
        "50",
        "--compact",
    ])
    .unwrap();

    let Command::Snapshot(args) = cli.command else {
        panic!("expected snapshot");
    };
    assert_eq!(args.graph, PathBuf::from("graph.json"));
    assert_eq!(args.schema, Some(PathBuf::from("schema.toml")));
    assert_eq!(args.max_objects, Some(50));
    assert!(args.compact);
    assert!(args.bridge_timeout_ms.is_none());
}

#[test]
fn check_schema_is_optional() {
    let cli = Cli::try_parse_from(["glimpse", "check"]).unwrap();
    let Command::Check(args) = cli.command else {
        panic!("expected check");
    };
    assert!(args.schema.is_none());
    assert!(!args.strict);
}

#[test]
fn verbose_and_quiet_conflict() {
    assert!(Cli::try_parse_from(["glimpse", "-v", "-q", "check"]).is_err());
}

#[test]
fn global_flags_follow_subcommand() {
    let cli = Cli::try_parse_from(["glimpse", "check", "--no-color", "--verbose"]).unwrap();
    assert!(cli.no_color);
    assert!(cli.verbose);
}
