use approx::assert_relative_eq;
use std::path::PathBuf;

use clap::Parser;
use runtime::{run, Args};

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("lanyard-runtime-{}-{name}", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn demo_feed_runs_headless() -> anyhow::Result<()> {
    let args = Args {
        frames: 120,
        ..Args::default()
    };
    let summary = run(&args)?;
    assert_eq!(summary.frames, 120);
    assert_eq!(summary.chains, 3);
    assert_eq!(summary.cards.len(), 3);
    assert!(summary.steps >= 110, "expected about one step per frame, got {}", summary.steps);
    assert!(!summary.dragged);
    for (key, position) in &summary.cards {
        assert!(position.is_finite(), "{key} card left the world");
    }
    Ok(())
}

#[test]
fn scripted_drag_captures_the_first_card() -> anyhow::Result<()> {
    let args = Args {
        frames: 160,
        drag: true,
        log_every: 0,
        ..Args::default()
    };
    let summary = run(&args)?;
    assert!(summary.dragged);
    Ok(())
}

#[test]
fn records_and_config_load_from_files() -> anyhow::Result<()> {
    let records = temp_file(
        "records.json",
        r#"[{"contentHash": "QmOne"}, {"contentHash": ""}, {"ipfs_hash": "QmTwo", "city": "Leeds"}]"#,
    );
    let config = temp_file("config.json", r#"{"layout": {"spacing": 5.0}}"#);
    let args = Args {
        records: Some(records.clone()),
        config: Some(config.clone()),
        frames: 10,
        ..Args::default()
    };
    let summary = run(&args)?;
    assert_eq!(summary.chains, 2);
    std::fs::remove_file(records)?;
    std::fs::remove_file(config)?;
    Ok(())
}

#[test]
fn missing_records_file_is_an_error() {
    let args = Args {
        records: Some(PathBuf::from("/nonexistent/lanyard/records.json")),
        ..Args::default()
    };
    assert!(run(&args).is_err());
}

#[test]
fn cli_flags_parse() {
    let args = Args::parse_from(["lanyard_main", "--frames", "42", "--frame-dt", "0.02", "--drag"]);
    assert_eq!(args.frames, 42);
    assert_relative_eq!(args.frame_dt, 0.02);
    assert!(args.drag);
    assert!(args.records.is_none());
}
