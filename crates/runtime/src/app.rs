//! # Application Logic
//!
//! [`run`] builds the scene described by [`Args`] and drives it frame by
//! frame, the way a host render loop would.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::{Vec2, Vec3};
use lanyard::{Camera, CardRecord, ChainId, LanyardConfig, PointerEvent, Scene};

/// Feed used when no `--records` file is given.
const DEMO_RECORDS: &str = r#"[
    {
        "identifier": "deed-001",
        "title": "Lot 12, Harbour Road",
        "locality": "Portsmouth",
        "sizeValue": 420,
        "createdAt": "2024-02-11T09:30:00Z",
        "contentHash": "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"
    },
    {
        "identifier": "deed-002",
        "title": "Orchard Parcel",
        "locality": "Kent",
        "sizeValue": 1250.5,
        "createdAt": "2024-05-02",
        "contentHash": "QmT78zSuBmuS4z925WZfrqQ1qHaJ56DQaTfyMUF7F8ff5o"
    },
    {
        "identifier": "deed-003",
        "title": "Mill House",
        "locality": "York",
        "sizeValue": 310,
        "contentHash": "QmcRD4wkPPi6dig81r5sLj9Zm1gDCL4zgpEj9CfuRrGbzF"
    }
]"#;

/// Pointer id used by the scripted drag.
const SCRIPT_POINTER: u32 = 1;

#[derive(Parser, Debug, Clone)]
#[command(name = "lanyard_main", about = "Simulate hanging cards headlessly")]
pub struct Args {
    /// JSON array of card records. Defaults to a built-in demo feed.
    #[arg(long)]
    pub records: Option<PathBuf>,
    /// JSON configuration overrides.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of render frames to simulate.
    #[arg(long, default_value_t = 300)]
    pub frames: u32,
    /// Render frame duration in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub frame_dt: f32,
    /// Grab the first card partway through and swing it sideways.
    #[arg(long)]
    pub drag: bool,
    /// Log card positions every this many frames (0 disables).
    #[arg(long, default_value_t = 60)]
    pub log_every: u32,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            records: None,
            config: None,
            frames: 300,
            frame_dt: 1.0 / 60.0,
            drag: false,
            log_every: 60,
        }
    }
}

/// What a run ended with.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: u32,
    pub steps: u64,
    pub chains: usize,
    /// Final card position per record key.
    pub cards: Vec<(String, Vec3)>,
    /// Whether the scripted drag ever captured a card.
    pub dragged: bool,
}

/// Runs the scene described by `args`.
///
/// # Errors
/// Returns an error if the records or config file cannot be loaded.
pub fn run(args: &Args) -> Result<RunSummary> {
    let config = match &args.config {
        Some(path) => LanyardConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => LanyardConfig::default(),
    };
    let records = load_records(args.records.as_ref())?;
    tracing::info!("Loaded {} records", records.len());

    let mut scene = Scene::with_world(config, Camera::new(1280, 720));
    let report = scene.rebuild(&records);
    for skipped in &report.skipped {
        tracing::warn!("Record {} skipped: {}", skipped.index, skipped.reason);
    }
    for (record, e) in &report.failed {
        tracing::warn!("No chain for {}: {e}", record.key());
    }

    let script = if args.drag {
        report.chains.first().map(|&id| DragScript::new(id, args.frames))
    } else {
        None
    };

    let queue = scene.pointer_queue();
    let mut summary = RunSummary {
        frames: 0,
        steps: 0,
        chains: report.chains.len(),
        cards: Vec::new(),
        dragged: false,
    };
    for frame in 0..args.frames {
        if let Some(script) = &script {
            if let Some(event) = script.event(&scene, frame) {
                queue.push(event);
            }
        }
        let output = scene.tick(args.frame_dt);
        summary.frames += 1;
        summary.steps += u64::from(output.steps);
        summary.dragged |= output.chains.iter().any(|chain| chain.dragging);

        if args.log_every > 0 && (frame + 1) % args.log_every == 0 {
            for chain in &output.chains {
                tracing::info!(
                    "Frame {}: {} card at {:?}, rope tip {:?}",
                    frame + 1,
                    chain.key,
                    chain.transforms.card.position,
                    chain.points[0]
                );
            }
        }
        if frame + 1 == args.frames {
            summary.cards = output
                .chains
                .iter()
                .map(|chain| (chain.key.clone(), chain.transforms.card.position))
                .collect();
        }
    }
    scene.teardown();
    Ok(summary)
}

fn load_records(path: Option<&PathBuf>) -> Result<Vec<CardRecord>> {
    let json = match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading records from {}", path.display()))?
        }
        None => DEMO_RECORDS.to_owned(),
    };
    lanyard::parse_records(&json).context("parsing record feed")
}

/// Down on the card at a quarter of the run, sideways sweep, up at half.
struct DragScript {
    chain: ChainId,
    down: u32,
    up: u32,
}

impl DragScript {
    fn new(chain: ChainId, frames: u32) -> Self {
        let down = frames / 4;
        let up = (frames / 2).max(down + 1);
        Self { chain, down, up }
    }

    fn event(&self, scene: &Scene, frame: u32) -> Option<PointerEvent> {
        if frame == self.down {
            let ndc = card_ndc(scene, self.chain)?;
            return Some(PointerEvent::Down {
                pointer: SCRIPT_POINTER,
                ndc,
            });
        }
        if frame > self.down && frame < self.up {
            #[allow(clippy::cast_precision_loss)]
            let progress = (frame - self.down) as f32 / (self.up - self.down) as f32;
            let ndc = Vec2::new(-0.4 + 0.8 * progress, 0.2);
            return Some(PointerEvent::Move {
                pointer: SCRIPT_POINTER,
                ndc,
            });
        }
        if frame == self.up {
            return Some(PointerEvent::Up {
                pointer: SCRIPT_POINTER,
                ndc: Vec2::ZERO,
            });
        }
        None
    }
}

fn card_ndc(scene: &Scene, id: ChainId) -> Option<Vec2> {
    let card = scene.chain(id)?.chain.card();
    let state = physics::PhysicsEngine::body(scene.engine(), card).ok()?;
    Some(scene.camera().project(state.position).truncate())
}
