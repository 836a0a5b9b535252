use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::Parser;
use log::info;

use dactyl::cli::Cli;
use dactyl::resource::DirectoryClipSource;
use dactyl::{Engine, SubmitOutcome};

/// Engine tick, roughly one display frame
const TICK: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    cli.validate()?;

    let source = Arc::new(DirectoryClipSource::new(&cli.clips));
    let mut engine = Engine::new(source, cli.engine_config());

    if !engine.wait_ready(Duration::from_millis(cli.warmup_timeout)) {
        bail!("clip warm-up did not finish within {} ms", cli.warmup_timeout);
    }
    info!(
        "warm-up complete: {} of {} letters have clips",
        engine.available_clips(),
        dactyl::alphabet::len()
    );

    match engine.submit(&cli.text, cli.speed) {
        SubmitOutcome::Started => {}
        SubmitOutcome::NothingToPlay => {
            println!("nothing to play: no supported characters in input");
            return Ok(());
        }
        outcome => bail!("submit rejected: {:?}", outcome),
    }

    let mut last_symbol = None;
    let mut last_tick = Instant::now();
    loop {
        let now = Instant::now();
        engine.update(now.duration_since(last_tick));
        last_tick = now;

        let symbol = engine.current_symbol();
        if symbol != last_symbol {
            if let Some(c) = symbol {
                println!("{}", c);
            }
            last_symbol = symbol;
        }

        if !engine.is_playing() {
            break;
        }
        std::thread::sleep(TICK);
    }
    println!("done");

    if cli.bones {
        for bone in engine.bone_transforms() {
            let [x, y, z] = bone.position;
            let world = bone
                .world_position
                .map(|[wx, wy, wz]| format!(" world=({:.3}, {:.3}, {:.3})", wx, wy, wz))
                .unwrap_or_default();
            println!("{:<12} local=({:.3}, {:.3}, {:.3}){}", bone.name, x, y, z, world);
        }
    }

    Ok(())
}
