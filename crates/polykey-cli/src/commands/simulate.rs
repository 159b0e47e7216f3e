//! Run a scripted input sequence through the engine.

use std::path::PathBuf;

use clap::Args;
use polykey_platform::Snapshot;

use super::common::load_config;
use crate::script::{Script, ScriptedInputs};

/// Simulate a key and pot sequence.
#[derive(Args)]
pub struct SimulateArgs {
    /// Script of timed input events (TOML)
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Configuration file (defaults to the factory configuration)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Dump state every N cycles as well as at the end
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub every: u64,

    /// Print snapshots as JSON lines instead of reports
    #[arg(long)]
    pub json: bool,
}

/// Run the simulate command.
pub fn run(args: SimulateArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut engine = config.build_engine()?;
    let script = Script::load(&args.script)?;

    let mut inputs = ScriptedInputs::new(config.settings().scan.pins);
    let settle = u64::from(config.scan.debounce_samples) + 1;
    let cycles = script.duration(settle);

    tracing::info!(
        script = %args.script.display(),
        events = script.events.len(),
        cycles,
        "simulating"
    );

    for cycle in 0..cycles {
        inputs.set_cycle(cycle);
        for event in script.events_at(cycle) {
            inputs.apply(event);
        }
        engine.cycle(&mut inputs);

        let done = cycle + 1;
        if done == cycles || (args.every > 0 && done % args.every == 0) {
            emit(&engine.snapshot(), args.json)?;
        }
    }

    let snapshot = engine.snapshot();
    tracing::info!(
        cycles = snapshot.cycle,
        active_voices = snapshot.active_voices(),
        "simulation finished"
    );
    Ok(())
}

fn emit<const V: usize, const B: usize>(
    snapshot: &Snapshot<V, B>,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
    } else {
        println!("cycle {}", snapshot.cycle);
        println!("{}", snapshot.report());
    }
    Ok(())
}
