//! Print the octave table.

use std::path::PathBuf;

use clap::Args;
use polykey_core::ButtonId;
use polykey_synth::{midi_to_freq, note_name};

use super::common::load_config;

/// Show the note every key plays in every octave.
#[derive(Args)]
pub struct TableArgs {
    /// Configuration file (defaults to the factory configuration)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Run the table command.
pub fn run(args: TableArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    config.validate()?;
    let table = config.octave_table()?;

    for (octave, row) in table.rows().iter().enumerate() {
        println!("Octave {octave}");
        for (button, &note) in ButtonId::all(row.len()).zip(row) {
            println!(
                "  Key {:>2}: {:<4} ({:>3})  {:>8.2} Hz",
                button.raw(),
                note_name(note).to_string(),
                note,
                midi_to_freq(note)
            );
        }
    }
    Ok(())
}
