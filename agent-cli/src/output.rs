//! Rendering for command results: human-readable by default, `--format json`
//! for scripting. Mirrors the teacher's output contract minus the YAML
//! variant, since `serde_yaml` is not part of this workspace's dependency
//! table.

use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Anything a command hands back to the user implements this once and gets
/// both renderings for free.
pub trait Output: Serialize {
    fn write_human(&self) -> String;

    fn write(&self, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Human => Ok(self.write_human()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

pub fn print_output<T: Output>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", value.write(format)?);
    Ok(())
}
