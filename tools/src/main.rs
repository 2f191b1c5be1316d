use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dcfs_tools::{decode_message_json, format_report, inspect_message, load_schema, selfcheck};

#[derive(Parser)]
#[command(name = "dcfs-tools", version, about = "DCFS message inspection and decoding tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a framed message and print its structure.
    Inspect {
        /// Path to the message bytes.
        message: PathBuf,
    },
    /// Decode a schema-described record from a message into JSON.
    Decode {
        /// Path to the message bytes.
        message: PathBuf,
        /// Schema JSON describing the record.
        #[arg(long)]
        schema: PathBuf,
    },
    /// Run the built-in end-to-end exercise.
    Selfcheck,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Inspect { message } => {
            let bytes = fs::read(&message)
                .with_context(|| format!("read message {}", message.display()))?;
            let report = inspect_message(&bytes)?;
            print!("{}", format_report(&report));
        }
        Command::Decode { message, schema } => {
            let bytes = fs::read(&message)
                .with_context(|| format!("read message {}", message.display()))?;
            let schema_json = fs::read_to_string(&schema)
                .with_context(|| format!("read schema {}", schema.display()))?;
            let schema = load_schema(&schema_json)?;
            let value = decode_message_json(&bytes, &schema)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::Selfcheck => {
            print!("{}", selfcheck()?);
        }
    }
    Ok(())
}
