//! Knotboard CLI
//!
//! Headless driver for knotboard documents:
//!
//!   knotboard layout <DOCUMENT> [--config <FILE>] [--max-ticks N] [--pretty]
//!   knotboard validate <DOCUMENT>
//!   knotboard anchors <DOCUMENT>
//!
//! Set `RUST_LOG` to control log output.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::CliError;

#[derive(Parser)]
#[command(name = "knotboard")]
#[command(about = "Lay out and inspect knotboard diagram documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the force layout until it settles and print the final frame
    Layout {
        /// Document file (JSON)
        document: PathBuf,

        /// Editor config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stop after this many ticks even if the layout is still moving
        #[arg(long, default_value_t = 300)]
        max_ticks: usize,

        /// Pretty-print the frame
        #[arg(short, long)]
        pretty: bool,
    },
    /// Check that every link points at existing nodes
    Validate {
        /// Document file (JSON)
        document: PathBuf,
    },
    /// Print the arrow marker inset of every link
    Anchors {
        /// Document file (JSON)
        document: PathBuf,
    },
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Layout {
            document,
            config,
            max_ticks,
            pretty,
        } => {
            let frame = commands::layout(&document, config.as_deref(), max_ticks, pretty)?;
            println!("{frame}");
        }
        Command::Validate { document } => {
            let (text, validation) = commands::validate(&document)?;
            println!("{text}");
            if !validation.dangling.is_empty() {
                return Err(CliError::Invalid(validation.dangling.len()));
            }
        }
        Command::Anchors { document } => {
            println!("{}", commands::anchors(&document)?);
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_layout_args() {
        let cli = Cli::parse_from(["knotboard", "layout", "doc.json", "--max-ticks", "50", "-p"]);
        match cli.command {
            Command::Layout {
                document,
                config,
                max_ticks,
                pretty,
            } => {
                assert_eq!(document, PathBuf::from("doc.json"));
                assert!(config.is_none());
                assert_eq!(max_ticks, 50);
                assert!(pretty);
            }
            _ => panic!("expected layout"),
        }
    }
}
