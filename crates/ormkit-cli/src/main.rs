//! ormkit Command-Line Tool
//!
//! Validates model definition files and resolves through-relationships
//! against them.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ormkit Command-Line Tool
#[derive(Parser, Debug)]
#[command(name = "ormkit")]
#[command(version, about = "Validate ormkit models and resolve relationships")]
pub struct Args {
    /// Enable debug logging (overridden by ORMKIT_LOG)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate a JSON array of model definitions
    Validate {
        /// Model definition file
        file: PathBuf,
    },
    /// Resolve PARENT.THROUGH.TARGET into a two-hop relationship
    Resolve {
        /// Model definition file
        file: PathBuf,
        /// Parent model name
        parent: String,
        /// Relation on the parent leading to the through model
        through: String,
        /// Relation on the through model leading to the target model
        target: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let args = Args::parse();

    let default_directive = if args.debug { "ormkit=debug" } else { "ormkit=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("ORMKIT_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();

    match commands::run(&args.command) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
