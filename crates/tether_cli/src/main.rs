//! Tether CLI: drives incremental resource builds of a `tether.toml` project.
//!
//! Provides `tether build` for copying resources of every module in build
//! order, `tether fingerprint` for printing a resources target's
//! configuration fingerprint, `tether targets` for listing target chunks, and
//! `tether clean` for removing outputs and persisted build state.

#![warn(missing_docs)]

mod build;
mod clean;
mod fingerprint;
mod project;
mod targets;

use std::process;

use clap::{Parser, Subcommand};

/// Tether: incremental build bookkeeping.
#[derive(Parser, Debug)]
#[command(name = "tether", version, about = "Tether incremental build tool")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory, or path to its `tether.toml`.
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Copy resources of every module, incrementally unless `--rebuild`.
    Build(BuildArgs),
    /// Print the configuration fingerprint of a module's resources target.
    Fingerprint(FingerprintArgs),
    /// List target chunks in build order.
    Targets,
    /// Remove the output directory and persisted build state.
    Clean,
}

/// Arguments for the `tether build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Discard previous build state and copy everything.
    #[arg(long)]
    pub rebuild: bool,
}

/// Arguments for the `tether fingerprint` subcommand.
#[derive(Parser, Debug)]
pub struct FingerprintArgs {
    /// Module name.
    pub module: String,

    /// Use the test resources target.
    #[arg(long)]
    pub tests: bool,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional project directory or config file.
    pub project: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    tether_common::logging::init_logging(cli.verbose, cli.quiet);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        project: cli.project,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Fingerprint(ref args) => fingerprint::run(args, &global),
        Command::Targets => targets::run(&global),
        Command::Clean => clean::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
