//! husk unified CLI tool
//!
//! Command-line interface for generating declaration stubs from object-graph
//! snapshots dumped by a host runtime: batch generation into a stubs
//! directory, single-module printing, and snapshot inspection.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "husk")]
#[command(about = "Generate declaration stubs from object-graph snapshots", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate stub files for modules in a snapshot
    Generate {
        /// Snapshot JSON file dumped by a host runtime
        snapshot: PathBuf,
        /// Module roots to generate
        roots: Vec<String>,
        /// Generate every module in the snapshot
        #[arg(long)]
        all: bool,
        /// Generate only modules the host marks as built-in
        #[arg(long)]
        builtin_only: bool,
        /// Module names to skip
        #[arg(short, long)]
        exclude: Vec<String>,
        /// Output directory (defaults to HUSK_STUBS_PATH or `_stubs`)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// Base name substituted for classes with no declared bases
        #[arg(long, default_value = husk_gen::DEFAULT_ROOT_BASE)]
        root_base: String,
        /// Leave base lists empty instead of substituting a root base
        #[arg(long)]
        no_root_base: bool,
    },

    /// Print one module's stub to stdout
    Print {
        /// Snapshot JSON file dumped by a host runtime
        snapshot: PathBuf,
        /// Module root to print
        root: String,
        /// Base name substituted for classes with no declared bases
        #[arg(long, default_value = husk_gen::DEFAULT_ROOT_BASE)]
        root_base: String,
        /// Leave base lists empty instead of substituting a root base
        #[arg(long)]
        no_root_base: bool,
    },

    /// List module roots in a snapshot
    List {
        /// Snapshot JSON file dumped by a host runtime
        snapshot: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            snapshot,
            roots,
            all,
            builtin_only,
            exclude,
            out_dir,
            root_base,
            no_root_base,
        } => commands::generate::execute(
            snapshot,
            roots,
            all,
            builtin_only,
            exclude,
            out_dir,
            root_base,
            no_root_base,
        ),

        Commands::Print {
            snapshot,
            root,
            root_base,
            no_root_base,
        } => commands::print::execute(snapshot, root, root_base, no_root_base),

        Commands::List { snapshot } => commands::list::execute(snapshot),
    }
}
