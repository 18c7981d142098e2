//! `register-check` CLI -- verify and generate CAS-register histories.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "register-check",
    about = "Incremental linearizability checker for a CAS register"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify linearizability of history files in a directory
    Verify(VerifyArgs),
    /// Generate synthetic histories
    Generate(GenerateArgs),
}

#[derive(Debug, Parser)]
pub struct VerifyArgs {
    /// Directory containing `*.json` / `*.hist` history files
    #[arg(long)]
    pub input_dir: PathBuf,
    /// Concurrency bound passed to the normaliser
    #[arg(long, default_value_t = 16)]
    pub concurrency: usize,
}

#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Number of histories to generate
    #[arg(long)]
    pub n_hist: u64,
    /// Number of processes (writers/readers) per history
    #[arg(long)]
    pub n_process: u64,
    /// Number of writes in the CAS chain per history
    #[arg(long)]
    pub n_write: u64,
    /// Number of reads per history
    #[arg(long)]
    pub n_read: u64,
    /// Output directory for generated history files
    #[arg(long)]
    pub output_dir: PathBuf,
}
