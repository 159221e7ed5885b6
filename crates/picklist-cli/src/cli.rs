use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "picklist")]
#[command(bin_name = "picklist")]
#[command(version)]
#[command(about = "Barcode-driven warehouse picking list")]
pub struct Cli {
    /// Write a diagnostics log for this run
    #[arg(long, global = true)]
    pub diagnostics: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Print the picking list in coordinate order")]
    List,
    #[command(about = "Run environment and configuration checks")]
    Doctor,
}
