use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "jsondrive",
    about = "jsondrive: file-backed JSON document store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store root directory
    #[arg(short, long, global = true, default_value = "./")]
    pub root: PathBuf,

    /// TOML file with store settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a JSON document to a record
    Write(WriteArgs),
    /// Print a single record
    Read(RecordArgs),
    /// Print every record in a collection
    ReadAll(CollectionArgs),
    /// Delete a record
    Delete(RecordArgs),
    /// Populate a collection with sample users
    Seed(SeedArgs),
}

#[derive(Args)]
pub struct WriteArgs {
    pub collection: String,
    pub resource: String,
    /// JSON document; `-` reads it from stdin
    pub value: String,
}

#[derive(Args)]
pub struct RecordArgs {
    pub collection: String,
    pub resource: String,
}

#[derive(Args)]
pub struct CollectionArgs {
    pub collection: String,
}

#[derive(Args)]
pub struct SeedArgs {
    #[arg(long, default_value = "users")]
    pub collection: String,
}
