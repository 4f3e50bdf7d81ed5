use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "docstore",
    about = "Store documents under numeric IDs and serve them back over HTTP",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum RegistryArg {
    Memory,
    Log,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Store a local file under an ID
    Put(PutArgs),
    /// Fetch the document stored under an ID
    Get(GetArgs),
    /// List registered IDs and their locations
    List(ListArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    #[arg(long)]
    pub root: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub registry: Option<RegistryArg>,
}

#[derive(Args)]
pub struct PutArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub id: i64,
    /// File to store
    pub file: PathBuf,
    /// Stored filename, defaults to the file's own name
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub root: Option<PathBuf>,
}

#[derive(Args)]
pub struct GetArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub id: i64,
    /// Write content here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub root: Option<PathBuf>,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long)]
    pub root: Option<PathBuf>,
}
