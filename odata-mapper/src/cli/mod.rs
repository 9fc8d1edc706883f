pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "odata-mapper")]
#[command(about = "Inspect an OData v2 service from the command line")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Service root URL, overriding the config file and environment
    #[arg(long, global = true)]
    pub service_root: Option<String>,

    /// Log requests and session handling
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the service `$metadata` document
    Metadata {
        /// Indent the XML
        #[arg(long)]
        pretty: bool,
    },
    /// GET a path relative to the service root
    Get {
        path: String,
    },
    /// Count the entities of an entity set
    Count {
        entity: String,
        /// Equality filter as NAME=VALUE; repeat for more terms
        #[arg(short, long)]
        filter: Vec<String>,
    },
}
