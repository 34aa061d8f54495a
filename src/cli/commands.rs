use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "newsimpact", about = "Financial news impact engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest pre-fetched articles from a JSON file (array of {source, url, title, content, published_at})
    Ingest {
        /// Path to the JSON file
        file: String,
    },
    /// Cluster unprocessed articles into unique stories
    Dedup,
    /// Extract entities for stories that have none
    Extract,
    /// Map entity bags to impacted symbols
    MapImpacts,
    /// Run ingest, dedup, extract and map-impacts in order
    Pipeline {
        /// Path to the JSON article file
        file: String,
    },
    /// Ask for relevant news
    Query {
        text: String,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Show a story with its entities and impacts
    Show {
        /// Story ID
        id: String,
    },
    /// Re-embed stories missing vectors
    Reindex,
    /// Show database statistics
    Stats,
}
