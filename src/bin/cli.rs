//! AtlasTree CLI
//!
//! Inspect and edit a tree file saved with `BytesCodec` values.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use atlastree::{AtlasError, BTree, BytesCodec, Config};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// AtlasTree CLI
#[derive(Parser, Debug)]
#[command(name = "atlastree-cli")]
#[command(about = "Inspect and edit AtlasTree files")]
#[command(version)]
struct Args {
    /// Tree file (created on first write)
    #[arg(short, long, default_value = "./tree.atl")]
    file: PathBuf,

    /// Node fan-out used for new trees and accepted when loading.
    ///
    /// The file does not record the fan-out: pass the same value on every
    /// invocation, or `stats` will report underfilled nodes.
    #[arg(short, long, default_value = "255")]
    max_items: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// List items in key order
    List {
        /// Start at this key (inclusive)
        #[arg(long)]
        from: Option<String>,

        /// Walk keys in descending order
        #[arg(short, long)]
        reverse: bool,

        /// Stop after this many items
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print height, length and run a structural check
    Stats,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,atlastree=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), AtlasError> {
    let config = Config::builder().max_items(args.max_items).build()?;
    let mut tree = open_tree(&args.file, config)?;

    match args.command {
        Commands::Get { key } => match tree.get(key.as_bytes()) {
            Some(value) => println!("{}", String::from_utf8_lossy(value)),
            None => println!("(not found)"),
        },
        Commands::Set { key, value } => {
            match tree.set(key, Bytes::from(value)) {
                Some(_) => println!("OK (replaced)"),
                None => println!("OK"),
            }
            tree.save_to_path(&args.file, &BytesCodec)?;
        }
        Commands::Del { key } => {
            if tree.delete(key.as_bytes()).is_some() {
                tree.save_to_path(&args.file, &BytesCodec)?;
                println!("OK");
            } else {
                println!("(not found)");
            }
        }
        Commands::List {
            from,
            reverse,
            limit,
        } => {
            let mut remaining = limit.unwrap_or(usize::MAX);
            let print = |key: &[u8], value: &Bytes| {
                if remaining == 0 {
                    return false;
                }
                remaining -= 1;
                println!(
                    "{}\t{}",
                    String::from_utf8_lossy(key),
                    String::from_utf8_lossy(value)
                );
                true
            };
            let pivot = from.as_deref().map(str::as_bytes);
            if reverse {
                tree.descend(pivot, print);
            } else {
                tree.ascend(pivot, print);
            }
        }
        Commands::Stats => {
            println!("file:      {}", args.file.display());
            println!("length:    {}", tree.len());
            println!("height:    {}", tree.height());
            println!("max_items: {}", tree.config().max_items());
            println!("min_items: {}", tree.config().min_items());
            tree.verify()?;
            println!("structure: ok");
        }
    }

    Ok(())
}

/// Load the tree at `path`, or start an empty one if the file does not exist
fn open_tree(path: &Path, config: Config) -> Result<BTree<Bytes>, AtlasError> {
    if !path.exists() {
        tracing::info!("{} does not exist, starting with an empty tree", path.display());
        return Ok(BTree::with_config(config));
    }
    BTree::load_from_path_with_config(path, &BytesCodec, config)
}
