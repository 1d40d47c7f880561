//! AsideKV CLI
//!
//! Command-line wrapper that opens a store on a data directory and runs one
//! command against it. Values are stored as JSON strings.

use std::process::ExitCode;

use asidekv::{CompressionKind, Config, Store};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

/// AsideKV CLI
#[derive(Parser, Debug)]
#[command(name = "asidekv-cli")]
#[command(about = "CLI for the AsideKV embedded key-value store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./asidekv_data")]
    data_dir: String,

    /// Record file extension
    #[arg(short, long, default_value = "kv")]
    extension: String,

    /// Compression applied to stored values
    #[arg(short, long, value_enum, default_value = "none")]
    compression: Compression,

    /// fsync each durable write
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Compression {
    None,
    Lz4,
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

        /// Only write the cache (lost when the process exits)
        #[arg(long)]
        cache_only: bool,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// List durable keys
    Keys,
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,asidekv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .file_extension(&args.extension)
        .sync_writes(args.sync)
        .compression(match args.compression {
            Compression::None => CompressionKind::None,
            Compression::Lz4 => CompressionKind::Lz4,
        })
        .build();

    let store = match Store::open(config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = match run(&store, args.command) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    };

    store.close();
    code
}

fn run(store: &Store, command: Commands) -> asidekv::Result<ExitCode> {
    match command {
        Commands::Get { key } => match store.get::<String>(&key)? {
            Some(value) => println!("{}", value),
            None => {
                println!("(nil)");
                return Ok(ExitCode::from(1));
            }
        },
        Commands::Set {
            key,
            value,
            cache_only,
        } => {
            store.set(&key, &value, !cache_only)?;
            println!("OK");
        }
        Commands::Del { key } => {
            store.erase(&key)?;
            println!("OK");
        }
        Commands::Keys => {
            for key in store.keys() {
                println!("{}", key);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
