//! ick-compose CLI
//!
//! Usage:
//!   ick-compose [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>   Configuration file declaring components (TOML format)
//!   -d, --data <FILE>     Root data exposed to templates as `Root` (JSON format)
//!   --strict              Fail on unregistered components
//!   --max-depth <N>       Bound on component nesting
//!   --css                 Prefix the output with the CSS of the used components
//!   --ids                 List the generated ids on stderr
//!   -v, --verbose         Increase log verbosity
//!   -h, --help            Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing::Level;

use ick_compose::{Composer, Config};

#[derive(Parser)]
#[command(name = "ick-compose")]
#[command(about = "Expand embedded component tags into html")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Configuration file declaring components (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root data exposed to templates as `Root` (JSON format)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Fail on unregistered components instead of leaving a comment
    #[arg(long)]
    strict: bool,

    /// Bound on component nesting
    #[arg(long)]
    max_depth: Option<usize>,

    /// Prefix the output with a <style> block of the used components' CSS
    #[arg(long)]
    css: bool,

    /// List the generated ids on stderr
    #[arg(long)]
    ids: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    if cli.strict {
        config.compose.strict = true;
    }
    if let Some(max_depth) = cli.max_depth {
        config.compose.max_depth = max_depth;
    }

    let registry = match config.registry() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Load root data
    let root = match &cli.data {
        Some(path) => {
            let parsed = fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|content| {
                    serde_json::from_str::<serde_json::Value>(&content).map_err(|e| e.to_string())
                });
            match parsed {
                Ok(value) => value,
                Err(e) => {
                    eprintln!("Error loading data '{}': {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
        None => serde_json::Value::Null,
    };

    // Read input
    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let composer = Composer::new(&registry, config.compose.clone());
    match composer.compose_fragment(&source, &root) {
        Ok(composition) => {
            if cli.css && !composition.styles.is_empty() {
                println!("<style>\n{}</style>", composition.stylesheet());
            }
            println!("{}", composition.html);
            if cli.ids {
                for id in composition.ids() {
                    eprintln!("{}", id);
                }
            }
        }
        Err(failure) => {
            eprintln!("{}", failure.error.report(&filename));
            std::process::exit(1);
        }
    }
}
