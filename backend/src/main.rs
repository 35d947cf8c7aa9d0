//! Expander CLI - cross-product tables from named value lists
//!
//! # Commands
//!
//! ```bash
//! expander expand grid.json                       # CSV to stdout
//! expander expand grid.csv --nesting make,model   # keep make/model paired
//! expander expand grid.json -f records -o out.json
//! expander validate grid.json                     # schema check only
//! expander example                                # print an example request
//! expander serve                                  # HTTP server (port 3000)
//! ```

use clap::{Parser, Subcommand};
use expander::{
    api::logs::LOG_BROADCASTER, config::parse_delimiter, example_request, expand_file, parse_nesting_list, render,
    server::start_server, validate_grid_request, ExpandOptions, OutputFormat, Settings,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "expander")]
#[command(about = "Expand named value lists into a cross-product table", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a JSON or CSV grid
    Expand {
        /// Input file (JSON grid/request or CSV with one column per header)
        input: PathBuf,

        /// Columns to keep paired, e.g. "make,model" (overrides the file)
        #[arg(short, long)]
        nesting: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// CSV output delimiter (default: EXPANDER_DELIMITER or ',')
        #[arg(short, long)]
        delimiter: Option<String>,

        /// Refuse expansions above this many rows, 0 = no limit
        /// (default: EXPANDER_MAX_ROWS or 1000000)
        #[arg(long)]
        max_rows: Option<usize>,

        /// Skip schema validation of JSON input
        #[arg(long)]
        no_validate: bool,

        /// Don't print progress to stderr
        #[arg(short, long)]
        quiet: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a JSON grid against the grid request schema
    Validate {
        /// Input JSON file
        input: PathBuf,
    },

    /// Print the car keyword example request
    Example,

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: EXPANDER_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    let settings = Settings::from_env();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Expand {
            input,
            nesting,
            format,
            delimiter,
            max_rows,
            no_validate,
            quiet,
            output,
        } => {
            LOG_BROADCASTER.set_echo(!quiet);
            cmd_expand(
                &settings,
                &input,
                nesting.as_deref(),
                format,
                delimiter.as_deref(),
                max_rows,
                no_validate,
                output.as_deref(),
            )
        }

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Example => cmd_example(),

        Commands::Serve { port } => {
            let settings = Settings {
                port: port.unwrap_or(settings.port),
                ..settings
            };
            start_server(settings).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_expand(
    settings: &Settings,
    input: &Path,
    nesting: Option<&str>,
    format: OutputFormat,
    delimiter: Option<&str>,
    max_rows: Option<usize>,
    no_validate: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let delimiter = match delimiter {
        Some(raw) => parse_delimiter(raw).ok_or_else(|| format!("Invalid delimiter: '{}'", raw))?,
        None => settings.delimiter,
    };

    let options = ExpandOptions {
        nesting: nesting.map(parse_nesting_list),
        max_rows: match max_rows {
            Some(0) => None,
            Some(n) => Some(n),
            None => settings.max_rows,
        },
        skip_validation: no_validate,
    };

    let result = expand_file(input, options)?;
    let rendered = render(&result.table, format, delimiter)?;
    write_output(&rendered, output)?;

    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let document: Value = serde_json::from_str(&content)?;

    match validate_grid_request(&document) {
        Ok(()) => {
            eprintln!("✅ Valid grid request");
            Ok(())
        }
        Err(errors) => {
            for err in errors.iter().take(10) {
                eprintln!("   - {}", err);
            }
            Err(format!("{} schema violation(s)", errors.len()).into())
        }
    }
}

fn cmd_example() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&example_request())?);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
