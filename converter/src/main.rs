//! Crimex CLI - Convert a CSV dataset to JSON
//!
//! ```bash
//! crimex                                  # clean_dataset.csv -> crime_data.json
//! crimex data.csv -o out.json             # explicit paths
//! crimex data.csv -d auto --encoding auto # detect delimiter and charset
//! crimex data.csv -f year -f victims      # choose the numeric fields
//! crimex data.csv --utf8 --atomic         # raw UTF-8 output, atomic replace
//! ```

use clap::Parser;
use crimex::logs::{set_verbosity, Verbosity};
use crimex::{
    run, ConverterConfig, Delimiter, InputEncoding, LoadOptions, SaveOptions, WriteMode,
    DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH, DEFAULT_NUMERIC_FIELDS,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crimex")]
#[command(about = "Convert a CSV dataset to a JSON array, coercing numeric fields", long_about = None)]
struct Cli {
    /// Input CSV file
    #[arg(default_value = DEFAULT_INPUT_PATH)]
    input: PathBuf,

    /// Output JSON file (overwritten)
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// CSV delimiter: a single character, 'tab' or 'auto'
    #[arg(short, long, default_value = ",")]
    delimiter: Delimiter,

    /// Input encoding: 'utf-8' or 'auto'
    #[arg(long, default_value = "utf-8")]
    encoding: InputEncoding,

    /// Field to convert to an integer (repeatable, default: year, cases)
    #[arg(short, long = "field")]
    fields: Vec<String>,

    /// Write non-ASCII characters as raw UTF-8 instead of \u escapes
    #[arg(long)]
    utf8: bool,

    /// Write to a temporary file and rename it over the output
    #[arg(long)]
    atomic: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print debug details
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    fn into_config(self) -> ConverterConfig {
        let fields = if self.fields.is_empty() {
            DEFAULT_NUMERIC_FIELDS.iter().map(|f| f.to_string()).collect()
        } else {
            self.fields
        };

        ConverterConfig::new(self.input, self.output)
            .with_numeric_fields(fields)
            .with_load_options(LoadOptions {
                delimiter: self.delimiter,
                encoding: self.encoding,
            })
            .with_save_options(SaveOptions {
                ascii_only: !self.utf8,
                write_mode: if self.atomic {
                    WriteMode::Atomic
                } else {
                    WriteMode::Overwrite
                },
            })
    }
}

fn main() {
    let cli = Cli::parse();
    set_verbosity(cli.verbosity());

    let config = cli.into_config();

    if let Err(e) = run(&config) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}
