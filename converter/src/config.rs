//! Converter configuration.
//!
//! The defaults reproduce the fixed paths the converter has always used:
//! `clean_dataset.csv` in, `crime_data.json` out, `year` and `cases` coerced.

use std::path::PathBuf;

use crate::output::SaveOptions;
use crate::parser::LoadOptions;
use crate::transform::DEFAULT_NUMERIC_FIELDS;

/// Input file read when none is given.
pub const DEFAULT_INPUT_PATH: &str = "clean_dataset.csv";

/// Output file written when none is given, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "crime_data.json";

/// Everything a single conversion run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Fields coerced to integers
    pub numeric_fields: Vec<String>,
    pub load: LoadOptions,
    pub save: SaveOptions,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            numeric_fields: DEFAULT_NUMERIC_FIELDS.iter().map(|f| f.to_string()).collect(),
            load: LoadOptions::default(),
            save: SaveOptions::default(),
        }
    }
}

impl ConverterConfig {
    /// Default settings with explicit paths.
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            ..Self::default()
        }
    }

    pub fn with_numeric_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_load_options(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }

    pub fn with_save_options(mut self, save: SaveOptions) -> Self {
        self.save = save;
        self
    }
}
