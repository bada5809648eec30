//! # Crimex - CSV dataset to JSON conversion
//!
//! Crimex reads a CSV export, converts its numeric fields (`year` and `cases`
//! by default) to integers and writes the rows as a JSON array.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│   Coerce    │────▶│  JSON File  │
//! │ (UTF-8/auto)│     │  (header)   │     │ (float→int) │     │ (4 spaces)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crimex::convert;
//!
//! fn main() {
//!     let summary = convert("clean_dataset.csv", "crime_data.json").unwrap();
//!     println!("Converted {} rows", summary.rows);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (FieldValue, Header, Record, Dataset)
//! - [`parser`] - CSV loading with optional auto-detection
//! - [`transform`] - Numeric field coercion
//! - [`output`] - JSON writing
//! - [`pipeline`] - Load, coerce, save orchestration
//! - [`config`] - Run configuration
//! - [`logs`] - Console logging

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Pipeline stages
pub mod output;
pub mod parser;
pub mod transform;

pub mod pipeline;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CoercionError,
    ConvertError,
    ConvertResult,
    ErrorKind,
    RunError,
    RunResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Dataset, FieldValue, Header, Record};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{ConverterConfig, DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    detect_delimiter,
    detect_encoding,
    load,
    load_with,
    Delimiter,
    InputEncoding,
    LoadOptions,
    ParseResult,
};

// =============================================================================
// Re-exports - Coercion
// =============================================================================

pub use transform::{coerce, coerce_dataset, coerce_fields, DEFAULT_NUMERIC_FIELDS};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use output::{save, save_with, to_json_string, SaveOptions, WriteMode};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{convert, run, RunSummary, Stage, SUCCESS_MESSAGE};
