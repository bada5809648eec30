//! High-level conversion pipeline.
//!
//! A run goes `Loading → Coercing → Saving → Done`, entering each stage once.
//! A failure in any stage ends the run with a [`RunError`] naming that stage.
//! Nothing is written unless loading and coercion both succeed.
//!
//! # Example
//!
//! ```rust,ignore
//! use crimex::{run, ConverterConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let summary = run(&ConverterConfig::new("clean_dataset.csv", "crime_data.json"))?;
//!     println!("Converted {} rows", summary.rows);
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::ConverterConfig;
use crate::error::{ConvertError, RunError, RunResult};
use crate::logs::{log_debug, log_debug_indent, log_info, log_success};
use crate::output::save_with;
use crate::parser::{format_delimiter, load_with};
use crate::transform::coerce_dataset;

/// Line printed to stdout when a run succeeds.
pub const SUCCESS_MESSAGE: &str = "✅ CSV converted to JSON successfully!";

/// Stage of a conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Loading,
    Coercing,
    Saving,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loading => "Loading",
            Stage::Coercing => "Coercing",
            Stage::Saving => "Saving",
            Stage::Done => "Done",
        };
        f.write_str(name)
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Number of records written
    pub rows: usize,
    /// Number of values converted from text to integer
    pub converted_values: usize,
    /// Field names, in output order
    pub fields: Vec<String>,
    /// Encoding the input was decoded with
    pub encoding: String,
    /// Delimiter the input was split on
    pub delimiter: char,
    pub output_path: PathBuf,
    /// Always [`Stage::Done`]
    pub stage: Stage,
}

fn at(stage: Stage) -> impl Fn(ConvertError) -> RunError {
    move |source| RunError { stage, source }
}

/// Run a full conversion: load, coerce every record, save.
///
/// Prints [`SUCCESS_MESSAGE`] to stdout when the output has been written.
pub fn run(config: &ConverterConfig) -> RunResult<RunSummary> {
    // Loading
    log_info(format!("📖 Reading {}...", config.input_path.display()));
    let parsed = load_with(&config.input_path, &config.load).map_err(at(Stage::Loading))?;
    let mut dataset = parsed.dataset;

    log_debug_indent(format!("Encoding: {}", parsed.encoding), 1);
    log_debug_indent(format!("Delimiter: '{}'", format_delimiter(parsed.delimiter)), 1);
    log_success(format!(
        "Read {} rows with {} columns",
        dataset.len(),
        dataset.header().len()
    ));
    log_debug(format!("Columns: {}", dataset.header().names().join(", ")));

    // Coercing
    log_info(format!("🔢 Converting numeric fields: {}", config.numeric_fields.join(", ")));
    let converted_values =
        coerce_dataset(&mut dataset, &config.numeric_fields).map_err(at(Stage::Coercing))?;
    log_success(format!("{} values converted to integers", converted_values));

    // Saving
    log_info(format!("💾 Writing {}...", config.output_path.display()));
    save_with(&dataset, &config.output_path, &config.save).map_err(at(Stage::Saving))?;
    log_success(format!("{} records written", dataset.len()));

    println!("{}", SUCCESS_MESSAGE);

    Ok(RunSummary {
        rows: dataset.len(),
        converted_values,
        fields: dataset.header().names().to_vec(),
        encoding: parsed.encoding,
        delimiter: parsed.delimiter as char,
        output_path: config.output_path.clone(),
        stage: Stage::Done,
    })
}

/// Convert `input_path` to `output_path` with default settings.
pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(input_path: P, output_path: Q) -> RunResult<RunSummary> {
    run(&ConverterConfig::new(
        input_path.as_ref(),
        output_path.as_ref(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::output::{SaveOptions, WriteMode};
    use crate::parser::{Delimiter, LoadOptions};
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;

    fn write_input(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("clean_dataset.csv");
        fs::write(&path, content).unwrap();
        path
    }

    fn read_output(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_scenario_mixed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, "year,cases\n2020,5\n2019.0,\n");
        let output = dir.path().join("crime_data.json");

        let summary = convert(&input, &output).unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.converted_values, 3);
        assert_eq!(summary.stage, Stage::Done);
        assert_eq!(
            read_output(&output),
            json!([{"year": 2020, "cases": 5}, {"year": 2019, "cases": ""}])
        );
    }

    #[test]
    fn test_scenario_empty_year() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, "year,cases\n,10\n");
        let output = dir.path().join("crime_data.json");

        convert(&input, &output).unwrap();
        assert_eq!(read_output(&output), json!([{"year": "", "cases": 10}]));
    }

    #[test]
    fn test_scenario_invalid_year_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, "year,cases\n2020,1\nabc,3\n");
        let output = dir.path().join("crime_data.json");

        let err = convert(&input, &output).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Coercion);
        assert_eq!(err.stage, Stage::Coercing);
        assert!(!output.exists());
    }

    #[test]
    fn test_failed_run_leaves_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, "year,cases\nabc,3\n");
        let output = dir.path().join("crime_data.json");
        fs::write(&output, "previous").unwrap();

        assert!(convert(&input, &output).is_err());
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
    }

    #[test]
    fn test_scenario_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, "year,cases\n");
        let output = dir.path().join("crime_data.json");

        let summary = convert(&input, &output).unwrap();
        assert_eq!(summary.rows, 0);
        assert_eq!(fs::read_to_string(&output).unwrap(), "[]");
    }

    #[test]
    fn test_short_row_writes_null() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, "state,year,cases\nGoa,2020\nKerala\n");
        let output = dir.path().join("crime_data.json");

        let summary = convert(&input, &output).unwrap();
        assert_eq!(summary.converted_values, 1);
        assert_eq!(
            read_output(&output),
            json!([
                {"state": "Goa", "year": 2020, "cases": null},
                {"state": "Kerala", "year": null, "cases": null}
            ])
        );
    }

    #[test]
    fn test_structure_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            &dir,
            "state,district,year,crime_head,cases\nGoa,North,2001,Theft,12\nAssam,Kamrup,2002.0,Robbery,3.0\n",
        );
        let output = dir.path().join("crime_data.json");

        let summary = convert(&input, &output).unwrap();
        assert_eq!(summary.fields, ["state", "district", "year", "crime_head", "cases"]);

        let written = fs::read_to_string(&output).unwrap();
        let keys_in_order = ["\"state\"", "\"district\"", "\"year\"", "\"crime_head\"", "\"cases\""];
        let positions: Vec<usize> = keys_in_order
            .iter()
            .map(|k| written.find(k).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let value = read_output(&output);
        assert_eq!(value[0]["state"], "Goa");
        assert_eq!(value[1]["district"], "Kamrup");
        assert_eq!(value[1]["cases"], 3);
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert(dir.path().join("nope.csv"), dir.path().join("out.json")).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::FileAccess);
        assert_eq!(err.stage, Stage::Loading);
    }

    #[test]
    fn test_malformed_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, "year,cases\n2020,1,extra\n");
        let output = dir.path().join("out.json");

        let err = convert(&input, &output).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(!output.exists());
    }

    #[test]
    fn test_unwritable_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, "year,cases\n2020,1\n");

        let err = convert(&input, dir.path().join("missing").join("out.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileAccess);
        assert_eq!(err.stage, Stage::Saving);
    }

    #[test]
    fn test_configured_run() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, "year;victims;city\n2020;4.0;Pune\n");
        let output = dir.path().join("out.json");

        let config = ConverterConfig::new(&input, &output)
            .with_numeric_fields(["victims"])
            .with_load_options(LoadOptions {
                delimiter: Delimiter::Auto,
                ..LoadOptions::default()
            })
            .with_save_options(SaveOptions {
                ascii_only: true,
                write_mode: WriteMode::Atomic,
            });

        let summary = run(&config).unwrap();
        assert_eq!(summary.delimiter, ';');
        assert_eq!(
            read_output(&output),
            json!([{"year": "2020", "victims": 4, "city": "Pune"}])
        );
    }
}
