//! CSV loading with optional encoding and delimiter auto-detection.
//!
//! The first row is the header; every following row becomes one
//! [`Record`](crate::models::Record) keyed by it. All values stay text here,
//! numeric coercion happens in [`crate::transform`].

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{ConvertError, ConvertResult};
use crate::models::{Dataset, Header};

/// Delimiters tried by [`detect_delimiter`], in tie-breaking order.
const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

// =============================================================================
// Options
// =============================================================================

/// Field delimiter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Fixed(u8),
    /// Pick the most frequent candidate in the header line.
    Auto,
}

impl Default for Delimiter {
    fn default() -> Self {
        Delimiter::Fixed(b',')
    }
}

impl FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Delimiter::Auto),
            "\\t" | "tab" | "\t" => Ok(Delimiter::Fixed(b'\t')),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii() => Ok(Delimiter::Fixed(c as u8)),
                    _ => Err(format!(
                        "invalid delimiter '{}': expected a single ASCII character, 'tab' or 'auto'",
                        s
                    )),
                }
            }
        }
    }
}

/// Character encoding of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputEncoding {
    /// Strict UTF-8; invalid bytes are a parse error.
    #[default]
    Utf8,
    /// Detect the charset from the content.
    Auto,
}

impl FromStr for InputEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(InputEncoding::Utf8),
            "auto" => Ok(InputEncoding::Auto),
            other => Err(format!("unsupported encoding '{}': expected 'utf-8' or 'auto'", other)),
        }
    }
}

/// How to read the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOptions {
    pub delimiter: Delimiter,
    pub encoding: InputEncoding,
}

/// A loaded dataset with the settings actually used to read it.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub dataset: Dataset,
    /// Encoding the bytes were decoded with
    pub encoding: String,
    /// Delimiter the rows were split on
    pub delimiter: u8,
}

// =============================================================================
// Detection
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Detect the delimiter by counting candidates in the first line.
///
/// Falls back to `,` when no candidate appears.
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");

    let mut best = CANDIDATE_DELIMITERS[0];
    let mut best_count = 0;

    for &candidate in &CANDIDATE_DELIMITERS {
        let count = first_line.bytes().filter(|&b| b == candidate).count();
        if count > best_count {
            best_count = count;
            best = candidate;
        }
    }

    best
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode bytes as strict UTF-8, dropping a leading byte-order mark.
fn decode_utf8(bytes: &[u8], path: &Path) -> ConvertResult<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    String::from_utf8(bytes.to_vec()).map_err(|e| {
        let valid = e.utf8_error().valid_up_to();
        let line = bytes[..valid].iter().filter(|&&b| b == b'\n').count() as u64 + 1;
        ConvertError::parse(
            path,
            Some(line),
            format!("invalid UTF-8 sequence at byte {}", valid),
        )
    })
}

/// Decode bytes with a named encoding, failing on malformed sequences.
pub fn decode_content(bytes: &[u8], encoding: &str, path: &Path) -> ConvertResult<String> {
    let codec = encoding_rs::Encoding::for_label(encoding.as_bytes()).unwrap_or(encoding_rs::UTF_8);

    if codec == encoding_rs::UTF_8 {
        return decode_utf8(bytes, path);
    }

    let (text, _, had_errors) = codec.decode(bytes);
    if had_errors {
        return Err(ConvertError::parse(
            path,
            None,
            format!("content is not valid {}", codec.name()),
        ));
    }

    Ok(text.into_owned())
}

// =============================================================================
// Loading
// =============================================================================

/// Load a UTF-8, comma-separated file.
pub fn load<P: AsRef<Path>>(path: P) -> ConvertResult<Dataset> {
    load_with(path, &LoadOptions::default()).map(|r| r.dataset)
}

/// Load a file with explicit options.
pub fn load_with<P: AsRef<Path>>(path: P, options: &LoadOptions) -> ConvertResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| ConvertError::file_access(path, e))?;

    parse_bytes(&bytes, options, path)
}

/// Parse in-memory CSV bytes. `source` only labels errors.
pub fn parse_bytes(bytes: &[u8], options: &LoadOptions, source: &Path) -> ConvertResult<ParseResult> {
    let (content, encoding) = match options.encoding {
        InputEncoding::Utf8 => (decode_utf8(bytes, source)?, "utf-8".to_string()),
        InputEncoding::Auto => {
            let encoding = detect_encoding(bytes);
            (decode_content(bytes, &encoding, source)?, encoding)
        }
    };

    let delimiter = match options.delimiter {
        Delimiter::Fixed(d) => d,
        Delimiter::Auto => detect_delimiter(&content),
    };

    let dataset = parse_str(&content, delimiter, source)?;

    Ok(ParseResult {
        dataset,
        encoding,
        delimiter,
    })
}

/// Parse decoded CSV text into a dataset.
///
/// A row shorter than the header leaves its missing fields null. A row
/// longer than the header is a parse error.
pub fn parse_str(content: &str, delimiter: u8, source: &Path) -> ConvertResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let to_error = |e: csv::Error| {
        let line = e.position().map(|p| p.line());
        ConvertError::parse(source, line, csv_message(&e))
    };

    let header = Header::from_columns(reader.headers().map_err(to_error)?.iter());
    let columns = header.column_count();
    let mut dataset = Dataset::new(Arc::new(header));

    for row in reader.records() {
        let row = row.map_err(to_error)?;
        if row.len() > columns {
            return Err(ConvertError::parse(
                source,
                row.position().map(|p| p.line()),
                format!(
                    "found record with {} fields, but the header has {} fields",
                    row.len(),
                    columns
                ),
            ));
        }
        dataset.push_row(row.iter());
    }

    Ok(dataset)
}

/// Error text of a csv error without its position, which
/// [`ConvertError::Parse`] already carries.
fn csv_message(e: &csv::Error) -> String {
    match e.kind() {
        csv::ErrorKind::Io(err) => err.to_string(),
        csv::ErrorKind::Utf8 { err, .. } => format!(
            "invalid UTF-8 in field {} near byte {}",
            err.field() + 1,
            err.valid_up_to()
        ),
        csv::ErrorKind::UnequalLengths { expected_len, len, .. } => format!(
            "found record with {} fields, but the previous record has {} fields",
            len, expected_len
        ),
        _ => e.to_string(),
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Fixed(d) => f.write_str(&format_delimiter(*d)),
            Delimiter::Auto => f.write_str("auto"),
        }
    }
}

/// Format a delimiter byte for display
pub fn format_delimiter(d: u8) -> String {
    match d {
        b'\t' => "TAB".to_string(),
        c => (c as char).to_string(),
    }
}
