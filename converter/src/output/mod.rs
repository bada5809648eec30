//! JSON output for converted datasets.
//!
//! The dataset is written as one array of objects, indented with four
//! spaces. By default every non-ASCII character is written as a `\uXXXX`
//! escape, surrogate pairs included. Clearing [`SaveOptions::ascii_only`]
//! writes raw UTF-8 instead.

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{ConvertError, ConvertResult};
use crate::models::Dataset;

/// Indentation of the output document.
pub const INDENT: &[u8] = b"    ";

// =============================================================================
// Options
// =============================================================================

/// How the output file is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Truncate and write in place. A failure mid-write leaves a partial file.
    #[default]
    Overwrite,
    /// Write a temporary file next to the target, then rename it over the target.
    Atomic,
}

/// How to write the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Escape non-ASCII characters.
    pub ascii_only: bool,
    pub write_mode: WriteMode,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            ascii_only: true,
            write_mode: WriteMode::default(),
        }
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// Pretty formatter that escapes everything outside ASCII.
struct AsciiFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl<'a> AsciiFormatter<'a> {
    fn new(indent: &'a [u8]) -> Self {
        Self {
            inner: PrettyFormatter::with_indent(indent),
        }
    }
}

impl Formatter for AsciiFormatter<'_> {
    fn write_string_fragment<W: ?Sized + Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if c.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }
}

/// Serialize a dataset as indented JSON into a writer.
pub fn write_json<W: Write>(writer: W, dataset: &Dataset, ascii_only: bool) -> io::Result<()> {
    if ascii_only {
        let mut ser = serde_json::Serializer::with_formatter(writer, AsciiFormatter::new(INDENT));
        dataset.serialize(&mut ser)?;
    } else {
        let mut ser = serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(INDENT));
        dataset.serialize(&mut ser)?;
    }
    Ok(())
}

/// Render a dataset as an indented JSON string.
pub fn to_json_string(dataset: &Dataset, ascii_only: bool) -> io::Result<String> {
    let mut buf = Vec::new();
    write_json(&mut buf, dataset, ascii_only)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

// =============================================================================
// Saving
// =============================================================================

/// Write a dataset to `path` with default options, replacing any existing file.
pub fn save<P: AsRef<Path>>(dataset: &Dataset, path: P) -> ConvertResult<()> {
    save_with(dataset, path, &SaveOptions::default())
}

/// Write a dataset to `path`.
pub fn save_with<P: AsRef<Path>>(dataset: &Dataset, path: P, options: &SaveOptions) -> ConvertResult<()> {
    let path = path.as_ref();
    let result = match options.write_mode {
        WriteMode::Overwrite => write_in_place(dataset, path, options.ascii_only),
        WriteMode::Atomic => write_atomic(dataset, path, options.ascii_only),
    };
    result.map_err(|e| ConvertError::file_access(path, e))
}

fn write_in_place(dataset: &Dataset, path: &Path, ascii_only: bool) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(&mut writer, dataset, ascii_only)?;
    writer.flush()
}

fn write_atomic(dataset: &Dataset, path: &Path, ascii_only: bool) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write_json(&mut writer, dataset, ascii_only)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
