//! Numeric field coercion.
//!
//! A recognized field holding non-empty text is read as a floating-point
//! number and truncated toward zero, so decimal-formatted integers such as
//! `"2020.0"` become `2020`. Absent fields, nulls, empty strings and values
//! that are already integers are left as they are.
//!
//! Results must fit in an `i64`; larger magnitudes are a [`CoercionError`].

use crate::error::{CoercionError, ConvertError, ConvertResult};
use crate::models::{Dataset, FieldValue, Record};

/// Fields coerced when no explicit list is configured.
pub const DEFAULT_NUMERIC_FIELDS: [&str; 2] = ["year", "cases"];

/// Coerce the default numeric fields of a record.
///
/// # Example
/// ```ignore
/// use crimex::{coerce, Record};
///
/// let record = coerce(Record::from_pairs([("year", "2019.0"), ("cases", "")])).unwrap();
/// assert_eq!(record.get("year").unwrap().as_integer(), Some(2019));
/// assert_eq!(record.get("cases").unwrap().as_text(), Some(""));
/// ```
pub fn coerce(mut record: Record) -> Result<Record, CoercionError> {
    coerce_fields(&mut record, &DEFAULT_NUMERIC_FIELDS)?;
    Ok(record)
}

/// Coerce the given fields of a record in place.
///
/// Returns how many values were converted from text to integer.
pub fn coerce_fields<S: AsRef<str>>(
    record: &mut Record,
    fields: &[S],
) -> Result<usize, CoercionError> {
    let mut converted = 0;

    for field in fields {
        let field = field.as_ref();
        let Some(value) = record.get_mut(field) else {
            continue;
        };
        if let Some(n) = coerce_value(field, value)? {
            *value = FieldValue::Integer(n);
            converted += 1;
        }
    }

    Ok(converted)
}

/// Integer for a field value, or `None` when the value stays unchanged.
pub fn coerce_value(field: &str, value: &FieldValue) -> Result<Option<i64>, CoercionError> {
    match value {
        FieldValue::Integer(_) | FieldValue::Null => Ok(None),
        FieldValue::Text(s) if s.is_empty() => Ok(None),
        FieldValue::Text(s) => parse_truncated(s)
            .map(Some)
            .map_err(|reason| CoercionError::new(field, s.as_str(), reason)),
    }
}

/// Parse text as a float and truncate it to an integer.
///
/// Single underscores between digits are accepted as group separators
/// (`"1_000"`).
pub fn parse_truncated(text: &str) -> Result<i64, String> {
    let number: f64 = strip_digit_separators(text.trim())
        .parse()
        .map_err(|e: std::num::ParseFloatError| e.to_string())?;

    if !number.is_finite() {
        return Err("not a finite number".to_string());
    }

    let truncated = number.trunc();
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err("out of the supported 64-bit integer range".to_string());
    }

    Ok(truncated as i64)
}

/// Remove `_` separators that sit between two ASCII digits.
///
/// Any other underscore is kept so the float parse rejects it.
fn strip_digit_separators(text: &str) -> std::borrow::Cow<'_, str> {
    if !text.contains('_') {
        return std::borrow::Cow::Borrowed(text);
    }

    let bytes = text.as_bytes();
    let separates_digits = |i: usize| {
        i > 0
            && i + 1 < bytes.len()
            && bytes[i - 1].is_ascii_digit()
            && bytes[i + 1].is_ascii_digit()
    };

    if bytes
        .iter()
        .enumerate()
        .any(|(i, &b)| b == b'_' && !separates_digits(i))
    {
        return std::borrow::Cow::Borrowed(text);
    }

    std::borrow::Cow::Owned(text.replace('_', ""))
}

/// Coerce every record of a dataset, in order.
///
/// Stops at the first failing record. Returns the total number of values
/// converted.
pub fn coerce_dataset<S: AsRef<str>>(dataset: &mut Dataset, fields: &[S]) -> ConvertResult<usize> {
    let mut converted = 0;

    for (i, record) in dataset.records_mut().iter_mut().enumerate() {
        converted += coerce_fields(record, fields)
            .map_err(|source| ConvertError::Coercion { row: i + 1, source })?;
    }

    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::Header;
    use std::sync::Arc;

    fn year(record: &Record) -> &FieldValue {
        record.get("year").unwrap()
    }

    #[test]
    fn test_integer_text() {
        let record = coerce(Record::from_pairs([("year", "2020"), ("cases", "5")])).unwrap();
        assert_eq!(year(&record), &FieldValue::Integer(2020));
        assert_eq!(record.get("cases"), Some(&FieldValue::Integer(5)));
    }

    #[test]
    fn test_decimal_text_is_truncated() {
        assert_eq!(parse_truncated("2019.0"), Ok(2019));
        assert_eq!(parse_truncated("12.99"), Ok(12));
        assert_eq!(parse_truncated("-3.9"), Ok(-3));
        assert_eq!(parse_truncated("-0.5"), Ok(0));
        assert_eq!(parse_truncated("1e3"), Ok(1000));
        assert_eq!(parse_truncated(" 42 "), Ok(42));
    }

    #[test]
    fn test_empty_and_absent_fields_unchanged() {
        let record = coerce(Record::from_pairs([("year", ""), ("cases", "10")])).unwrap();
        assert_eq!(year(&record), &FieldValue::from(""));
        assert_eq!(record.get("cases"), Some(&FieldValue::Integer(10)));

        let record = coerce(Record::from_pairs([("state", "Kerala")])).unwrap();
        assert!(record.get("year").is_none());
        assert_eq!(record.get("state"), Some(&FieldValue::from("Kerala")));
    }

    #[test]
    fn test_other_fields_untouched() {
        let record = coerce(Record::from_pairs([("year", "2021"), ("population", "1000")])).unwrap();
        assert_eq!(record.get("population"), Some(&FieldValue::from("1000")));
    }

    #[test]
    fn test_invalid_value_fails() {
        let err = coerce(Record::from_pairs([("year", "abc"), ("cases", "3")])).unwrap_err();
        assert_eq!(err.field, "year");
        assert_eq!(err.value, "abc");
    }

    #[test]
    fn test_digit_separators() {
        assert_eq!(parse_truncated("1_000"), Ok(1000));
        assert_eq!(parse_truncated("2_019.5"), Ok(2019));
        assert!(parse_truncated("1__000").is_err());
        assert!(parse_truncated("_1000").is_err());
        assert!(parse_truncated("1000_").is_err());
    }

    #[test]
    fn test_null_field_unchanged() {
        let mut record = Record::from_columns(
            Arc::new(Header::from_columns(["year", "cases"])),
            ["2020"],
        );
        assert_eq!(coerce_fields(&mut record, &DEFAULT_NUMERIC_FIELDS), Ok(1));
        assert_eq!(record.get("cases"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_whitespace_only_fails() {
        assert!(coerce(Record::from_pairs([("cases", "  ")])).is_err());
    }

    #[test]
    fn test_non_finite_and_overflow_fail() {
        assert!(parse_truncated("nan").is_err());
        assert!(parse_truncated("inf").is_err());
        let err = parse_truncated("1e30").unwrap_err();
        assert!(err.contains("64-bit"));
        assert_eq!(parse_truncated("-9223372036854775808"), Ok(i64::MIN));
    }

    #[test]
    fn test_idempotent() {
        let once = coerce(Record::from_pairs([("year", "2019.0"), ("cases", "")])).unwrap();
        let twice = coerce(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_field_list() {
        let mut record = Record::from_pairs([("year", "2020"), ("victims", "7.0")]);
        let converted = coerce_fields(&mut record, &["victims"]).unwrap();

        assert_eq!(converted, 1);
        assert_eq!(record.get("victims"), Some(&FieldValue::Integer(7)));
        assert_eq!(year(&record), &FieldValue::from("2020"));
    }

    #[test]
    fn test_dataset_reports_failing_row() {
        let mut dataset = Dataset::new(Arc::new(Header::from_columns(["year", "cases"])));
        dataset.push_row(["2020", "5"]);
        dataset.push_row(["2019.0", ""]);
        dataset.push_row(["abc", "3"]);

        let err = coerce_dataset(&mut dataset, &DEFAULT_NUMERIC_FIELDS).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Coercion);
        match err {
            ConvertError::Coercion { row, source } => {
                assert_eq!(row, 3);
                assert_eq!(source.field, "year");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_dataset_counts_conversions() {
        let mut dataset = Dataset::new(Arc::new(Header::from_columns(["year", "cases"])));
        dataset.push_row(["2020", "5"]);
        dataset.push_row(["2019.0", ""]);

        assert_eq!(coerce_dataset(&mut dataset, &DEFAULT_NUMERIC_FIELDS).unwrap(), 3);
    }
}
