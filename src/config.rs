//! Settings for reading the source table.

use crate::error::LoadError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the delimited source text is laid out.
///
/// The defaults match the EDGAR export: `;` between fields, `,` as decimal
/// separator, three label columns (`region;code;name`) followed by `Y_<year>`
/// columns holding megatonnes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Field delimiter, a single ASCII character.
    pub delimiter: char,
    /// Prefix in front of the year in header columns.
    pub year_prefix: String,
    /// Decimal separator used by numeric cells. Only its first occurrence is replaced.
    pub decimal_separator: char,
    /// Raw cell value divided by this yields gigatonnes.
    pub unit_divisor: f64,
    /// Number of leading label columns before the first year column.
    pub label_columns: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: ';',
            year_prefix: "Y_".into(),
            decimal_separator: ',',
            unit_divisor: 1000.0,
            label_columns: 3,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_year_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.year_prefix = prefix.into();
        self
    }

    pub fn with_decimal_separator(mut self, sep: char) -> Self {
        self.decimal_separator = sep;
        self
    }

    pub fn with_unit_divisor(mut self, divisor: f64) -> Self {
        self.unit_divisor = divisor;
        self
    }

    /// Read options from a JSON file. Missing keys fall back to the defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let opts: ParseOptions = serde_json::from_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reject settings the parser cannot work with.
    pub fn validate(&self) -> Result<(), LoadError> {
        let bad = |msg: String| Err(LoadError::Options(msg));
        if !self.delimiter.is_ascii() {
            return bad(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ));
        }
        if self.delimiter == self.decimal_separator {
            return bad("delimiter and decimal separator must differ".into());
        }
        if self.label_columns < 3 {
            return bad("need at least 3 label columns (region, code, name)".into());
        }
        if !(self.unit_divisor.is_finite() && self.unit_divisor > 0.0) {
            return bad(format!(
                "unit divisor must be a positive number, got {}",
                self.unit_divisor
            ));
        }
        Ok(())
    }

    /// Delimiter as the byte the reader splits on.
    pub(crate) fn delimiter_byte(&self) -> Result<u8, LoadError> {
        u8::try_from(self.delimiter).map_err(|_| {
            LoadError::Options(format!("delimiter {:?} is not a single byte", self.delimiter))
        })
    }

    /// Minimum field count of a usable data row: the labels plus one value.
    pub(crate) fn min_row_fields(&self) -> usize {
        self.label_columns + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("opts.json");
        std::fs::write(&p, r#"{"delimiter": ","}"#).unwrap();
        // comma as delimiter collides with the default decimal separator
        assert!(ParseOptions::from_json_file(&p).is_err());

        std::fs::write(&p, r#"{"delimiter": ",", "decimal_separator": "."}"#).unwrap();
        let opts = ParseOptions::from_json_file(&p).unwrap();
        assert_eq!(opts.delimiter, ',');
        assert_eq!(opts.year_prefix, "Y_");
        assert_eq!(opts.unit_divisor, 1000.0);
        assert_eq!(opts.label_columns, 3);
    }

    #[test]
    fn rejects_non_positive_divisor() {
        let opts = ParseOptions::new().with_unit_divisor(0.0);
        assert!(matches!(opts.validate(), Err(LoadError::Options(_))));
    }

    #[test]
    fn rejects_non_ascii_delimiter_and_short_labels() {
        let opts = ParseOptions::new().with_delimiter('\u{013B}');
        assert!(matches!(opts.validate(), Err(LoadError::Options(_))));
        assert!(opts.delimiter_byte().is_err());

        let opts = ParseOptions {
            label_columns: 1,
            ..Default::default()
        };
        assert!(matches!(opts.validate(), Err(LoadError::Options(_))));
        assert_eq!(ParseOptions::default().delimiter_byte().unwrap(), b';');
    }
}
