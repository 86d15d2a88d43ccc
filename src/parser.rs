//! Reads the semicolon-delimited emission table into typed entities.
//!
//! Layout: a header row whose columns from the fourth onward are `Y_<year>`,
//! then one row per country, `region;code;name;v_1970;v_1971;...`. Cells use
//! a decimal comma and hold megatonnes.
//!
//! Only a missing or header-less source is fatal. Short rows are dropped and
//! unusable cells become uncertain zero records; both are tallied in
//! [`ParseReport`].

use crate::config::ParseOptions;
use crate::error::LoadError;
use crate::models::{Entity, YearRecord};
use ahash::AHashSet;
use csv::{ReaderBuilder, StringRecord};
use log::{debug, warn};
use regex::Regex;

/// Entities in source row order plus the sorted list of header years.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub entities: Vec<Entity>,
    pub years: Vec<i32>,
}

/// Tally of everything the parser absorbed instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct ParseReport {
    /// Data rows seen after the header.
    pub rows_read: usize,
    /// Rows with too few fields or an empty code.
    pub rows_dropped: usize,
    /// Rows skipped because their code was already taken by an earlier row.
    pub duplicate_ids: usize,
    /// Year records flagged uncertain (empty, non-numeric, negative or zero cells).
    pub uncertain_cells: usize,
}

/// Maps each value column (0-indexed after the labels) to its year.
/// Columns whose header does not carry a usable year map to `None` so that
/// the remaining columns keep their alignment.
#[derive(Debug, Clone)]
struct YearColumns(Vec<Option<i32>>);

impl YearColumns {
    fn from_header(header: &StringRecord, opts: &ParseOptions) -> Result<Self, LoadError> {
        let re = Regex::new(&format!(r"^{}(-?\d+)$", regex::escape(&opts.year_prefix)))?;
        let mut seen = AHashSet::new();
        let cols: Vec<Option<i32>> = header
            .iter()
            .skip(opts.label_columns)
            .map(|h| {
                let h = h.trim();
                let year = re
                    .captures(h)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse::<i32>().ok());
                match year {
                    Some(y) if !seen.insert(y) => {
                        warn!("duplicate year column {h:?}, ignoring it");
                        None
                    }
                    Some(y) => Some(y),
                    None => {
                        warn!("header column {h:?} is not a year column, ignoring it");
                        None
                    }
                }
            })
            .collect();
        if cols.iter().all(Option::is_none) {
            return Err(LoadError::NoYearColumns {
                prefix: opts.year_prefix.clone(),
            });
        }
        Ok(Self(cols))
    }

    fn sorted_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.0.iter().flatten().copied().collect();
        years.sort_unstable();
        years
    }
}

/// Turn one raw cell into a record. Never drops the cell.
pub fn parse_cell(raw: &str, opts: &ParseOptions) -> YearRecord {
    match parse_number(raw, opts.decimal_separator) {
        Some(v) => YearRecord::measured(v / opts.unit_divisor),
        None => YearRecord::unknown(),
    }
}

/// Decimal-comma number, non-negative and finite. Only the first separator is
/// swapped for a dot, so `1.234,5` stays unparsable.
fn parse_number(raw: &str, decimal_separator: char) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let normalized = s.replacen(decimal_separator, ".", 1);
    let v = normalized.parse::<f64>().ok()?;
    (v.is_finite() && v >= 0.0).then_some(v)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

/// Parse the whole table. Options are validated first.
pub fn parse_text(text: &str, opts: &ParseOptions) -> Result<(ParsedTable, ParseReport), LoadError> {
    opts.validate()?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(opts.delimiter_byte()?)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut records = rdr.records();
    let header = loop {
        match records.next() {
            Some(rec) => {
                let rec = rec?;
                if !is_blank(&rec) {
                    break rec;
                }
            }
            None => return Err(LoadError::Empty),
        }
    };
    let columns = YearColumns::from_header(&header, opts)?;

    let mut report = ParseReport::default();
    let mut entities: Vec<Entity> = Vec::new();
    let mut ids = AHashSet::new();

    for rec in records {
        let rec = rec?;
        if is_blank(&rec) {
            continue;
        }
        report.rows_read += 1;
        let line = rec.position().map(|p| p.line()).unwrap_or_default();

        if rec.len() < opts.min_row_fields() {
            debug!("line {line}: {} fields, dropping row", rec.len());
            report.rows_dropped += 1;
            continue;
        }
        let label = |i: usize| rec.get(i).map(str::trim).unwrap_or_default();
        let (region, code, name) = (label(0), label(1), label(2));
        if code.is_empty() {
            debug!("line {line}: empty code, dropping row");
            report.rows_dropped += 1;
            continue;
        }
        if !ids.insert(code.to_string()) {
            warn!("line {line}: duplicate code {code:?}, keeping the first row");
            report.duplicate_ids += 1;
            continue;
        }

        let mut entity = Entity::new(code, name, region);
        // Column k always maps to the k-th header year; trailing absent columns stay absent.
        for (slot, cell) in columns.0.iter().zip(rec.iter().skip(opts.label_columns)) {
            let Some(year) = *slot else { continue };
            let record = parse_cell(cell, opts);
            if record.uncertainty {
                report.uncertain_cells += 1;
            }
            entity.years.insert(year, record);
        }
        entities.push(entity);
    }

    let table = ParsedTable {
        entities,
        years: columns.sorted_years(),
    };
    Ok((table, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> ParseOptions {
        ParseOptions::default()
    }

    #[test]
    fn cell_divides_by_thousand_and_flags_zero() {
        let r = parse_cell("12,5", &opts());
        assert!((r.absolute - 0.0125).abs() < 1e-12);
        assert!(!r.uncertainty);
        assert_eq!(r.per_capita, 0.0);

        let z = parse_cell("0", &opts());
        assert_eq!(z.absolute, 0.0);
        assert!(z.uncertainty);

        let z = parse_cell("0,0", &opts());
        assert!(z.uncertainty);
    }

    #[test]
    fn unusable_cells_become_uncertain_zero() {
        for raw in ["", "   ", "n/a", "1.234,5", "-3,2", "inf", "NaN"] {
            let r = parse_cell(raw, &opts());
            assert_eq!(r.absolute, 0.0, "cell {raw:?}");
            assert!(r.uncertainty, "cell {raw:?}");
        }
    }

    #[test]
    fn only_first_separator_is_replaced() {
        assert_eq!(parse_number("3,25", ','), Some(3.25));
        assert_eq!(parse_number("3,2,5", ','), None);
        assert_eq!(parse_number(" 7 ", ','), Some(7.0));
    }

    #[test]
    fn header_slots_keep_alignment() {
        let text = "a;b;c;Y_2000;junk;Y_2002\nR;AAA;Alpha;1;2;3\n";
        let (table, _) = parse_text(text, &opts()).unwrap();
        assert_eq!(table.years, vec![2000, 2002]);
        let e = &table.entities[0];
        assert_eq!(e.years.len(), 2);
        assert!((e.years[&2000].absolute - 0.001).abs() < 1e-12);
        assert!((e.years[&2002].absolute - 0.003).abs() < 1e-12);
    }

    #[test]
    fn header_without_years_is_fatal() {
        let err = parse_text("a;b;c;d\nR;AAA;A;1\n", &opts()).unwrap_err();
        assert!(matches!(err, LoadError::NoYearColumns { .. }));
    }

    #[test]
    fn bad_options_fail_instead_of_panicking() {
        let short_labels = ParseOptions {
            label_columns: 1,
            ..Default::default()
        };
        let err = parse_text("region;Y_2000\nR;AAA\n", &short_labels).unwrap_err();
        assert!(matches!(err, LoadError::Options(_)));

        let wide = ParseOptions::new().with_delimiter('\u{013B}');
        let err = parse_text("region;code;name;Y_2000\nR;AAA;A;5\n", &wide).unwrap_err();
        assert!(matches!(err, LoadError::Options(_)));
    }

    #[test]
    fn blank_input_is_fatal() {
        assert!(matches!(parse_text("", &opts()), Err(LoadError::Empty)));
        assert!(matches!(parse_text("\n  \n\n", &opts()), Err(LoadError::Empty)));
    }
}
