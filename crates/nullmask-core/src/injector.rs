//! Null injection: replace eligible cells with the null marker at random
//!
//! A cell is eligible when no pattern is given, or when it holds a string
//! that the pattern matches at its first character. Each eligible cell is
//! nulled independently with the configured probability.

use crate::error::{Error, Result};
use crate::table::{CellValue, Table};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, error, warn};

/// Default per-cell probability of nullification
pub const DEFAULT_PROBABILITY: f64 = 0.1;

/// Settings for one injection pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectOptions {
    /// Chance in [0.0, 1.0] that an eligible cell is nulled
    #[serde(default = "default_probability")]
    pub probability: f64,
    /// Regular expression a string cell must match at its start to be eligible
    #[serde(default)]
    pub pattern: Option<String>,
    /// Columns to process; all columns when absent
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}

fn default_probability() -> f64 {
    DEFAULT_PROBABILITY
}

impl Default for InjectOptions {
    fn default() -> Self {
        Self {
            probability: DEFAULT_PROBABILITY,
            pattern: None,
            columns: None,
        }
    }
}

impl InjectOptions {
    /// Options with the given probability and no pattern or column filter
    pub fn with_probability(probability: f64) -> Self {
        Self {
            probability,
            ..Self::default()
        }
    }

    /// Set the pattern
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Restrict processing to the given columns
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Check the probability range
    pub fn validate(&self) -> Result<()> {
        // Written so that NaN is rejected too
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(Error::ProbabilityOutOfRange(self.probability));
        }
        Ok(())
    }
}

/// Split a comma-separated column list. Names are trimmed at injection time.
pub fn parse_column_list(list: &str) -> Vec<String> {
    list.split(',').map(str::to_string).collect()
}

/// Per-column counts from an injection pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnReport {
    pub column: String,
    /// Cells that passed the pattern check
    pub eligible: usize,
    pub nullified: usize,
}

/// Summary of an injection pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionReport {
    /// Rows in the table
    pub rows: usize,
    /// Processed columns, in processing order
    pub columns: Vec<ColumnReport>,
    /// Requested columns that do not exist in the table
    pub skipped_columns: Vec<String>,
}

impl InjectionReport {
    /// Total cells replaced with null
    pub fn total_nullified(&self) -> usize {
        self.columns.iter().map(|c| c.nullified).sum()
    }

    /// Total cells that were eligible
    pub fn total_eligible(&self) -> usize {
        self.columns.iter().map(|c| c.eligible).sum()
    }
}

/// The masked table together with what was done to it
#[derive(Debug, Clone)]
pub struct Injection {
    pub table: Table,
    pub report: InjectionReport,
}

/// Replace eligible cells of `table` with [`CellValue::Null`].
///
/// The table is taken by value and handed back in the result; keep a clone
/// if the original is still needed. The table shape and the probability are
/// checked before any cell is touched. Columns named in `options.columns`
/// that are not in the table are logged and skipped.
pub fn inject_nulls<R: Rng + ?Sized>(
    mut table: Table,
    options: &InjectOptions,
    rng: &mut R,
) -> Result<Injection> {
    table.validate()?;
    options.validate()?;

    let pattern = options
        .pattern
        .as_deref()
        .map(compile_anchored)
        .transpose()?;

    let requested: Vec<String> = match &options.columns {
        Some(names) => names.iter().map(|n| n.trim().to_string()).collect(),
        None => table.columns.iter().map(|c| c.name.clone()).collect(),
    };

    let mut report = InjectionReport {
        rows: table.row_count(),
        ..Default::default()
    };
    let mut visited = HashSet::new();

    for name in requested {
        if visited.contains(&name) {
            debug!("column '{}' requested more than once, already processed", name);
            continue;
        }

        let Some(column) = table.find_column_mut(&name) else {
            warn!("column '{}' not found, skipping", name);
            report.skipped_columns.push(name);
            continue;
        };

        let mut column_report = ColumnReport {
            column: name.clone(),
            eligible: 0,
            nullified: 0,
        };

        for (row, cell) in column.cells.iter_mut().enumerate() {
            if !is_eligible(cell, pattern.as_ref()) {
                continue;
            }
            column_report.eligible += 1;

            if rng.gen::<f64>() < options.probability {
                *cell = CellValue::Null;
                column_report.nullified += 1;
                debug!("replaced value at row {}, column '{}' with null", row, name);
            }
        }

        report.columns.push(column_report);
        visited.insert(name);
    }

    Ok(Injection { table, report })
}

/// Compile `pattern` so it only matches at the start of the input
fn compile_anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})", pattern)).map_err(|e| {
        error!("invalid pattern '{}': {}", pattern, e);
        Error::InvalidPattern {
            pattern: pattern.to_string(),
            source: e,
        }
    })
}

fn is_eligible(cell: &CellValue, pattern: Option<&Regex>) -> bool {
    match pattern {
        None => true,
        Some(re) => cell.as_str().is_some_and(|s| re.is_match(s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x_d00d_f00d)
    }

    fn abc_table() -> Table {
        Table::from_columns(vec![
            Column::new("A", vec![CellValue::Integer(1), CellValue::from("x")]),
            Column::new("B", vec![CellValue::Integer(2), CellValue::from("y")]),
            Column::new("C", vec![CellValue::Float(3.5), CellValue::Bool(true)]),
        ])
        .unwrap()
    }

    fn all_null(column: &Column) -> bool {
        column.cells.iter().all(CellValue::is_null)
    }

    #[test]
    fn test_zero_probability_is_noop() {
        let table = abc_table();
        let result = inject_nulls(table.clone(), &InjectOptions::with_probability(0.0), &mut rng())
            .unwrap();

        assert_eq!(result.table, table);
        assert_eq!(result.report.total_nullified(), 0);
        assert_eq!(result.report.total_eligible(), 6);
    }

    #[test]
    fn test_full_probability_nulls_everything() {
        let result =
            inject_nulls(abc_table(), &InjectOptions::with_probability(1.0), &mut rng()).unwrap();

        assert!(result.table.columns.iter().all(all_null));
        assert_eq!(result.report.total_nullified(), 6);
        assert_eq!(result.report.rows, 2);
    }

    #[test]
    fn test_column_restriction() {
        let original = abc_table();
        let options = InjectOptions::with_probability(1.0).columns(parse_column_list("A,C"));
        let result = inject_nulls(original.clone(), &options, &mut rng()).unwrap();

        assert!(all_null(result.table.find_column("A").unwrap()));
        assert!(all_null(result.table.find_column("C").unwrap()));
        assert_eq!(result.table.find_column("B"), original.find_column("B"));
    }

    #[test]
    fn test_column_names_are_trimmed() {
        let options = InjectOptions::with_probability(1.0).columns(parse_column_list(" A , C"));
        let result = inject_nulls(abc_table(), &options, &mut rng()).unwrap();

        assert!(all_null(result.table.find_column("A").unwrap()));
        assert!(all_null(result.table.find_column("C").unwrap()));
        assert!(result.report.skipped_columns.is_empty());
    }

    #[test]
    fn test_unknown_column_is_skipped() {
        let table = Table::from_columns(vec![
            Column::new("A", vec![CellValue::from("a")]),
            Column::new("B", vec![CellValue::from("b")]),
        ])
        .unwrap();
        let options = InjectOptions::with_probability(1.0).columns(["Z", "A", "B"]);
        let result = inject_nulls(table, &options, &mut rng()).unwrap();

        assert_eq!(result.report.skipped_columns, vec!["Z".to_string()]);
        assert!(result.table.columns.iter().all(all_null));
    }

    #[test]
    fn test_repeated_column_is_processed_once() {
        let options = InjectOptions::with_probability(1.0).columns(["A", "A "]);
        let result = inject_nulls(abc_table(), &options, &mut rng()).unwrap();

        assert_eq!(result.report.columns.len(), 1);
        assert_eq!(result.report.total_nullified(), 2);
    }

    #[test]
    fn test_pattern_matches_at_start_only() {
        let table = Table::from_columns(vec![Column::new(
            "fruit",
            vec!["apple".into(), "banana".into(), "avocado".into()],
        )])
        .unwrap();
        let options = InjectOptions::with_probability(1.0).pattern("^a");
        let result = inject_nulls(table, &options, &mut rng()).unwrap();

        let fruit = result.table.find_column("fruit").unwrap();
        assert_eq!(
            fruit.cells,
            vec![CellValue::Null, CellValue::from("banana"), CellValue::Null]
        );
        assert_eq!(result.report.total_eligible(), 2);
    }

    #[test]
    fn test_unanchored_pattern_is_anchored() {
        let table = Table::from_columns(vec![Column::new(
            "word",
            vec!["cat".into(), "concat".into(), "category".into()],
        )])
        .unwrap();
        let options = InjectOptions::with_probability(1.0).pattern("cat");
        let result = inject_nulls(table, &options, &mut rng()).unwrap();

        // Prefix match, not a search and not a full match
        assert_eq!(
            result.table.find_column("word").unwrap().cells,
            vec![CellValue::Null, CellValue::from("concat"), CellValue::Null]
        );
    }

    #[test]
    fn test_alternation_is_anchored_as_a_whole() {
        let table = Table::from_columns(vec![Column::new(
            "w",
            vec!["xa".into(), "bx".into(), "ab".into()],
        )])
        .unwrap();
        let options = InjectOptions::with_probability(1.0).pattern("a|b");
        let result = inject_nulls(table, &options, &mut rng()).unwrap();

        assert_eq!(
            result.table.find_column("w").unwrap().cells,
            vec![CellValue::from("xa"), CellValue::Null, CellValue::Null]
        );
    }

    #[test]
    fn test_pattern_never_matches_non_strings() {
        let table = Table::from_columns(vec![Column::new(
            "mixed",
            vec![
                CellValue::Integer(1),
                CellValue::Float(1.5),
                CellValue::Bool(true),
                CellValue::Null,
                CellValue::from("1"),
            ],
        )])
        .unwrap();
        let options = InjectOptions::with_probability(1.0).pattern(".*");
        let result = inject_nulls(table, &options, &mut rng()).unwrap();

        assert_eq!(
            result.table.find_column("mixed").unwrap().cells,
            vec![
                CellValue::Integer(1),
                CellValue::Float(1.5),
                CellValue::Bool(true),
                CellValue::Null,
                CellValue::Null,
            ]
        );
        assert_eq!(result.report.total_eligible(), 1);
    }

    #[test]
    fn test_out_of_range_probability() {
        for p in [1.5, -0.1, f64::NAN] {
            let err = inject_nulls(abc_table(), &InjectOptions::with_probability(p), &mut rng())
                .unwrap_err();
            assert!(matches!(err, Error::ProbabilityOutOfRange(_)));
        }
    }

    #[test]
    fn test_out_of_range_leaves_callers_table_untouched() {
        let original = abc_table();
        let result = inject_nulls(
            original.clone(),
            &InjectOptions::with_probability(1.5),
            &mut rng(),
        );

        assert!(result.is_err());
        assert_eq!(original, abc_table());
    }

    #[test]
    fn test_malformed_table_is_rejected() {
        let ragged = Table {
            columns: vec![
                Column::new("A", vec![CellValue::Integer(1), CellValue::Integer(2)]),
                Column::new("B", vec![CellValue::Integer(1)]),
            ],
        };
        let err = inject_nulls(ragged, &InjectOptions::with_probability(0.5), &mut rng())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTable(_)));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let options = InjectOptions::with_probability(0.5).pattern("(unclosed");
        let err = inject_nulls(abc_table(), &options, &mut rng()).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_fraction_converges_to_probability() {
        let rows = 20_000;
        let table = Table::from_columns(vec![Column::new(
            "v",
            (0..rows).map(CellValue::Integer).collect(),
        )])
        .unwrap();

        for p in [0.1, 0.3, 0.75] {
            let result = inject_nulls(
                table.clone(),
                &InjectOptions::with_probability(p),
                &mut rng(),
            )
            .unwrap();
            let fraction = result.report.total_nullified() as f64 / rows as f64;
            assert!(
                (fraction - p).abs() < 0.02,
                "p = {}, observed fraction {}",
                p,
                fraction
            );
            assert_eq!(
                result.table.find_column("v").unwrap().null_count(),
                result.report.total_nullified()
            );
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let options = InjectOptions::with_probability(0.5);
        let first = inject_nulls(abc_table(), &options, &mut rng()).unwrap();
        let second = inject_nulls(abc_table(), &options, &mut rng()).unwrap();
        assert_eq!(first.table, second.table);
    }

    #[test]
    fn test_options_from_json_defaults() {
        let options: InjectOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, InjectOptions::default());

        let options: InjectOptions =
            serde_json::from_str(r#"{"probability": 0.5, "pattern": "^a", "columns": ["A"]}"#)
                .unwrap();
        assert_eq!(options.probability, 0.5);
        assert_eq!(options.pattern.as_deref(), Some("^a"));
        assert_eq!(options.columns, Some(vec!["A".to_string()]));
    }

    #[test]
    fn test_parse_column_list() {
        assert_eq!(parse_column_list("A, C"), vec!["A", " C"]);
        assert_eq!(parse_column_list("A"), vec!["A"]);
    }
}
