//! Schema validation for parsed CSV tables.
//!
//! Structural problems (empty file, missing headers) stop validation with a
//! single error. Otherwise every data row is checked and all findings are
//! collected, errors and warnings separately, in row order. Messages carry
//! the display row number, where the header is row 1.

use super::parser::{parse_rows, ParsedTable};
use crate::model::schema::{FieldCheck, ImportSchema, Severity};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

pub const EMPTY_FILE_ERROR: &str = "The file is empty.";

static ASCII_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("digits pattern"));

static SIGNED_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("signed digits pattern"));

// Emoji, pictographs, dingbats, arrows and other symbol blocks, plus the
// joiners and selectors that glue emoji sequences together.
static SYMBOLS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\x{00A9}\x{00AE}\x{2122}\x{2190}-\x{21FF}\x{2300}-\x{23FF}\x{2460}-\x{24FF}\x{25A0}-\x{27BF}\x{2900}-\x{297F}\x{2B00}-\x{2BFF}\x{3030}\x{303D}\x{3297}\x{3299}\x{1F000}-\x{1FAFF}\x{200D}\x{20E3}\x{FE0E}\x{FE0F}\x{E0020}-\x{E007F}]",
    )
    .expect("symbol pattern")
});

/// Result of validating one file.
///
/// A file is valid exactly when `errors` is empty; warnings never matter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub rows: ParsedTable,
}

impl ValidationOutcome {
    /// Single structural error with no rows.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            warnings: Vec::new(),
            rows: ParsedTable::default(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn data_row_count(&self) -> usize {
        self.rows.data_rows().len()
    }

    /// The normalized CSV that gets uploaded in place of the original bytes.
    pub fn cleaned_payload(&self) -> Option<String> {
        self.is_valid().then(|| self.rows.to_csv())
    }
}

/// Parses and validates raw file text.
pub fn validate_text(text: &str, schema: &ImportSchema) -> ValidationOutcome {
    validate_table(parse_rows(text), schema)
}

pub fn validate_table(table: ParsedTable, schema: &ImportSchema) -> ValidationOutcome {
    let Some(header) = table.header() else {
        return ValidationOutcome::failure(EMPTY_FILE_ERROR);
    };

    let mut columns: HashMap<&str, usize> = HashMap::new();
    for (idx, title) in header.iter().enumerate() {
        columns.entry(title.as_str()).or_insert(idx);
    }

    let missing: Vec<&str> = schema
        .expected_headers()
        .iter()
        .map(String::as_str)
        .filter(|title| !columns.contains_key(title))
        .collect();
    if !missing.is_empty() {
        return ValidationOutcome::failure(format!(
            "Missing required headers: {}",
            missing.join(", ")
        ));
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (idx, row) in table.data_rows().iter().enumerate() {
        let display_row = idx + 2;

        for field in schema.required_fields() {
            if let Some(value) = cell(&columns, row, field) {
                if value.trim().is_empty() {
                    errors.push(format!(
                        "Row {}: \"{}\" cannot be empty.",
                        display_row, field
                    ));
                }
            }
        }

        for rule in schema.rules() {
            let Some(value) = cell(&columns, row, &rule.field) else {
                continue;
            };
            if value.trim().is_empty() {
                continue;
            }
            if let Some(problem) = check_value(rule.check, &rule.field, value) {
                let message = format!("Row {}: {}", display_row, problem);
                match rule.check.severity() {
                    Severity::Error => errors.push(message),
                    Severity::Warning => warnings.push(message),
                }
            }
        }
    }

    log::debug!(
        "validated {} data rows: {} errors, {} warnings",
        table.data_rows().len(),
        errors.len(),
        warnings.len()
    );

    ValidationOutcome {
        errors,
        warnings,
        rows: table,
    }
}

/// Cell under `field`, `None` when the column does not exist. Cells past the
/// end of a short row read as empty.
fn cell<'a>(columns: &HashMap<&str, usize>, row: &'a [String], field: &str) -> Option<&'a str> {
    columns
        .get(field)
        .map(|&col| row.get(col).map(String::as_str).unwrap_or(""))
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Returns the problem with `value`, without the row prefix.
fn check_value(check: FieldCheck, field: &str, value: &str) -> Option<String> {
    match check {
        FieldCheck::WholePositive => {
            if !ASCII_DIGITS.is_match(value) {
                Some(format!(
                    "{} \"{}\" must be a whole number without decimals or special characters",
                    field, value
                ))
            } else if value.bytes().all(|b| b == b'0') {
                Some(format!("{} \"{}\" must be greater than 0", field, value))
            } else {
                None
            }
        }
        FieldCheck::DecimalPositive => match parse_number(value) {
            None => Some(format!("{} \"{}\" must be a valid number", field, value)),
            Some(n) if n <= 0.0 => Some(format!("{} \"{}\" must be greater than 0", field, value)),
            Some(_) => None,
        },
        FieldCheck::NonNegativeDecimal => match parse_number(value) {
            None => Some(format!("{} \"{}\" must be a valid number", field, value)),
            Some(n) if n < 0.0 => Some(format!("{} \"{}\" cannot be negative", field, value)),
            Some(_) => None,
        },
        FieldCheck::NonNegativeInteger => {
            if !SIGNED_DIGITS.is_match(value) {
                Some(format!("{} \"{}\" must be a whole number", field, value))
            } else if value.starts_with('-') && value[1..].bytes().any(|b| b != b'0') {
                Some(format!("{} \"{}\" cannot be negative", field, value))
            } else {
                None
            }
        }
        FieldCheck::PlainText => SYMBOLS.is_match(value).then(|| {
            format!(
                "{} \"{}\" contains emojis or special symbols that are not allowed",
                field, value
            )
        }),
        FieldCheck::MaxLength(limit) => (value.chars().count() > limit).then(|| {
            format!(
                "{} \"{}\" is longer than {} characters",
                field, value, limit
            )
        }),
        FieldCheck::DigitsOnly => (!ASCII_DIGITS.is_match(value))
            .then(|| format!("{} \"{}\" should only contain numbers", field, value)),
    }
}
