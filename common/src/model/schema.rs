//! Column expectations for one kind of CSV import.
//!
//! A schema lists the headers a file must carry, the fields that may not be
//! left empty and the per-field value checks. Columns are always looked up by
//! header name, so the order of `expected_headers` only matters for messages.

/// Whether a failed check blocks the upload or is only advisory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Value check applied to the non-empty cells of one column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldCheck {
    /// ASCII digits only, greater than zero.
    WholePositive,
    /// Any finite number greater than zero.
    DecimalPositive,
    /// Integer, zero allowed.
    NonNegativeInteger,
    /// Any finite number, zero allowed.
    NonNegativeDecimal,
    /// No emoji, pictographs or symbol-block characters.
    PlainText,
    /// Advisory: value longer than the given number of characters.
    MaxLength(usize),
    /// Advisory: value contains something other than ASCII digits.
    DigitsOnly,
}

impl FieldCheck {
    pub fn severity(self) -> Severity {
        match self {
            FieldCheck::MaxLength(_) | FieldCheck::DigitsOnly => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRule {
    pub field: String,
    pub check: FieldCheck,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportSchema {
    expected_headers: Vec<String>,
    required_fields: Vec<String>,
    rules: Vec<FieldRule>,
}

impl ImportSchema {
    pub fn new<I, S>(expected_headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expected_headers: expected_headers.into_iter().map(Into::into).collect(),
            required_fields: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Marks `field` as one that may not be empty or whitespace-only.
    pub fn require(mut self, field: impl Into<String>) -> Self {
        self.required_fields.push(field.into());
        self
    }

    /// Adds a value check for `field`. Checks run in the order they are added.
    pub fn rule(mut self, field: impl Into<String>, check: FieldCheck) -> Self {
        self.rules.push(FieldRule {
            field: field.into(),
            check,
        });
        self
    }

    pub fn expected_headers(&self) -> &[String] {
        &self.expected_headers
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }
}
