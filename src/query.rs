//! Classification of free-form search input.

use crate::error::ReportError;
use crate::prefix::Prefix;

/// What a search string refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchKey {
    Prefix(Prefix),
    AsNumber(u32),
    AsMacro(String),
}

impl SearchKey {
    /// Decide whether `input` is an AS number, an AS-SET or a prefix.
    ///
    /// `64500` and `AS64500` are AS numbers. `AS-FOO` and hierarchical
    /// names such as `AS64500:AS-CUSTOMERS` are macros.
    pub fn classify(input: &str) -> Result<Self, ReportError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ReportError::InvalidArgument("empty search string".to_string()));
        }

        let upper = trimmed.to_ascii_uppercase();
        if upper.starts_with("AS-") || upper.contains(":AS-") {
            return Ok(SearchKey::AsMacro(upper));
        }

        let digits = upper.strip_prefix("AS").unwrap_or(&upper);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return parse_as_number(digits).map(SearchKey::AsNumber);
        }

        match Prefix::parse(trimmed) {
            Ok(prefix) => Ok(SearchKey::Prefix(prefix)),
            Err(_) => Err(ReportError::InvalidArgument(format!(
                "{} is not a prefix, AS number or AS-SET",
                trimmed
            ))),
        }
    }
}

/// Parse a plain AS number.
pub fn parse_as_number(input: &str) -> Result<u32, ReportError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ReportError::InvalidArgument(format!(
            "Invalid argument provided for as number: {}",
            input
        )));
    }
    trimmed.parse::<u32>().map_err(|_| {
        ReportError::InvalidArgument(format!("AS number out of range: {}", input))
    })
}
