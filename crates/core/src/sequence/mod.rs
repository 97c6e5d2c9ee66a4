//! Document type validation and voucher number formatting.
//!
//! The counter itself lives in the database; this module only decides what a
//! valid document type is and how a counter value is rendered.

use crate::ledger::LedgerError;

/// Template applied to new sequences.
pub const DEFAULT_TEMPLATE: &str = "{prefix}-{counter}";

/// Longest accepted document type.
pub const MAX_DOCUMENT_TYPE_LEN: usize = 16;

/// Widest zero padding a template may ask for.
pub const MAX_COUNTER_WIDTH: usize = 32;

/// Validates a document type key.
///
/// Accepts 1-16 ASCII alphanumerics, `-`, or `_`.
///
/// # Errors
///
/// Returns `InvalidDocumentType` otherwise.
pub fn validate_document_type(document_type: &str) -> Result<(), LedgerError> {
    let valid = !document_type.is_empty()
        && document_type.len() <= MAX_DOCUMENT_TYPE_LEN
        && document_type
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(LedgerError::InvalidDocumentType(document_type.to_string()))
    }
}

/// Validates a document type and returns its canonical upper-case key.
///
/// `inv` and `INV` name the same sequence.
///
/// # Errors
///
/// Returns `InvalidDocumentType` if the key is not valid.
pub fn normalize_document_type(document_type: &str) -> Result<String, LedgerError> {
    validate_document_type(document_type)?;
    Ok(document_type.to_ascii_uppercase())
}

/// Prefix given to a sequence created on first use.
#[must_use]
pub fn default_prefix(document_type: &str) -> String {
    document_type.to_ascii_uppercase()
}

/// Zero-padding width of a counter placeholder, `0` for plain `{counter}`.
fn counter_width(placeholder: &str) -> Option<usize> {
    if placeholder == "counter" {
        return Some(0);
    }
    placeholder
        .strip_prefix("counter:0")
        .and_then(|width| width.parse::<usize>().ok())
}

/// Checks that a template renders a distinct number for every counter value.
///
/// At least one counter placeholder is required, and padding is capped at
/// [`MAX_COUNTER_WIDTH`].
///
/// # Errors
///
/// Returns `InvalidSequenceTemplate` otherwise.
pub fn validate_template(template: &str) -> Result<(), LedgerError> {
    let mut has_counter = false;
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open..];
        let Some(close) = after.find('}') else { break };
        match counter_width(&after[1..close]) {
            Some(width) if width > MAX_COUNTER_WIDTH => {
                return Err(LedgerError::InvalidSequenceTemplate(template.to_string()));
            }
            Some(_) => has_counter = true,
            None => {}
        }
        rest = &after[close + 1..];
    }

    if has_counter {
        Ok(())
    } else {
        Err(LedgerError::InvalidSequenceTemplate(template.to_string()))
    }
}

/// Renders a voucher number.
///
/// Placeholders: `{prefix}`, `{counter}`, and `{counter:0N}` for a counter
/// zero-padded to `N` digits (at most [`MAX_COUNTER_WIDTH`]). Anything else
/// is copied verbatim.
#[must_use]
pub fn format_voucher_number(template: &str, prefix: &str, counter: i64) -> String {
    let mut out = String::with_capacity(template.len() + 8);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open..];
        let Some(close) = after.find('}') else {
            out.push_str(after);
            return out;
        };

        let placeholder = &after[1..close];
        if placeholder == "prefix" {
            out.push_str(prefix);
        } else if let Some(width) = counter_width(placeholder) {
            let width = width.min(MAX_COUNTER_WIDTH);
            out.push_str(&format!("{counter:0width$}"));
        } else {
            out.push_str(&after[..=close]);
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}
