use uuid::Uuid;

use crate::error::AppError;

/// Length of the canonical hyphenated identifier form.
const ID_LEN: usize = 36;

/// Parse a record identifier supplied by a client.
///
/// Only the canonical hyphenated form is accepted, so `{...}`, `urn:uuid:`
/// and bare 32-digit forms are rejected along with anything malformed.
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    if raw.len() != ID_LEN {
        return Err(invalid(what));
    }
    Uuid::try_parse(raw).map_err(|_| invalid(what))
}

/// Like [`parse_id`] for optional inputs; blank values count as absent.
pub fn parse_optional_id(raw: Option<&str>, what: &str) -> Result<Option<Uuid>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_id(raw, what).map(Some),
        None => Ok(None),
    }
}

fn invalid(what: &str) -> AppError {
    AppError::Validation(format!("Invalid {what} ID"))
}
