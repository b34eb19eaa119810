//! Path-safety checks for module names and report ids
//!
//! Both end up as file names under the storage root (`reports/<id>.json`) or in
//! export paths, so they are limited to `[A-Za-z0-9_-]`.

/// Longest accepted module name or report id
pub const MAX_ID_LENGTH: usize = 128;

/// Device names some filesystems refuse, compared case-insensitively
const RESERVED_NAMES: &[&str] = &[
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
    "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("Identifier is empty")]
    Empty,

    #[error("Identifier is {len} characters long (max {MAX_ID_LENGTH})")]
    TooLong { len: usize },

    #[error("Identifier '{id}' contains '{ch}'; only letters, digits, '-' and '_' are allowed")]
    InvalidChar { id: String, ch: char },

    #[error("Identifier '{id}' is a reserved device name")]
    Reserved { id: String },
}

/// Accept `id` only if it can be used verbatim as a file stem.
///
/// ```
/// use verity::validation::validate_id;
///
/// assert!(validate_id("database").is_ok());
/// assert!(validate_id("report-2024-01-01T00-00-00-000Z-a1b2c3").is_ok());
/// assert!(validate_id("").is_err());
/// assert!(validate_id("../index").is_err());
/// ```
pub fn validate_id(id: &str) -> Result<(), IdError> {
    if id.is_empty() {
        return Err(IdError::Empty);
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(IdError::TooLong { len: id.len() });
    }
    if let Some(ch) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(IdError::InvalidChar {
            id: id.to_string(),
            ch,
        });
    }
    if RESERVED_NAMES.contains(&id.to_ascii_lowercase().as_str()) {
        return Err(IdError::Reserved { id: id.to_string() });
    }
    Ok(())
}

/// `value_parser` for module and report id arguments
pub fn clap_id_validator(s: &str) -> Result<String, String> {
    validate_id(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}
