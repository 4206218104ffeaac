use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Separator between the encoded IV and ciphertext. Not part of the
/// standard base64 alphabet, so it can never appear inside either half.
const SEPARATOR: char = ':';

/// Errors produced when parsing a stored record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The record does not contain exactly one separator.
    #[error("record must contain exactly one ':' separator")]
    Shape,
    /// One of the halves is not valid base64.
    #[error("invalid base64 in record: {0}")]
    Encoding(String),
}

/// Encode an `(iv, ciphertext)` pair as a single `iv:ciphertext` text record.
pub fn encode_record(iv: &[u8], ciphertext: &[u8]) -> String {
    format!(
        "{}{SEPARATOR}{}",
        STANDARD.encode(iv),
        STANDARD.encode(ciphertext)
    )
}

/// Decode a stored text record back into its `(iv, ciphertext)` halves.
pub fn decode_record(record: &str) -> Result<(Vec<u8>, Vec<u8>), FormatError> {
    let mut parts = record.split(SEPARATOR);
    let (Some(iv), Some(ciphertext), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FormatError::Shape);
    };

    let iv = STANDARD
        .decode(iv)
        .map_err(|e| FormatError::Encoding(e.to_string()))?;
    let ciphertext = STANDARD
        .decode(ciphertext)
        .map_err(|e| FormatError::Encoding(e.to_string()))?;
    Ok((iv, ciphertext))
}
