//! GSTIN validation.

use super::state;
use crate::error::FiscalError;
use once_cell::sync::Lazy;
use regex::Regex;

const CHARSET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

// state code, PAN, entity number, literal Z, check character
static GSTIN_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").expect("valid GSTIN regex")
});

/// Validate a GSTIN and return its canonical uppercase form.
pub fn validate(raw: &str) -> Result<String, FiscalError> {
    let gstin = raw.trim().to_ascii_uppercase();
    let invalid = |reason: &str| FiscalError::InvalidGstin {
        gstin: raw.to_string(),
        reason: reason.to_string(),
    };

    if gstin.len() != 15 {
        return Err(invalid("must be 15 characters"));
    }
    if !GSTIN_SHAPE.is_match(&gstin) {
        return Err(invalid("does not match the GSTIN layout"));
    }
    if state::by_code(&gstin[..2]).is_none() {
        return Err(invalid("unknown state code"));
    }

    let expected = check_char(&gstin[..14]).ok_or_else(|| invalid("invalid characters"))?;
    if gstin.as_bytes()[14] != expected {
        return Err(invalid("checksum mismatch"));
    }

    Ok(gstin)
}

/// State code of an already validated GSTIN.
pub fn state_code(gstin: &str) -> Option<&'static str> {
    gstin.get(..2).and_then(state::by_code).map(|s| s.code)
}

fn check_char(body: &str) -> Option<u8> {
    let mut sum: u32 = 0;
    for (i, b) in body.bytes().enumerate() {
        let value = CHARSET.iter().position(|&c| c == b)? as u32;
        let product = value * if i % 2 == 0 { 1 } else { 2 };
        sum += product / 36 + product % 36;
    }
    let check = (36 - sum % 36) % 36;
    Some(CHARSET[check as usize])
}
