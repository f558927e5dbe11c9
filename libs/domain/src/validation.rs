//! Input validation utilities

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

/// Validate a checklist or document title
pub fn validate_title(title: &str) -> Result<(), String> {
    let title = title.trim();

    if title.is_empty() {
        return Err("Title is required".to_string());
    }

    if title.len() > 120 {
        return Err("Title must be at most 120 characters long".to_string());
    }

    Ok(())
}

/// Validate a document number (passport number, SEVIS ID, etc.)
pub fn validate_document_number(number: &str) -> Result<(), String> {
    if number.is_empty() {
        return Err("Document number is required".to_string());
    }

    if number.len() > 32 {
        return Err("Document number must be at most 32 characters long".to_string());
    }

    static DOCUMENT_NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = DOCUMENT_NUMBER_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]*$")
            .expect("Failed to compile document number regex")
    });

    if !regex.is_match(number) {
        return Err(
            "Document number can only contain letters, numbers, spaces, and dashes".to_string(),
        );
    }

    Ok(())
}

/// Validate that a document's issue date is not after its expiry date
pub fn validate_date_order(
    issue_date: Option<NaiveDate>,
    expiry_date: Option<NaiveDate>,
) -> Result<(), String> {
    if let (Some(issued), Some(expires)) = (issue_date, expiry_date) {
        if issued > expires {
            return Err("Issue date must not be after expiry date".to_string());
        }
    }

    Ok(())
}
