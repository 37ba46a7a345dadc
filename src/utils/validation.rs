use crate::utils::error::{ComicError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use std::fmt::Write;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ComicError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ComicError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ComicError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ComicError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ComicError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(ComicError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ComicError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Element ids are matched literally inside `id="..."` attributes.
pub fn validate_element_id(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;
    if value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>'))
    {
        return Err(ComicError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Element id cannot contain whitespace, quotes or angle brackets".to_string(),
        });
    }
    Ok(())
}

/// The pattern must parse and must only use date fields, since it formats a
/// calendar date with no time or zone.
pub fn validate_date_format(field_name: &str, pattern: &str) -> Result<()> {
    validate_non_empty_string(field_name, pattern)?;
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(ComicError::InvalidConfigValue {
            field: field_name.to_string(),
            value: pattern.to_string(),
            reason: "Not a valid strftime pattern".to_string(),
        });
    }

    let mut trial = String::new();
    if write!(trial, "{}", NaiveDate::MIN.format(pattern)).is_err() {
        return Err(ComicError::InvalidConfigValue {
            field: field_name.to_string(),
            value: pattern.to_string(),
            reason: "Pattern uses fields a calendar date does not have".to_string(),
        });
    }
    Ok(())
}
