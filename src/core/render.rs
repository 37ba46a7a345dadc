use crate::core::distance;
use crate::domain::model::{ComicMetadata, DisplayFragment};
use crate::utils::error::{ComicError, Result};
use crate::utils::validation::validate_date_format;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt::Write;

/// Short `en-US` style date, e.g. `1/10/2024`.
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Calendar date of publication. Out-of-range parts are rejected.
pub fn publish_date(metadata: &ComicMetadata) -> Result<NaiveDate> {
    // chrono months are 1-based, same as the wire value.
    NaiveDate::from_ymd_opt(metadata.year, metadata.month, metadata.day).ok_or(
        ComicError::InvalidDate {
            year: metadata.year,
            month: metadata.month,
            day: metadata.day,
        },
    )
}

#[derive(Debug, Clone)]
pub struct FragmentRenderer {
    date_format: String,
}

impl FragmentRenderer {
    pub fn new(date_format: impl Into<String>) -> Result<Self> {
        let date_format = date_format.into();
        validate_date_format("date_format", &date_format)?;
        Ok(Self { date_format })
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn render(
        &self,
        metadata: &ComicMetadata,
        published: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<DisplayFragment> {
        Ok(DisplayFragment {
            title: metadata.title.clone(),
            image_url: metadata.image_url.clone(),
            alt_text: metadata.alt_text.clone(),
            date: self.format_date(published)?,
            relative: distance::time_ago(published.and_time(NaiveTime::MIN), now),
        })
    }

    fn format_date(&self, date: NaiveDate) -> Result<String> {
        let mut formatted = String::new();
        write!(formatted, "{}", date.format(&self.date_format)).map_err(|_| {
            ComicError::InvalidConfigValue {
                field: "date_format".to_string(),
                value: self.date_format.clone(),
                reason: format!("cannot format {}", date),
            }
        })?;
        Ok(formatted)
    }
}

impl Default for FragmentRenderer {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}
