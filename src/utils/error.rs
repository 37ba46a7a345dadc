use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComicError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP request to {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid publish date: {year}-{month}-{day}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("Container element '{id}' not found")]
    MissingContainer { id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("A comic load is already in flight")]
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Decode,
    MissingContainer,
    Config,
    Io,
    Busy,
}

impl ComicError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ComicError::Http(_) | ComicError::HttpStatus { .. } => ErrorCategory::Network,
            ComicError::Decode { .. } | ComicError::InvalidDate { .. } => ErrorCategory::Decode,
            ComicError::MissingContainer { .. } => ErrorCategory::MissingContainer,
            ComicError::Config { .. }
            | ComicError::InvalidConfigValue { .. }
            | ComicError::MissingConfig { .. } => ErrorCategory::Config,
            ComicError::Io(_) => ErrorCategory::Io,
            ComicError::AlreadyRunning => ErrorCategory::Busy,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the comic API: {}", self),
            ErrorCategory::Decode => format!("The comic API sent unexpected data: {}", self),
            ErrorCategory::MissingContainer => format!("The page has no place for the comic: {}", self),
            ErrorCategory::Config => format!("Configuration problem: {}", self),
            ErrorCategory::Io => format!("File access failed: {}", self),
            ErrorCategory::Busy => "Another comic load is still running".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check connectivity and the selection/lookup endpoints",
            ErrorCategory::Decode => "Check that the endpoints return the expected JSON shape",
            ErrorCategory::MissingContainer => {
                "Add an element with the configured container id to the page template"
            }
            ErrorCategory::Config => "Fix the flag or TOML value named above",
            ErrorCategory::Io => "Check file paths and permissions",
            ErrorCategory::Busy => "Wait for the running load to finish",
        }
    }
}

pub type Result<T> = std::result::Result<T, ComicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let missing = ComicError::MissingContainer {
            id: "comic-page".to_string(),
        };
        assert_eq!(missing.category(), ErrorCategory::MissingContainer);
        assert_eq!(missing.to_string(), "Container element 'comic-page' not found");

        let status = ComicError::HttpStatus {
            url: "http://x/api".to_string(),
            status: 503,
        };
        assert_eq!(status.category(), ErrorCategory::Network);

        let date = ComicError::InvalidDate {
            year: 2024,
            month: 13,
            day: 1,
        };
        assert_eq!(date.category(), ErrorCategory::Decode);
        assert_eq!(ComicError::AlreadyRunning.category(), ErrorCategory::Busy);
    }
}
