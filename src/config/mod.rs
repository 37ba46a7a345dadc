pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::{ComicError, Result};
use crate::utils::validation::{
    validate_date_format, validate_element_id, validate_path, validate_positive_number,
    validate_url,
};

#[cfg(feature = "cli")]
use crate::core::loader::DEFAULT_CONTAINER_ID;
#[cfg(feature = "cli")]
use crate::core::render::DEFAULT_DATE_FORMAT;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_SELECTION_ENDPOINT: &str = "https://fwd.innopolis.university/api/hw2";
pub const DEFAULT_LOOKUP_ENDPOINT: &str = "https://fwd.innopolis.university/api/comic";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "comic-loader")]
#[command(about = "Fetch today's comic and render it into an HTML page")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_SELECTION_ENDPOINT)]
    pub selection_endpoint: String,

    #[arg(long, default_value = DEFAULT_LOOKUP_ENDPOINT)]
    pub lookup_endpoint: String,

    #[arg(
        long,
        required_unless_present = "config",
        help = "Identity sent to the selection endpoint"
    )]
    pub email: Option<String>,

    #[arg(long, default_value = DEFAULT_CONTAINER_ID)]
    pub container_id: String,

    #[arg(long, help = "HTML page to render into (a built-in page is used otherwise)")]
    pub template: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = toml_config::DEFAULT_OUTPUT_FILE)]
    pub output_file: String,

    #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
    pub date_format: String,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Read settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log elapsed time and memory usage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn selection_endpoint(&self) -> &str {
        &self.selection_endpoint
    }

    fn lookup_endpoint(&self) -> &str {
        &self.lookup_endpoint
    }

    fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    fn container_id(&self) -> &str {
        &self.container_id
    }

    fn date_format(&self) -> &str {
        &self.date_format
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }

    fn template_path(&self) -> Option<&str> {
        self.template.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }
}

#[cfg(feature = "cli")]
impl crate::utils::validation::Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

/// Checks shared by every [`ConfigProvider`].
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_url("selection_endpoint", config.selection_endpoint())?;
    validate_url("lookup_endpoint", config.lookup_endpoint())?;
    if config.email().trim().is_empty() {
        return Err(ComicError::MissingConfig {
            field: "email".to_string(),
        });
    }
    validate_element_id("container_id", config.container_id())?;
    validate_date_format("date_format", config.date_format())?;
    if let Some(seconds) = config.timeout_seconds() {
        validate_positive_number("timeout_seconds", seconds, 1)?;
    }
    if let Some(template) = config.template_path() {
        validate_path("template", template)?;
    }
    validate_path("output_path", config.output_path())?;
    validate_path("output_file", config.output_file())?;
    Ok(())
}
