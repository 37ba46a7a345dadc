use crate::core::loader::DEFAULT_CONTAINER_ID;
use crate::core::render::DEFAULT_DATE_FORMAT;
use crate::core::ConfigProvider;
use crate::utils::error::{ComicError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_OUTPUT_FILE: &str = "comic.html";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub page: PageConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub selection_endpoint: String,
    pub lookup_endpoint: String,
    pub email: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageConfig {
    pub container_id: Option<String>,
    pub template: Option<String>,
    pub date_format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub file: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ComicError::InvalidConfigValue {
            field: "toml_parsing".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${COMIC_EMAIL})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ComicError::Config {
            message: format!("env pattern failed to compile: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn selection_endpoint(&self) -> &str {
        &self.api.selection_endpoint
    }

    fn lookup_endpoint(&self) -> &str {
        &self.api.lookup_endpoint
    }

    fn email(&self) -> &str {
        &self.api.email
    }

    fn container_id(&self) -> &str {
        self.page.container_id.as_deref().unwrap_or(DEFAULT_CONTAINER_ID)
    }

    fn date_format(&self) -> &str {
        self.page.date_format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT)
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.api.timeout_seconds
    }

    fn template_path(&self) -> Option<&str> {
        self.page.template.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_file(&self) -> &str {
        self.output.file.as_deref().unwrap_or(DEFAULT_OUTPUT_FILE)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        super::validate_provider(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let toml_content = r#"
[api]
selection_endpoint = "https://api.example.com/hw2"
lookup_endpoint = "https://api.example.com/comic"
email = "reader@example.com"

[output]
path = "./test-output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.selection_endpoint(), "https://api.example.com/hw2");
        assert_eq!(config.email(), "reader@example.com");
        assert_eq!(config.container_id(), "comic-page");
        assert_eq!(config.date_format(), "%-m/%-d/%Y");
        assert_eq!(config.output_file(), "comic.html");
        assert!(config.template_path().is_none());
        assert!(config.timeout_seconds().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[api]
selection_endpoint = "https://api.example.com/hw2"
lookup_endpoint = "https://api.example.com/comic"
email = "reader@example.com"
timeout_seconds = 10

[page]
container_id = "strip"
template = "page.html"
date_format = "%Y-%m-%d"

[output]
path = "./out"
file = "today.html"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.container_id(), "strip");
        assert_eq!(config.template_path(), Some("page.html"));
        assert_eq!(config.date_format(), "%Y-%m-%d");
        assert_eq!(config.timeout_seconds(), Some(10));
        assert_eq!(config.output_file(), "today.html");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("COMIC_LOADER_TEST_EMAIL", "env@example.com");

        let toml_content = r#"
[api]
selection_endpoint = "https://api.example.com/hw2"
lookup_endpoint = "https://api.example.com/comic"
email = "${COMIC_LOADER_TEST_EMAIL}"

[output]
path = "${COMIC_LOADER_UNSET_VARIABLE}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.email(), "env@example.com");
        assert_eq!(config.output_path(), "${COMIC_LOADER_UNSET_VARIABLE}");

        std::env::remove_var("COMIC_LOADER_TEST_EMAIL");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[api]
selection_endpoint = "invalid-url"
lookup_endpoint = "https://api.example.com/comic"
email = "reader@example.com"

[output]
path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_email_is_missing_config() {
        let toml_content = r#"
[api]
selection_endpoint = "https://api.example.com/hw2"
lookup_endpoint = "https://api.example.com/comic"
email = ""

[output]
path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ComicError::MissingConfig { ref field } if field == "email"));
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let toml_content = r#"
[output]
path = "./output"
"#;

        assert!(matches!(
            TomlConfig::from_toml_str(toml_content),
            Err(ComicError::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[api]
selection_endpoint = "https://api.example.com/hw2"
lookup_endpoint = "https://api.example.com/comic"
email = "file@example.com"

[output]
path = "./output"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.email(), "file@example.com");
    }
}
