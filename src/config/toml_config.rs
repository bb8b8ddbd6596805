use crate::core::locale::Locale;
use crate::core::render::DEFAULT_TAG_LIMIT;
use crate::utils::error::{DirectoryError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_MAIL_ENDPOINT: &str = "https://api.resend.com";
pub const DEFAULT_SITE_URL: &str = "https://piaryth.org";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub remote: RemoteConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub url: String,
    pub anon_key: String,
    pub access_token: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub listings_table: Option<String>,
    pub profiles_table: Option<String>,
    pub users_table: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailConfig {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub from: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    pub tag_limit: Option<usize>,
    pub active_only: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    pub base_url: Option<String>,
    pub locale: Option<String>,
}

impl RemoteConfig {
    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn listings_table(&self) -> &str {
        self.listings_table.as_deref().unwrap_or("schools")
    }

    pub fn profiles_table(&self) -> &str {
        self.profiles_table.as_deref().unwrap_or("profiles")
    }

    pub fn users_table(&self) -> &str {
        self.users_table.as_deref().unwrap_or("users")
    }
}

impl MailConfig {
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_MAIL_ENDPOINT)
    }
}

impl SearchConfig {
    pub fn tag_limit(&self) -> usize {
        self.tag_limit.unwrap_or(DEFAULT_TAG_LIMIT)
    }

    pub fn active_only(&self) -> bool {
        self.active_only.unwrap_or(false)
    }
}

impl SiteConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_SITE_URL)
    }

    pub fn locale(&self) -> Result<Locale> {
        match self.locale.as_deref() {
            None => Ok(Locale::default()),
            Some(raw) => raw
                .parse()
                .map_err(|reason| DirectoryError::InvalidConfigValueError {
                    field: "site.locale".to_string(),
                    value: raw.to_string(),
                    reason,
                }),
        }
    }
}

impl DirectoryConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DirectoryError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DirectoryError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 沒有設定檔時，從 SUPABASE_* / RESEND_* 環境變數組出配置
    pub fn from_env() -> Result<Self> {
        let required = |name: &str| {
            std::env::var(name).map_err(|_| DirectoryError::MissingConfigError {
                field: name.to_string(),
            })
        };
        let optional = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        Ok(Self {
            remote: RemoteConfig {
                url: required("SUPABASE_URL")?,
                anon_key: required("SUPABASE_ANON_KEY")?,
                access_token: optional("SUPABASE_ACCESS_TOKEN"),
                timeout_seconds: None,
                listings_table: None,
                profiles_table: None,
                users_table: None,
            },
            mail: MailConfig {
                api_key: optional("RESEND_API_KEY"),
                endpoint: None,
                from: optional("MAIL_FROM"),
            },
            search: SearchConfig::default(),
            site: SiteConfig {
                base_url: optional("SITE_URL"),
                locale: None,
            },
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_ANON_KEY})；找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DirectoryError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("remote.url", &self.remote.url)?;
        validation::validate_non_empty_string("remote.anon_key", &self.remote.anon_key)?;
        reject_unresolved("remote.anon_key", &self.remote.anon_key)?;
        if let Some(token) = &self.remote.access_token {
            reject_unresolved("remote.access_token", token)?;
        }

        if let Some(timeout) = self.remote.timeout_seconds {
            validation::validate_range("remote.timeout_seconds", timeout, 1, 300)?;
        }

        if let Some(endpoint) = &self.mail.endpoint {
            validation::validate_url("mail.endpoint", endpoint)?;
        }

        if let Some(tag_limit) = self.search.tag_limit {
            validation::validate_positive_number("search.tag_limit", tag_limit, 1)?;
        }

        if let Some(base_url) = &self.site.base_url {
            validation::validate_url("site.base_url", base_url)?;
        }
        self.site.locale()?;

        Ok(())
    }
}

impl Validate for DirectoryConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

fn reject_unresolved(field: &str, value: &str) -> Result<()> {
    if value.contains("${") {
        return Err(DirectoryError::ConfigValidationError {
            field: field.to_string(),
            message: format!("unresolved environment variable in '{}'", value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[remote]
url = "https://abc.supabase.co"
anon_key = "anon"

[search]
tag_limit = 5
active_only = true

[site]
locale = "en"
"#;

        let config = DirectoryConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.remote.url, "https://abc.supabase.co");
        assert_eq!(config.remote.listings_table(), "schools");
        assert_eq!(config.remote.timeout_seconds(), 30);
        assert_eq!(config.search.tag_limit(), 5);
        assert!(config.search.active_only());
        assert_eq!(config.site.locale().unwrap(), Locale::En);
        assert_eq!(config.mail.endpoint(), "https://api.resend.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PIARYTH_TEST_ANON_KEY", "secret-anon");

        let toml_content = r#"
[remote]
url = "https://abc.supabase.co"
anon_key = "${PIARYTH_TEST_ANON_KEY}"
"#;

        let config = DirectoryConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.remote.anon_key, "secret-anon");

        std::env::remove_var("PIARYTH_TEST_ANON_KEY");
    }

    #[test]
    fn test_unresolved_variable_fails_validation() {
        let toml_content = r#"
[remote]
url = "https://abc.supabase.co"
anon_key = "${PIARYTH_TEST_UNSET_VARIABLE}"
"#;

        let config = DirectoryConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(DirectoryError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[remote]
url = "invalid-url"
anon_key = "anon"
"#;

        let config = DirectoryConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[remote]
url = "https://abc.supabase.co"
anon_key = "anon"

[site]
locale = "fr"
"#;
        let config = DirectoryConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[remote]
url = "http://localhost:54321"
anon_key = "anon"
timeout_seconds = 10

[mail]
api_key = "re_123"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = DirectoryConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.remote.timeout_seconds(), 10);
        assert_eq!(config.mail.api_key.as_deref(), Some("re_123"));
    }

    #[test]
    fn test_missing_remote_section_fails() {
        assert!(DirectoryConfig::from_toml_str("[site]\nlocale = \"ja\"\n").is_err());
    }
}
