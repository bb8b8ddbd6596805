use crate::config::toml_config::DirectoryConfig;
use crate::core::filter::SearchFilter;
use crate::core::locale::Locale;
use crate::core::registration::{
    RegistrationForm, ADDRESS_FIELD, CATEGORY_FIELD, DESCRIPTION_FIELD, FEATURES_FIELD, NAME_FIELD,
};
use crate::core::render::OutputFormat;
use crate::domain::model::ContactRequest;
use crate::utils::error::{DirectoryError, Result};
use crate::utils::validation::Validate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "piaryth")]
#[command(about = "Piano / rhythmic school directory client")]
pub struct CliConfig {
    /// Path to a TOML configuration file (defaults to SUPABASE_* environment variables)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Serve listings from a local JSON file instead of the remote service
    #[arg(long, global = true)]
    pub fixture: Option<String>,

    /// Display language (ja, en)
    #[arg(long, global = true)]
    pub lang: Option<String>,

    /// Output format for search results (text, json, csv)
    #[arg(long, global = true, default_value = "text")]
    pub format: String,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Search listings by keyword, prefecture and school type
    Search {
        /// Free-text keyword matched against title, catchphrase and description
        #[arg(long, default_value = "")]
        q: String,

        /// Prefecture ("すべて" or "all" for every prefecture)
        #[arg(long)]
        pref: Option<String>,

        #[arg(long)]
        city: Option<String>,

        /// piano, rhythmic or both
        #[arg(long = "type")]
        school_type: Option<String>,

        /// Raw page query string, e.g. "q=ピアノ&pref=東京都"; overrides the other flags
        #[arg(long)]
        query_string: Option<String>,

        /// Only return published listings
        #[arg(long)]
        active_only: bool,
    },

    /// Show one listing in detail
    Show { id: String },

    /// Register a new listing (created unpublished)
    Register {
        #[arg(long)]
        user_id: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        address: Option<String>,

        /// Comma-separated features, e.g. "ピアノ,初心者"
        #[arg(long)]
        features: Option<String>,
    },

    /// Show account and subscription status
    Account {
        #[arg(long)]
        user_id: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Send a contact-form inquiry to a listing owner
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        message: String,

        #[arg(long)]
        classroom_id: String,

        #[arg(long)]
        classroom_name: String,

        #[arg(long)]
        classroom_url: Option<String>,
    },

    /// Liveness probe
    Ping,

    /// Report whether the mail API key is configured
    EnvCheck,
}

impl CliConfig {
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.format
            .parse()
            .map_err(|reason| DirectoryError::InvalidConfigValueError {
                field: "format".to_string(),
                value: self.format.clone(),
                reason,
            })
    }

    /// `--lang` 優先，其次是設定檔的 site.locale
    pub fn locale(&self, config: Option<&DirectoryConfig>) -> Result<Locale> {
        match &self.lang {
            Some(lang) => lang
                .parse()
                .map_err(|reason| DirectoryError::InvalidConfigValueError {
                    field: "lang".to_string(),
                    value: lang.clone(),
                    reason,
                }),
            None => config
                .map(|c| c.site.locale())
                .unwrap_or(Ok(Locale::default())),
        }
    }

    /// 有 `--config` 時讀檔；否則讀環境變數。離線模式下遠端設定可以缺少
    pub fn load_directory_config(&self) -> Result<Option<DirectoryConfig>> {
        if let Some(path) = &self.config {
            tracing::debug!("Loading configuration from {}", path);
            let config = DirectoryConfig::from_file(path)?;
            config.validate()?;
            return Ok(Some(config));
        }

        match DirectoryConfig::from_env() {
            Ok(config) => {
                config.validate()?;
                Ok(Some(config))
            }
            Err(e) if self.fixture.is_some() => {
                tracing::debug!("No remote configuration in fixture mode: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl Command {
    pub fn search_filter(&self) -> Option<SearchFilter> {
        match self {
            Command::Search {
                q,
                pref,
                city,
                school_type,
                query_string,
                active_only,
            } => {
                let filter = match query_string {
                    Some(raw) => SearchFilter::from_query_string(raw),
                    None => {
                        let mut filter = SearchFilter::new().with_keyword(q);
                        if let Some(pref) = pref {
                            filter = filter.with_region(pref);
                        }
                        if let Some(city) = city {
                            filter = filter.with_subregion(city);
                        }
                        if let Some(school_type) = school_type {
                            filter = filter.with_category(school_type);
                        }
                        filter
                    }
                };
                Some(filter.active_only(*active_only))
            }
            _ => None,
        }
    }

    pub fn registration_form(&self) -> Option<RegistrationForm> {
        match self {
            Command::Register {
                name,
                category,
                description,
                address,
                features,
                ..
            } => {
                let form = [
                    (NAME_FIELD, name),
                    (CATEGORY_FIELD, category),
                    (DESCRIPTION_FIELD, description),
                    (ADDRESS_FIELD, address),
                    (FEATURES_FIELD, features),
                ]
                .into_iter()
                .filter_map(|(field, value)| value.as_ref().map(|v| (field, v.clone())))
                .fold(RegistrationForm::new(), |form, (field, value)| form.set(field, value));
                Some(form)
            }
            _ => None,
        }
    }

    pub fn contact_request(&self) -> Option<ContactRequest> {
        match self {
            Command::Contact {
                name,
                email,
                message,
                classroom_id,
                classroom_name,
                classroom_url,
            } => Some(ContactRequest {
                name: name.clone(),
                email: email.clone(),
                message: message.clone(),
                classroom_id: classroom_id.clone(),
                classroom_name: classroom_name.clone(),
                classroom_url: classroom_url.clone(),
            }),
            _ => None,
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        self.output_format()?;
        if let Some(lang) = &self.lang {
            lang.parse::<Locale>()
                .map_err(|reason| DirectoryError::InvalidConfigValueError {
                    field: "lang".to_string(),
                    value: lang.clone(),
                    reason,
                })?;
        }
        Ok(())
    }
}
