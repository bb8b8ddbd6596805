use clap::Parser;
use piaryth_directory::config::toml_config::DEFAULT_TIMEOUT_SECONDS;
use piaryth_directory::core::{account, contact, detail, health, registration};
use piaryth_directory::domain::ports::{ListingStore, ProfileStore};
use piaryth_directory::utils::{logger, validation::Validate};
use piaryth_directory::{
    CardRenderer, CliConfig, Command, DirectoryConfig, InMemoryDirectory, PostgrestClient,
    ResendMailer, Result, SearchSession,
};
use std::sync::Arc;

struct Stores {
    listings: Arc<dyn ListingStore>,
    profiles: Arc<dyn ProfileStore>,
}

fn open_stores(cli: &CliConfig, config: Option<&DirectoryConfig>) -> Result<Stores> {
    if let Some(path) = &cli.fixture {
        tracing::info!("📁 Using fixture data from {}", path);
        let directory = Arc::new(InMemoryDirectory::from_fixture_file(path)?);
        return Ok(Stores {
            listings: directory.clone(),
            profiles: directory,
        });
    }

    let config = config.ok_or_else(|| piaryth_directory::DirectoryError::MissingConfigError {
        field: "remote".to_string(),
    })?;
    let client = Arc::new(PostgrestClient::new(&config.remote)?);
    Ok(Stores {
        listings: client.clone(),
        profiles: client,
    })
}

// 健康檢查不需要遠端設定
fn run_health(cli: &CliConfig) -> Result<String> {
    if let Command::EnvCheck = cli.command {
        let key = match &cli.config {
            Some(path) => DirectoryConfig::from_file(path)?.mail.api_key,
            None => std::env::var("RESEND_API_KEY").ok(),
        };
        return Ok(health::env_check(key.as_deref()).to_string());
    }
    Ok(health::ping().to_string())
}

async fn run(cli: &CliConfig) -> Result<String> {
    if matches!(cli.command, Command::Ping | Command::EnvCheck) {
        return run_health(cli);
    }

    let config = cli.load_directory_config()?;
    let config = config.as_ref();
    let locale = cli.locale(config)?;
    let stores = open_stores(cli, config)?;

    let mut renderer = CardRenderer::new(locale);
    if let Some(config) = config {
        renderer = renderer
            .with_tag_limit(config.search.tag_limit())
            .with_base_url(config.site.base_url());
    }

    match &cli.command {
        Command::Search { .. } => {
            let filter = cli.command.search_filter().unwrap_or_default();
            let active_only = config.map(|c| c.search.active_only()).unwrap_or(false);

            tracing::info!("🔍 Searching with query string: {}", filter.to_query_string());
            let mut session = SearchSession::new(stores.listings).with_active_only(active_only);
            let view = session.submit(&filter).await;
            // 讀取失敗要走錯誤路徑，不能當成成功輸出
            if let Some(err) = view.error() {
                return Err(err);
            }
            renderer.render(view, cli.output_format()?)
        }
        Command::Show { id } => {
            let listing = detail::load_listing(stores.listings.as_ref(), id).await?;
            Ok(renderer.render_detail(&listing))
        }
        Command::Register { user_id, .. } => {
            let form = cli.command.registration_form().unwrap_or_default();
            let created =
                registration::register(stores.listings.as_ref(), &form, user_id.as_deref()).await?;
            Ok(format!("✅ Registered '{}' ({})", created.title, created.id))
        }
        Command::Account { user_id, email } => {
            let summary =
                account::load_account(stores.profiles.as_ref(), user_id.as_deref(), email.as_deref())
                    .await?;
            Ok(account::render_account(&summary, locale))
        }
        Command::Contact { .. } => {
            let request = cli
                .command
                .contact_request()
                .ok_or_else(|| piaryth_directory::DirectoryError::validation("contact", "missing request"))?;
            let mail_config = config.map(|c| c.mail.clone()).unwrap_or_default();
            let timeout = config
                .map(|c| c.remote.timeout_seconds())
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS);
            let mailer = ResendMailer::new(&mail_config, timeout)?;

            let mut notifier = contact::ContactNotifier::new(
                stores.listings.as_ref(),
                stores.profiles.as_ref(),
                &mailer,
            );
            if let Some(from) = &mail_config.from {
                notifier = notifier.with_sender(from.clone());
            }

            let receipt = notifier.notify(&request).await?;
            Ok(format!(
                "✅ Email sent successfully ({} / {})",
                receipt.inquirer_message_id, receipt.owner_message_id
            ))
        }
        Command::Ping | Command::EnvCheck => run_health(cli),
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting piaryth CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(&cli).await {
        Ok(output) => {
            println!("{}", output.trim_end());
        }
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}
