use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "piaryth_directory=debug,piaryth=debug,info"
    } else {
        "piaryth_directory=info,piaryth=info"
    }
}

pub fn init_cli_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// 結構化輸出，給部署在託管函式環境時收集日誌用
pub fn init_json_logger() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(false)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_default_filter_shows_info_lines() {
        let filter = EnvFilter::new(default_directives(false));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));

        let verbose = EnvFilter::new(default_directives(true));
        assert_eq!(verbose.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
