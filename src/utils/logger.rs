use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` 未設定時使用的過濾規則；`--verbose` 會蓋過設定檔的等級
fn default_directive(verbose: bool, level: &str) -> String {
    if verbose {
        "servicehub=debug,info".to_string()
    } else {
        format!("servicehub={}", level)
    }
}

pub fn init_cli_logger(verbose: bool, level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// 結構化輸出，方便收集到集中式日誌
pub fn init_json_logger(verbose: bool, level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .json(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_is_used() {
        assert_eq!(default_directive(false, "debug"), "servicehub=debug");
        assert_eq!(default_directive(false, "warn"), "servicehub=warn");
    }

    #[test]
    fn test_verbose_overrides_level() {
        assert_eq!(default_directive(true, "error"), "servicehub=debug,info");
    }
}
