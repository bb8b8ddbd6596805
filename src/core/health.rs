use chrono::Utc;

pub const PONG: &str = "pong";
pub const ENV_OK: &str = "env ok";
pub const ENV_MISS: &str = "env miss";

pub fn ping() -> &'static str {
    tracing::info!("PING request at {}", Utc::now().to_rfc3339());
    PONG
}

/// 只回報郵件 API 金鑰是否已設定，不洩漏內容
pub fn env_check(mail_api_key: Option<&str>) -> &'static str {
    tracing::info!("ENV-CHECK request at {}", Utc::now().to_rfc3339());

    match mail_api_key {
        Some(key) if !key.trim().is_empty() => ENV_OK,
        _ => ENV_MISS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn test_env_check() {
        assert_eq!(env_check(Some("re_123")), "env ok");
        assert_eq!(env_check(Some("  ")), "env miss");
        assert_eq!(env_check(None), "env miss");
    }
}
