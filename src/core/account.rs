use crate::core::locale::Locale;
use crate::domain::model::{Profile, SubscriptionStatus};
use crate::domain::ports::ProfileStore;
use crate::utils::error::{DirectoryError, Result};
use chrono::{DateTime, FixedOffset, Utc};

/// 日本時間 (UTC+9)
const JST_OFFSET_SECONDS: i32 = 9 * 3600;

#[derive(Debug, Clone, PartialEq)]
pub struct AccountSummary {
    pub email: Option<String>,
    pub profile: Profile,
}

pub async fn load_account<S: ProfileStore + ?Sized>(
    store: &S,
    user_id: Option<&str>,
    email: Option<&str>,
) -> Result<AccountSummary> {
    let user_id = user_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| DirectoryError::validation("user_id", "Sign in is required."))?;

    let profile = match store.profile(user_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => return Err(DirectoryError::not_found("profile", user_id)),
        Err(e) => {
            tracing::error!("Error fetching profile {}: {}", user_id, e);
            return Err(e);
        }
    };

    Ok(AccountSummary {
        email: email.map(str::to_string),
        profile,
    })
}

pub fn format_trial_date(date: &DateTime<Utc>, locale: Locale) -> String {
    let local = match FixedOffset::east_opt(JST_OFFSET_SECONDS) {
        Some(offset) => date.with_timezone(&offset),
        None => date.fixed_offset(),
    };

    match locale {
        Locale::Ja => local.format("%Y年%-m月%-d日").to_string(),
        Locale::En => local.format("%B %-d, %Y").to_string(),
    }
}

pub fn render_account(summary: &AccountSummary, locale: Locale) -> String {
    let mut lines = vec![format!(
        "{}: {}",
        locale.email_label(),
        summary.email.as_deref().unwrap_or("-")
    )];

    let status = summary.profile.status();
    if let Some(status) = &status {
        lines.push(format!(
            "{}: {}",
            locale.status_label(),
            locale.subscription_status(status)
        ));
    }

    // 試用期間中才顯示結束日
    if let (Some(SubscriptionStatus::Trialing), Some(ends_at)) =
        (&status, &summary.profile.trial_ends_at)
    {
        lines.push(format!(
            "{}: {}",
            locale.trial_ends_label(),
            format_trial_date(ends_at, locale)
        ));
    }

    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryDirectory;
    use chrono::TimeZone;

    fn trialing_profile() -> Profile {
        Profile {
            id: "user-1".to_string(),
            full_name: Some("山田花子".to_string()),
            avatar_url: None,
            subscription_status: Some("trialing".to_string()),
            trial_starts_at: None,
            trial_ends_at: Some(Utc.with_ymd_and_hms(2026, 3, 31, 20, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_trial_date_uses_japan_time() {
        let date = Utc.with_ymd_and_hms(2026, 3, 31, 20, 0, 0).unwrap();
        assert_eq!(format_trial_date(&date, Locale::Ja), "2026年4月1日");
        assert_eq!(format_trial_date(&date, Locale::En), "April 1, 2026");
    }

    #[test]
    fn test_render_trialing_account() {
        let summary = AccountSummary {
            email: Some("hanako@example.jp".to_string()),
            profile: trialing_profile(),
        };
        let output = render_account(&summary, Locale::Ja);

        assert!(output.contains("メールアドレス: hanako@example.jp"));
        assert!(output.contains("現在のステータス: お試し期間中"));
        assert!(output.contains("お試し期間終了日: 2026年4月1日"));
    }

    #[test]
    fn test_trial_end_hidden_when_active() {
        let mut profile = trialing_profile();
        profile.subscription_status = Some("active".to_string());
        let output = render_account(
            &AccountSummary {
                email: None,
                profile,
            },
            Locale::En,
        );

        assert!(output.contains("Current status: Active"));
        assert!(!output.contains("Trial ends"));
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let store = InMemoryDirectory::default();
        let err = load_account(&store, Some("nobody"), None).await.unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_sign_in_required() {
        let store = InMemoryDirectory::default();
        let err = load_account(&store, None, None).await.unwrap_err();
        assert!(matches!(err, DirectoryError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_loads_profile() {
        let store = InMemoryDirectory::default().with_profile(trialing_profile());
        let summary = load_account(&store, Some("user-1"), Some("hanako@example.jp"))
            .await
            .unwrap();
        assert_eq!(summary.profile.full_name.as_deref(), Some("山田花子"));
    }
}
