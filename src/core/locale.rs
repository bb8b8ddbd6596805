use crate::domain::model::{SchoolType, SubscriptionStatus};
use std::str::FromStr;

/// 畫面文字的語系；預設日文
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Ja,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ja" | "ja-jp" => Ok(Locale::Ja),
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            other => Err(format!("unsupported locale '{}' (expected ja or en)", other)),
        }
    }
}

impl Locale {
    pub fn searching(&self) -> &'static str {
        match self {
            Locale::Ja => "検索中...",
            Locale::En => "Searching...",
        }
    }

    pub fn fetch_failed(&self) -> &'static str {
        match self {
            Locale::Ja => "データの取得に失敗しました。",
            Locale::En => "Failed to load data.",
        }
    }

    pub fn no_results(&self) -> &'static str {
        match self {
            Locale::Ja => "該当する教室は見つかりませんでした。",
            Locale::En => "No matching schools were found.",
        }
    }

    pub fn tagline_label(&self) -> &'static str {
        match self {
            Locale::Ja => "キャッチコピー",
            Locale::En => "Tagline",
        }
    }

    pub fn region_label(&self) -> &'static str {
        match self {
            Locale::Ja => "地域",
            Locale::En => "Region",
        }
    }

    pub fn type_label(&self) -> &'static str {
        match self {
            Locale::Ja => "タイプ",
            Locale::En => "Type",
        }
    }

    pub fn monthly_fee_label(&self) -> &'static str {
        match self {
            Locale::Ja => "月額",
            Locale::En => "Monthly fee",
        }
    }

    pub fn more_tags(&self) -> &'static str {
        match self {
            Locale::Ja => "...他",
            Locale::En => "...more",
        }
    }

    pub fn details_label(&self) -> &'static str {
        match self {
            Locale::Ja => "詳細",
            Locale::En => "Details",
        }
    }

    pub fn no_description(&self) -> &'static str {
        match self {
            Locale::Ja => "詳細な説明はありません。",
            Locale::En => "No description available.",
        }
    }

    pub fn not_available(&self) -> &'static str {
        match self {
            Locale::Ja => "情報なし",
            Locale::En => "Not available",
        }
    }

    pub fn gallery_label(&self) -> &'static str {
        match self {
            Locale::Ja => "フォトギャラリー",
            Locale::En => "Photo gallery",
        }
    }

    pub fn keywords_label(&self) -> &'static str {
        match self {
            Locale::Ja => "特徴・キーワード",
            Locale::En => "Features & keywords",
        }
    }

    pub fn email_label(&self) -> &'static str {
        match self {
            Locale::Ja => "メールアドレス",
            Locale::En => "Email",
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self {
            Locale::Ja => "現在のステータス",
            Locale::En => "Current status",
        }
    }

    pub fn trial_ends_label(&self) -> &'static str {
        match self {
            Locale::Ja => "お試し期間終了日",
            Locale::En => "Trial ends",
        }
    }

    pub fn profile_not_found(&self) -> &'static str {
        match self {
            Locale::Ja => "プロファイルが見つかりません。",
            Locale::En => "Profile not found.",
        }
    }

    pub fn school_type(&self, school_type: SchoolType) -> &'static str {
        match (self, school_type) {
            (Locale::Ja, SchoolType::Piano) => "ピアノ教室",
            (Locale::Ja, SchoolType::Rhythmic) => "リトミック教室",
            (Locale::Ja, SchoolType::Both) => "ピアノ＆リトミック教室",
            (Locale::En, SchoolType::Piano) => "Piano school",
            (Locale::En, SchoolType::Rhythmic) => "Rhythmic school",
            (Locale::En, SchoolType::Both) => "Piano & rhythmic school",
        }
    }

    pub fn subscription_status(&self, status: &SubscriptionStatus) -> String {
        let label = match (self, status) {
            (_, SubscriptionStatus::Other(raw)) => return raw.clone(),
            (Locale::Ja, SubscriptionStatus::Trialing) => "お試し期間中",
            (Locale::Ja, SubscriptionStatus::Active) => "有効",
            (Locale::Ja, SubscriptionStatus::Inactive) => "無効",
            (Locale::Ja, SubscriptionStatus::Canceled) => "キャンセル済み",
            (Locale::En, SubscriptionStatus::Trialing) => "Trial",
            (Locale::En, SubscriptionStatus::Active) => "Active",
            (Locale::En, SubscriptionStatus::Inactive) => "Inactive",
            (Locale::En, SubscriptionStatus::Canceled) => "Canceled",
        };
        label.to_string()
    }

    /// 金額加上千分位與貨幣單位
    pub fn yen(&self, amount: f64) -> String {
        match self {
            Locale::Ja => format!("{}円", format_thousands(amount)),
            Locale::En => format!("¥{}", format_thousands(amount)),
        }
    }
}

/// 千分位格式；小數最多保留三位並去掉尾端的 0
pub fn format_thousands(amount: f64) -> String {
    let fixed = format!("{:.3}", amount.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 + fraction.len() + 1);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if !fraction.is_empty() {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    if amount < 0.0 && grouped != "0" {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
