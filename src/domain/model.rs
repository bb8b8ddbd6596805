use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 教室類型，對應資料庫的 `school_type_enum`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchoolType {
    Piano,
    Rhythmic,
    Both,
}

impl SchoolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchoolType::Piano => "piano",
            SchoolType::Rhythmic => "rhythmic",
            SchoolType::Both => "both",
        }
    }
}

impl fmt::Display for SchoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchoolType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "piano" => Ok(SchoolType::Piano),
            // 舊版登錄表單送出的是 "rhythm"
            "rhythmic" | "rhythm" => Ok(SchoolType::Rhythmic),
            "both" => Ok(SchoolType::Both),
            other => Err(format!(
                "unknown school type '{}' (expected piano, rhythmic or both)",
                other
            )),
        }
    }
}

/// 一筆教室資料 (`schools` 資料表的一列)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub school_type: Option<SchoolType>,
    #[serde(default)]
    pub prefecture: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub catchphrase: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fee_structure: Option<serde_json::Value>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Listing {
    /// 月費；只有 `fee_structure.monthly` 是數字時才有值
    pub fn monthly_fee(&self) -> Option<f64> {
        self.fee_structure
            .as_ref()
            .and_then(|fees| fees.get("monthly"))
            .and_then(|monthly| monthly.as_f64())
    }

    pub fn keywords(&self) -> &[String] {
        self.keywords.as_deref().unwrap_or(&[])
    }

    pub fn images(&self) -> &[String] {
        self.images.as_deref().unwrap_or(&[])
    }

    /// 都道府県 + 市区町村，兩者皆無時為 None
    pub fn region_label(&self) -> Option<String> {
        let parts: Vec<&str> = [self.prefecture.as_deref(), self.city.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// 新增教室時送出的欄位
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewListing {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_type: Option<SchoolType>,
    pub keywords: Vec<String>,
    pub user_id: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    Inactive,
    Canceled,
    Other(String),
}

impl From<&str> for SubscriptionStatus {
    fn from(value: &str) -> Self {
        match value {
            "trialing" => SubscriptionStatus::Trialing,
            "active" => SubscriptionStatus::Active,
            "inactive" => SubscriptionStatus::Inactive,
            "canceled" => SubscriptionStatus::Canceled,
            other => SubscriptionStatus::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub subscription_status: Option<String>,
    #[serde(default)]
    pub trial_starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub trial_ends_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn status(&self) -> Option<SubscriptionStatus> {
        self.subscription_status
            .as_deref()
            .map(SubscriptionStatus::from)
    }
}

/// 聯絡表單送出的內容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    pub classroom_id: String,
    pub classroom_name: String,
    #[serde(default)]
    pub classroom_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_requires_title() {
        let row = json!({"id": "1", "catchphrase": "no title"});
        assert!(serde_json::from_value::<Listing>(row).is_err());
    }

    #[test]
    fn test_listing_optional_fields_default() {
        let row = json!({"id": "1", "title": "東京ピアノアカデミー"});
        let listing: Listing = serde_json::from_value(row).unwrap();
        assert!(listing.school_type.is_none());
        assert!(listing.keywords().is_empty());
        assert!(listing.monthly_fee().is_none());
        assert!(listing.region_label().is_none());
    }

    #[test]
    fn test_monthly_fee_only_reads_numbers() {
        let mut listing: Listing = serde_json::from_value(json!({
            "id": "1",
            "title": "t",
            "fee_structure": {"monthly": 8000}
        }))
        .unwrap();
        assert_eq!(listing.monthly_fee(), Some(8000.0));

        listing.fee_structure = Some(json!({"monthly": "8000"}));
        assert_eq!(listing.monthly_fee(), None);

        listing.fee_structure = Some(json!([8000]));
        assert_eq!(listing.monthly_fee(), None);
    }

    #[test]
    fn test_school_type_parsing() {
        assert_eq!("piano".parse::<SchoolType>().unwrap(), SchoolType::Piano);
        assert_eq!("rhythm".parse::<SchoolType>().unwrap(), SchoolType::Rhythmic);
        assert_eq!(" both ".parse::<SchoolType>().unwrap(), SchoolType::Both);
        assert!("violin".parse::<SchoolType>().is_err());
    }

    #[test]
    fn test_region_label_joins_parts() {
        let listing: Listing = serde_json::from_value(json!({
            "id": "1",
            "title": "t",
            "prefecture": "大阪府",
            "city": "大阪市"
        }))
        .unwrap();
        assert_eq!(listing.region_label().as_deref(), Some("大阪府 大阪市"));
    }
}
