use crate::core::locale::Locale;
use crate::domain::model::Listing;
use crate::utils::error::{DirectoryError, Result};
use serde::Serialize;
use std::str::FromStr;

pub const DEFAULT_TAG_LIMIT: usize = 3;

/// 搜尋結果畫面的三種互斥狀態
#[derive(Debug, Clone, PartialEq)]
pub enum SearchView {
    Loading,
    /// 取得資料失敗；內容只寫進日誌，畫面顯示固定訊息
    Failed(String),
    Results(Vec<Listing>),
}

impl SearchView {
    pub fn is_loading(&self) -> bool {
        matches!(self, SearchView::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SearchView::Failed(_))
    }

    /// 失敗狀態轉成錯誤，讓呼叫端可以跟「零筆結果」分開處理
    pub fn error(&self) -> Option<DirectoryError> {
        match self {
            SearchView::Failed(message) => Some(DirectoryError::SearchFailed {
                message: message.clone(),
            }),
            _ => None,
        }
    }

    pub fn listings(&self) -> &[Listing] {
        match self {
            SearchView::Results(listings) => listings,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unsupported format '{}' (text, json, csv)", other)),
        }
    }
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    title: &'a str,
    catchphrase: &'a str,
    prefecture: &'a str,
    city: &'a str,
    school_type: &'a str,
    monthly_fee: Option<f64>,
    keywords: String,
}

#[derive(Debug, Clone)]
pub struct CardRenderer {
    locale: Locale,
    tag_limit: usize,
    base_url: Option<String>,
}

impl Default for CardRenderer {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

impl CardRenderer {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            tag_limit: DEFAULT_TAG_LIMIT,
            base_url: None,
        }
    }

    pub fn with_tag_limit(mut self, tag_limit: usize) -> Self {
        self.tag_limit = tag_limit;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn listing_url(&self, id: &str) -> String {
        format!("{}/schools/{}", self.base_url.as_deref().unwrap_or(""), id)
    }

    /// JSON / CSV 只輸出資料本身；失敗狀態回傳錯誤而不是文字訊息
    pub fn render(&self, view: &SearchView, format: OutputFormat) -> Result<String> {
        if format == OutputFormat::Text {
            return Ok(self.render_text(view));
        }
        if let Some(err) = view.error() {
            return Err(err);
        }

        match format {
            OutputFormat::Csv => self.render_csv(view.listings()),
            _ => self.render_json(view.listings()),
        }
    }

    pub fn render_text(&self, view: &SearchView) -> String {
        match view {
            SearchView::Loading => self.locale.searching().to_string(),
            SearchView::Failed(_) => self.locale.fetch_failed().to_string(),
            SearchView::Results(listings) if listings.is_empty() => {
                self.locale.no_results().to_string()
            }
            SearchView::Results(listings) => listings
                .iter()
                .map(|listing| self.render_card(listing))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    pub fn render_card(&self, listing: &Listing) -> String {
        let locale = self.locale;
        let mut lines = vec![format!("■ {}", listing.title)];

        if let Some(catchphrase) = non_empty(&listing.catchphrase) {
            lines.push(format!("  {}: {}", locale.tagline_label(), catchphrase));
        }
        if let Some(region) = listing.region_label() {
            lines.push(format!("  {}: {}", locale.region_label(), region));
        }
        if let Some(school_type) = listing.school_type {
            lines.push(format!(
                "  {}: {}",
                locale.type_label(),
                locale.school_type(school_type)
            ));
        }
        if let Some(fee) = listing.monthly_fee() {
            lines.push(format!("  {}: {}", locale.monthly_fee_label(), locale.yen(fee)));
        }
        if let Some(tags) = self.render_tags(listing.keywords()) {
            lines.push(format!("  {}", tags));
        }
        lines.push(format!("  {}: {}", locale.details_label(), self.listing_url(&listing.id)));

        lines.join("\n") + "\n"
    }

    /// 最多顯示 `tag_limit` 個標籤，超過時加上省略記號
    pub fn render_tags(&self, keywords: &[String]) -> Option<String> {
        if keywords.is_empty() || self.tag_limit == 0 {
            return None;
        }

        let mut tags: Vec<String> = keywords
            .iter()
            .take(self.tag_limit)
            .map(|keyword| format!("#{}", keyword))
            .collect();
        if keywords.len() > self.tag_limit {
            tags.push(self.locale.more_tags().to_string());
        }
        Some(tags.join(" "))
    }

    pub fn render_detail(&self, listing: &Listing) -> String {
        let locale = self.locale;
        let mut lines = vec![listing.title.clone()];

        if let Some(catchphrase) = non_empty(&listing.catchphrase) {
            lines.push(format!("「{}」", catchphrase));
        }
        lines.push(String::new());
        lines.push(
            non_empty(&listing.description)
                .unwrap_or(locale.no_description())
                .to_string(),
        );
        lines.push(String::new());

        let type_label = listing
            .school_type
            .map(|t| locale.school_type(t))
            .unwrap_or(locale.not_available());
        lines.push(format!("{}: {}", locale.type_label(), type_label));

        let mut location = format!(
            "{}{}",
            listing.prefecture.as_deref().unwrap_or(""),
            listing.city.as_deref().unwrap_or("")
        );
        if let Some(address) = non_empty(&listing.address) {
            location.push_str(", ");
            location.push_str(address);
        }
        lines.push(format!("{}: {}", locale.region_label(), location));

        if let Some(fee) = listing.monthly_fee() {
            lines.push(format!("{}: {}", locale.monthly_fee_label(), locale.yen(fee)));
        }

        if !listing.images().is_empty() {
            lines.push(String::new());
            lines.push(format!("{}:", locale.gallery_label()));
            lines.extend(listing.images().iter().map(|url| format!("  {}", url)));
        }

        if !listing.keywords().is_empty() {
            lines.push(String::new());
            lines.push(format!("{}:", locale.keywords_label()));
            let tags: Vec<String> = listing
                .keywords()
                .iter()
                .map(|keyword| format!("#{}", keyword))
                .collect();
            lines.push(format!("  {}", tags.join(" ")));
        }

        lines.join("\n") + "\n"
    }

    pub fn render_json(&self, listings: &[Listing]) -> Result<String> {
        Ok(serde_json::to_string_pretty(listings)?)
    }

    pub fn render_csv(&self, listings: &[Listing]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        for listing in listings {
            writer.serialize(CsvRow {
                id: &listing.id,
                title: &listing.title,
                catchphrase: listing.catchphrase.as_deref().unwrap_or(""),
                prefecture: listing.prefecture.as_deref().unwrap_or(""),
                city: listing.city.as_deref().unwrap_or(""),
                school_type: listing.school_type.map(|t| t.as_str()).unwrap_or(""),
                monthly_fee: listing.monthly_fee(),
                keywords: listing.keywords().join(";"),
            })?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| DirectoryError::IoError(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| DirectoryError::ValidationError {
            field: "csv".to_string(),
            message: e.to_string(),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.trim().is_empty())
}
