use crate::domain::model::SchoolType;
use url::form_urlencoded;

/// 下拉選單「全部」的值；不對該欄位做任何限制
pub const ALL_SENTINEL: &str = "すべて";

pub const KEYWORD_PARAM: &str = "q";
pub const REGION_PARAM: &str = "pref";
pub const SUBREGION_PARAM: &str = "city";
pub const CATEGORY_PARAM: &str = "type";

pub fn is_all_sentinel(value: &str) -> bool {
    let value = value.trim();
    value == ALL_SENTINEL || value.eq_ignore_ascii_case("all")
}

/// 搜尋條件；建構時就已正規化，缺少的條件一律為 None
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    keyword: Option<String>,
    region: Option<String>,
    subregion: Option<String>,
    category: Option<SchoolType>,
    active_only: bool,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keyword(mut self, keyword: &str) -> Self {
        let trimmed = keyword.trim();
        self.keyword = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.region = normalize_choice(region);
        self
    }

    pub fn with_subregion(mut self, subregion: &str) -> Self {
        self.subregion = normalize_choice(subregion);
        self
    }

    /// 無法辨識的類型視為未指定
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = normalize_choice(category).and_then(|value| {
            value
                .parse::<SchoolType>()
                .map_err(|e| tracing::debug!("Ignoring category filter: {}", e))
                .ok()
        });
        self
    }

    pub fn active_only(mut self, active_only: bool) -> Self {
        self.active_only = active_only;
        self
    }

    /// 從頁面的 query string 讀取條件 (例如 `q=ピアノ&pref=東京都&type=piano`)
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(form_urlencoded::parse(query.as_bytes()))
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |filter, (key, value)| match key.as_ref() {
                KEYWORD_PARAM => filter.with_keyword(value.as_ref()),
                REGION_PARAM => filter.with_region(value.as_ref()),
                SUBREGION_PARAM => filter.with_subregion(value.as_ref()),
                CATEGORY_PARAM => filter.with_category(value.as_ref()),
                _ => filter,
            })
    }

    /// 送出表單時產生的 query string；`q` 一定存在，其他條件為「全部」時省略
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair(KEYWORD_PARAM, self.keyword.as_deref().unwrap_or(""));
        if let Some(region) = &self.region {
            serializer.append_pair(REGION_PARAM, region);
        }
        if let Some(subregion) = &self.subregion {
            serializer.append_pair(SUBREGION_PARAM, subregion);
        }
        if let Some(category) = self.category {
            serializer.append_pair(CATEGORY_PARAM, category.as_str());
        }
        serializer.finish()
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn subregion(&self) -> Option<&str> {
        self.subregion.as_deref()
    }

    pub fn category(&self) -> Option<SchoolType> {
        self.category
    }

    pub fn is_active_only(&self) -> bool {
        self.active_only
    }

    pub fn is_empty(&self) -> bool {
        self.keyword.is_none()
            && self.region.is_none()
            && self.subregion.is_none()
            && self.category.is_none()
            && !self.active_only
    }
}

fn normalize_choice(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || is_all_sentinel(trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sentinels_mean_no_filter() {
        let filter = SearchFilter::from_query_string("q=&pref=すべて&type=all");
        assert!(filter.is_empty());
    }

    #[test]
    fn test_reads_encoded_query_string() {
        let filter = SearchFilter::from_query_string(
            "?q=%20Tokyo%20&pref=%E6%9D%B1%E4%BA%AC%E9%83%BD&type=piano",
        );
        assert_eq!(filter.keyword(), Some("Tokyo"));
        assert_eq!(filter.region(), Some("東京都"));
        assert_eq!(filter.category(), Some(SchoolType::Piano));
    }

    #[test]
    fn test_whitespace_keyword_is_absent() {
        let filter = SearchFilter::new().with_keyword("   \t ");
        assert_eq!(filter.keyword(), None);
    }

    #[test]
    fn test_unknown_category_is_ignored() {
        let filter = SearchFilter::from_query_string("type=violin");
        assert_eq!(filter.category(), None);
    }

    #[test]
    fn test_unknown_params_are_ignored() {
        let filter = SearchFilter::from_query_string("page=2&utm_source=mail");
        assert!(filter.is_empty());
    }

    #[test]
    fn test_query_string_omits_all_choices() {
        let filter = SearchFilter::new()
            .with_keyword("ピアノ")
            .with_region("すべて")
            .with_category("rhythmic");
        let query = filter.to_query_string();
        assert!(query.starts_with("q="));
        assert!(!query.contains("pref="));
        assert!(query.ends_with("type=rhythmic"));
        assert_eq!(SearchFilter::from_query_string(&query), filter);
    }

    #[test]
    fn test_empty_keyword_still_written() {
        assert_eq!(SearchFilter::new().to_query_string(), "q=");
    }
}
