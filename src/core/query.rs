use crate::core::filter::SearchFilter;
use crate::domain::model::{Listing, SchoolType};

/// 可以被篩選的欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Title,
    Catchphrase,
    Description,
    Prefecture,
    City,
    SchoolType,
    IsActive,
}

impl Column {
    pub fn name(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Title => "title",
            Column::Catchphrase => "catchphrase",
            Column::Description => "description",
            Column::Prefecture => "prefecture",
            Column::City => "city",
            Column::SchoolType => "school_type",
            Column::IsActive => "is_active",
        }
    }

    fn value_of(&self, listing: &Listing) -> Option<String> {
        match self {
            Column::Id => Some(listing.id.clone()),
            Column::Title => Some(listing.title.clone()),
            Column::Catchphrase => listing.catchphrase.clone(),
            Column::Description => listing.description.clone(),
            Column::Prefecture => listing.prefecture.clone(),
            Column::City => listing.city.clone(),
            Column::SchoolType => listing.school_type.map(|t| t.as_str().to_string()),
            Column::IsActive => listing.is_active.map(|active| active.to_string()),
        }
    }
}

/// 關鍵字比對的欄位
pub const KEYWORD_COLUMNS: [Column; 3] = [Column::Title, Column::Catchphrase, Column::Description];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Eq { column: Column, value: String },
    /// 不分大小寫的子字串比對
    ILike { column: Column, needle: String },
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(column: Column, value: impl Into<String>) -> Self {
        Predicate::Eq {
            column,
            value: value.into(),
        }
    }

    pub fn ilike(column: Column, needle: impl Into<String>) -> Self {
        Predicate::ILike {
            column,
            needle: needle.into(),
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Predicate::Eq { column, value } => {
                column.value_of(listing).as_deref() == Some(value.as_str())
            }
            Predicate::ILike { column, needle } => column
                .value_of(listing)
                .map(|text| text.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            Predicate::Or(options) => options.iter().any(|option| option.matches(listing)),
        }
    }

    /// `or=(...)` 內部使用的 `column.op.value` 形式
    fn to_postgrest_term(&self) -> String {
        match self {
            Predicate::Eq { column, value } => {
                format!("{}.eq.{}", column.name(), quote_reserved(value))
            }
            Predicate::ILike { column, needle } => {
                format!("{}.ilike.{}", column.name(), quote_reserved(&like_pattern(needle)))
            }
            Predicate::Or(options) => format!("or({})", join_terms(options)),
        }
    }

    fn to_postgrest_param(&self) -> (String, String) {
        match self {
            Predicate::Eq { column, value } => (column.name().to_string(), format!("eq.{}", value)),
            Predicate::ILike { column, needle } => (
                column.name().to_string(),
                format!("ilike.{}", like_pattern(needle)),
            ),
            Predicate::Or(options) => ("or".to_string(), format!("({})", join_terms(options))),
        }
    }
}

/// 一次對 `schools` 的查詢：select * 加上以 AND 串接的條件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    predicates: Vec<Predicate>,
}

impl ListingQuery {
    pub fn select_all() -> Self {
        Self::default()
    }

    /// 搜尋頁與其他搜尋入口共用的查詢建構
    pub fn from_filter(filter: &SearchFilter) -> Self {
        let mut query = Self::select_all();

        if let Some(keyword) = filter.keyword() {
            query = query.and(Predicate::Or(
                KEYWORD_COLUMNS
                    .iter()
                    .map(|column| Predicate::ilike(*column, keyword))
                    .collect(),
            ));
        }

        if let Some(region) = filter.region() {
            query = query.and(Predicate::eq(Column::Prefecture, region));
        }

        if let Some(subregion) = filter.subregion() {
            query = query.and(Predicate::eq(Column::City, subregion));
        }

        if let Some(category) = filter.category() {
            query = query.and(category_predicate(category));
        }

        if filter.is_active_only() {
            query = query.and(Predicate::eq(Column::IsActive, "true"));
        }

        query
    }

    pub fn by_id(id: &str) -> Self {
        Self::select_all().and(Predicate::eq(Column::Id, id))
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_unfiltered(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        self.predicates.iter().all(|predicate| predicate.matches(listing))
    }

    /// 轉成 PostgREST 的 query 參數；同名的 `or` 參數會被後端以 AND 合併
    pub fn to_postgrest_params(&self) -> Vec<(String, String)> {
        std::iter::once(("select".to_string(), "*".to_string()))
            .chain(self.predicates.iter().map(Predicate::to_postgrest_param))
            .collect()
    }
}

/// 指定類型時，「兩者皆有」的教室也要列出
fn category_predicate(category: SchoolType) -> Predicate {
    match category {
        SchoolType::Both => Predicate::eq(Column::SchoolType, SchoolType::Both.as_str()),
        specific => Predicate::Or(vec![
            Predicate::eq(Column::SchoolType, specific.as_str()),
            Predicate::eq(Column::SchoolType, SchoolType::Both.as_str()),
        ]),
    }
}

fn join_terms(options: &[Predicate]) -> String {
    options
        .iter()
        .map(Predicate::to_postgrest_term)
        .collect::<Vec<_>>()
        .join(",")
}

/// `*` 是 PostgREST 的萬用字元；LIKE 的 `%`、`_` 需要跳脫
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('*');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('*');
    escaped
}

/// 值包含保留字元時以雙引號包起來
fn quote_reserved(value: &str) -> String {
    let needs_quotes = value
        .chars()
        .any(|ch| matches!(ch, ',' | '.' | ':' | '(' | ')' | '"' | '\\') || ch.is_whitespace());

    if !needs_quotes {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if matches!(ch, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}
