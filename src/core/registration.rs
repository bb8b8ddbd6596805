use crate::domain::model::{Listing, NewListing, SchoolType};
use crate::domain::ports::ListingStore;
use crate::utils::error::{DirectoryError, Result};
use std::collections::HashMap;

pub const NAME_FIELD: &str = "schoolName";
pub const DESCRIPTION_FIELD: &str = "description";
pub const ADDRESS_FIELD: &str = "address";
pub const CATEGORY_FIELD: &str = "category";
pub const FEATURES_FIELD: &str = "features";

/// 登錄表單送來的原始欄位
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    fields: HashMap<String, String>,
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn set(mut self, field: &str, value: impl Into<String>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// 空字串視為未填
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// 驗證表單並轉成新增資料；新登錄的教室一律先不公開
    pub fn to_new_listing(&self, owner_id: Option<&str>) -> Result<NewListing> {
        let owner_id = owner_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DirectoryError::validation("user_id", "Sign in is required to register a school."))?;

        let title = self
            .get(NAME_FIELD)
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .ok_or_else(|| DirectoryError::validation(NAME_FIELD, "School name is required."))?;

        let school_type = self
            .get(CATEGORY_FIELD)
            .map(|value| {
                value.parse::<SchoolType>().map_err(|_| {
                    DirectoryError::validation(
                        CATEGORY_FIELD,
                        format!(
                            "Invalid category '{}' (expected piano, rhythmic or both).",
                            value
                        ),
                    )
                })
            })
            .transpose()?;

        Ok(NewListing {
            title: title.to_string(),
            description: self.get(DESCRIPTION_FIELD).map(str::to_string),
            address: self.get(ADDRESS_FIELD).map(str::to_string),
            school_type,
            keywords: split_features(self.get(FEATURES_FIELD).unwrap_or("")),
            user_id: owner_id.to_string(),
            is_active: false,
        })
    }
}

/// 以逗號分隔的特色，去掉空白與空項目
pub fn split_features(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|feature| !feature.is_empty())
        .map(str::to_string)
        .collect()
}

/// 驗證通過後才會送出新增請求
pub async fn register<S: ListingStore + ?Sized>(
    store: &S,
    form: &RegistrationForm,
    owner_id: Option<&str>,
) -> Result<Listing> {
    let new_listing = form.to_new_listing(owner_id)?;

    match store.insert(&new_listing).await {
        Ok(created) => {
            tracing::info!("Registered listing {} ({})", created.id, created.title);
            Ok(created)
        }
        Err(e) => {
            tracing::error!("Error inserting listing '{}': {}", new_listing.title, e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryDirectory;

    fn valid_form() -> RegistrationForm {
        RegistrationForm::new()
            .set(NAME_FIELD, " 仙台ピアノ＆リトミック ")
            .set(CATEGORY_FIELD, "both")
            .set(FEATURES_FIELD, "ピアノ, リトミック,, 子供 ,")
            .set(DESCRIPTION_FIELD, "選べるレッスン")
    }

    #[test]
    fn test_valid_form_builds_inactive_listing() {
        let listing = valid_form().to_new_listing(Some("user-1")).unwrap();
        assert_eq!(listing.title, "仙台ピアノ＆リトミック");
        assert_eq!(listing.school_type, Some(SchoolType::Both));
        assert_eq!(listing.keywords, vec!["ピアノ", "リトミック", "子供"]);
        assert_eq!(listing.description.as_deref(), Some("選べるレッスン"));
        assert_eq!(listing.address, None);
        assert!(!listing.is_active);
    }

    #[test]
    fn test_owner_is_required() {
        let err = valid_form().to_new_listing(None).unwrap_err();
        assert!(matches!(err, DirectoryError::ValidationError { ref field, .. } if field == "user_id"));
    }

    #[test]
    fn test_title_is_required() {
        let form = valid_form().set(NAME_FIELD, "   ");
        let err = form.to_new_listing(Some("user-1")).unwrap_err();
        assert!(matches!(err, DirectoryError::ValidationError { ref field, .. } if field == NAME_FIELD));
    }

    #[test]
    fn test_category_must_be_known() {
        let form = valid_form().set(CATEGORY_FIELD, "violin");
        assert!(form.to_new_listing(Some("user-1")).is_err());

        let form = valid_form().set(CATEGORY_FIELD, "");
        assert_eq!(form.to_new_listing(Some("user-1")).unwrap().school_type, None);
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_store() {
        let store = InMemoryDirectory::default();
        let form = RegistrationForm::from_pairs([(CATEGORY_FIELD, "piano")]);

        assert!(register(&store, &form, Some("user-1")).await.is_err());
        assert!(store.listings().is_empty());
    }

    #[tokio::test]
    async fn test_register_inserts_listing() {
        let store = InMemoryDirectory::default();
        let created = register(&store, &valid_form(), Some("user-1")).await.unwrap();

        assert_eq!(created.title, "仙台ピアノ＆リトミック");
        assert_eq!(created.is_active, Some(false));
        assert_eq!(created.user_id.as_deref(), Some("user-1"));
        assert_eq!(store.listings().len(), 1);
    }
}
