use crate::core::query::ListingQuery;
use crate::domain::model::{Listing, NewListing, Profile};
use crate::domain::ports::{ListingStore, ProfileStore};
use crate::utils::error::{DirectoryError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

#[derive(Debug, Deserialize)]
struct UserRow {
    id: String,
    email: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Fixture {
    Full {
        #[serde(default)]
        listings: Vec<Listing>,
        #[serde(default)]
        profiles: Vec<Profile>,
        #[serde(default)]
        users: Vec<UserRow>,
    },
    ListingsOnly(Vec<Listing>),
}

/// 離線用的目錄：資料放在記憶體，查詢條件在本地評估
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    listings: RwLock<Vec<Listing>>,
    profiles: RwLock<HashMap<String, Profile>>,
    user_emails: RwLock<HashMap<String, String>>,
    next_id: AtomicU64,
}

impl InMemoryDirectory {
    pub fn with_listings(listings: Vec<Listing>) -> Self {
        Self {
            listings: RwLock::new(listings),
            ..Default::default()
        }
    }

    pub fn with_profile(self, profile: Profile) -> Self {
        write_lock(&self.profiles).insert(profile.id.clone(), profile);
        self
    }

    pub fn with_user_email(self, user_id: &str, email: &str) -> Self {
        write_lock(&self.user_emails).insert(user_id.to_string(), email.to_string());
        self
    }

    /// 讀取 JSON 資料檔：可以是教室陣列，或含 listings/profiles/users 的物件
    pub fn from_fixture_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_fixture_str(&content)
    }

    pub fn from_fixture_str(content: &str) -> Result<Self> {
        let fixture: Fixture = serde_json::from_str(content)?;

        let directory = match fixture {
            Fixture::ListingsOnly(listings) => Self::with_listings(listings),
            Fixture::Full {
                listings,
                profiles,
                users,
            } => {
                let directory = Self::with_listings(listings);
                for profile in profiles {
                    write_lock(&directory.profiles).insert(profile.id.clone(), profile);
                }
                for user in users {
                    write_lock(&directory.user_emails).insert(user.id, user.email);
                }
                directory
            }
        };

        tracing::debug!("Loaded {} listing(s) from fixture", directory.listings().len());
        Ok(directory)
    }

    pub fn listings(&self) -> Vec<Listing> {
        read_lock(&self.listings).clone()
    }
}

#[async_trait]
impl ListingStore for InMemoryDirectory {
    async fn search(&self, query: &ListingQuery) -> Result<Vec<Listing>> {
        Ok(read_lock(&self.listings)
            .iter()
            .filter(|listing| query.matches(listing))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>> {
        Ok(read_lock(&self.listings)
            .iter()
            .find(|listing| listing.id == id)
            .cloned())
    }

    async fn insert(&self, listing: &NewListing) -> Result<Listing> {
        if listing.title.trim().is_empty() {
            return Err(DirectoryError::RemoteError {
                status: 400,
                message: "null value in column \"title\" violates not-null constraint".to_string(),
            });
        }

        let id = format!("local-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let created = Listing {
            id,
            title: listing.title.clone(),
            school_type: listing.school_type,
            prefecture: None,
            city: None,
            address: listing.address.clone(),
            catchphrase: None,
            description: listing.description.clone(),
            fee_structure: None,
            keywords: Some(listing.keywords.clone()),
            images: None,
            is_active: Some(listing.is_active),
            user_id: Some(listing.user_id.clone()),
        };

        write_lock(&self.listings).push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl ProfileStore for InMemoryDirectory {
    async fn profile(&self, user_id: &str) -> Result<Option<Profile>> {
        Ok(read_lock(&self.profiles).get(user_id).cloned())
    }

    async fn user_email(&self, user_id: &str) -> Result<Option<String>> {
        Ok(read_lock(&self.user_emails).get(user_id).cloned())
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
