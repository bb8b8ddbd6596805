use crate::core::query::ListingQuery;
use crate::domain::model::{Listing, NewListing, OutgoingEmail, Profile};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 教室資料的存取介面；篩選與排序全部交給後端
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn search(&self, query: &ListingQuery) -> Result<Vec<Listing>>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>>;
    async fn insert(&self, listing: &NewListing) -> Result<Listing>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn profile(&self, user_id: &str) -> Result<Option<Profile>>;
    async fn user_email(&self, user_id: &str) -> Result<Option<String>>;
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// 成功時回傳郵件服務給的訊息 id
    async fn send(&self, email: &OutgoingEmail) -> Result<String>;
}

#[async_trait]
impl<T: ListingStore + ?Sized> ListingStore for std::sync::Arc<T> {
    async fn search(&self, query: &ListingQuery) -> Result<Vec<Listing>> {
        (**self).search(query).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>> {
        (**self).find_by_id(id).await
    }

    async fn insert(&self, listing: &NewListing) -> Result<Listing> {
        (**self).insert(listing).await
    }
}

#[async_trait]
impl<T: ProfileStore + ?Sized> ProfileStore for std::sync::Arc<T> {
    async fn profile(&self, user_id: &str) -> Result<Option<Profile>> {
        (**self).profile(user_id).await
    }

    async fn user_email(&self, user_id: &str) -> Result<Option<String>> {
        (**self).user_email(user_id).await
    }
}
