use crate::domain::model::Listing;
use crate::domain::ports::ListingStore;
use crate::utils::error::{DirectoryError, Result};

/// 依 id 讀取單一教室；空白 id 不會送出請求
pub async fn load_listing<S: ListingStore + ?Sized>(store: &S, id: &str) -> Result<Listing> {
    let id = id.trim();
    if id.is_empty() {
        tracing::warn!("Invalid id provided for listing detail");
        return Err(DirectoryError::not_found("listing", id));
    }

    match store.find_by_id(id).await {
        Ok(Some(listing)) => Ok(listing),
        Ok(None) => Err(DirectoryError::not_found("listing", id)),
        Err(e) => {
            tracing::error!("Error fetching listing details for id {}: {}", id, e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryDirectory;
    use serde_json::json;

    #[test]
    fn test_blank_id_is_not_found() {
        let store = InMemoryDirectory::default();
        let err = tokio_test::block_on(load_listing(&store, "  ")).unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_loads_existing_listing() {
        let listing: Listing =
            serde_json::from_value(json!({"id": "kyoto", "title": "京都音楽スクール"})).unwrap();
        let store = InMemoryDirectory::with_listings(vec![listing.clone()]);

        assert_eq!(load_listing(&store, " kyoto ").await.unwrap(), listing);
        assert!(matches!(
            load_listing(&store, "osaka").await,
            Err(DirectoryError::NotFound { .. })
        ));
    }
}
