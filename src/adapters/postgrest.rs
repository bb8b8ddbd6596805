use crate::config::toml_config::RemoteConfig;
use crate::core::query::{Column, ListingQuery, Predicate};
use crate::domain::model::{Listing, NewListing, Profile};
use crate::domain::ports::{ListingStore, ProfileStore};
use crate::utils::error::{DirectoryError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct EmailRow {
    email: Option<String>,
}

/// PostgREST (Supabase REST) 的最小客戶端
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
    listings_table: String,
    profiles_table: String,
    users_table: String,
}

impl PostgrestClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: config.access_token.clone(),
            listings_table: config.listings_table().to_string(),
            profiles_table: config.profiles_table().to_string(),
            users_table: config.users_table().to_string(),
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, self.table_url(table))
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(bearer)
            .header("Accept", "application/json")
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, query: &ListingQuery) -> Result<Vec<T>> {
        let params = query.to_postgrest_params();
        tracing::debug!("GET {} with {:?}", self.table_url(table), params);

        let response = self
            .request(Method::GET, table)
            .query(&params)
            .send()
            .await?;
        let response = check_status(response).await?;

        Ok(response.json::<Vec<T>>().await?)
    }
}

/// 非 2xx 回應轉成 RemoteError，盡量取出 PostgREST 的 message 欄位
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    tracing::debug!("Remote response status: {}", status);

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body);

    Err(DirectoryError::RemoteError {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ListingStore for PostgrestClient {
    async fn search(&self, query: &ListingQuery) -> Result<Vec<Listing>> {
        self.select(&self.listings_table, query).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>> {
        let rows: Vec<Listing> = self
            .select(&self.listings_table, &ListingQuery::by_id(id))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, listing: &NewListing) -> Result<Listing> {
        tracing::debug!("POST {}", self.table_url(&self.listings_table));

        let response = self
            .request(Method::POST, &self.listings_table)
            .header("Prefer", "return=representation")
            .json(&[listing])
            .send()
            .await?;
        let response = check_status(response).await?;

        let rows: Vec<Listing> = response.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DirectoryError::RemoteError {
                status: 200,
                message: "insert returned no rows".to_string(),
            })
    }
}

#[async_trait]
impl ProfileStore for PostgrestClient {
    async fn profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let query = ListingQuery::select_all().and(Predicate::eq(Column::Id, user_id));
        let rows: Vec<Profile> = self.select(&self.profiles_table, &query).await?;
        Ok(rows.into_iter().next())
    }

    async fn user_email(&self, user_id: &str) -> Result<Option<String>> {
        let query = ListingQuery::select_all().and(Predicate::eq(Column::Id, user_id));
        let rows: Vec<EmailRow> = self.select(&self.users_table, &query).await?;
        Ok(rows.into_iter().next().and_then(|row| row.email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config(url: String) -> RemoteConfig {
        RemoteConfig {
            url,
            anon_key: "anon-key".to_string(),
            access_token: None,
            timeout_seconds: Some(5),
            listings_table: None,
            profiles_table: None,
            users_table: None,
        }
    }

    #[test]
    fn test_table_url_strips_trailing_slash() {
        let client = PostgrestClient::new(&config("https://abc.supabase.co/".to_string())).unwrap();
        assert_eq!(client.table_url("schools"), "https://abc.supabase.co/rest/v1/schools");
    }

    #[tokio::test]
    async fn test_sends_api_key_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/schools")
                .header("apikey", "anon-key")
                .header("authorization", "Bearer anon-key")
                .query_param("select", "*");
            then.status(200).json_body(json!([]));
        });

        let client = PostgrestClient::new(&config(server.base_url())).unwrap();
        let rows = client.search(&ListingQuery::select_all()).await.unwrap();

        mock.assert();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_remote_error_message_is_extracted() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rest/v1/profiles");
            then.status(401)
                .json_body(json!({"code": "PGRST301", "message": "JWT expired"}));
        });

        let client = PostgrestClient::new(&config(server.base_url())).unwrap();
        let err = client.profile("u1").await.unwrap_err();

        match err {
            DirectoryError::RemoteError { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "JWT expired");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_user_email_lookup() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/users")
                .query_param("id", "eq.owner-1");
            then.status(200).json_body(json!([{"email": "owner@example.jp"}]));
        });

        let client = PostgrestClient::new(&config(server.base_url())).unwrap();
        let email = client.user_email("owner-1").await.unwrap();

        mock.assert();
        assert_eq!(email.as_deref(), Some("owner@example.jp"));
    }
}
