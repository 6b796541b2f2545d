//! HTTPS JSON transport for the GoBus backend
//!
//! One configured `reqwest` client with the two cross-cutting concerns of
//! the original transport: the session token is attached as a `token`
//! header to every request when present, and error responses are
//! classified by status code (401 additionally triggers the forced-logout
//! hook) before propagating to the caller. Otherwise a transparent
//! pass-through: fixed base URL, fixed timeout, no retry, no queueing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{BusApi, TokenSource};
use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::types::{
    Bus, BusPatch, BusSchedule, NewSchedule, SearchSchedule, Stand, UserProfile, VerifiedUser,
};

pub struct HttpApi {
    client: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenSource>,
}

impl HttpApi {
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        // A trailing slash is what makes relative joins land under the
        // API prefix instead of replacing it.
        let normalized = if config.base_url.ends_with('/') {
            config.base_url.clone()
        } else {
            format!("{}/", config.base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| ApiError::Network(format!("invalid base URL: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Network(format!("invalid endpoint '{}': {}", path, e)).into())
    }

    fn builder(&self, method: Method, url: Url) -> RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(token) = self.tokens.token() {
            builder = builder.header("token", token);
        }
        builder
    }

    /// Send a request and classify any failure into the error taxonomy
    async fn execute(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await.map_err(classify_transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        debug!(status = status.as_u16(), "API request failed");

        let error = match status {
            StatusCode::UNAUTHORIZED => {
                self.tokens.handle_unauthorized().await;
                ApiError::Unauthorized
            }
            StatusCode::FORBIDDEN => ApiError::Forbidden,
            s if s.is_server_error() => ApiError::Server {
                status: s.as_u16(),
            },
            s => ApiError::Unexpected {
                status: s.as_u16(),
                message: response.text().await.unwrap_or_default(),
            },
        };

        Err(error.into())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        let response = self.execute(self.builder(Method::GET, url)).await?;
        decode(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        let response = self
            .execute(self.builder(method, url).json(body))
            .await?;
        decode(response).await
    }

    async fn send_empty(&self, method: Method, path: &str) -> Result<()> {
        let url = self.endpoint(path)?;
        self.execute(self.builder(method, url)).await?;
        Ok(())
    }
}

fn classify_transport(error: reqwest::Error) -> crate::error::GobusError {
    if error.is_timeout() {
        ApiError::Timeout.into()
    } else {
        ApiError::Network(error.to_string()).into()
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()).into())
}

// Response envelopes; the backend wraps collections in named fields.

#[derive(Deserialize)]
struct BusesEnvelope {
    #[serde(default)]
    buses: Vec<Bus>,
}

#[derive(Deserialize)]
struct StandsEnvelope {
    #[serde(default)]
    stands: Vec<Stand>,
}

#[derive(Deserialize)]
struct SchedulesEnvelope {
    #[serde(default)]
    schedules: Vec<SearchSchedule>,
}

#[derive(Deserialize)]
struct ScheduleEnvelope {
    schedule: Option<BusSchedule>,
}

#[derive(Deserialize)]
struct FavoritesEnvelope {
    #[serde(default)]
    favorites: Vec<Bus>,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: VerifiedUser,
}

#[async_trait]
impl BusApi for HttpApi {
    async fn send_otp(&self, email: &str) -> Result<()> {
        let url = self.endpoint("auth/get-email")?;
        self.execute(
            self.builder(Method::POST, url)
                .json(&serde_json::json!({ "email": email })),
        )
        .await?;
        Ok(())
    }

    async fn verify_otp(&self, otp: u32) -> Result<VerifiedUser> {
        let envelope: UserEnvelope = self
            .send_json(
                Method::POST,
                "auth/verify-otp",
                &serde_json::json!({ "otp": otp }),
            )
            .await?;
        Ok(envelope.user)
    }

    async fn register_user(&self, profile: &UserProfile) -> Result<VerifiedUser> {
        // The backend really does route this under a doubled /api segment.
        let envelope: UserEnvelope = self
            .send_json(Method::PATCH, "api/user/create-user", profile)
            .await?;
        Ok(envelope.user)
    }

    async fn my_buses(&self) -> Result<Vec<Bus>> {
        let envelope: BusesEnvelope = self.get_json("bus/my-buses").await?;
        Ok(envelope.buses)
    }

    async fn create_bus(&self, bus: &Bus) -> Result<()> {
        let url = self.endpoint("bus/create")?;
        self.execute(self.builder(Method::POST, url).json(bus))
            .await?;
        Ok(())
    }

    async fn update_bus(&self, id: &str, patch: &BusPatch) -> Result<()> {
        let path = format!("bus/update/{}", id);
        let url = self.endpoint(&path)?;
        self.execute(self.builder(Method::PUT, url).json(patch))
            .await?;
        Ok(())
    }

    async fn delete_bus(&self, id: &str) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("bus/delete/{}", id))
            .await
    }

    async fn stands(&self) -> Result<Vec<Stand>> {
        let envelope: StandsEnvelope = self.get_json("schedule/stands").await?;
        Ok(envelope.stands)
    }

    async fn search_schedules(
        &self,
        source_id: &str,
        destination_id: &str,
    ) -> Result<Vec<SearchSchedule>> {
        let mut url = self.endpoint("schedule/search")?;
        url.query_pairs_mut()
            .append_pair("source", source_id)
            .append_pair("destination", destination_id);
        let response = self.execute(self.builder(Method::GET, url)).await?;
        let envelope: SchedulesEnvelope = decode(response).await?;
        Ok(envelope.schedules)
    }

    async fn create_schedule(&self, schedule: &NewSchedule) -> Result<()> {
        let url = self.endpoint("schedule/create")?;
        self.execute(self.builder(Method::POST, url).json(schedule))
            .await?;
        Ok(())
    }

    async fn schedule_by_bus(&self, bus_id: &str) -> Result<Option<BusSchedule>> {
        let envelope: ScheduleEnvelope =
            self.get_json(&format!("schedule/bus/{}", bus_id)).await?;
        Ok(envelope.schedule)
    }

    async fn delete_schedule(&self, schedule_id: &str) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("schedule/{}", schedule_id))
            .await
    }

    async fn favorites(&self) -> Result<Vec<Bus>> {
        let envelope: FavoritesEnvelope = self.get_json("user/favorites").await?;
        Ok(envelope.favorites)
    }

    async fn add_favorite(&self, bus_id: &str) -> Result<()> {
        let url = self.endpoint("user/favorites/add")?;
        self.execute(
            self.builder(Method::POST, url)
                .json(&serde_json::json!({ "busId": bus_id })),
        )
        .await?;
        Ok(())
    }

    async fn remove_favorite(&self, bus_id: &str) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("user/favorites/{}", bus_id))
            .await
    }

    async fn send_feedback(&self, message: &str, admin_email: &str) -> Result<()> {
        let url = self.endpoint("feedback")?;
        self.execute(self.builder(Method::POST, url).json(&serde_json::json!({
            "message": message,
            "adminEmail": admin_email,
        })))
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::NoSession;

    fn test_api(base: &str) -> HttpApi {
        let config = ApiConfig {
            base_url: base.to_string(),
            timeout_secs: 25,
        };
        HttpApi::new(&config, Arc::new(NoSession)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_under_api_prefix() {
        let api = test_api("https://go-by-bus.vercel.app/api/");
        let url = api.endpoint("bus/my-buses").unwrap();
        assert_eq!(url.as_str(), "https://go-by-bus.vercel.app/api/bus/my-buses");
    }

    #[test]
    fn test_endpoint_base_without_trailing_slash() {
        let api = test_api("https://go-by-bus.vercel.app/api");
        let url = api.endpoint("schedule/stands").unwrap();
        assert_eq!(
            url.as_str(),
            "https://go-by-bus.vercel.app/api/schedule/stands"
        );
    }

    #[test]
    fn test_search_query_encoding() {
        let api = test_api("https://go-by-bus.vercel.app/api/");
        let mut url = api.endpoint("schedule/search").unwrap();
        url.query_pairs_mut()
            .append_pair("source", "a 1")
            .append_pair("destination", "b1");
        assert_eq!(url.query(), Some("source=a+1&destination=b1"));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = ApiConfig {
            base_url: "not a url".to_string(),
            timeout_secs: 25,
        };
        assert!(HttpApi::new(&config, Arc::new(NoSession)).is_err());
    }
}
