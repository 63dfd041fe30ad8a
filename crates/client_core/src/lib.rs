use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::ProgressEntryId,
    error::ApiError,
    protocol::{
        AuthResponse, FeedbackRequest, FeedbackResponse, GeneratePlanRequest, HealthResponse,
        LoginRequest, MessageResponse, MyPlansResponse, NutritionPlanResponse,
        ProgressEntryRequest, ProgressEntryResponse, ProgressListResponse, ProgressStatsResponse,
        RegisterRequest, VerifyTokenResponse, WorkoutPlanResponse,
    },
};
use tracing::{debug, info, warn};

pub mod config;
pub mod error;
pub mod token_store;

pub use config::{load_settings, ClientSettings};
pub use error::{GatewayError, GatewayResult};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};

/// Every backend operation the UI can trigger.
///
/// Implementations own the bearer token: `register` and `login` adopt the
/// returned token, `logout` discards it, nothing else touches it.
#[async_trait]
pub trait Gateway: Send + Sync {
    fn has_token(&self) -> bool;
    async fn register(&self, profile: &RegisterRequest) -> GatewayResult<AuthResponse>;
    async fn login(&self, credentials: &LoginRequest) -> GatewayResult<AuthResponse>;
    async fn verify_session(&self) -> GatewayResult<VerifyTokenResponse>;
    fn logout(&self);
    async fn generate_workout_plan(&self, duration_weeks: u32)
        -> GatewayResult<WorkoutPlanResponse>;
    async fn generate_nutrition_plan(
        &self,
        duration_weeks: u32,
    ) -> GatewayResult<NutritionPlanResponse>;
    async fn list_plans(&self) -> GatewayResult<MyPlansResponse>;
    async fn submit_feedback(&self, payload: &FeedbackRequest) -> GatewayResult<FeedbackResponse>;
    async fn add_progress_entry(
        &self,
        entry: &ProgressEntryRequest,
    ) -> GatewayResult<ProgressEntryResponse>;
    async fn list_progress_entries(&self, window_days: u32)
        -> GatewayResult<ProgressListResponse>;
    async fn progress_stats(&self) -> GatewayResult<ProgressStatsResponse>;
    async fn delete_progress_entry(&self, id: ProgressEntryId) -> GatewayResult<MessageResponse>;
    async fn health_check(&self) -> GatewayResult<HealthResponse>;
}

/// HTTP gateway to the coaching backend.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Builds the client and restores any token left by a previous run.
    pub fn new(settings: &ClientSettings, store: Arc<dyn TokenStore>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("failed to build http client")?;
        let base_url = config::normalize_base_url(&settings.api_base_url)?;

        let restored = match store.load() {
            Ok(token) => token,
            Err(err) => {
                warn!("ignoring unreadable persisted session: {err}");
                None
            }
        };
        if restored.is_some() {
            info!("restored persisted session token");
        }

        Ok(Self {
            http,
            base_url,
            token: RwLock::new(restored),
            store,
        })
    }

    fn current_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Refuses an auth response without a usable token; nothing is adopted.
    fn accept_auth(&self, path: &str, body: AuthResponse) -> GatewayResult<AuthResponse> {
        if body.token.trim().is_empty() {
            return Err(GatewayError::MalformedResponse {
                path: path.to_string(),
                source: <serde_json::Error as serde::de::Error>::custom(
                    "auth response carries an empty token",
                ),
            });
        }
        self.adopt_token(&body.token);
        Ok(body)
    }

    fn adopt_token(&self, token: &str) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        if let Err(err) = self.store.save(token) {
            warn!("session token kept in memory only: {err}");
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{path}", self.base_url));
        match self.current_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> GatewayResult<T> {
        debug!(%method, path, "backend request");
        let network = |source| GatewayError::Network {
            path: path.to_string(),
            source,
        };

        let response = builder.send().await.map_err(network)?;
        let status = response.status();
        let body = response.bytes().await.map_err(network)?;

        if !status.is_success() {
            let message = ApiError::message_from_body(&body);
            debug!(%method, path, status = status.as_u16(), "backend rejected request");
            return Err(GatewayError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|source| GatewayError::MalformedResponse {
            path: path.to_string(),
            source,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        self.send(Method::GET, path, self.request(Method::GET, path))
            .await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        let builder = self.request(Method::POST, path).json(body);
        self.send(Method::POST, path, builder).await
    }
}

#[async_trait]
impl Gateway for ApiClient {
    fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    async fn register(&self, profile: &RegisterRequest) -> GatewayResult<AuthResponse> {
        let path = "/auth/register";
        let body = self.accept_auth(path, self.post_json(path, profile).await?)?;
        info!(user_id = %body.user.id, "registered new account");
        Ok(body)
    }

    async fn login(&self, credentials: &LoginRequest) -> GatewayResult<AuthResponse> {
        let path = "/auth/login";
        let body = self.accept_auth(path, self.post_json(path, credentials).await?)?;
        info!(user_id = %body.user.id, "logged in");
        Ok(body)
    }

    async fn verify_session(&self) -> GatewayResult<VerifyTokenResponse> {
        let path = "/auth/verify-token";
        self.send(Method::POST, path, self.request(Method::POST, path))
            .await
    }

    fn logout(&self) {
        let had_token = self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        if let Err(err) = self.store.clear() {
            warn!("failed to clear persisted session token: {err}");
        }
        if had_token {
            info!("session token discarded");
        }
    }

    async fn generate_workout_plan(
        &self,
        duration_weeks: u32,
    ) -> GatewayResult<WorkoutPlanResponse> {
        self.post_json(
            "/generate-workout-plan",
            &GeneratePlanRequest { duration_weeks },
        )
        .await
    }

    async fn generate_nutrition_plan(
        &self,
        duration_weeks: u32,
    ) -> GatewayResult<NutritionPlanResponse> {
        self.post_json(
            "/generate-nutrition-plan",
            &GeneratePlanRequest { duration_weeks },
        )
        .await
    }

    async fn list_plans(&self) -> GatewayResult<MyPlansResponse> {
        self.get("/my-plans").await
    }

    async fn submit_feedback(&self, payload: &FeedbackRequest) -> GatewayResult<FeedbackResponse> {
        self.post_json("/submit-feedback", payload).await
    }

    async fn add_progress_entry(
        &self,
        entry: &ProgressEntryRequest,
    ) -> GatewayResult<ProgressEntryResponse> {
        self.post_json("/progress", entry).await
    }

    async fn list_progress_entries(
        &self,
        window_days: u32,
    ) -> GatewayResult<ProgressListResponse> {
        let path = "/progress";
        let builder = self
            .request(Method::GET, path)
            .query(&[("days", window_days)]);
        self.send(Method::GET, path, builder).await
    }

    async fn progress_stats(&self) -> GatewayResult<ProgressStatsResponse> {
        self.get("/progress/stats").await
    }

    async fn delete_progress_entry(&self, id: ProgressEntryId) -> GatewayResult<MessageResponse> {
        let path = format!("/progress/{id}");
        self.send(Method::DELETE, &path, self.request(Method::DELETE, &path))
            .await
    }

    async fn health_check(&self) -> GatewayResult<HealthResponse> {
        self.get("/health").await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
