//! The single HTTP entry point for all API calls.
//!
//! Owns the bearer token in transit: every request carries it when one is
//! held, and a 401 on any authenticated call hands control to the registered
//! [`UnauthorizedHandler`] before the failure is returned to the caller.

use std::sync::{RwLock, Weak};

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use stockpanel_auth::{User, validate_email};
use stockpanel_core::DomainError;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ClientError, parse_error_body};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Reacts to the API rejecting the session.
#[async_trait]
pub trait UnauthorizedHandler: Send + Sync {
    /// `rejected_token` is the token the failed request carried.
    async fn on_unauthorized(&self, rejected_token: Option<&str>);
}

/// Login form input, validated before anything is sent.
#[derive(Clone, Serialize)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Result<Self, DomainError> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(DomainError::validation("password: required"));
        }
        Ok(Self {
            email: email.trim().to_string(),
            password: password.to_string(),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `POST /auth/login` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    pub access_token: String,
}

pub struct ApiClient {
    http: reqwest::Client,
    api_url: String,
    token: RwLock<Option<String>>,
    unauthorized: RwLock<Option<Weak<dyn UnauthorizedHandler>>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            token: RwLock::new(None),
            unauthorized: RwLock::new(None),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(|p| p.into_inner()) = token;
    }

    pub fn clear_token(&self) {
        self.set_token(None);
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Register who tears the session down on 401. Held weakly so the
    /// session store and the client can point at each other.
    pub fn set_unauthorized_handler(&self, handler: Weak<dyn UnauthorizedHandler>) {
        *self.unauthorized.write().unwrap_or_else(|p| p.into_inner()) = Some(handler);
    }

    /// Exchange credentials for a user and token.
    ///
    /// A 400/401 here means bad credentials, not an expired session, so the
    /// unauthorized handler is not involved and no state is touched.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<LoginResponse, ClientError> {
        let url = self.url("/auth/login");
        let request_id = Uuid::now_v7();

        let resp = self
            .http
            .post(&url)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .json(credentials)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%request_id, error = %e, "login request failed");
                ClientError::Network(e.to_string())
            })?;

        let status = resp.status();
        if status.is_success() {
            return decode(resp).await;
        }

        let body = resp.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST {
            let (message, _) = parse_error_body(&body);
            tracing::info!(%request_id, status = status.as_u16(), "login rejected");
            return Err(ClientError::InvalidCredentials(
                message.unwrap_or_else(|| "invalid email or password".to_string()),
            ));
        }
        Err(ClientError::from_status(status.as_u16(), &body))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.execute(Method::GET, path, |req| req).await?;
        decode(resp).await
    }

    pub async fn get_with_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, ClientError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.execute(Method::GET, path, |req| req.query(query)).await?;
        decode(resp).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.execute(Method::POST, path, |req| req.json(body)).await?;
        decode(resp).await
    }

    /// `POST` whose response body is ignored.
    pub async fn post_unit<B>(&self, path: &str, body: &B) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(Method::POST, path, |req| req.json(body)).await?;
        Ok(())
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.execute(Method::PATCH, path, |req| req.json(body)).await?;
        decode(resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.execute(Method::DELETE, path, |req| req).await?;
        Ok(())
    }

    async fn execute<F>(&self, method: Method, path: &str, build: F) -> Result<Response, ClientError>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self.url(path);
        let token = self.token();
        let request_id = Uuid::now_v7();

        let mut req = self
            .http
            .request(method.clone(), &url)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(token) = &token {
            req = req.bearer_auth(token);
        }

        let resp = build(req).send().await.map_err(|e| {
            tracing::warn!(%request_id, %method, path, error = %e, "request failed");
            ClientError::Network(e.to_string())
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(%request_id, %method, path, "API rejected the session");
            self.notify_unauthorized(token.as_deref()).await;
            return Err(ClientError::SessionExpired);
        }

        let body = resp.text().await.unwrap_or_default();
        tracing::debug!(%request_id, %method, path, status = status.as_u16(), "request returned an error status");
        Err(ClientError::from_status(status.as_u16(), &body))
    }

    async fn notify_unauthorized(&self, rejected_token: Option<&str>) {
        let handler = self
            .unauthorized
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .and_then(Weak::upgrade);

        match handler {
            Some(handler) => handler.on_unauthorized(rejected_token).await,
            None => tracing::debug!("no unauthorized handler registered"),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    resp.json::<T>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}
