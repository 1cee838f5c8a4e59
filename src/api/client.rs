//! HTTP client for the clients/commandes API
//!
//! Wraps reqwest::Client; every request passes through the bearer token
//! interceptor before it is sent.

use anyhow::{Context, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::ApiError;
use crate::auth::{augment, Storage, TokenStore};
use crate::config::Config;

pub struct ApiClient<S> {
    http: reqwest::Client,
    base_url: Url,
    store: TokenStore<S>,
}

impl<S: Storage> ApiClient<S> {
    pub fn new(config: &Config, store: TokenStore<S>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;
        let base_url = Url::parse(config.api_url.trim_end_matches('/'))
            .with_context(|| format!("Invalid api_url '{}'", config.api_url))?;

        Ok(Self {
            http,
            base_url,
            store,
        })
    }

    pub fn store(&self) -> &TokenStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TokenStore<S> {
        &mut self.store
    }

    /// `base_url` + `path`, keeping any path prefix of the base.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Send a prepared request and classify the response status.
    async fn send(&mut self, builder: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let request = builder.build().map_err(|source| ApiError::Transport {
            url: String::new(),
            source,
        })?;
        let request = augment(&self.store, request);
        let url = request.url().to_string();
        let authenticated = request.headers().contains_key(AUTHORIZATION);
        tracing::debug!("{} {}", request.method(), url);

        let resp = self
            .http
            .execute(request)
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let err = ApiError::from_status(status, &url, body);

        if matches!(err, ApiError::Unauthenticated) && authenticated {
            tracing::info!("Server rejected the session, logging out");
            self.store.clear().map_err(ApiError::Session)?;
        }
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let url = resp.url().to_string();
        resp.json()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }

    pub async fn get<T: DeserializeOwned>(&mut self, path: &str) -> Result<T, ApiError> {
        let resp = self.send(self.request(Method::GET, path)).await?;
        Self::decode(resp).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &mut self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self.send(self.request(Method::POST, path).json(body)).await?;
        Self::decode(resp).await
    }

    /// POST whose response body is plain text (or empty).
    pub async fn post_text<B: Serialize + ?Sized>(
        &mut self,
        path: &str,
        body: &B,
    ) -> Result<String, ApiError> {
        let resp = self.send(self.request(Method::POST, path).json(body)).await?;
        let url = resp.url().to_string();
        resp.text()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &mut self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self.send(self.request(Method::PUT, path).json(body)).await?;
        Self::decode(resp).await
    }

    pub async fn delete(&mut self, path: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::storage::MemoryStorage;
    use crate::models::AuthResponse;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `401 Unauthorized` to every request; returns the base URL.
    async fn reject_everything() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    // read headers, then whatever body Content-Length announces
                    let body_start = loop {
                        let n = socket.read(&mut chunk).await.unwrap_or(0);
                        if n == 0 {
                            return;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                            break pos + 4;
                        }
                    };
                    let head = String::from_utf8_lossy(&buf[..body_start]).to_lowercase();
                    let length = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    while buf.len() < body_start + length {
                        let n = socket.read(&mut chunk).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                    }

                    let response = "HTTP/1.1 401 Unauthorized\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}", addr)
    }

    fn logged_in(api_url: &str) -> ApiClient<MemoryStorage> {
        let mut api = client(api_url);
        api.store_mut()
            .store(&AuthResponse {
                access_token: "a.b.c".to_string(),
                refresh_token: "r".to_string(),
            })
            .unwrap();
        api
    }

    fn client(api_url: &str) -> ApiClient<MemoryStorage> {
        let config = Config {
            api_url: api_url.to_string(),
            ..Config::default()
        };
        ApiClient::new(&config, TokenStore::new(MemoryStorage::new())).unwrap()
    }

    #[test]
    fn test_url_joining() {
        assert_eq!(
            client("http://localhost:8080").url("/clients/3"),
            "http://localhost:8080/clients/3"
        );
        assert_eq!(
            client("http://host/api/").url("/auth/login"),
            "http://host/api/auth/login"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = Config {
            api_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(ApiClient::new(&config, TokenStore::new(MemoryStorage::new())).is_err());
    }

    #[tokio::test]
    async fn test_401_with_bearer_logs_out() {
        let base = reject_everything().await;
        let mut api = logged_in(&base);

        let err = api.get::<serde_json::Value>("/clients").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
        assert!(api.store().access_token().is_none());
        assert!(api.store().refresh_token().is_none());
    }

    #[tokio::test]
    async fn test_401_on_login_keeps_session() {
        let base = reject_everything().await;
        let mut api = logged_in(&base);

        let body = serde_json::json!({"username": "bob", "password": "wrong"});
        let err = api.post_text("/auth/login", &body).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
        assert_eq!(api.store().access_token().as_deref(), Some("a.b.c"));
        assert_eq!(api.store().refresh_token().as_deref(), Some("r"));
    }
}
