//! Web server for tagvault.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::{Result, StoreError};

use super::handlers::AppState;
use super::openapi::create_swagger_router;
use super::router::{create_health_router, create_router};

/// HTTP server for the file API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// CORS allowed origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &ServerConfig, app_state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse::<SocketAddr>()
            .map_err(|e| {
                StoreError::Config(format!(
                    "invalid server address {}:{}: {e}",
                    config.host, config.port
                ))
            })?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            cors_origins: config.cors_origins.clone(),
        })
    }

    /// Get the configured address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn router(self) -> axum::Router {
        create_router(self.app_state, &self.cors_origins)
            .merge(create_health_router())
            .merge(create_swagger_router())
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, self.router()).await
    }

    /// Run the server in the background and return the bound address.
    ///
    /// Useful for tests binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        let router = self.router();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentials;
    use crate::store::FileStore;
    use tempfile::TempDir;

    fn create_state(dir: &TempDir) -> AppState {
        let store = FileStore::open(dir.path().join("uploads"), dir.path().join("meta.json")).unwrap();
        AppState::new(Arc::new(store), Arc::new(StaticCredentials::new()))
    }

    fn create_test_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
        }
    }

    #[test]
    fn test_web_server_new() {
        let dir = TempDir::new().unwrap();
        let server = WebServer::new(&create_test_config(), create_state(&dir)).unwrap();

        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[test]
    fn test_web_server_invalid_host() {
        let dir = TempDir::new().unwrap();
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..create_test_config()
        };

        let result = WebServer::new(&config, create_state(&dir));
        assert!(matches!(result, Err(StoreError::Config(_))));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let dir = TempDir::new().unwrap();
        let server = WebServer::new(&create_test_config(), create_state(&dir)).unwrap();
        let addr = server.run_with_addr().await.unwrap();

        let client = reqwest::Client::new();
        let resp = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
        assert_eq!(resp.text().await.unwrap(), "OK");

        let resp = client
            .get(format!("http://{}/files", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 401);
    }
}
