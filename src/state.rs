use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::CatalogStore;
use crate::middleware::auth::AccessGate;

/// Shared, read-only application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub store: Arc<dyn CatalogStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn CatalogStore>) -> Self {
        let tokens = Arc::new(TokenService::new(&config.security));
        Self {
            config: Arc::new(config),
            tokens,
            store,
        }
    }

    pub fn access_gate(&self) -> AccessGate {
        AccessGate::for_site(self.tokens.clone())
    }

    pub fn currency(&self) -> &str {
        &self.config.catalog.currency
    }

    pub fn secure_cookies(&self) -> bool {
        self.config.security.secure_cookies
    }
}
