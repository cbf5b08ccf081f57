// Application context
//
// Explicit dependency container threading configuration, storage, the
// HTTP client, and the state stores to consumers. No ambient globals:
// the presentation layer holds one of these and nothing else.

use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::http::ApiClient;
use crate::models::{Order, Product};
use crate::resources::ResourceStore;
use crate::session::SessionManager;
use crate::store::{CredentialStore, KeyringStore, TOKEN_KEY};

pub struct AppContext {
    pub config: Arc<Config>,
    pub store: Arc<dyn CredentialStore>,
    pub client: Arc<ApiClient>,
    pub session: Arc<SessionManager>,
    pub products: Arc<ResourceStore<Product>>,
    pub orders: Arc<ResourceStore<Order>>,
}

impl AppContext {
    /// Build the context with the platform keystore as token storage.
    pub fn new(config: Config) -> Result<Self> {
        let store: Arc<dyn CredentialStore> =
            Arc::new(KeyringStore::new(&config.keyring_service, TOKEN_KEY));
        Self::with_store(config, store)
    }

    /// Build the context with an injected credential store.
    pub fn with_store(config: Config, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let client = Arc::new(ApiClient::new(&config, store.clone())?);
        let session = Arc::new(SessionManager::new(client.clone(), store.clone()));
        let products = Arc::new(ResourceStore::products(client.clone()));
        let orders = Arc::new(ResourceStore::orders(client.clone()));

        Ok(Self {
            config: Arc::new(config),
            store,
            client,
            session,
            products,
            orders,
        })
    }
}
