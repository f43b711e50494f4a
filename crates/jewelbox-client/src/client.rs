//! Client composition: transport, session, and endpoint groups.

use std::sync::Arc;

use tracing::{info, warn};

use jewelbox_auth::store::open_store;
use jewelbox_auth::{Clock, Durability, SystemClock, TokenManager};
use jewelbox_core::AppResult;
use jewelbox_core::config::{AppConfig, SessionConfig};
use jewelbox_core::traits::TokenPersistence;
use jewelbox_core::types::{IssuedTokens, TokenPair};

use crate::api::{
    AccountApi, AuthApi, CatalogApi, OrdersApi, SignInRequest, SignUpRequest, UsersApi,
};
use crate::error::ApiError;
use crate::http::{AuthorizedClient, HttpTransport};

/// Entry point for talking to the backend as one signed-in user.
#[derive(Debug, Clone)]
pub struct JewelboxClient {
    auth: AuthApi,
    api: AuthorizedClient,
}

impl JewelboxClient {
    /// Wire a client from explicit parts. The session starts empty; call
    /// [`TokenManager::load_initial`] to adopt a persisted one.
    pub fn new(
        http: HttpTransport,
        store: Arc<dyn TokenPersistence>,
        session: &SessionConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let auth = AuthApi::new(http.clone());
        let tokens = TokenManager::with_clock(store, Arc::new(auth.clone()), session, clock);

        Self {
            auth,
            api: AuthorizedClient::new(http, tokens),
        }
    }

    /// Build from configuration and restore any persisted session.
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        let http = HttpTransport::new(&config.api)?;
        let store = open_store(&config.session).await?;
        let client = Self::new(http, store, &config.session, Arc::new(SystemClock));

        match client.tokens().load_initial().await {
            Some(pair) => info!(user_id = %pair.user_id, "Restored session"),
            None => info!("No saved session"),
        }

        Ok(client)
    }

    /// The session.
    pub fn tokens(&self) -> &TokenManager {
        self.api.tokens()
    }

    /// Sign in and store the issued pair.
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<TokenPair, ApiError> {
        let issued = self.auth.sign_in(request).await?;
        self.adopt(issued).await
    }

    /// Create an account and sign in with it.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<TokenPair, ApiError> {
        let issued = self.auth.sign_up(request).await?;
        self.adopt(issued).await
    }

    /// Forget the session locally. There is no backend call.
    pub async fn sign_out(&self) -> Durability {
        let durability = self.tokens().clear_tokens().await;
        if let Durability::Volatile { error } = &durability {
            warn!(error = %error, "Signed out, but the saved session could not be removed");
        }
        durability
    }

    /// Account endpoints.
    pub fn account(&self) -> AccountApi<'_> {
        AccountApi::new(&self.api)
    }

    /// Catalog endpoints.
    pub fn catalog(&self) -> CatalogApi<'_> {
        CatalogApi::new(&self.api)
    }

    /// Order endpoints.
    pub fn orders(&self) -> OrdersApi<'_> {
        OrdersApi::new(&self.api)
    }

    /// Admin user endpoints.
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(&self.api)
    }

    async fn adopt(&self, issued: IssuedTokens) -> Result<TokenPair, ApiError> {
        let tokens = self.tokens();
        let pair = TokenPair::from_issued(issued, tokens.now(), None)
            .ok_or_else(|| ApiError::Decode("response is missing session credentials".into()))?;

        if let Durability::Volatile { error } = tokens.set_tokens(pair.clone()).await {
            warn!(
                user_id = %pair.user_id,
                error = %error,
                "Signed in, but the session will not survive a restart"
            );
        }

        info!(user_id = %pair.user_id, "Signed in");
        Ok(pair)
    }
}
