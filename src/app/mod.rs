use std::sync::Arc;

use axum::http::HeaderValue;
use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    config::{AppConfig, WaitlistConfig},
    database::DbManager,
    model::WaitlistStore,
    Result,
};

// ###################################
// ->  Structs
// ###################################
/// Everything needed to start serving: the shared state, a bound listener and the CORS allow-list.
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
    pub allowed_origins: Vec<HeaderValue>,
}
impl App {
    pub fn new(
        app_state: AppState,
        listener: TcpListener,
        allowed_origins: Vec<HeaderValue>,
    ) -> Self {
        App {
            app_state,
            listener,
            allowed_origins,
        }
    }

    /// Fails if the CORS origins are malformed, the database can't be reached or
    /// the address can't be bound. Nothing is served in that case.
    pub async fn build_from_config(config: AppConfig) -> Result<Self> {
        let allowed_origins = config.net_config.cors_origins()?;

        let dm = DbManager::init(&config.db_config).await?;
        let entries = dm.count().await.map_err(crate::database::Error::Store)?;
        info!("{:<20} - {entries} entries on the waiting list", "build_from_config");

        let app_state = AppState::new(Arc::new(dm), config.waitlist_config);

        let listener = TcpListener::bind(config.net_config.socket_addr()).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        Ok(App::new(app_state, listener, allowed_origins))
    }
}

pub struct InternalState {
    pub store: Arc<dyn WaitlistStore>,
    pub settings: WaitlistConfig,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(store: Arc<dyn WaitlistStore>, settings: WaitlistConfig) -> Self {
        AppState(Arc::new(InternalState { store, settings }))
    }
}
