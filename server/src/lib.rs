use axum::{
    http::{header, HeaderMap, Method},
    routing::{get, patch, post},
    Router,
};
use chrono::Utc;
use dropclub_engine::{Key, Ledger, LedgerError, Memory, Policy, State, Value};
use dropclub_types::{api::Update, AccountId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};
use thiserror::Error;
use tokio::sync::broadcast;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use uuid::Uuid;

pub mod config;

mod auth;
mod routes;
mod webhook;

#[cfg(test)]
mod tests;

use config::Config;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Internal error")]
    Internal,
}

/// Shared application state behind every route.
///
/// All domain writes funnel through [`Service::command`], which runs one
/// unit of work against the store and broadcasts the resulting updates to
/// live feed subscribers. Reads go through [`Service::query`].
pub struct Service {
    config: Config,
    state: Arc<RwLock<Memory>>,
    sessions: RwLock<HashMap<Uuid, AccountId>>,
    update_tx: broadcast::Sender<Update>,
}

impl Service {
    pub fn new(config: Config) -> Self {
        let (update_tx, _) = broadcast::channel(1024);
        let mut memory = Memory::default();
        memory.insert(
            Key::MysteryCatalog,
            Value::MysteryCatalog(config.mystery_rewards.clone()),
        );

        Self {
            config,
            state: Arc::new(RwLock::new(memory)),
            sessions: RwLock::new(HashMap::new()),
            update_tx,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn policy(&self) -> Policy {
        Policy {
            arcade_cooldown: self.config.arcade_cooldown(),
        }
    }

    /// Runs one command against the store and broadcasts its updates.
    ///
    /// The write lock is held for the duration of the command; a command
    /// that errors leaves no trace behind.
    pub fn command<T>(
        &self,
        op: impl FnOnce(&mut Ledger<'_, Memory>) -> Result<T, LedgerError>,
    ) -> Result<T, ServiceError> {
        let mut state = match self.state.write() {
            Ok(state) => state,
            Err(e) => {
                tracing::error!("Failed to acquire write lock in command: {}", e);
                return Err(ServiceError::Internal);
            }
        };
        let mut ledger = Ledger::new(
            &*state,
            Utc::now(),
            ChaCha8Rng::seed_from_u64(rand::thread_rng().gen()),
            self.policy(),
        );
        let value = op(&mut ledger)?;
        let (changes, updates) = ledger.commit();
        state.apply(changes);
        drop(state); // Release lock before broadcasting

        for update in updates {
            if let Err(e) = self.update_tx.send(update) {
                tracing::debug!("Dropping update broadcast (no subscribers): {}", e);
                break;
            }
        }
        Ok(value)
    }

    pub fn query<T>(&self, op: impl FnOnce(&Memory) -> T) -> Result<T, ServiceError> {
        let state = match self.state.read() {
            Ok(state) => state,
            Err(e) => {
                tracing::error!("Failed to acquire read lock in query: {}", e);
                return Err(ServiceError::Internal);
            }
        };
        Ok(op(&state))
    }

    pub fn create_session(&self, account: AccountId) -> Result<Uuid, ServiceError> {
        let mut sessions = match self.sessions.write() {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::error!("Failed to acquire write lock in create_session: {}", e);
                return Err(ServiceError::Internal);
            }
        };
        let token = Uuid::new_v4();
        sessions.insert(token, account);
        Ok(token)
    }

    /// Resolves the bearer token in `headers` to a live session.
    pub fn authenticate(&self, headers: &HeaderMap) -> Option<AccountId> {
        let token = auth::bearer_token(headers)?;
        let sessions = match self.sessions.read() {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::error!("Failed to acquire read lock in authenticate: {}", e);
                return None;
            }
        };
        sessions.get(&token).copied()
    }

    pub fn update_subscriber(&self) -> broadcast::Receiver<Update> {
        self.update_tx.subscribe()
    }
}

pub struct Api {
    service: Arc<Service>,
}

impl Api {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }

    pub fn router(&self) -> Router {
        // Configure CORS
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

        // Configure Rate Limiting
        // Generous enough that a busy dashboard polling every endpoint stays under it
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .per_second(50)
                .burst_size(500)
                .key_extractor(SmartIpKeyExtractor)
                .finish()
                .unwrap(),
        );

        Router::new()
            .route("/api/register", post(routes::accounts::register))
            .route("/api/login", post(routes::accounts::login))
            .route("/api/me", get(routes::accounts::me))
            .route("/api/me/entries", get(routes::accounts::entries))
            .route("/api/me/wins", get(routes::accounts::wins))
            .route("/api/me/ledger", get(routes::accounts::ledger))
            .route("/api/me/reset", post(routes::accounts::reset))
            .route("/api/me/streak", post(routes::engagement::claim_streak))
            .route(
                "/api/me/referral",
                get(routes::engagement::referral_code).post(routes::engagement::apply_referral),
            )
            .route("/api/drops", get(routes::drops::list))
            .route("/api/drops/:id", get(routes::drops::detail))
            .route("/api/drops/:id/enter", post(routes::drops::enter))
            .route(
                "/api/drops/:id/comments",
                get(routes::drops::comments).post(routes::drops::post_comment),
            )
            .route("/api/feed", get(routes::engagement::feed))
            .route("/api/leaderboard", get(routes::engagement::leaderboard))
            .route("/api/achievements", get(routes::engagement::achievements))
            .route("/api/notifications", get(routes::engagement::notifications))
            .route(
                "/api/notifications/read",
                post(routes::engagement::mark_read),
            )
            .route("/api/arcade/play", post(routes::arcade::play))
            .route("/api/arcade/mystery", post(routes::arcade::mystery))
            .route("/api/rewards", get(routes::engagement::rewards))
            .route("/api/rewards/redeem", post(routes::engagement::redeem))
            .route("/api/packs", get(routes::billing::packs))
            .route("/api/stripe/checkout", post(routes::billing::checkout))
            .route("/api/stripe/webhook", post(routes::billing::webhook))
            .route("/api/updates", get(routes::ws::updates))
            .route("/api/admin/drops", post(routes::admin::create_drop))
            .route(
                "/api/admin/drops/:id",
                patch(routes::admin::update_drop).delete(routes::admin::delete_drop),
            )
            .route(
                "/api/admin/drops/:id/winner",
                post(routes::admin::pick_winner),
            )
            .route("/api/admin/stats", get(routes::admin::stats))
            .route("/api/admin/uploads", post(routes::admin::upload))
            .nest_service(
                "/uploads",
                ServeDir::new(&self.service.config().upload_dir),
            )
            .layer(cors)
            .layer(GovernorLayer {
                config: governor_conf,
            })
            .with_state(self.service.clone())
    }
}
