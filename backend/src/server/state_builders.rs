//! Builds the HTTP state from the configured store.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use shotserver::domain::FactoryService;
use shotserver::domain::ports::{FactoryRepository, FixtureLoginService};
use shotserver::inbound::http::state::{HttpState, HttpStatePorts};
use shotserver::outbound::memory::InMemoryFactoryRepository;
use shotserver::outbound::persistence::DieselFactoryRepository;

use super::ServerConfig;

fn state_for<R>(repo: R, clock: Arc<dyn Clock>, config: &ServerConfig) -> web::Data<HttpState>
where
    R: FactoryRepository + 'static,
{
    let service = Arc::new(FactoryService::new(Arc::new(repo), clock, config.policy));
    web::Data::new(HttpState::new(
        HttpStatePorts {
            login: Arc::new(FixtureLoginService),
            factories: service.clone(),
            registration: service,
        },
        config.login_url.clone(),
    ))
}

/// PostgreSQL-backed state when a pool is configured, in-memory otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    match &config.db_pool {
        Some(pool) => state_for(DieselFactoryRepository::new(pool.clone()), clock, config),
        None => {
            info!("no database configured; factories are kept in memory");
            state_for(
                InMemoryFactoryRepository::with_default_choices(clock.clone()),
                clock,
                config,
            )
        }
    }
}
