//! Service entry point: loads settings, prepares the store and runs the
//! HTTP server.

mod server;

use std::path::Path;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use server::{ServerConfig, create_server};
use shotserver::inbound::http::health::HealthState;
use shotserver::outbound::persistence::{DbPool, PoolConfig, migrate};
use shotserver::settings::AppSettings;

/// `Key::derive_from` panics below this length.
const SESSION_KEY_MIN_LEN: usize = 32;

fn load_session_key(path: &Path, allow_ephemeral: bool) -> std::io::Result<Key> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let bytes = Zeroizing::new(bytes);
            if bytes.len() < SESSION_KEY_MIN_LEN {
                return Err(std::io::Error::other(format!(
                    "session key at {} is shorter than {SESSION_KEY_MIN_LEN} bytes",
                    path.display()
                )));
            }
            Ok(Key::derive_from(&bytes))
        }
        Err(error) if cfg!(debug_assertions) || allow_ephemeral => {
            warn!(path = %path.display(), %error, "using temporary session key (dev only)");
            Ok(Key::generate())
        }
        Err(error) => Err(std::io::Error::other(format!(
            "failed to read session key at {}: {error}",
            path.display()
        ))),
    }
}

async fn connect_store(database_url: &str) -> std::io::Result<DbPool> {
    let applied = migrate(database_url.to_owned())
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    info!(applied, "database migrations complete");
    DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    let key = load_session_key(&settings.session_key_file(), settings.session_allow_ephemeral)?;

    let mut config = ServerConfig::new(key, settings.cookie_secure(), SameSite::Lax, bind_addr)
        .with_login_url(settings.login_url())
        .with_view_policy(settings.view_policy());
    if let Some(database_url) = settings.database_url.as_deref() {
        config = config.with_db_pool(connect_store(database_url).await?);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "listening");
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
