//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use shotserver::domain::FactoryViewPolicy;
use shotserver::outbound::persistence::DbPool;

/// Everything `create_server` needs, assembled from settings.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) login_url: String,
    pub(crate) policy: FactoryViewPolicy,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            login_url: "/login".to_owned(),
            policy: FactoryViewPolicy::default(),
            db_pool: None,
        }
    }

    /// Redirect target for anonymous visitors of the registration page.
    #[must_use]
    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }

    #[must_use]
    pub fn with_view_policy(mut self, policy: FactoryViewPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Store factories in PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
