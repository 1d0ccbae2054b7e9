//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and talk only to driving ports,
//! so they can be exercised with mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{FactoriesQuery, FactoryRegistration, LoginService};

/// Port implementations required by the handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub factories: Arc<dyn FactoriesQuery>,
    pub registration: Arc<dyn FactoryRegistration>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub factories: Arc<dyn FactoriesQuery>,
    pub registration: Arc<dyn FactoryRegistration>,
    /// Where anonymous visitors of login-only pages are sent.
    pub login_url: String,
}

impl HttpState {
    /// Construct state from the port bundle and the login redirect target.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use shotserver::domain::{FactoryService, FactoryViewPolicy};
    /// use shotserver::domain::ports::FixtureLoginService;
    /// use shotserver::inbound::http::state::{HttpState, HttpStatePorts};
    /// use shotserver::outbound::memory::InMemoryFactoryRepository;
    ///
    /// let service = Arc::new(FactoryService::new(
    ///     Arc::new(InMemoryFactoryRepository::default()),
    ///     Arc::new(DefaultClock),
    ///     FactoryViewPolicy::default(),
    /// ));
    /// let state = HttpState::new(
    ///     HttpStatePorts {
    ///         login: Arc::new(FixtureLoginService),
    ///         factories: service.clone(),
    ///         registration: service,
    ///     },
    ///     "/login",
    /// );
    /// assert_eq!(state.login_url, "/login");
    /// ```
    pub fn new(ports: HttpStatePorts, login_url: impl Into<String>) -> Self {
        let HttpStatePorts {
            login,
            factories,
            registration,
        } = ports;
        Self {
            login,
            factories,
            registration,
            login_url: login_url.into(),
        }
    }
}
