//! Driving port for session login.
//!
//! Credential storage lives outside this service, so the bundled
//! implementation accepts a single operator account.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Authenticate credentials and return the user id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}

/// Id of the operator account accepted by [`FixtureLoginService`].
pub const FIXTURE_ADMIN_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

/// Accepts `admin` / `password` only.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        if credentials.username() == "admin" && credentials.password() == "password" {
            UserId::new(FIXTURE_ADMIN_ID)
                .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}
