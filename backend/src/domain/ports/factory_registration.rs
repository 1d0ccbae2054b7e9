//! Driving port for registering factories.

use async_trait::async_trait;

use crate::domain::{
    Error, FactoryRegistrationForm, RegistrationChoices, RegistrationOutcome, UserId,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FactoryRegistration: Send + Sync {
    /// Options for the form's choice fields.
    async fn registration_choices(&self) -> Result<RegistrationChoices, Error>;

    /// Validate and persist a submitted form owned by `admin`.
    ///
    /// Validation failures and store conflicts come back as
    /// [`RegistrationOutcome::Rejected`]; `Err` is reserved for failures that
    /// prevent the form from being rendered at all.
    async fn register(
        &self,
        admin: UserId,
        form: FactoryRegistrationForm,
    ) -> Result<RegistrationOutcome, Error>;
}
