//! Factory listing, detail and registration services.
//!
//! One service backs both driving ports because they share the repository,
//! clock and view policy.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::try_join;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info};

use crate::domain::ports::{
    FactoriesQuery, FactoryDetails, FactoryInsertError, FactoryRegistration, FactoryRepository,
    FactoryRepositoryError,
};
use crate::domain::{
    Browser, Error, Factory, FactoryRegistrationForm, FactoryViewPolicy, FormErrors, FormField,
    NAME_TAKEN_MESSAGE, ProblemReport, RECENT_PROBLEMS_LIMIT, RECENT_SCREENSHOTS_LIMIT,
    RecentScreenshot, RegistrationChoices, RegistrationOutcome, RejectedRegistration,
    SAVE_FAILED_MESSAGE, Screenshot, TraceId, UserId, sort_browsers_for_display,
};

/// Message of the error returned when no factory is fresh.
pub const NO_ACTIVE_FACTORIES_MESSAGE: &str = "No active screenshot factories.";

/// Message of the error returned when the store cannot be reached.
pub const STORE_UNAVAILABLE_MESSAGE: &str = "Factory store unavailable.";

/// Backend text is logged with the trace id and never returned to clients.
fn map_repository_error(error: FactoryRepositoryError) -> Error {
    error!(error = %error, trace_id = ?TraceId::current(), "factory repository failed");
    match error {
        FactoryRepositoryError::Connection { .. } => {
            Error::service_unavailable(STORE_UNAVAILABLE_MESSAGE)
        }
        FactoryRepositoryError::Query { .. } => Error::internal("factory repository error"),
    }
}

fn out_of_service() -> Error {
    Error::service_unavailable(NO_ACTIVE_FACTORIES_MESSAGE).with_details(json!({
        "title": "out of service",
        "hint": "Please try again later.",
    }))
}

fn limit_len(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

/// Domain service implementing [`FactoriesQuery`] and [`FactoryRegistration`].
#[derive(Clone)]
pub struct FactoryService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    policy: FactoryViewPolicy,
}

impl<R> FactoryService<R> {
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>, policy: FactoryViewPolicy) -> Self {
        Self {
            repo,
            clock,
            policy,
        }
    }
}

impl<R> FactoryService<R>
where
    R: FactoryRepository,
{
    async fn load_browsers(&self, factory_id: i32) -> Result<Vec<Browser>, Error> {
        let mut browsers = self
            .repo
            .browsers_for_factory(factory_id)
            .await
            .map_err(map_repository_error)?;
        sort_browsers_for_display(&mut browsers);
        Ok(browsers)
    }

    async fn load_screenshots(&self, factory_id: i32) -> Result<Vec<Screenshot>, Error> {
        let mut screenshots = self
            .repo
            .recent_screenshots(
                factory_id,
                self.policy.profanities_allowed(),
                RECENT_SCREENSHOTS_LIMIT,
            )
            .await
            .map_err(map_repository_error)?;
        screenshots.retain(|shot| self.policy.allows_profanities(shot.website_profanities));
        screenshots.sort_by(|a, b| b.id.cmp(&a.id));
        screenshots.truncate(limit_len(RECENT_SCREENSHOTS_LIMIT));
        Ok(screenshots)
    }

    async fn load_problems(&self, factory_id: i32) -> Result<Vec<ProblemReport>, Error> {
        let mut problems = self
            .repo
            .recent_problem_reports(factory_id, RECENT_PROBLEMS_LIMIT)
            .await
            .map_err(map_repository_error)?;
        problems.sort_by(|a, b| b.id.cmp(&a.id));
        problems.truncate(limit_len(RECENT_PROBLEMS_LIMIT));
        Ok(problems)
    }

    fn reject(
        form: FactoryRegistrationForm,
        errors: FormErrors,
        choices: RegistrationChoices,
    ) -> RegistrationOutcome {
        RegistrationOutcome::Rejected(RejectedRegistration {
            form,
            errors,
            choices,
        })
    }
}

#[async_trait]
impl<R> FactoriesQuery for FactoryService<R>
where
    R: FactoryRepository,
{
    async fn list_active(&self) -> Result<Vec<Factory>, Error> {
        let cutoff = self.policy.poll_cutoff(self.clock.utc());
        let mut factories = self
            .repo
            .list_active(cutoff)
            .await
            .map_err(map_repository_error)?;
        if factories.is_empty() {
            return Err(out_of_service());
        }
        factories.sort_by(|a, b| {
            b.uploads_per_day
                .cmp(&a.uploads_per_day)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(factories)
    }

    async fn factory_details(
        &self,
        name: &str,
        viewer: Option<UserId>,
    ) -> Result<FactoryDetails, Error> {
        let factory = self
            .repo
            .find_by_name(name)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("factory {name} not found")))?;

        let (mut browsers, screenshots, problems, screen_sizes, color_depths) = try_join!(
            self.load_browsers(factory.id),
            self.load_screenshots(factory.id),
            self.load_problems(factory.id),
            async {
                let mut sizes = self
                    .repo
                    .screen_sizes(factory.id)
                    .await
                    .map_err(map_repository_error)?;
                sizes.sort();
                Ok::<_, Error>(sizes)
            },
            async {
                let mut depths = self
                    .repo
                    .color_depths(factory.id)
                    .await
                    .map_err(map_repository_error)?;
                depths.sort();
                Ok::<_, Error>(depths)
            },
        )?;

        let admin_logged_in = factory.is_administered_by(viewer.as_ref());
        let show_commands = admin_logged_in && browsers.iter().any(Browser::has_command);
        if !admin_logged_in {
            for browser in &mut browsers {
                browser.command = None;
            }
        }

        let screenshots = screenshots
            .into_iter()
            .map(|screenshot| RecentScreenshot {
                browser: browsers
                    .iter()
                    .find(|browser| browser.id == screenshot.browser_id)
                    .cloned(),
                screenshot,
            })
            .collect();

        Ok(FactoryDetails {
            factory,
            browsers,
            screenshots,
            problems,
            screen_sizes,
            color_depths,
            admin_logged_in,
            show_commands,
        })
    }
}

#[async_trait]
impl<R> FactoryRegistration for FactoryService<R>
where
    R: FactoryRepository,
{
    async fn registration_choices(&self) -> Result<RegistrationChoices, Error> {
        self.repo
            .registration_choices()
            .await
            .map_err(map_repository_error)
    }

    async fn register(
        &self,
        admin: UserId,
        form: FactoryRegistrationForm,
    ) -> Result<RegistrationOutcome, Error> {
        let choices = self.registration_choices().await?;
        let valid = match form.validate(&choices) {
            Ok(valid) => valid,
            Err(errors) => return Ok(Self::reject(form, errors, choices)),
        };

        let new_factory = valid.into_new_factory(admin);
        match self.repo.insert(&new_factory).await {
            Ok(factory) => {
                info!(factory = %factory.name, admin = %admin, "factory registered");
                Ok(RegistrationOutcome::Registered(factory))
            }
            Err(FactoryInsertError::UniqueViolation { name }) => {
                info!(factory = %name, "factory name already taken");
                let mut errors = FormErrors::default();
                errors.add_field(FormField::Name, NAME_TAKEN_MESSAGE);
                Ok(Self::reject(form, errors, choices))
            }
            Err(err) => {
                error!(
                    error = %err,
                    trace_id = ?TraceId::current(),
                    factory = %new_factory.name,
                    "factory insert failed"
                );
                let mut errors = FormErrors::default();
                errors.add_non_field(SAVE_FAILED_MESSAGE);
                Ok(Self::reject(form, errors, choices))
            }
        }
    }
}

#[cfg(test)]
#[path = "factory_service_tests.rs"]
mod tests;
