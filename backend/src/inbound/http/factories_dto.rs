//! Factory page view models.
//!
//! Responses are JSON renderings of what the listing, detail and
//! registration pages display. Timestamps are RFC 3339 strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::FactoryDetails;
use crate::domain::{
    Browser, ColorDepth, Factory, FactoryRegistrationForm, FormErrors, ProblemReport,
    RecentScreenshot, RegistrationChoices, ScreenSize,
};

pub(super) const REGISTRATION_TITLE: &str = "register a new screenshot factory";
pub(super) const REGISTRATION_SUBMIT: &str = "register";

/// One row of the active factory listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FactorySummary {
    #[schema(example = "hardy")]
    pub name: String,
    #[schema(example = "x86_64")]
    pub architecture: String,
    #[schema(example = "Ubuntu 8.04 (Hardy Heron)")]
    pub operating_system: String,
    pub last_poll: Option<String>,
    pub uploads_per_day: i32,
    pub created: String,
}

impl From<&Factory> for FactorySummary {
    fn from(factory: &Factory) -> Self {
        Self {
            name: factory.name.to_string(),
            architecture: factory.architecture.name.clone(),
            operating_system: factory.operating_system.label(),
            last_poll: factory.last_poll.map(|at| at.to_rfc3339()),
            uploads_per_day: factory.uploads_per_day,
            created: factory.created.to_rfc3339(),
        }
    }
}

/// Response for `GET /api/v1/factories`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FactoryListResponse {
    pub factories: Vec<FactorySummary>,
}

impl FactoryListResponse {
    pub fn from_factories(factories: &[Factory]) -> Self {
        Self {
            factories: factories.iter().map(FactorySummary::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrowserView {
    pub id: i32,
    #[schema(example = "Firefox 3.0.1")]
    pub name: String,
    pub engine: String,
    pub engine_version: String,
    pub javascript: Option<String>,
    pub java: Option<String>,
    pub flash: Option<String>,
    /// Present for the factory admin only.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub command: Option<String>,
    pub active: bool,
}

impl From<&Browser> for BrowserView {
    fn from(browser: &Browser) -> Self {
        Self {
            id: browser.id,
            name: browser.display_name(),
            engine: browser.engine.clone(),
            engine_version: browser.engine_version.clone(),
            javascript: browser.javascript.clone(),
            java: browser.java.clone(),
            flash: browser.flash.clone(),
            command: browser.command.clone(),
            active: browser.active,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotView {
    pub id: i32,
    pub website_url: String,
    pub width: i32,
    pub height: i32,
    pub created: String,
    /// Display name of the producing browser, if still attached.
    pub browser: Option<String>,
}

impl From<&RecentScreenshot> for ScreenshotView {
    fn from(recent: &RecentScreenshot) -> Self {
        let shot = &recent.screenshot;
        Self {
            id: shot.id,
            website_url: shot.website_url.clone(),
            width: shot.width,
            height: shot.height,
            created: shot.created.to_rfc3339(),
            browser: recent.browser.as_ref().map(Browser::display_name),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemReportView {
    pub id: i32,
    pub screenshot_id: i32,
    pub code: i32,
    pub message: String,
    pub reported: String,
}

impl From<&ProblemReport> for ProblemReportView {
    fn from(report: &ProblemReport) -> Self {
        Self {
            id: report.id,
            screenshot_id: report.screenshot_id,
            code: report.code,
            message: report.message.clone(),
            reported: report.reported.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScreenSizeView {
    pub width: i32,
    pub height: i32,
}

impl From<&ScreenSize> for ScreenSizeView {
    fn from(size: &ScreenSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

/// Response for `GET /api/v1/factories/{name}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FactoryDetailResponse {
    pub factory: FactorySummary,
    pub browsers: Vec<BrowserView>,
    pub screenshots: Vec<ScreenshotView>,
    pub problems: Vec<ProblemReportView>,
    pub screen_sizes: Vec<ScreenSizeView>,
    /// Bits per pixel, ascending.
    pub color_depths: Vec<i32>,
    pub admin_logged_in: bool,
    pub show_commands: bool,
}

impl From<&FactoryDetails> for FactoryDetailResponse {
    fn from(details: &FactoryDetails) -> Self {
        Self {
            factory: FactorySummary::from(&details.factory),
            browsers: details.browsers.iter().map(BrowserView::from).collect(),
            screenshots: details.screenshots.iter().map(ScreenshotView::from).collect(),
            problems: details.problems.iter().map(ProblemReportView::from).collect(),
            screen_sizes: details.screen_sizes.iter().map(ScreenSizeView::from).collect(),
            color_depths: details
                .color_depths
                .iter()
                .map(|ColorDepth { bits_per_pixel }| *bits_per_pixel)
                .collect(),
            admin_logged_in: details.admin_logged_in,
            show_commands: details.show_commands,
        }
    }
}

/// Urlencoded body of `POST /api/v1/factories/add`.
///
/// Missing fields bind as empty strings so they surface as "required"
/// errors rather than a malformed request.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct RegistrationRequest {
    pub name: String,
    #[schema(example = "1")]
    pub architecture: String,
    #[schema(example = "1")]
    pub operating_system: String,
}

impl From<RegistrationRequest> for FactoryRegistrationForm {
    fn from(request: RegistrationRequest) -> Self {
        Self {
            name: request.name,
            architecture: request.architecture,
            operating_system: request.operating_system,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChoiceView {
    /// Value to submit for this option.
    pub value: String,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationChoicesView {
    pub architectures: Vec<ChoiceView>,
    pub operating_systems: Vec<ChoiceView>,
}

impl From<&RegistrationChoices> for RegistrationChoicesView {
    fn from(choices: &RegistrationChoices) -> Self {
        Self {
            architectures: choices
                .architectures
                .iter()
                .map(|arch| ChoiceView {
                    value: arch.id.to_string(),
                    label: arch.name.clone(),
                })
                .collect(),
            operating_systems: choices
                .operating_systems
                .iter()
                .map(|os| ChoiceView {
                    value: os.id.to_string(),
                    label: os.label(),
                })
                .collect(),
        }
    }
}

/// Registration form as rendered to the client.
///
/// `errors` is keyed by field name (`name`, `architecture`,
/// `operating_system`).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationFormView {
    #[schema(example = "register a new screenshot factory")]
    pub title: String,
    #[schema(example = "register")]
    pub submit: String,
    #[schema(example = "name")]
    pub focus: String,
    pub values: RegistrationRequest,
    pub errors: BTreeMap<String, Vec<String>>,
    pub non_field_errors: Vec<String>,
    pub choices: RegistrationChoicesView,
}

impl RegistrationFormView {
    /// Blank form offering `choices`.
    pub fn empty(choices: &RegistrationChoices) -> Self {
        Self::render(&FactoryRegistrationForm::default(), &FormErrors::default(), choices)
    }

    /// Re-render submitted values with their errors.
    pub fn render(
        form: &FactoryRegistrationForm,
        errors: &FormErrors,
        choices: &RegistrationChoices,
    ) -> Self {
        Self {
            title: REGISTRATION_TITLE.to_owned(),
            submit: REGISTRATION_SUBMIT.to_owned(),
            focus: "name".to_owned(),
            values: RegistrationRequest {
                name: form.name.clone(),
                architecture: form.architecture.clone(),
                operating_system: form.operating_system.clone(),
            },
            errors: errors
                .fields()
                .map(|(field, messages)| (field.as_str().to_owned(), messages.to_vec()))
                .collect(),
            non_field_errors: errors.non_field().to_vec(),
            choices: RegistrationChoicesView::from(choices),
        }
    }
}
