//! Internal Diesel row structs.
//!
//! These never leave the persistence layer; repositories convert them into
//! domain values.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    architectures, browsers, factories, operating_systems, problem_reports, screenshots,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = architectures)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ArchitectureRow {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = operating_systems)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OperatingSystemRow {
    pub id: i32,
    pub distro: String,
    pub version: String,
    pub codename: String,
}

/// Row struct for reading from the factories table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = factories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FactoryRow {
    pub id: i32,
    pub name: String,
    pub admin_id: Uuid,
    pub last_poll: Option<DateTime<Utc>>,
    pub uploads_per_day: i32,
    pub created: DateTime<Utc>,
}

/// Insertable struct for registering a factory.
///
/// `last_poll`, `uploads_per_day` and `created` use column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = factories)]
pub(crate) struct NewFactoryRow<'a> {
    pub name: &'a str,
    pub admin_id: Uuid,
    pub architecture_id: i32,
    pub operating_system_id: i32,
}

/// Browser row with lookup ids still unresolved.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = browsers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BrowserRow {
    pub id: i32,
    pub factory_id: i32,
    pub browser_group_id: i32,
    pub version: String,
    pub engine_id: i32,
    pub engine_version: String,
    pub javascript_id: Option<i32>,
    pub java_id: Option<i32>,
    pub flash_id: Option<i32>,
    pub command: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = screenshots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ScreenshotRow {
    pub id: i32,
    pub factory_id: i32,
    pub browser_id: i32,
    pub width: i32,
    pub height: i32,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = problem_reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProblemReportRow {
    pub id: i32,
    pub screenshot_id: i32,
    pub code: i32,
    pub message: String,
    pub reported: DateTime<Utc>,
}
