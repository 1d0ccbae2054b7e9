//! PostgreSQL-backed `FactoryRepository` implementation using Diesel ORM.
//!
//! Factory reads join their architecture and operating-system rows directly.
//! Browser lookup labels are batch-loaded with one `id = ANY(...)` query per
//! lookup table so the number of round trips does not grow with the number
//! of browsers.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{FactoryInsertError, FactoryRepository, FactoryRepositoryError};
use crate::domain::{
    Architecture, Browser, ColorDepth, Factory, FactoryName, NewFactory, OperatingSystem,
    ProblemReport, RegistrationChoices, ScreenSize, Screenshot, UserId,
};

use super::diesel_helpers::{
    map_diesel_error, map_insert_error, map_pool_error, map_pool_error_message,
};
use super::models::{
    ArchitectureRow, BrowserRow, FactoryRow, NewFactoryRow, OperatingSystemRow, ProblemReportRow,
    ScreenshotRow,
};
use super::pool::DbPool;
use super::schema::{
    architectures, browser_groups, browsers, engines, factories, factory_color_depths,
    factory_screen_sizes, flash_versions, java_versions, javascript_versions, operating_systems,
    problem_reports, screenshots, websites,
};

type FactoryJoinRow = (FactoryRow, ArchitectureRow, OperatingSystemRow);

/// Diesel-backed implementation of the factory repository port.
#[derive(Clone)]
pub struct DieselFactoryRepository {
    pool: DbPool,
}

impl DieselFactoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Row conversion
// ---------------------------------------------------------------------------

fn architecture_from_row(row: ArchitectureRow) -> Architecture {
    Architecture {
        id: row.id,
        name: row.name,
    }
}

fn operating_system_from_row(row: OperatingSystemRow) -> OperatingSystem {
    OperatingSystem {
        id: row.id,
        distro: row.distro,
        version: row.version,
        codename: row.codename,
    }
}

fn factory_from_rows(
    (row, architecture, operating_system): FactoryJoinRow,
) -> Result<Factory, String> {
    let name = FactoryName::new(row.name.as_str())
        .map_err(|err| format!("stored factory name {:?} is invalid: {err}", row.name))?;
    Ok(Factory {
        id: row.id,
        name,
        admin: UserId::from_uuid(row.admin_id),
        architecture: architecture_from_row(architecture),
        operating_system: operating_system_from_row(operating_system),
        last_poll: row.last_poll,
        uploads_per_day: row.uploads_per_day,
        created: row.created,
    })
}

fn unique_ids(ids: impl Iterator<Item = i32>) -> Vec<i32> {
    ids.collect::<BTreeSet<_>>().into_iter().collect()
}

fn required_label(labels: &HashMap<i32, String>, id: i32, kind: &str) -> Result<String, String> {
    labels
        .get(&id)
        .cloned()
        .ok_or_else(|| format!("{kind} {id} referenced by a browser is missing"))
}

fn optional_label(labels: &HashMap<i32, String>, id: Option<i32>) -> Option<String> {
    id.and_then(|id| labels.get(&id).cloned())
}

struct BrowserLabels {
    groups: HashMap<i32, String>,
    engines: HashMap<i32, String>,
    javascript: HashMap<i32, String>,
    java: HashMap<i32, String>,
    flash: HashMap<i32, String>,
}

fn browser_from_row(row: BrowserRow, labels: &BrowserLabels) -> Result<Browser, String> {
    Ok(Browser {
        id: row.id,
        factory_id: row.factory_id,
        group: required_label(&labels.groups, row.browser_group_id, "browser group")?,
        version: row.version,
        engine: required_label(&labels.engines, row.engine_id, "engine")?,
        engine_version: row.engine_version,
        javascript: optional_label(&labels.javascript, row.javascript_id),
        java: optional_label(&labels.java, row.java_id),
        flash: optional_label(&labels.flash, row.flash_id),
        command: row.command,
        active: row.active,
    })
}

fn screenshot_from_row((row, url, profanities): (ScreenshotRow, String, i32)) -> Screenshot {
    Screenshot {
        id: row.id,
        factory_id: row.factory_id,
        browser_id: row.browser_id,
        website_url: url,
        website_profanities: profanities,
        width: row.width,
        height: row.height,
        created: row.created,
    }
}

fn problem_report_from_row(row: ProblemReportRow) -> ProblemReport {
    ProblemReport {
        id: row.id,
        screenshot_id: row.screenshot_id,
        code: row.code,
        message: row.message,
        reported: row.reported,
    }
}

/// Load `(id, label)` pairs for the given ids from a lookup table.
macro_rules! load_labels {
    ($conn:expr, $table:ident, $label:ident, $ids:expr) => {{
        let ids: Vec<i32> = $ids;
        if ids.is_empty() {
            HashMap::new()
        } else {
            $table::table
                .filter($table::id.eq_any(ids))
                .select(($table::id, $table::$label))
                .load::<(i32, String)>($conn)
                .await
                .map_err(map_diesel_error)?
                .into_iter()
                .collect::<HashMap<i32, String>>()
        }
    }};
}

// ---------------------------------------------------------------------------
// Trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl FactoryRepository for DieselFactoryRepository {
    async fn list_active(
        &self,
        polled_after: DateTime<Utc>,
    ) -> Result<Vec<Factory>, FactoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<FactoryJoinRow> = factories::table
            .inner_join(architectures::table)
            .inner_join(operating_systems::table)
            .filter(factories::last_poll.gt(polled_after))
            .order((factories::uploads_per_day.desc(), factories::name.asc()))
            .select((
                FactoryRow::as_select(),
                ArchitectureRow::as_select(),
                OperatingSystemRow::as_select(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(factory_from_rows)
            .collect::<Result<Vec<_>, _>>()
            .map_err(FactoryRepositoryError::query)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Factory>, FactoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<FactoryJoinRow> = factories::table
            .inner_join(architectures::table)
            .inner_join(operating_systems::table)
            .filter(factories::name.eq(name))
            .select((
                FactoryRow::as_select(),
                ArchitectureRow::as_select(),
                OperatingSystemRow::as_select(),
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(factory_from_rows)
            .transpose()
            .map_err(FactoryRepositoryError::query)
    }

    async fn browsers_for_factory(
        &self,
        factory_id: i32,
    ) -> Result<Vec<Browser>, FactoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BrowserRow> = browsers::table
            .filter(browsers::factory_id.eq(factory_id))
            .select(BrowserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let labels = BrowserLabels {
            groups: load_labels!(
                &mut conn,
                browser_groups,
                name,
                unique_ids(rows.iter().map(|row| row.browser_group_id))
            ),
            engines: load_labels!(
                &mut conn,
                engines,
                name,
                unique_ids(rows.iter().map(|row| row.engine_id))
            ),
            javascript: load_labels!(
                &mut conn,
                javascript_versions,
                version,
                unique_ids(rows.iter().filter_map(|row| row.javascript_id))
            ),
            java: load_labels!(
                &mut conn,
                java_versions,
                version,
                unique_ids(rows.iter().filter_map(|row| row.java_id))
            ),
            flash: load_labels!(
                &mut conn,
                flash_versions,
                version,
                unique_ids(rows.iter().filter_map(|row| row.flash_id))
            ),
        };

        rows.into_iter()
            .map(|row| browser_from_row(row, &labels))
            .collect::<Result<Vec<_>, _>>()
            .map_err(FactoryRepositoryError::query)
    }

    async fn recent_screenshots(
        &self,
        factory_id: i32,
        max_profanities: i32,
        limit: i64,
    ) -> Result<Vec<Screenshot>, FactoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(ScreenshotRow, String, i32)> = screenshots::table
            .inner_join(websites::table)
            .filter(screenshots::factory_id.eq(factory_id))
            .filter(websites::profanities.le(max_profanities))
            .order(screenshots::id.desc())
            .limit(limit)
            .select((ScreenshotRow::as_select(), websites::url, websites::profanities))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(screenshot_from_row).collect())
    }

    async fn recent_problem_reports(
        &self,
        factory_id: i32,
        limit: i64,
    ) -> Result<Vec<ProblemReport>, FactoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProblemReportRow> = problem_reports::table
            .inner_join(screenshots::table)
            .filter(screenshots::factory_id.eq(factory_id))
            .order(problem_reports::id.desc())
            .limit(limit)
            .select(ProblemReportRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(problem_report_from_row).collect())
    }

    async fn screen_sizes(
        &self,
        factory_id: i32,
    ) -> Result<Vec<ScreenSize>, FactoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(i32, i32)> = factory_screen_sizes::table
            .filter(factory_screen_sizes::factory_id.eq(factory_id))
            .order((factory_screen_sizes::width, factory_screen_sizes::height))
            .select((factory_screen_sizes::width, factory_screen_sizes::height))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(width, height)| ScreenSize { width, height })
            .collect())
    }

    async fn color_depths(
        &self,
        factory_id: i32,
    ) -> Result<Vec<ColorDepth>, FactoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<i32> = factory_color_depths::table
            .filter(factory_color_depths::factory_id.eq(factory_id))
            .order(factory_color_depths::bits_per_pixel)
            .select(factory_color_depths::bits_per_pixel)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|bits_per_pixel| ColorDepth { bits_per_pixel })
            .collect())
    }

    async fn registration_choices(&self) -> Result<RegistrationChoices, FactoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let architecture_rows: Vec<ArchitectureRow> = architectures::table
            .order(architectures::name)
            .select(ArchitectureRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let os_rows: Vec<OperatingSystemRow> = operating_systems::table
            .order((
                operating_systems::distro,
                operating_systems::version,
                operating_systems::codename,
            ))
            .select(OperatingSystemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(RegistrationChoices {
            architectures: architecture_rows
                .into_iter()
                .map(architecture_from_row)
                .collect(),
            operating_systems: os_rows.into_iter().map(operating_system_from_row).collect(),
        })
    }

    async fn insert(&self, factory: &NewFactory) -> Result<Factory, FactoryInsertError> {
        let name = factory.name.as_ref();
        let new_row = NewFactoryRow {
            name,
            admin_id: *factory.admin.as_uuid(),
            architecture_id: factory.architecture_id,
            operating_system_id: factory.operating_system_id,
        };
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| FactoryInsertError::connection(map_pool_error_message(err)))?;

        // The unique index on `name` arbitrates concurrent registrations; a
        // violation aborts and rolls back this transaction.
        let stored: FactoryJoinRow = conn
            .transaction(|conn| {
                async move {
                    let id: i32 = diesel::insert_into(factories::table)
                        .values(&new_row)
                        .returning(factories::id)
                        .get_result(conn)
                        .await?;
                    factories::table
                        .inner_join(architectures::table)
                        .inner_join(operating_systems::table)
                        .filter(factories::id.eq(id))
                        .select((
                            FactoryRow::as_select(),
                            ArchitectureRow::as_select(),
                            OperatingSystemRow::as_select(),
                        ))
                        .first(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_insert_error(err, name))?;

        factory_from_rows(stored).map_err(FactoryInsertError::query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn labels() -> BrowserLabels {
        BrowserLabels {
            groups: HashMap::from([(1, "Firefox".to_owned())]),
            engines: HashMap::from([(2, "Gecko".to_owned())]),
            javascript: HashMap::from([(3, "1.8".to_owned())]),
            java: HashMap::new(),
            flash: HashMap::from([(5, "9.0".to_owned())]),
        }
    }

    fn row(browser_group_id: i32) -> BrowserRow {
        BrowserRow {
            id: 10,
            factory_id: 4,
            browser_group_id,
            version: "3.0".to_owned(),
            engine_id: 2,
            engine_version: "1.9".to_owned(),
            javascript_id: Some(3),
            java_id: None,
            flash_id: Some(5),
            command: None,
            active: true,
        }
    }

    #[rstest]
    fn browser_rows_resolve_preloaded_labels() {
        let browser = browser_from_row(row(1), &labels()).expect("labels resolve");
        assert_eq!(browser.display_name(), "Firefox 3.0");
        assert_eq!(browser.engine, "Gecko");
        assert_eq!(browser.javascript.as_deref(), Some("1.8"));
        assert_eq!(browser.java, None);
        assert_eq!(browser.flash.as_deref(), Some("9.0"));
    }

    #[rstest]
    fn missing_required_label_is_reported() {
        let error = browser_from_row(row(99), &labels()).expect_err("group 99 is unknown");
        assert!(error.contains("browser group 99"));
    }

    #[rstest]
    fn unique_ids_dedupes_and_sorts() {
        assert_eq!(unique_ids([3, 1, 3, 2, 1].into_iter()), vec![1, 2, 3]);
    }

    #[rstest]
    fn stored_rows_with_invalid_names_are_rejected() {
        let now = Utc::now();
        let rows = (
            FactoryRow {
                id: 1,
                name: "Legacy Box".to_owned(),
                admin_id: uuid::Uuid::nil(),
                last_poll: None,
                uploads_per_day: 0,
                created: now,
            },
            ArchitectureRow {
                id: 1,
                name: "ppc".to_owned(),
            },
            OperatingSystemRow {
                id: 1,
                distro: "Mac OS X".to_owned(),
                version: "10.4".to_owned(),
                codename: "Tiger".to_owned(),
            },
        );
        assert!(factory_from_rows(rows).is_err());
    }
}
