//! Mutex-guarded factory store.
//!
//! Every operation takes the single state lock, so the name check and the
//! insert in [`FactoryRepository::insert`] happen atomically, mirroring the
//! unique index of the PostgreSQL schema.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{FactoryInsertError, FactoryRepository, FactoryRepositoryError};
use crate::domain::{
    Architecture, Browser, ColorDepth, Factory, NewFactory, OperatingSystem, ProblemReport,
    RegistrationChoices, ScreenSize, Screenshot,
};

#[derive(Default)]
struct State {
    architectures: Vec<Architecture>,
    operating_systems: Vec<OperatingSystem>,
    factories: Vec<Factory>,
    browsers: Vec<Browser>,
    screenshots: Vec<Screenshot>,
    problems: Vec<ProblemReport>,
    screen_sizes: HashMap<i32, BTreeSet<ScreenSize>>,
    color_depths: HashMap<i32, BTreeSet<ColorDepth>>,
    next_id: i32,
}

impl State {
    fn allocate_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Factory repository held entirely in memory.
pub struct InMemoryFactoryRepository {
    state: Mutex<State>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryFactoryRepository {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl InMemoryFactoryRepository {
    /// Empty store stamping `created` with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            clock,
        }
    }

    /// Store pre-populated with common registration choices.
    pub fn with_default_choices(clock: Arc<dyn Clock>) -> Self {
        let repo = Self::new(clock);
        for name in ["x86_64", "i386", "ppc", "arm64"] {
            repo.add_architecture(name);
        }
        repo.add_operating_system("Debian", "12", "bookworm");
        repo.add_operating_system("Ubuntu", "24.04", "Noble Numbat");
        repo.add_operating_system("Windows", "XP", "");
        repo.add_operating_system("Mac OS X", "10.5", "Leopard");
        repo
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_architecture(&self, name: &str) -> Architecture {
        let mut state = self.lock();
        let architecture = Architecture {
            id: state.allocate_id(),
            name: name.to_owned(),
        };
        state.architectures.push(architecture.clone());
        architecture
    }

    pub fn add_operating_system(
        &self,
        distro: &str,
        version: &str,
        codename: &str,
    ) -> OperatingSystem {
        let mut state = self.lock();
        let operating_system = OperatingSystem {
            id: state.allocate_id(),
            distro: distro.to_owned(),
            version: version.to_owned(),
            codename: codename.to_owned(),
        };
        state.operating_systems.push(operating_system.clone());
        operating_system
    }

    /// Record a poll from the named factory.
    ///
    /// Returns `false` when no such factory exists.
    pub fn record_poll(&self, name: &str, at: DateTime<Utc>, uploads_per_day: i32) -> bool {
        let mut state = self.lock();
        match state
            .factories
            .iter_mut()
            .find(|factory| factory.name.as_ref() == name)
        {
            Some(factory) => {
                factory.last_poll = Some(at);
                factory.uploads_per_day = uploads_per_day;
                true
            }
            None => false,
        }
    }

    /// Store a browser; `id` is assigned by the store.
    pub fn add_browser(&self, mut browser: Browser) -> Browser {
        let mut state = self.lock();
        browser.id = state.allocate_id();
        state.browsers.push(browser.clone());
        browser
    }

    /// Store a screenshot; `id` is assigned by the store.
    pub fn add_screenshot(&self, mut screenshot: Screenshot) -> Screenshot {
        let mut state = self.lock();
        screenshot.id = state.allocate_id();
        state.screenshots.push(screenshot.clone());
        screenshot
    }

    /// Store a problem report; `id` is assigned by the store.
    pub fn add_problem_report(&self, mut report: ProblemReport) -> ProblemReport {
        let mut state = self.lock();
        report.id = state.allocate_id();
        state.problems.push(report.clone());
        report
    }

    pub fn add_screen_size(&self, factory_id: i32, size: ScreenSize) {
        self.lock()
            .screen_sizes
            .entry(factory_id)
            .or_default()
            .insert(size);
    }

    pub fn add_color_depth(&self, factory_id: i32, depth: ColorDepth) {
        self.lock()
            .color_depths
            .entry(factory_id)
            .or_default()
            .insert(depth);
    }

    /// Number of stored factories called `name`.
    pub fn count_named(&self, name: &str) -> usize {
        self.lock()
            .factories
            .iter()
            .filter(|factory| factory.name.as_ref() == name)
            .count()
    }
}

fn take_newest<T>(mut items: Vec<T>, id: impl Fn(&T) -> i32, limit: i64) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(id(item)));
    items.truncate(usize::try_from(limit).unwrap_or(0));
    items
}

#[async_trait]
impl FactoryRepository for InMemoryFactoryRepository {
    async fn list_active(
        &self,
        polled_after: DateTime<Utc>,
    ) -> Result<Vec<Factory>, FactoryRepositoryError> {
        let mut active: Vec<Factory> = self
            .lock()
            .factories
            .iter()
            .filter(|factory| factory.last_poll.is_some_and(|poll| poll > polled_after))
            .cloned()
            .collect();
        active.sort_by(|a, b| {
            b.uploads_per_day
                .cmp(&a.uploads_per_day)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(active)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Factory>, FactoryRepositoryError> {
        Ok(self
            .lock()
            .factories
            .iter()
            .find(|factory| factory.name.as_ref() == name)
            .cloned())
    }

    async fn browsers_for_factory(
        &self,
        factory_id: i32,
    ) -> Result<Vec<Browser>, FactoryRepositoryError> {
        Ok(self
            .lock()
            .browsers
            .iter()
            .filter(|browser| browser.factory_id == factory_id)
            .cloned()
            .collect())
    }

    async fn recent_screenshots(
        &self,
        factory_id: i32,
        max_profanities: i32,
        limit: i64,
    ) -> Result<Vec<Screenshot>, FactoryRepositoryError> {
        let matching: Vec<Screenshot> = self
            .lock()
            .screenshots
            .iter()
            .filter(|shot| shot.factory_id == factory_id)
            .filter(|shot| shot.website_profanities <= max_profanities)
            .cloned()
            .collect();
        Ok(take_newest(matching, |shot| shot.id, limit))
    }

    async fn recent_problem_reports(
        &self,
        factory_id: i32,
        limit: i64,
    ) -> Result<Vec<ProblemReport>, FactoryRepositoryError> {
        let state = self.lock();
        let shot_ids: BTreeSet<i32> = state
            .screenshots
            .iter()
            .filter(|shot| shot.factory_id == factory_id)
            .map(|shot| shot.id)
            .collect();
        let matching: Vec<ProblemReport> = state
            .problems
            .iter()
            .filter(|report| shot_ids.contains(&report.screenshot_id))
            .cloned()
            .collect();
        Ok(take_newest(matching, |report| report.id, limit))
    }

    async fn screen_sizes(
        &self,
        factory_id: i32,
    ) -> Result<Vec<ScreenSize>, FactoryRepositoryError> {
        Ok(self
            .lock()
            .screen_sizes
            .get(&factory_id)
            .map(|sizes| sizes.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn color_depths(
        &self,
        factory_id: i32,
    ) -> Result<Vec<ColorDepth>, FactoryRepositoryError> {
        Ok(self
            .lock()
            .color_depths
            .get(&factory_id)
            .map(|depths| depths.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn registration_choices(&self) -> Result<RegistrationChoices, FactoryRepositoryError> {
        let state = self.lock();
        let mut architectures = state.architectures.clone();
        architectures.sort_by(|a, b| a.name.cmp(&b.name));
        let mut operating_systems = state.operating_systems.clone();
        operating_systems.sort_by(|a, b| {
            (&a.distro, &a.version, &a.codename).cmp(&(&b.distro, &b.version, &b.codename))
        });
        Ok(RegistrationChoices {
            architectures,
            operating_systems,
        })
    }

    async fn insert(&self, factory: &NewFactory) -> Result<Factory, FactoryInsertError> {
        let created = self.clock.utc();
        let mut state = self.lock();
        if state
            .factories
            .iter()
            .any(|existing| existing.name == factory.name)
        {
            return Err(FactoryInsertError::unique_violation(factory.name.as_ref()));
        }
        let architecture = state
            .architectures
            .iter()
            .find(|arch| arch.id == factory.architecture_id)
            .cloned()
            .ok_or_else(|| {
                FactoryInsertError::query(format!(
                    "architecture {} does not exist",
                    factory.architecture_id
                ))
            })?;
        let operating_system = state
            .operating_systems
            .iter()
            .find(|os| os.id == factory.operating_system_id)
            .cloned()
            .ok_or_else(|| {
                FactoryInsertError::query(format!(
                    "operating system {} does not exist",
                    factory.operating_system_id
                ))
            })?;

        let stored = Factory {
            id: state.allocate_id(),
            name: factory.name.clone(),
            admin: factory.admin,
            architecture,
            operating_system,
            last_poll: None,
            uploads_per_day: 0,
            created,
        };
        state.factories.push(stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FactoryName, UserId};
    use chrono::TimeDelta;
    use rstest::{fixture, rstest};

    #[fixture]
    fn repo() -> Arc<InMemoryFactoryRepository> {
        Arc::new(InMemoryFactoryRepository::with_default_choices(Arc::new(
            DefaultClock,
        )))
    }

    async fn register(
        repo: &InMemoryFactoryRepository,
        name: &str,
    ) -> Result<Factory, FactoryInsertError> {
        let choices = repo.registration_choices().await.expect("choices");
        repo.insert(&NewFactory {
            name: FactoryName::new(name).expect("valid name"),
            admin: UserId::random(),
            architecture_id: choices.architectures[0].id,
            operating_system_id: choices.operating_systems[0].id,
        })
        .await
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_names_are_unique_violations(repo: Arc<InMemoryFactoryRepository>) {
        register(&repo, "hardy").await.expect("first insert");
        let error = register(&repo, "hardy").await.expect_err("second insert");
        assert_eq!(error, FactoryInsertError::unique_violation("hardy"));
        assert_eq!(repo.count_named("hardy"), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn concurrent_inserts_store_one_row(repo: Arc<InMemoryFactoryRepository>) {
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { register(&repo, "racer").await })
            })
            .collect();
        let mut successes = 0;
        for task in tasks {
            if task.await.expect("task joins").is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(repo.count_named("racer"), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn list_active_filters_by_cutoff(repo: Arc<InMemoryFactoryRepository>) {
        let now = Utc::now();
        register(&repo, "fresh").await.expect("insert");
        register(&repo, "stale").await.expect("insert");
        register(&repo, "never").await.expect("insert");
        assert!(repo.record_poll("fresh", now, 3));
        assert!(repo.record_poll("stale", now - TimeDelta::minutes(30), 50));

        let active = repo
            .list_active(now - TimeDelta::minutes(10))
            .await
            .expect("list");
        let names: Vec<&str> = active.iter().map(|f| f.name.as_ref()).collect();
        assert_eq!(names, vec!["fresh"]);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_choice_ids_fail_the_insert(repo: Arc<InMemoryFactoryRepository>) {
        let error = repo
            .insert(&NewFactory {
                name: FactoryName::new("orphan").expect("valid name"),
                admin: UserId::random(),
                architecture_id: 999,
                operating_system_id: 999,
            })
            .await
            .expect_err("dangling reference");
        assert!(matches!(error, FactoryInsertError::Query { .. }));
    }
}
