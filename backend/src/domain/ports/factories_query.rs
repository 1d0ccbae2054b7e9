//! Driving port for the factory listing and detail pages.

use async_trait::async_trait;

use crate::domain::{
    Browser, ColorDepth, Error, Factory, ProblemReport, RecentScreenshot, ScreenSize, UserId,
};

/// Everything the detail page shows about one factory.
#[derive(Debug, Clone, PartialEq)]
pub struct FactoryDetails {
    pub factory: Factory,
    /// Sorted by display name, then id.
    pub browsers: Vec<Browser>,
    pub screenshots: Vec<RecentScreenshot>,
    pub problems: Vec<ProblemReport>,
    pub screen_sizes: Vec<ScreenSize>,
    pub color_depths: Vec<ColorDepth>,
    /// The viewer administers this factory.
    pub admin_logged_in: bool,
    /// Admin is viewing and at least one browser carries a command.
    pub show_commands: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FactoriesQuery: Send + Sync {
    /// Factories that polled within the freshness window, busiest first.
    ///
    /// An empty window is reported as `service_unavailable`.
    async fn list_active(&self) -> Result<Vec<Factory>, Error>;

    /// Detail view of the named factory for an optional viewer.
    async fn factory_details(
        &self,
        name: &str,
        viewer: Option<UserId>,
    ) -> Result<FactoryDetails, Error>;
}
