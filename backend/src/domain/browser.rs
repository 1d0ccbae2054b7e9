//! Browsers installed on a screenshot factory.

use std::cmp::Ordering;

/// A browser installation belonging to one factory.
///
/// Lookup labels (group, engine, plugin versions) are resolved by the
/// repository before the value reaches the domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Browser {
    pub id: i32,
    pub factory_id: i32,
    pub group: String,
    pub version: String,
    pub engine: String,
    pub engine_version: String,
    pub javascript: Option<String>,
    pub java: Option<String>,
    pub flash: Option<String>,
    /// Operator-supplied launch command, visible to the factory admin only.
    pub command: Option<String>,
    pub active: bool,
}

impl Browser {
    /// Display form, for example `Firefox 3.0.1`.
    pub fn display_name(&self) -> String {
        if self.version.is_empty() {
            return self.group.clone();
        }
        format!("{} {}", self.group, self.version)
    }

    /// Whether the browser carries a non-empty command. Whitespace counts.
    pub fn has_command(&self) -> bool {
        self.command.as_deref().is_some_and(|command| !command.is_empty())
    }

    fn display_order(&self, other: &Self) -> Ordering {
        self.display_name()
            .cmp(&other.display_name())
            .then(self.id.cmp(&other.id))
    }
}

/// Sort browsers by display string, then id.
pub fn sort_browsers_for_display(browsers: &mut [Browser]) {
    browsers.sort_by(Browser::display_order);
}
