//! Screenshot factory aggregate and its naming policy.
//!
//! A factory is a worker machine that polls the server for rendering jobs.
//! Its name is chosen by the operator at registration time and doubles as a
//! URL path segment, which is why the character set is restricted and a few
//! words that collide with server routes are reserved.

use std::fmt;

use chrono::{DateTime, Utc};

use super::UserId;

/// Maximum length of a factory name, matching the storage column width.
pub const FACTORY_NAME_MAX: usize = 20;

/// Names that clash with server routes or host names.
pub const RESERVED_FACTORY_NAMES: [&str; 5] = ["localhost", "server", "factory", "shotfactory", "add"];

/// Reasons a candidate factory name is rejected.
///
/// The `Display` output is the message shown next to the form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryNameError {
    Empty,
    TooLong { max: usize },
    InvalidFirstCharacter,
    InvalidCharacter,
    Reserved,
}

impl fmt::Display for FactoryNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "This field is required."),
            Self::TooLong { max } => {
                write!(f, "Ensure this value has at most {max} characters.")
            }
            Self::InvalidFirstCharacter => write!(f, "Name must start with a lowercase letter."),
            Self::InvalidCharacter => write!(
                f,
                "Name may contain only lowercase letters, digits, underscore, hyphen."
            ),
            Self::Reserved => write!(f, "This name is reserved."),
        }
    }
}

impl std::error::Error for FactoryNameError {}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-'
}

/// Validated factory name.
///
/// ## Invariants
/// - 1 to [`FACTORY_NAME_MAX`] characters.
/// - First character is `a-z`; the rest are `a-z`, `0-9`, `_` or `-`.
/// - Not one of [`RESERVED_FACTORY_NAMES`].
///
/// # Examples
/// ```
/// use shotserver::domain::{FactoryName, FactoryNameError};
///
/// assert!(FactoryName::new("linux-box_01").is_ok());
/// assert_eq!(FactoryName::new("9lives"), Err(FactoryNameError::InvalidFirstCharacter));
/// assert_eq!(FactoryName::new("add"), Err(FactoryNameError::Reserved));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactoryName(String);

impl FactoryName {
    /// Validate and construct a factory name.
    ///
    /// Checks run in a fixed order and the first failure is reported.
    pub fn new(name: impl Into<String>) -> Result<Self, FactoryNameError> {
        let name = name.into();
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return Err(FactoryNameError::Empty);
        };
        if name.chars().count() > FACTORY_NAME_MAX {
            return Err(FactoryNameError::TooLong {
                max: FACTORY_NAME_MAX,
            });
        }
        if !first.is_ascii_lowercase() {
            return Err(FactoryNameError::InvalidFirstCharacter);
        }
        if !chars.all(is_name_char) {
            return Err(FactoryNameError::InvalidCharacter);
        }
        if RESERVED_FACTORY_NAMES.contains(&name.as_str()) {
            return Err(FactoryNameError::Reserved);
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for FactoryName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FactoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<FactoryName> for String {
    fn from(value: FactoryName) -> Self {
        value.0
    }
}

impl TryFrom<String> for FactoryName {
    type Error = FactoryNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// CPU architecture a factory runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Architecture {
    pub id: i32,
    pub name: String,
}

/// Operating system a factory runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatingSystem {
    pub id: i32,
    pub distro: String,
    pub version: String,
    pub codename: String,
}

impl OperatingSystem {
    /// Human-readable label such as `Ubuntu 8.04 (Hardy Heron)`.
    ///
    /// Empty parts are omitted.
    pub fn label(&self) -> String {
        let mut label = self.distro.clone();
        if !self.version.is_empty() {
            if !label.is_empty() {
                label.push(' ');
            }
            label.push_str(&self.version);
        }
        if !self.codename.is_empty() {
            if !label.is_empty() {
                label.push(' ');
            }
            label.push('(');
            label.push_str(&self.codename);
            label.push(')');
        }
        label
    }
}

/// A registered screenshot factory.
#[derive(Debug, Clone, PartialEq)]
pub struct Factory {
    pub id: i32,
    pub name: FactoryName,
    pub admin: UserId,
    pub architecture: Architecture,
    pub operating_system: OperatingSystem,
    /// `None` until the factory polls for the first time.
    pub last_poll: Option<DateTime<Utc>>,
    pub uploads_per_day: i32,
    pub created: DateTime<Utc>,
}

impl Factory {
    /// Whether `viewer` owns this factory.
    pub fn is_administered_by(&self, viewer: Option<&UserId>) -> bool {
        viewer.is_some_and(|id| *id == self.admin)
    }
}

/// Values required to insert a factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFactory {
    pub name: FactoryName,
    pub admin: UserId,
    pub architecture_id: i32,
    pub operating_system_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a")]
    #[case("box")]
    #[case("linux-box_01")]
    #[case("z9-_")]
    #[case("abcdefghijklmnopqrst")]
    #[case("localhost2")]
    #[case("adder")]
    fn accepts_valid_names(#[case] raw: &str) {
        let name = FactoryName::new(raw).expect("name should be accepted");
        assert_eq!(name.as_ref(), raw);
    }

    #[rstest]
    #[case("Box")]
    #[case("9lives")]
    #[case("_hidden")]
    #[case("-dash")]
    #[case(" box")]
    #[case("éclair")]
    fn rejects_names_not_starting_with_lowercase_letter(#[case] raw: &str) {
        assert_eq!(
            FactoryName::new(raw),
            Err(FactoryNameError::InvalidFirstCharacter)
        );
    }

    #[rstest]
    #[case("boX")]
    #[case("my box")]
    #[case("dot.name")]
    #[case("slash/name")]
    #[case("caf\u{e9}")]
    #[case("trailing ")]
    fn rejects_names_with_characters_outside_charset(#[case] raw: &str) {
        assert_eq!(FactoryName::new(raw), Err(FactoryNameError::InvalidCharacter));
    }

    #[rstest]
    fn rejects_every_reserved_name() {
        for reserved in RESERVED_FACTORY_NAMES {
            assert_eq!(
                FactoryName::new(reserved),
                Err(FactoryNameError::Reserved),
                "{reserved} must be reserved"
            );
        }
    }

    #[rstest]
    fn rejects_empty_and_overlong_names() {
        assert_eq!(FactoryName::new(""), Err(FactoryNameError::Empty));
        assert_eq!(
            FactoryName::new("a".repeat(FACTORY_NAME_MAX + 1)),
            Err(FactoryNameError::TooLong {
                max: FACTORY_NAME_MAX
            })
        );
    }

    #[rstest]
    fn error_messages_match_form_copy() {
        assert_eq!(
            FactoryNameError::InvalidFirstCharacter.to_string(),
            "Name must start with a lowercase letter."
        );
        assert_eq!(
            FactoryNameError::InvalidCharacter.to_string(),
            "Name may contain only lowercase letters, digits, underscore, hyphen."
        );
        assert_eq!(FactoryNameError::Reserved.to_string(), "This name is reserved.");
    }

    #[rstest]
    #[case("Ubuntu", "8.04", "Hardy Heron", "Ubuntu 8.04 (Hardy Heron)")]
    #[case("Windows", "XP", "", "Windows XP")]
    #[case("Debian", "", "", "Debian")]
    fn operating_system_label_skips_empty_parts(
        #[case] distro: &str,
        #[case] version: &str,
        #[case] codename: &str,
        #[case] expected: &str,
    ) {
        let os = OperatingSystem {
            id: 1,
            distro: distro.to_owned(),
            version: version.to_owned(),
            codename: codename.to_owned(),
        };
        assert_eq!(os.label(), expected);
    }
}
