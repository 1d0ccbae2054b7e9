//! Factory registration form schema.
//!
//! The form is bound from raw submitted strings and validated in a single
//! pass so that every field error is reported at once. Persistence-time
//! failures (name already taken, store unavailable) are appended to the same
//! [`FormErrors`] by the registration service.

use std::collections::BTreeMap;
use std::fmt;

use super::{Architecture, Factory, FactoryName, NewFactory, OperatingSystem, UserId};

/// Message for a missing required value.
pub const REQUIRED_MESSAGE: &str = "This field is required.";
/// Message for a choice id that does not match an available option.
pub const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
/// Message attached to `name` when the store reports a uniqueness conflict.
pub const NAME_TAKEN_MESSAGE: &str = "This name is already taken.";
/// Non-field message shown when the insert fails for any other reason.
pub const SAVE_FAILED_MESSAGE: &str = "The factory could not be saved. Please try again later.";

/// Fields of the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Name,
    Architecture,
    OperatingSystem,
}

impl FormField {
    /// Wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Architecture => "architecture",
            Self::OperatingSystem => "operating_system",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level and form-level errors collected during registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<FormField, Vec<String>>,
    non_field: Vec<String>,
}

impl FormErrors {
    pub fn add_field(&mut self, field: FormField, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    /// Messages recorded against `field`, oldest first.
    pub fn field(&self, field: FormField) -> &[String] {
        self.fields.get(&field).map_or(&[], Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = (FormField, &[String])> {
        self.fields
            .iter()
            .map(|(field, messages)| (*field, messages.as_slice()))
    }

    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }
}

/// Options offered by the registration form's choice fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationChoices {
    pub architectures: Vec<Architecture>,
    pub operating_systems: Vec<OperatingSystem>,
}

impl RegistrationChoices {
    fn has_architecture(&self, id: i32) -> bool {
        self.architectures.iter().any(|arch| arch.id == id)
    }

    fn has_operating_system(&self, id: i32) -> bool {
        self.operating_systems.iter().any(|os| os.id == id)
    }
}

/// Raw values submitted for registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactoryRegistrationForm {
    pub name: String,
    pub architecture: String,
    pub operating_system: String,
}

/// Registration values that passed every field validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub name: FactoryName,
    pub architecture_id: i32,
    pub operating_system_id: i32,
}

impl ValidRegistration {
    /// Attach the owning user to produce an insertable factory.
    pub fn into_new_factory(self, admin: UserId) -> NewFactory {
        NewFactory {
            name: self.name,
            admin,
            architecture_id: self.architecture_id,
            operating_system_id: self.operating_system_id,
        }
    }
}

fn validate_choice(raw: &str, exists: impl Fn(i32) -> bool) -> Result<i32, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(REQUIRED_MESSAGE);
    }
    raw.parse::<i32>()
        .ok()
        .filter(|id| exists(*id))
        .ok_or(INVALID_CHOICE_MESSAGE)
}

impl FactoryRegistrationForm {
    /// Run every field validator and collect all failures.
    ///
    /// # Examples
    /// ```
    /// use shotserver::domain::{
    ///     Architecture, FactoryRegistrationForm, FormField, OperatingSystem,
    ///     RegistrationChoices,
    /// };
    ///
    /// let choices = RegistrationChoices {
    ///     architectures: vec![Architecture { id: 1, name: "x86_64".into() }],
    ///     operating_systems: vec![OperatingSystem {
    ///         id: 2,
    ///         distro: "Debian".into(),
    ///         version: "12".into(),
    ///         codename: "bookworm".into(),
    ///     }],
    /// };
    /// let form = FactoryRegistrationForm {
    ///     name: "Shots".into(),
    ///     architecture: "1".into(),
    ///     operating_system: "9".into(),
    /// };
    /// let errors = form.validate(&choices).unwrap_err();
    /// assert_eq!(errors.field(FormField::Name).len(), 1);
    /// assert_eq!(errors.field(FormField::OperatingSystem).len(), 1);
    /// assert!(errors.field(FormField::Architecture).is_empty());
    /// ```
    pub fn validate(&self, choices: &RegistrationChoices) -> Result<ValidRegistration, FormErrors> {
        let mut errors = FormErrors::default();

        let name = FactoryName::new(self.name.as_str())
            .map_err(|err| errors.add_field(FormField::Name, err.to_string()))
            .ok();
        let architecture_id = validate_choice(&self.architecture, |id| choices.has_architecture(id))
            .map_err(|msg| errors.add_field(FormField::Architecture, msg))
            .ok();
        let operating_system_id =
            validate_choice(&self.operating_system, |id| choices.has_operating_system(id))
                .map_err(|msg| errors.add_field(FormField::OperatingSystem, msg))
                .ok();

        match (name, architecture_id, operating_system_id) {
            (Some(name), Some(architecture_id), Some(operating_system_id)) => {
                Ok(ValidRegistration {
                    name,
                    architecture_id,
                    operating_system_id,
                })
            }
            _ => Err(errors),
        }
    }
}

/// A form rejected by validation or persistence, ready to re-render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRegistration {
    pub form: FactoryRegistrationForm,
    pub errors: FormErrors,
    pub choices: RegistrationChoices,
}

/// Result of a registration attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    Registered(Factory),
    Rejected(RejectedRegistration),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn choices() -> RegistrationChoices {
        RegistrationChoices {
            architectures: vec![Architecture {
                id: 1,
                name: "x86_64".to_owned(),
            }],
            operating_systems: vec![OperatingSystem {
                id: 7,
                distro: "Ubuntu".to_owned(),
                version: "8.04".to_owned(),
                codename: "Hardy Heron".to_owned(),
            }],
        }
    }

    fn form(name: &str, architecture: &str, operating_system: &str) -> FactoryRegistrationForm {
        FactoryRegistrationForm {
            name: name.to_owned(),
            architecture: architecture.to_owned(),
            operating_system: operating_system.to_owned(),
        }
    }

    #[rstest]
    fn valid_form_yields_typed_values(choices: RegistrationChoices) {
        let valid = form("hardy", "1", " 7 ")
            .validate(&choices)
            .expect("form should validate");
        assert_eq!(valid.name.as_ref(), "hardy");
        assert_eq!(valid.architecture_id, 1);
        assert_eq!(valid.operating_system_id, 7);

        let admin = UserId::random();
        let new_factory = valid.into_new_factory(admin);
        assert_eq!(new_factory.admin, admin);
    }

    #[rstest]
    fn empty_form_reports_every_field_as_required(choices: RegistrationChoices) {
        let errors = FactoryRegistrationForm::default()
            .validate(&choices)
            .expect_err("empty form must fail");
        for field in [
            FormField::Name,
            FormField::Architecture,
            FormField::OperatingSystem,
        ] {
            assert_eq!(errors.field(field), [REQUIRED_MESSAGE.to_owned()]);
        }
        assert!(errors.non_field().is_empty());
    }

    #[rstest]
    #[case("x", "7")]
    #[case("1", "8")]
    #[case("-1", "7")]
    fn unknown_choices_are_rejected(
        choices: RegistrationChoices,
        #[case] architecture: &str,
        #[case] operating_system: &str,
    ) {
        let errors = form("hardy", architecture, operating_system)
            .validate(&choices)
            .expect_err("choice must fail");
        let invalid: Vec<FormField> = errors
            .fields()
            .filter(|(_, messages)| messages.contains(&INVALID_CHOICE_MESSAGE.to_owned()))
            .map(|(field, _)| field)
            .collect();
        assert_eq!(invalid.len(), 1);
        assert!(errors.field(FormField::Name).is_empty());
    }

    #[rstest]
    #[case("Hardy", "Name must start with a lowercase letter.")]
    #[case("hardy heron", "Name may contain only lowercase letters, digits, underscore, hyphen.")]
    #[case("shotfactory", "This name is reserved.")]
    fn name_errors_are_reported_on_the_name_field(
        choices: RegistrationChoices,
        #[case] name: &str,
        #[case] expected: &str,
    ) {
        let errors = form(name, "1", "7")
            .validate(&choices)
            .expect_err("name must fail");
        assert_eq!(errors.field(FormField::Name), [expected.to_owned()]);
        assert_eq!(errors.fields().count(), 1);
    }

    #[rstest]
    fn form_errors_accumulate_messages() {
        let mut errors = FormErrors::default();
        assert!(errors.is_empty());
        errors.add_field(FormField::Name, "first");
        errors.add_field(FormField::Name, "second");
        errors.add_non_field(SAVE_FAILED_MESSAGE);
        assert_eq!(
            errors.field(FormField::Name),
            ["first".to_owned(), "second".to_owned()]
        );
        assert_eq!(errors.non_field(), [SAVE_FAILED_MESSAGE.to_owned()]);
        assert!(!errors.is_empty());
    }
}
