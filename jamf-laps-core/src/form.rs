//! Form state for the password and policy panes.
//!
//! Each form is a plain value updated by a pure `reduce(self, event)`
//! function. A front end renders the current state and dispatches events;
//! [`crate::Orchestrator`] dispatches the request lifecycle events.

use crate::error::LapsError;
use crate::model::{PolicyField, RotationPolicy};

/// Fields of the LAPS password pane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordForm {
    pub serial_number: String,
    pub username: String,

    /// Last password retrieved, empty until a fetch succeeds.
    pub password: String,

    /// A fetch is in flight.
    pub busy: bool,
}

/// Events handled by [`PasswordForm::reduce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordEvent {
    SerialNumberChanged(String),
    UsernameChanged(String),
    FetchStarted,
    PasswordFetched(String),
    FetchFailed,
}

impl PasswordForm {
    pub fn new(serial_number: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            serial_number: serial_number.into(),
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn reduce(self, event: PasswordEvent) -> Self {
        match event {
            PasswordEvent::SerialNumberChanged(serial_number) => Self {
                serial_number,
                ..self
            },
            PasswordEvent::UsernameChanged(username) => Self { username, ..self },
            PasswordEvent::FetchStarted => Self { busy: true, ..self },
            PasswordEvent::PasswordFetched(password) => Self {
                password,
                busy: false,
                ..self
            },
            PasswordEvent::FetchFailed => Self {
                busy: false,
                ..self
            },
        }
    }

    /// Apply `event` in place.
    pub fn dispatch(&mut self, event: PasswordEvent) {
        *self = std::mem::take(self).reduce(event);
    }

    /// Whether the fetch action should be enabled.
    pub fn can_fetch(&self) -> bool {
        !self.serial_number.is_empty() && !self.username.is_empty() && !self.busy
    }
}

/// Editable copy of the rotation policy.
///
/// Times are kept as the text the user typed and only parsed on save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyFields {
    pub auto_deploy_enabled: bool,
    pub auto_rotate_enabled: bool,
    pub password_rotation_time: String,
    pub auto_rotate_expiration_time: String,
}

impl PolicyFields {
    /// Parse the fields into a policy record.
    ///
    /// Each time must be a whole number of seconds; `"12.5"`, `""` and
    /// `"abc"` are rejected with the offending field.
    pub fn parse(&self) -> Result<RotationPolicy, LapsError> {
        Ok(RotationPolicy {
            auto_deploy_enabled: self.auto_deploy_enabled,
            password_rotation_time: parse_seconds(
                &self.password_rotation_time,
                PolicyField::PasswordRotationTime,
            )?,
            auto_rotate_enabled: self.auto_rotate_enabled,
            auto_rotate_expiration_time: parse_seconds(
                &self.auto_rotate_expiration_time,
                PolicyField::AutoRotateExpirationTime,
            )?,
        })
    }
}

impl From<RotationPolicy> for PolicyFields {
    fn from(policy: RotationPolicy) -> Self {
        Self {
            auto_deploy_enabled: policy.auto_deploy_enabled,
            auto_rotate_enabled: policy.auto_rotate_enabled,
            password_rotation_time: policy.password_rotation_time.to_string(),
            auto_rotate_expiration_time: policy.auto_rotate_expiration_time.to_string(),
        }
    }
}

fn parse_seconds(value: &str, field: PolicyField) -> Result<i64, LapsError> {
    value.parse().map_err(|_| LapsError::ValidationFailed {
        field,
        value: value.to_string(),
    })
}

/// State of the policy pane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyForm {
    pub fields: PolicyFields,

    /// The fields differ from what the server last reported.
    pub dirty: bool,

    /// The last load changed the auto-deploy flag from its local value.
    pub auto_deploy_changed: bool,

    /// A fetch or save is in flight.
    pub busy: bool,
}

/// Events handled by [`PolicyForm::reduce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyEvent {
    AutoDeployToggled(bool),
    AutoRotateToggled(bool),
    RotationTimeChanged(String),
    ExpirationTimeChanged(String),
    RequestStarted,
    Loaded(RotationPolicy),
    Saved,
    RequestFailed,
}

impl PolicyForm {
    pub fn reduce(self, event: PolicyEvent) -> Self {
        let mut next = self;
        match event {
            PolicyEvent::AutoDeployToggled(value) => {
                if next.fields.auto_deploy_enabled != value {
                    next.fields.auto_deploy_enabled = value;
                    next.dirty = true;
                }
            }
            PolicyEvent::AutoRotateToggled(value) => {
                if next.fields.auto_rotate_enabled != value {
                    next.fields.auto_rotate_enabled = value;
                    next.dirty = true;
                }
            }
            PolicyEvent::RotationTimeChanged(value) => {
                if next.fields.password_rotation_time != value {
                    next.fields.password_rotation_time = value;
                    next.dirty = true;
                }
            }
            PolicyEvent::ExpirationTimeChanged(value) => {
                if next.fields.auto_rotate_expiration_time != value {
                    next.fields.auto_rotate_expiration_time = value;
                    next.dirty = true;
                }
            }
            PolicyEvent::RequestStarted => next.busy = true,
            PolicyEvent::Loaded(policy) => {
                next.auto_deploy_changed =
                    next.fields.auto_deploy_enabled != policy.auto_deploy_enabled;
                next.fields = PolicyFields::from(policy);
                next.dirty = false;
                next.busy = false;
            }
            PolicyEvent::Saved => {
                next.dirty = false;
                next.busy = false;
            }
            PolicyEvent::RequestFailed => next.busy = false,
        }
        next
    }

    /// Apply `event` in place.
    pub fn dispatch(&mut self, event: PolicyEvent) {
        *self = std::mem::take(self).reduce(event);
    }

    /// Whether the save action should be enabled.
    pub fn can_save(&self) -> bool {
        self.dirty && !self.busy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_policy() -> RotationPolicy {
        RotationPolicy {
            auto_deploy_enabled: true,
            password_rotation_time: 3600,
            auto_rotate_enabled: false,
            auto_rotate_expiration_time: 86400,
        }
    }

    #[test]
    fn test_password_form_can_fetch() {
        let form = PasswordForm::default();
        assert!(!form.can_fetch());

        let form = form
            .reduce(PasswordEvent::SerialNumberChanged("C02ABC123".into()))
            .reduce(PasswordEvent::UsernameChanged("ladmin".into()));
        assert!(form.can_fetch());

        let form = form.reduce(PasswordEvent::FetchStarted);
        assert!(!form.can_fetch());
    }

    #[test]
    fn test_password_form_failure_keeps_password() {
        let mut form = PasswordForm::new("C02ABC123", "ladmin");
        form.dispatch(PasswordEvent::FetchStarted);
        form.dispatch(PasswordEvent::PasswordFetched("first".into()));
        assert_eq!(form.password, "first");
        assert!(!form.busy);

        form.dispatch(PasswordEvent::FetchStarted);
        form.dispatch(PasswordEvent::FetchFailed);
        assert_eq!(form.password, "first");
        assert!(!form.busy);
    }

    #[test]
    fn test_policy_edits_mark_dirty() {
        let form = PolicyForm::default().reduce(PolicyEvent::Loaded(server_policy()));
        assert!(!form.can_save());

        let form = form.reduce(PolicyEvent::RotationTimeChanged("7200".into()));
        assert!(form.dirty);
        assert!(form.can_save());
        assert_eq!(form.fields.password_rotation_time, "7200");
    }

    #[test]
    fn test_policy_noop_edit_stays_clean() {
        let form = PolicyForm::default()
            .reduce(PolicyEvent::Loaded(server_policy()))
            .reduce(PolicyEvent::AutoDeployToggled(true))
            .reduce(PolicyEvent::RotationTimeChanged("3600".into()));
        assert!(!form.dirty);
    }

    #[test]
    fn test_policy_load_flags_auto_deploy_change() {
        let form = PolicyForm::default().reduce(PolicyEvent::Loaded(server_policy()));
        assert!(form.auto_deploy_changed);
        assert!(form.fields.auto_deploy_enabled);

        let form = form.reduce(PolicyEvent::Loaded(server_policy()));
        assert!(!form.auto_deploy_changed);
    }

    #[test]
    fn test_policy_load_discards_local_edits() {
        let form = PolicyForm::default()
            .reduce(PolicyEvent::ExpirationTimeChanged("999".into()))
            .reduce(PolicyEvent::RequestStarted)
            .reduce(PolicyEvent::Loaded(server_policy()));

        assert_eq!(form.fields.auto_rotate_expiration_time, "86400");
        assert!(!form.dirty);
        assert!(!form.busy);
    }

    #[test]
    fn test_policy_saved_cleans_form() {
        let mut form = PolicyForm::default();
        form.dispatch(PolicyEvent::AutoRotateToggled(true));
        form.dispatch(PolicyEvent::RequestStarted);
        assert!(!form.can_save());

        form.dispatch(PolicyEvent::Saved);
        assert!(!form.dirty);
        assert!(!form.busy);
        assert!(form.fields.auto_rotate_enabled);
    }

    #[test]
    fn test_policy_failed_request_keeps_dirty() {
        let mut form = PolicyForm::default();
        form.dispatch(PolicyEvent::AutoRotateToggled(true));
        form.dispatch(PolicyEvent::RequestStarted);
        form.dispatch(PolicyEvent::RequestFailed);

        assert!(form.dirty);
        assert!(form.can_save());
    }

    #[test]
    fn test_fields_parse_rejects_non_integers() {
        for bad in ["abc", "", "12.5", " 60"] {
            let fields = PolicyFields {
                password_rotation_time: bad.to_string(),
                auto_rotate_expiration_time: "60".to_string(),
                ..PolicyFields::default()
            };
            assert!(matches!(
                fields.parse(),
                Err(LapsError::ValidationFailed {
                    field: PolicyField::PasswordRotationTime,
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_fields_parse_reports_expiration_field() {
        let fields = PolicyFields {
            password_rotation_time: "3600".to_string(),
            auto_rotate_expiration_time: "not-a-number".to_string(),
            ..PolicyFields::default()
        };
        assert!(matches!(
            fields.parse(),
            Err(LapsError::ValidationFailed {
                field: PolicyField::AutoRotateExpirationTime,
                ..
            })
        ));
    }

    #[test]
    fn test_fields_round_trip_policy() {
        let fields = PolicyFields::from(server_policy());
        assert_eq!(fields.parse().unwrap(), server_policy());
    }
}
