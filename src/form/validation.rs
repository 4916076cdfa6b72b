use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use regex::Regex;

use super::record::{FieldKey, FormRecord};
use super::state::FormState;

pub const REQUIRED_MESSAGE: &str = "This field is required";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

impl ValidationResult {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(message) => Some(message),
        }
    }
}

/// Judges one raw field value. Validators are pure and never panic.
pub type Validator = Arc<dyn Fn(&str) -> ValidationResult + Send + Sync>;

/// Per-field validation errors. A missing or empty entry means valid.
pub type FieldErrors = BTreeMap<FieldKey, Vec<String>>;

pub fn required() -> Validator {
    required_with(REQUIRED_MESSAGE)
}

pub fn required_with(message: impl Into<String>) -> Validator {
    let message = message.into();
    Arc::new(move |raw: &str| {
        if raw.trim().is_empty() {
            ValidationResult::Invalid(message.clone())
        } else {
            ValidationResult::Valid
        }
    })
}

/// Fails when the value has fewer than `min` characters.
pub fn min_length(min: usize, message: impl Into<String>) -> Validator {
    let message = message.into();
    Arc::new(move |raw: &str| {
        if raw.chars().count() < min {
            ValidationResult::Invalid(message.clone())
        } else {
            ValidationResult::Valid
        }
    })
}

/// Fails when the value has more than `max` characters.
pub fn max_length(max: usize, message: impl Into<String>) -> Validator {
    let message = message.into();
    Arc::new(move |raw: &str| {
        if raw.chars().count() > max {
            ValidationResult::Invalid(message.clone())
        } else {
            ValidationResult::Valid
        }
    })
}

/// Fails unless the whole value matches `pattern`.
///
/// # Panics
///
/// Panics if `pattern` is not a valid regular expression. Use [`try_pattern`]
/// when the pattern is not a literal.
pub fn pattern(pattern: &str, message: impl Into<String>) -> Validator {
    match try_pattern(pattern, message) {
        Ok(validator) => validator,
        Err(error) => panic!("invalid validator pattern `{pattern}`: {error}"),
    }
}

pub fn try_pattern(pattern: &str, message: impl Into<String>) -> Result<Validator, regex::Error> {
    let regex = Regex::new(&format!("^(?:{pattern})$"))?;
    let message = message.into();
    Ok(Arc::new(move |raw: &str| {
        if regex.is_match(raw) {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(message.clone())
        }
    }))
}

pub fn custom<F>(validator: F) -> Validator
where
    F: Fn(&str) -> ValidationResult + Send + Sync + 'static,
{
    Arc::new(validator)
}

/// Ordered validators per field. Static for the lifetime of a form.
#[derive(Clone, Default)]
pub struct ValidatorConfig {
    fields: BTreeMap<FieldKey, Vec<Validator>>,
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends validators for `key`, keeping their order.
    pub fn field(
        mut self,
        key: impl Into<FieldKey>,
        validators: impl IntoIterator<Item = Validator>,
    ) -> Self {
        self.fields
            .entry(key.into())
            .or_default()
            .extend(validators);
        self
    }

    pub fn get(&self, key: &FieldKey) -> Option<&[Validator]> {
        self.fields.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &FieldKey) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Debug for ValidatorConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.fields
                    .iter()
                    .map(|(key, validators)| (key.as_str(), validators.len())),
            )
            .finish()
    }
}

pub fn run_validators(validators: &[Validator], raw: &str, first_error_only: bool) -> Vec<String> {
    let mut messages = Vec::new();
    for validator in validators {
        if let ValidationResult::Invalid(message) = validator(raw) {
            messages.push(message);
            if first_error_only {
                break;
            }
        }
    }
    messages
}

/// Returns the state's errors with the entry for `key` recomputed from `raw`.
///
/// Fields without validators are never added; the state's errors come back
/// unchanged for them.
pub fn validate_field<T>(key: &FieldKey, raw: &str, state: &FormState<T>) -> FieldErrors
where
    T: FormRecord,
{
    let Some(validators) = state.validators().get(key) else {
        return state.errors().clone();
    };

    let messages = run_validators(
        validators,
        raw,
        state.options().validate_first_error_only,
    );
    let mut errors = state.errors().clone();
    if messages.is_empty() {
        errors.remove(key);
    } else {
        errors.insert(key.clone(), messages);
    }
    errors
}
