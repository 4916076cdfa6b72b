use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use log::{debug, trace, warn};

use super::controller::{
    FormError, FormOptions, FormResult, InFlightEditPolicy, SettlePolicy, SubmitOutcome,
};
use super::delta::{PartialRecord, compute_delta};
use super::record::{FieldKey, FormRecord};
use super::validation::{FieldErrors, ValidatorConfig, validate_field};

/// Full state of one record-editing session.
///
/// A `FormState` is never mutated in place: every transition returns a new
/// value, so a snapshot handed to a submit handler stays stable.
#[derive(Clone, Debug)]
pub struct FormState<T> {
    values: T,
    initial_values: T,
    touched: BTreeMap<FieldKey, bool>,
    errors: FieldErrors,
    validators: Arc<ValidatorConfig>,
    options: FormOptions,
    has_changed: bool,
    is_submitting: bool,
    submit_count: u32,
    submitted_values: Option<T>,
    touched_before_submit: BTreeSet<FieldKey>,
    in_flight_changes: BTreeSet<FieldKey>,
    in_flight_blurs: BTreeSet<FieldKey>,
}

/// Result of asking a state to start a submit.
#[derive(Clone, Debug)]
pub enum SubmitStart<T> {
    /// Validation errors remain; every known field is now touched.
    Blocked(FormState<T>),
    Started(FormState<T>),
}

impl<T> FormState<T>
where
    T: FormRecord,
{
    pub fn new(initial: T, validators: ValidatorConfig) -> Self {
        Self::with_options(initial, validators, FormOptions::default())
    }

    pub fn with_options(initial: T, validators: ValidatorConfig, options: FormOptions) -> Self {
        Self::build(initial.clone(), initial, Arc::new(validators), options)
    }

    fn build(
        values: T,
        initial_values: T,
        validators: Arc<ValidatorConfig>,
        options: FormOptions,
    ) -> Self {
        let mut state = Self {
            values,
            initial_values,
            touched: BTreeMap::new(),
            errors: FieldErrors::new(),
            validators,
            options,
            has_changed: false,
            is_submitting: false,
            submit_count: 0,
            submitted_values: None,
            touched_before_submit: BTreeSet::new(),
            in_flight_changes: BTreeSet::new(),
            in_flight_blurs: BTreeSet::new(),
        };
        let keys = state.validators.keys().cloned().collect::<Vec<_>>();
        for key in keys {
            let Some(value) = state.values.field_value(&key) else {
                continue;
            };
            state.errors = validate_field(&key, &value.to_raw(), &state);
        }
        state
    }

    pub fn field_change(&self, key: &FieldKey, raw: &str) -> FormResult<Self> {
        let mut next = self.clone();
        if let Err(error) = next.values.apply_raw(key, raw) {
            warn!("rejected value for field `{key}`: {error}");
            return Err(error);
        }
        next.errors = validate_field(key, raw, &next);
        next.has_changed = true;
        if next.is_submitting {
            next.in_flight_changes.insert(key.clone());
        }
        trace!(
            "field `{key}` changed, {} error(s)",
            next.field_errors(key).len()
        );
        Ok(next)
    }

    pub fn field_blur(&self, key: &FieldKey) -> Self {
        let mut next = self.clone();
        next.touched.insert(key.clone(), true);
        if next.is_submitting {
            next.in_flight_blurs.insert(key.clone());
        }
        trace!("field `{key}` blurred");
        next
    }

    /// Touches every key present in the values or in the validator config.
    pub fn mark_all_touched(&self) -> Self {
        let mut next = self.clone();
        let keys = next
            .values
            .field_keys()
            .into_iter()
            .chain(next.validators.keys().cloned());
        for key in keys {
            next.touched.insert(key, true);
        }
        next
    }

    pub fn begin_submit(&self) -> FormResult<SubmitStart<T>> {
        if self.is_submitting {
            return Err(FormError::AlreadySubmitting);
        }

        let touched_before_submit: BTreeSet<FieldKey> = self
            .touched
            .iter()
            .filter(|(_, touched)| **touched)
            .map(|(key, _)| key.clone())
            .collect();
        let mut next = self.mark_all_touched();
        if next.has_errors() {
            debug!(
                "submit blocked by {} invalid field(s)",
                next.errors.values().filter(|e| !e.is_empty()).count()
            );
            return Ok(SubmitStart::Blocked(next));
        }

        next.is_submitting = true;
        next.submit_count = next.submit_count.saturating_add(1);
        next.submitted_values = Some(next.values.clone());
        next.touched_before_submit = touched_before_submit;
        next.in_flight_changes.clear();
        next.in_flight_blurs.clear();
        debug!("submit #{} started", next.submit_count);
        Ok(SubmitStart::Started(next))
    }

    /// Ends a submit once the handler has finished, however it finished.
    pub fn settle(&self, outcome: SubmitOutcome) -> Self {
        let mut next = self.clone();
        if !next.is_submitting {
            warn!("settle called without a submit in progress");
            return next;
        }

        next.is_submitting = false;
        let submitted = next.submitted_values.take();
        let changes = std::mem::take(&mut next.in_flight_changes);
        let blurs = std::mem::take(&mut next.in_flight_blurs);
        let touched_before = std::mem::take(&mut next.touched_before_submit);

        if outcome == SubmitOutcome::Failed
            && next.options.settle_policy == SettlePolicy::ResetOnSuccess
        {
            debug!("submit #{} failed, keeping form state", next.submit_count);
            return next;
        }

        match next.options.in_flight_edit_policy {
            InFlightEditPolicy::Discard => {
                next.touched.clear();
                next.errors.clear();
                next.has_changed = false;
                next.initial_values = next.values.clone();
            }
            InFlightEditPolicy::Preserve => {
                // Submit touched every field; only user-made touches survive.
                next.touched.retain(|key, _| {
                    blurs.contains(key) || (changes.contains(key) && touched_before.contains(key))
                });
                next.errors.retain(|key, _| changes.contains(key));
                next.has_changed = !changes.is_empty();
                next.initial_values = submitted.unwrap_or_else(|| next.values.clone());
            }
        }
        debug!("submit #{} settled ({outcome:?})", next.submit_count);
        next
    }

    /// Restores the initial values and rebuilds the state as construction does.
    pub fn reset_to_initial(&self) -> Self {
        let mut next = Self::build(
            self.initial_values.clone(),
            self.initial_values.clone(),
            self.validators.clone(),
            self.options,
        );
        next.submit_count = self.submit_count;
        next.is_submitting = self.is_submitting;
        next.submitted_values = self.submitted_values.clone();
        debug!("form reset to initial values");
        next
    }

    /// Replaces the values wholesale without validating or flagging changes.
    pub fn with_values(&self, values: T) -> Self {
        let mut next = self.clone();
        next.values = values;
        next
    }

    pub fn values(&self) -> &T {
        &self.values
    }

    pub fn initial_values(&self) -> &T {
        &self.initial_values
    }

    pub fn touched(&self) -> &BTreeMap<FieldKey, bool> {
        &self.touched
    }

    pub fn is_touched(&self, key: &FieldKey) -> bool {
        self.touched.get(key).copied().unwrap_or(false)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn field_errors(&self, key: &FieldKey) -> &[String] {
        self.errors.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_errors(&self) -> bool {
        self.errors.values().any(|messages| !messages.is_empty())
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// First error of a touched field; untouched fields show nothing.
    pub fn display_error(&self, key: &FieldKey) -> Option<&str> {
        if !self.is_touched(key) {
            return None;
        }
        self.field_errors(key).first().map(String::as_str)
    }

    pub fn validators(&self) -> &ValidatorConfig {
        &self.validators
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    pub fn has_changed(&self) -> bool {
        self.has_changed
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    pub fn can_submit(&self) -> bool {
        self.has_changed && !self.is_submitting
    }

    pub fn delta(&self) -> PartialRecord {
        compute_delta(&self.initial_values, &self.values)
    }
}

impl<T> FormState<T>
where
    T: FormRecord + Default,
{
    /// State used before any record is loaded.
    pub fn empty() -> Self {
        Self::new(T::default(), ValidatorConfig::new())
    }
}

impl<T> Default for FormState<T>
where
    T: FormRecord + Default,
{
    fn default() -> Self {
        Self::empty()
    }
}
