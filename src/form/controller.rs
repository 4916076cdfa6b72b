use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, warn};

use super::binding::FieldBinding;
use super::record::{FieldKey, FormRecord};
use super::state::{FormState, SubmitStart};
use super::validation::ValidatorConfig;

/// What settle does when the submit handler reports a failure.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SettlePolicy {
    /// Reset touched/errors/changed and adopt the values as the new baseline
    /// whatever the handler returned. A failed save then looks saved.
    #[default]
    ResetOnSettle,
    /// Only a successful handler resets the form; a failure just ends the
    /// submit and keeps everything else.
    ResetOnSuccess,
}

/// What settle does with edits made while the handler was running.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum InFlightEditPolicy {
    /// Settle clears touched/errors/changed unconditionally. Values edited
    /// during the submit stay, but they become part of the new baseline.
    #[default]
    Discard,
    /// The submitted values become the baseline; fields edited or blurred
    /// during the submit keep their touched/error bookkeeping.
    Preserve,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FormOptions {
    pub settle_policy: SettlePolicy,
    pub in_flight_edit_policy: InFlightEditPolicy,
    pub validate_first_error_only: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    Succeeded,
    Failed,
}

impl SubmitOutcome {
    pub fn of<R, E>(result: &Result<R, E>) -> Self {
        if result.is_ok() {
            Self::Succeeded
        } else {
            Self::Failed
        }
    }
}

/// How a submit attempt ended.
#[derive(Debug)]
pub enum SubmitReport<R, E> {
    /// Validation errors remained; the handler was not called.
    Blocked,
    /// The handler ran and the form settled. Carries the handler's result.
    Settled(Result<R, E>),
    /// The handler ran but the form could not be settled afterwards.
    Unsettled {
        result: Result<R, E>,
        error: FormError,
    },
}

impl<R, E> SubmitReport<R, E> {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked)
    }

    pub fn into_result(self) -> Option<Result<R, E>> {
        match self {
            Self::Blocked => None,
            Self::Settled(result) | Self::Unsettled { result, .. } => Some(result),
        }
    }

    pub fn settle_error(&self) -> Option<&FormError> {
        match self {
            Self::Unsettled { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormError {
    StatePoisoned(&'static str),
    AlreadySubmitting,
    UnknownField(FieldKey),
    InvalidRawValue {
        key: FieldKey,
        raw: String,
        reason: String,
    },
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::StatePoisoned(context) => {
                write!(f, "form state lock poisoned while {context}")
            }
            FormError::AlreadySubmitting => f.write_str("form submit is already in progress"),
            FormError::UnknownField(key) => write!(f, "record has no field `{key}`"),
            FormError::InvalidRawValue { key, raw, reason } => {
                write!(f, "field `{key}` cannot hold `{raw}`: {reason}")
            }
        }
    }
}

impl std::error::Error for FormError {}

pub type FormResult<T> = Result<T, FormError>;

/// Shared handle to the current [`FormState`] of one editing session.
///
/// Every mutation swaps in a new snapshot; snapshots already handed out are
/// never touched again.
#[derive(Clone)]
pub struct FormController<T>
where
    T: FormRecord,
{
    state: Arc<RwLock<Arc<FormState<T>>>>,
}

impl<T> FormController<T>
where
    T: FormRecord,
{
    pub fn new(initial: T, validators: ValidatorConfig) -> Self {
        Self::with_options(initial, validators, FormOptions::default())
    }

    pub fn with_options(initial: T, validators: ValidatorConfig, options: FormOptions) -> Self {
        Self::from_state(FormState::with_options(initial, validators, options))
    }

    pub fn from_state(state: FormState<T>) -> Self {
        Self {
            state: Arc::new(RwLock::new(Arc::new(state))),
        }
    }

    pub fn snapshot(&self) -> FormResult<Arc<FormState<T>>> {
        Ok(read_lock(&self.state, "creating form snapshot")?.clone())
    }

    pub fn options(&self) -> FormResult<FormOptions> {
        Ok(read_lock(&self.state, "reading form options")?.options())
    }

    pub fn bind(&self, key: impl Into<FieldKey>) -> FieldBinding<T> {
        FieldBinding::new(self.clone(), key.into())
    }

    pub fn on_field_change(&self, key: impl Into<FieldKey>, raw: &str) -> FormResult<()> {
        let key = key.into();
        self.replace("applying field change", |state| {
            state.field_change(&key, raw)
        })
    }

    pub fn on_field_blur(&self, key: impl Into<FieldKey>) -> FormResult<()> {
        let key = key.into();
        self.replace("applying field blur", |state| Ok(state.field_blur(&key)))
    }

    pub fn reset_to_initial(&self) -> FormResult<()> {
        self.replace("resetting form", |state| Ok(state.reset_to_initial()))
    }

    pub fn set_values(&self, values: T) -> FormResult<()> {
        self.replace("replacing form values", |state| Ok(state.with_values(values)))
    }

    /// Runs a submit with a handler that completes immediately.
    ///
    /// The handler is not called while validation errors remain; in that case
    /// every known field is marked touched and `Blocked` is returned. A
    /// panicking handler still settles the form, as a failure.
    pub fn submit<R, E>(
        &self,
        handler: impl FnOnce(&FormState<T>) -> Result<R, E>,
    ) -> FormResult<SubmitReport<R, E>> {
        let Some(snapshot) = self.start_submit()? else {
            return Ok(SubmitReport::Blocked);
        };
        let guard = SettleGuard::new(self);
        let result = handler(&snapshot);
        let settled = guard.finish(SubmitOutcome::of(&result));
        Ok(settled_report(settled, result))
    }

    /// Runs a submit whose handler completes asynchronously.
    ///
    /// The state lock is released while the handler runs, so fields can still
    /// be edited; how settle treats those edits is governed by
    /// [`InFlightEditPolicy`]. Dropping the returned future before the handler
    /// completes settles the form as a failure.
    pub async fn submit_async<F, Fut, R, E>(&self, handler: F) -> FormResult<SubmitReport<R, E>>
    where
        F: FnOnce(Arc<FormState<T>>) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let Some(snapshot) = self.start_submit()? else {
            return Ok(SubmitReport::Blocked);
        };
        let guard = SettleGuard::new(self);
        let result = handler(snapshot).await;
        let settled = guard.finish(SubmitOutcome::of(&result));
        Ok(settled_report(settled, result))
    }

    fn start_submit(&self) -> FormResult<Option<Arc<FormState<T>>>> {
        let mut slot = write_lock(&self.state, "starting submit")?;
        match slot.begin_submit() {
            Ok(SubmitStart::Blocked(next)) => {
                *slot = Arc::new(next);
                Ok(None)
            }
            Ok(SubmitStart::Started(next)) => {
                let next = Arc::new(next);
                *slot = next.clone();
                Ok(Some(next))
            }
            Err(error) => {
                warn!("submit rejected: {error}");
                Err(error)
            }
        }
    }

    fn finish_submit(&self, outcome: SubmitOutcome) -> FormResult<()> {
        if outcome == SubmitOutcome::Failed {
            debug!("submit handler reported a failure");
        }
        self.replace("settling submit", |state| Ok(state.settle(outcome)))
    }

    fn replace(
        &self,
        context: &'static str,
        transition: impl FnOnce(&FormState<T>) -> FormResult<FormState<T>>,
    ) -> FormResult<()> {
        let mut slot = write_lock(&self.state, context)?;
        let next = transition(&slot)?;
        *slot = Arc::new(next);
        Ok(())
    }

    #[cfg(test)]
    pub(super) fn poison_state(&self) {
        let state = self.state.clone();
        let _ = std::thread::spawn(move || {
            let _slot = state.write();
            panic!("poisoning form state");
        })
        .join();
    }
}

/// Settles an in-flight submit as failed unless [`SettleGuard::finish`] ran,
/// so a panicking handler or a dropped submit future cannot leave the form
/// submitting forever.
struct SettleGuard<'a, T>
where
    T: FormRecord,
{
    controller: &'a FormController<T>,
    armed: bool,
}

impl<'a, T> SettleGuard<'a, T>
where
    T: FormRecord,
{
    fn new(controller: &'a FormController<T>) -> Self {
        Self {
            controller,
            armed: true,
        }
    }

    fn finish(mut self, outcome: SubmitOutcome) -> FormResult<()> {
        self.armed = false;
        self.controller.finish_submit(outcome)
    }
}

impl<T> Drop for SettleGuard<'_, T>
where
    T: FormRecord,
{
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!("submit ended before its handler completed, settling as failed");
        if let Err(error) = self.controller.finish_submit(SubmitOutcome::Failed) {
            warn!("abandoned submit could not settle: {error}");
        }
    }
}

fn settled_report<R, E>(settled: FormResult<()>, result: Result<R, E>) -> SubmitReport<R, E> {
    match settled {
        Ok(()) => SubmitReport::Settled(result),
        Err(error) => {
            warn!("submit handler finished but the form could not settle: {error}");
            SubmitReport::Unsettled { result, error }
        }
    }
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
