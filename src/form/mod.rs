mod binding;
mod controller;
mod delta;
mod record;
mod state;
mod validation;


pub use binding::FieldBinding;
pub use calmform_derive::FormRecord;
pub use controller::{
    FormController, FormError, FormOptions, FormResult, InFlightEditPolicy, SettlePolicy,
    SubmitOutcome, SubmitReport,
};
pub use delta::{PartialRecord, compute_delta};
pub use record::{DynamicRecord, FieldCodec, FieldKey, FieldValue, FormRecord, parse_field};
pub use state::{FormState, SubmitStart};
pub use validation::{
    FieldErrors, REQUIRED_MESSAGE, ValidationResult, Validator, ValidatorConfig, custom,
    max_length, min_length, pattern, required, required_with, run_validators, try_pattern,
    validate_field,
};
