pub use crate::form::{
    DynamicRecord, FieldBinding, FieldKey, FieldValue, FormController, FormError, FormOptions,
    FormRecord, FormResult, FormState, InFlightEditPolicy, PartialRecord, SettlePolicy,
    SubmitReport, ValidationResult, ValidatorConfig, compute_delta, custom, max_length,
    min_length, pattern, required, required_with,
};
