use crate::prelude::*;

#[derive(Clone, Debug, FormRecord)]
struct Contact {
    email: String,
    age: Option<u8>,
}

#[test]
fn prelude_covers_a_full_editing_session() {
    let validators = ValidatorConfig::new().field(
        "email",
        [
            required(),
            pattern(r"[^@\s]+@[^@\s]+", "Please enter an email address"),
        ],
    );
    let controller = FormController::new(
        Contact {
            email: "a@calm.ui".into(),
            age: None,
        },
        validators,
    );
    let email = controller.bind(Contact::fields().email());

    email.on_change("b@calm.ui").expect("change");
    email.on_blur().expect("blur");
    controller.on_field_change("age", "41").expect("age parses");

    let report = controller
        .submit(|state| {
            Ok::<PartialRecord, FormError>(compute_delta(state.initial_values(), state.values()))
        })
        .expect("submit");
    let delta = report.into_result().expect("handler ran").expect("ok");
    assert_eq!(delta.get("email"), Some(&FieldValue::from("b@calm.ui")));
    assert_eq!(delta.get("age"), Some(&FieldValue::from(41_i64)));
}

#[test]
fn policies_default_to_reset_on_settle_and_discard() {
    let options = FormOptions::default();
    assert_eq!(options.settle_policy, SettlePolicy::ResetOnSettle);
    assert_eq!(options.in_flight_edit_policy, InFlightEditPolicy::Discard);
    assert!(!options.validate_first_error_only);
}

#[test]
fn custom_validators_plug_into_config() {
    let even = custom(|raw| match raw.parse::<i64>() {
        Ok(value) if value % 2 == 0 => ValidationResult::Valid,
        _ => ValidationResult::invalid("must be even"),
    });
    let state = FormState::new(DynamicRecord::new(), ValidatorConfig::new().field("n", [even]))
        .field_change(&FieldKey::new("n"), "3")
        .expect("dynamic change");
    assert_eq!(state.field_errors(&FieldKey::new("n")), ["must be even"]);
    assert!(matches!(
        FormController::new(DynamicRecord::new(), ValidatorConfig::new()).options(),
        Ok(FormOptions { .. })
    ));
}
