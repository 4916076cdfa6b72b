use calmform::form::{FieldKey, FieldValue, FormRecord};

#[derive(Clone, calmform::form::FormRecord)]
struct DemoRecord {
    email: String,
    visits: u32,
}

fn main() {
    let fields = DemoRecord::fields();
    let key = fields.email();
    let mut record = DemoRecord {
        email: "a@calm.ui".to_string(),
        visits: 0,
    };
    record.apply_raw(&key, "b@calm.ui").unwrap();
    assert_eq!(key.as_str(), "email");
    assert_eq!(
        record.field_value(&key),
        Some(FieldValue::Text("b@calm.ui".to_string()))
    );
    assert!(record.apply_raw(&fields.visits(), "many").is_err());
    assert!(record.apply_raw(&FieldKey::new("missing"), "x").is_err());
}
