use calmform::form::{FieldKey, FormRecord};

#[derive(Clone, calmform::form::FormRecord)]
struct Entry {
    r#type: String,
}

fn main() {
    let entry = Entry {
        r#type: "note".to_string(),
    };
    assert_eq!(Entry::fields().r#type(), FieldKey::new("type"));
    assert_eq!(entry.raw_value(&FieldKey::new("type")), "note");
}
