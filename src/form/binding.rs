use super::controller::{FormController, FormResult};
use super::record::{FieldKey, FormRecord};

/// One field's read/write contract, handed to the widget that edits it.
///
/// Widgets receive a binding explicitly instead of looking the form up from
/// ambient context.
#[derive(Clone)]
pub struct FieldBinding<T>
where
    T: FormRecord,
{
    controller: FormController<T>,
    key: FieldKey,
}

impl<T> FieldBinding<T>
where
    T: FormRecord,
{
    pub(super) fn new(controller: FormController<T>, key: FieldKey) -> Self {
        Self { controller, key }
    }

    pub fn key(&self) -> &FieldKey {
        &self.key
    }

    pub fn controller(&self) -> &FormController<T> {
        &self.controller
    }

    /// Current value as input text.
    pub fn value(&self) -> FormResult<String> {
        Ok(self.controller.snapshot()?.values().raw_value(&self.key))
    }

    pub fn errors(&self) -> FormResult<Vec<String>> {
        Ok(self.controller.snapshot()?.field_errors(&self.key).to_vec())
    }

    pub fn error_for_display(&self) -> FormResult<Option<String>> {
        Ok(self
            .controller
            .snapshot()?
            .display_error(&self.key)
            .map(str::to_string))
    }

    pub fn is_invalid(&self) -> FormResult<bool> {
        Ok(self.error_for_display()?.is_some())
    }

    pub fn is_touched(&self) -> FormResult<bool> {
        Ok(self.controller.snapshot()?.is_touched(&self.key))
    }

    pub fn is_disabled(&self) -> FormResult<bool> {
        Ok(self.controller.snapshot()?.is_submitting())
    }

    pub fn on_change(&self, raw: &str) -> FormResult<()> {
        self.controller.on_field_change(&self.key, raw)
    }

    pub fn on_blur(&self) -> FormResult<()> {
        self.controller.on_field_blur(&self.key)
    }
}
