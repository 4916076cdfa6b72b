//! State engine for editing a structured record through input fields.
//!
//! A [`form::FormState`] tracks the record's values, which fields were
//! touched, which fields fail validation, and whether anything changed since
//! the last saved snapshot. [`form::FormController`] owns the current state
//! for one editing session and runs the submit protocol;
//! [`form::compute_delta`] builds minimal update payloads.

extern crate self as calmform;

pub mod form;
pub mod prelude;

#[cfg(test)]
mod test_public_api;
