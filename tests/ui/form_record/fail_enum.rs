#![allow(dead_code)]

use calmform::form::FormRecord;

#[derive(FormRecord)]
enum Choice {
    Yes,
    No,
}

fn main() {}
