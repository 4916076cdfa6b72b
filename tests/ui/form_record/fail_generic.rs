#![allow(dead_code)]

use calmform::form::FormRecord;

#[derive(FormRecord)]
struct Wrapper<T> {
    value: T,
}

fn main() {}
