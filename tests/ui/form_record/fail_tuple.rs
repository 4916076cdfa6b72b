#![allow(dead_code)]

use calmform::form::FormRecord;

#[derive(FormRecord)]
struct Pair(String, u32);

fn main() {}
