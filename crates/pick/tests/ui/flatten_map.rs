use std::collections::HashMap;

use pick::Record;

#[derive(Record)]
struct Labels {
    #[serde(flatten)]
    extra: HashMap<String, String>,
}

fn main() {}
