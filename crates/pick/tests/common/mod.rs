#![allow(dead_code)]

use pick::Record;

#[derive(Debug, Clone, PartialEq, Record)]
pub struct Item {
    #[pick(rename = "a")]
    pub label: String,
    pub count: i32,
}

#[derive(Debug, Record)]
pub struct Nested {
    #[pick(rename = "a")]
    pub tags: Vec<String>,
    #[pick(rename = "b")]
    pub item: Item,
}

#[derive(Debug, Default, Record)]
pub struct Tagged {
    #[pick(tag = "a")]
    pub enabled: bool,
    #[pick(tag = "b,omitempty")]
    pub archived: bool,
    #[pick(tag = "c,omitempty")]
    pub parent: Option<Box<Item>>,
    #[pick(tag = "d,omitempty")]
    pub notes: Vec<String>,
}

#[derive(Debug, Record)]
pub struct Embedding {
    #[pick(flatten)]
    pub item: Item,
}

#[derive(Debug, Record)]
pub struct Shadowing {
    #[pick(flatten)]
    pub item: Item,
    #[pick(rename = "a")]
    pub code: i32,
}

pub const NO_PATHS: [&str; 0] = [];

pub fn item(label: &str, count: i32) -> Item {
    Item {
        label: label.to_string(),
        count,
    }
}

pub fn nested() -> Nested {
    Nested {
        tags: vec!["a".to_string()],
        item: item("a", 0),
    }
}
