use pick::Record;

#[derive(Record)]
struct Account {
    #[pick(rename_all = "camelCase")]
    name: String,
}

fn main() {}
