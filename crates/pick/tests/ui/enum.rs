use pick::Record;

#[derive(Record)]
enum Status {
    Active,
    Closed,
}

fn main() {}
