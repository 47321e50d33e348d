use pick::Record;

#[derive(Record)]
struct Pair(i32, i32);

fn main() {}
