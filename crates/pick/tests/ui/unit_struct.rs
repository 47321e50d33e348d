use pick::Record;

#[derive(Record)]
struct Marker;

fn main() {}
