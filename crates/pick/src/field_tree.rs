use std::collections::HashMap;

/// A pre-built tree of dot-notation field paths.
///
/// Given `["foo.bar.baz", "foo.bar.bux", "name"]`, builds:
/// ```text
/// Branch({ "foo": Branch({ "bar": Branch({ "baz": Leaf, "bux": Leaf }) }),
///          "name": Leaf })
/// ```
///
/// Built once per call (or once up front and reused across values with
/// [`project`](crate::project)). Borrows its keys from the input path strings.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldTree<'a> {
    /// No further restriction: take the value whole.
    Leaf,
    /// Keep only the named fields, each with its own sub-tree.
    Branch(HashMap<&'a str, FieldTree<'a>>),
}

impl<'a> FieldTree<'a> {
    /// Build a tree from a list of dot-notation paths.
    ///
    /// An empty list selects everything and yields [`FieldTree::Leaf`].
    /// Paths are split on the first `.` only; the tail is grouped under its
    /// head and split again one level down. A head that any path restricts
    /// stays restricted even when it is also mentioned bare.
    pub fn from_paths<S: AsRef<str>>(paths: &'a [S]) -> FieldTree<'a> {
        let paths: Vec<&'a str> = paths.iter().map(|p| p.as_ref()).collect();
        build(&paths)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, FieldTree::Leaf)
    }

    /// Sub-tree for a field name, if the name is selected.
    ///
    /// A leaf selects every name and hands back itself.
    pub fn get(&self, name: &str) -> Option<&FieldTree<'a>> {
        match self {
            FieldTree::Leaf => Some(self),
            FieldTree::Branch(children) => children.get(name),
        }
    }
}

fn build<'a>(paths: &[&'a str]) -> FieldTree<'a> {
    if paths.is_empty() {
        return FieldTree::Leaf;
    }

    // head -> accumulated tails; None until a tail shows up.
    let mut grouped: HashMap<&'a str, Option<Vec<&'a str>>> = HashMap::new();
    for &path in paths {
        match path.split_once('.') {
            Some((head, tail)) => grouped
                .entry(head)
                .or_insert(None)
                .get_or_insert_with(Vec::new)
                .push(tail),
            None => {
                grouped.entry(path).or_insert(None);
            }
        }
    }

    let children = grouped
        .into_iter()
        .map(|(head, tails)| match tails {
            Some(tails) => (head, build(&tails)),
            None => (head, FieldTree::Leaf),
        })
        .collect();
    FieldTree::Branch(children)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch<'t, 'a>(tree: &'t FieldTree<'a>) -> &'t HashMap<&'a str, FieldTree<'a>> {
        match tree {
            FieldTree::Branch(children) => children,
            other => panic!("expected Branch, got {:?}", other),
        }
    }

    #[test]
    fn empty_paths_select_everything() {
        let paths: Vec<String> = vec![];
        assert_eq!(FieldTree::from_paths(&paths), FieldTree::Leaf);
    }

    #[test]
    fn flat_fields() {
        let tree = FieldTree::from_paths(&["a", "b"]);
        let expected = FieldTree::Branch(HashMap::from([
            ("a", FieldTree::Leaf),
            ("b", FieldTree::Leaf),
        ]));
        assert_eq!(tree, expected);
        assert_eq!(tree.get("missing"), None);
    }

    #[test]
    fn nested_fields() {
        let tree = FieldTree::from_paths(&["a", "b.b1"]);
        let expected = FieldTree::Branch(HashMap::from([
            ("a", FieldTree::Leaf),
            ("b", FieldTree::Branch(HashMap::from([("b1", FieldTree::Leaf)]))),
        ]));
        assert_eq!(tree, expected);
    }

    #[test]
    fn splits_once_per_level() {
        let tree = FieldTree::from_paths(&["foo.bar.baz", "foo.bar.bux", "foo.qux"]);
        let foo = branch(branch(&tree).get("foo").unwrap());
        assert_eq!(foo.get("qux"), Some(&FieldTree::Leaf));
        let bar = branch(foo.get("bar").unwrap());
        assert_eq!(bar.len(), 2);
        assert_eq!(bar.get("baz"), Some(&FieldTree::Leaf));
        assert_eq!(bar.get("bux"), Some(&FieldTree::Leaf));
    }

    #[test]
    fn restricted_wins_over_bare_mention() {
        let restricted = FieldTree::Branch(HashMap::from([(
            "foo",
            FieldTree::Branch(HashMap::from([("bar", FieldTree::Leaf)])),
        )]));
        assert_eq!(FieldTree::from_paths(&["foo", "foo.bar"]), restricted);
        assert_eq!(FieldTree::from_paths(&["foo.bar", "foo"]), restricted);
    }

    #[test]
    fn duplicate_paths_collapse() {
        let tree = FieldTree::from_paths(&["a", "a", "b.c", "b.c"]);
        let top = branch(&tree);
        assert_eq!(top.len(), 2);
        assert_eq!(branch(top.get("b").unwrap()).len(), 1);
    }

    #[test]
    fn trailing_dot_is_literal() {
        let tree = FieldTree::from_paths(&["a."]);
        let a = branch(branch(&tree).get("a").unwrap());
        assert_eq!(a.get(""), Some(&FieldTree::Leaf));
    }

    #[test]
    fn leaf_selects_any_name() {
        let tree = FieldTree::Leaf;
        assert!(tree.is_leaf());
        assert_eq!(tree.get("anything"), Some(&FieldTree::Leaf));
    }

    #[test]
    fn borrows_owned_paths() {
        let paths = vec!["name".to_string(), "address.city".to_string()];
        let tree = FieldTree::from_paths(&paths);
        let top = branch(&tree);
        assert_eq!(top.get("name"), Some(&FieldTree::Leaf));
        assert!(!top.get("address").unwrap().is_leaf());
    }
}
