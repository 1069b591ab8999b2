//! Property merging

use crate::map::Map;

/// Copy missing properties from `source` into `target`
///
/// Every key visible on `source` (inherited ones included) is copied when
/// `target` has no own property of that name and `can_copy` accepts it.
/// Values are copied as handles, so reference nodes end up shared.
/// Returns `target` for chaining.
#[must_use]
pub fn extend(target: &Map, source: &Map, can_copy: Option<&dyn Fn(&str) -> bool>) -> Map {
    for key in source.enumerable_keys() {
        if target.has_own(&key) || !can_copy.map_or(true, |accept| accept(&key)) {
            continue;
        }
        if let Some(value) = source.get(&key) {
            target.insert(key, value);
        }
    }
    target.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;

    #[test]
    fn extend_fills_only_missing_keys() {
        let target = Map::new();
        target.insert("a", 1);
        let source = Map::new();
        source.insert("a", 10);
        source.insert("b", 20);

        let out = extend(&target, &source, None);
        assert!(out.ptr_eq(&target));
        assert_eq!(target.get("a"), Some(Node::from(1)));
        assert_eq!(target.get("b"), Some(Node::from(20)));
    }

    #[test]
    fn extend_respects_filter() {
        let target = Map::new();
        let source = Map::new();
        source.insert("keep", 1);
        source.insert("_private", 2);

        let accept = |key: &str| !key.starts_with('_');
        let out = extend(&target, &source, Some(&accept));
        assert_eq!(out.keys(), vec!["keep"]);
    }

    #[test]
    fn extend_copies_inherited_and_shares_handles() {
        let child = Node::map();
        let base = Map::new();
        base.insert("child", child.clone());
        let source = base.overlay();

        let target = Map::new();
        let _ = extend(&target, &source, None);
        assert!(target.get_own("child").unwrap().same(&child));
    }
}
