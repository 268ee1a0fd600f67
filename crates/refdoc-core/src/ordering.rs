//! Sibling ordering shared by the flattener and the TOC builder

/// How siblings are ordered at every nesting level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiblingOrder {
    /// Case-insensitive by name, ties keep declaration order
    #[default]
    Alphabetical,
    /// Exactly as declared
    Source,
}

impl SiblingOrder {
    pub fn from_flag(alphabetical: bool) -> Self {
        if alphabetical {
            SiblingOrder::Alphabetical
        } else {
            SiblingOrder::Source
        }
    }

    /// Reorder `items` in place by the name `key` extracts
    pub fn sort_by_name<T>(self, items: &mut [T], key: impl Fn(&T) -> &str) {
        if self == SiblingOrder::Alphabetical {
            // stable: equal keys stay in declaration order
            items.sort_by_cached_key(|item| key(item).to_lowercase());
        }
    }
}

/// Case-insensitive comparison with an exact tie break
pub fn compare_uids(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabetical_is_case_insensitive() {
        let mut names = vec!["beta", "Alpha", "gamma", "Delta"];
        SiblingOrder::Alphabetical.sort_by_name(&mut names, |n| *n);
        assert_eq!(names, vec!["Alpha", "beta", "Delta", "gamma"]);
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let mut items = vec![("b", 0), ("A", 1), ("a", 2), ("B", 3)];
        SiblingOrder::Alphabetical.sort_by_name(&mut items, |(n, _)| *n);
        let order: Vec<i32> = items.iter().map(|(_, i)| *i).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_source_order_untouched() {
        let mut names = vec!["z", "a", "m"];
        SiblingOrder::Source.sort_by_name(&mut names, |n| *n);
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_compare_uids() {
        let mut uids = vec!["b", "B", "a.X", "A"];
        uids.sort_by(|a, b| compare_uids(a, b));
        assert_eq!(uids, vec!["A", "a.X", "B", "b"]);
    }
}
