use std::collections::HashMap;
use std::hash::Hash;

/// Groups items by `key`, preserving first-seen key order and within-group
/// input order.
pub fn group_by<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<(K, Vec<T>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();

    for item in items {
        let group_key = key(&item);
        match index.get(&group_key) {
            Some(&slot) => groups[slot].1.push(item),
            None => {
                index.insert(group_key.clone(), groups.len());
                groups.push((group_key, vec![item]));
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_appear_in_first_seen_order() {
        let items = vec![("b", 1), ("a", 2), ("b", 3), ("c", 4), ("a", 5)];
        let groups = group_by(items, |item| item.0);

        let keys: Vec<&str> = groups.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn members_keep_input_order_within_their_group() {
        let items = vec![("b", 1), ("a", 2), ("b", 3), ("a", 5)];
        let groups = group_by(items, |item| item.0);

        assert_eq!(groups[0].1, vec![("b", 1), ("b", 3)]);
        assert_eq!(groups[1].1, vec![("a", 2), ("a", 5)]);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let groups = group_by(Vec::<(&str, i32)>::new(), |item| item.0);
        assert!(groups.is_empty());
    }
}
