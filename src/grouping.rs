use std::collections::HashMap;
use std::hash::Hash;

/// Group items by key, keeping groups in order of first appearance and items in
/// input order within each group.
pub fn group_in_order<K, T, I, F>(items: I, key: F) -> Vec<(K, Vec<T>)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();

    for item in items {
        let k = key(&item);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }

    groups
}
