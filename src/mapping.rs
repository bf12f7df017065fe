use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// The maximum number of entries kept in the ordered-slice representation.
/// Routing nodes rarely have more children than this, and a linear scan
/// over a handful of cache-warm entries beats hashing at that size.
pub(crate) const MAX_SLICE: usize = 8;

/// A hybrid keyed container: an insertion-ordered vec while small, a hash
/// map once it grows past [`MAX_SLICE`]. The promotion happens at insert
/// time and is one-way.
#[derive(Clone, Debug)]
pub(crate) enum Mapping<K, V> {
    Slice(Vec<(K, V)>),
    Map(HashMap<K, V>),
}

impl<K, V> Default for Mapping<K, V> {
    fn default() -> Self {
        Mapping::Slice(Vec::new())
    }
}

impl<K: Eq + Hash, V> Mapping<K, V> {
    /// Inserts a key/value pair, overwriting the value of an existing key.
    pub(crate) fn add(&mut self, key: K, value: V) {
        match self {
            Mapping::Slice(entries) => {
                if let Some(entry) = entries.iter_mut().find(|(k, _)| *k == key) {
                    entry.1 = value;
                    return;
                }
                if entries.len() < MAX_SLICE {
                    entries.push((key, value));
                    return;
                }
                let mut map: HashMap<K, V> = entries.drain(..).collect();
                map.insert(key, value);
                *self = Mapping::Map(map);
            }
            Mapping::Map(map) => {
                map.insert(key, value);
            }
        }
    }

    pub(crate) fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self {
            Mapping::Slice(entries) => entries
                .iter()
                .find(|(k, _)| k.borrow() == key)
                .map(|(_, v)| v),
            Mapping::Map(map) => map.get(key),
        }
    }

    pub(crate) fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self {
            Mapping::Slice(entries) => entries
                .iter_mut()
                .find(|(k, _)| k.borrow() == key)
                .map(|(_, v)| v),
            Mapping::Map(map) => map.get_mut(key),
        }
    }

    /// Returns the value for `key`, inserting the result of `default` if
    /// absent.
    pub(crate) fn find_or_insert(&mut self, key: K, default: impl FnOnce() -> V) -> &mut V
    where
        K: Clone,
    {
        if self.find(&key).is_none() {
            self.add(key.clone(), default());
        }
        match self.find_mut(&key) {
            Some(value) => value,
            None => unreachable!("entry was just inserted"),
        }
    }

    /// Calls `f` on each key/value pair in unspecified order, stopping
    /// early if `f` returns false. Returns false if iteration stopped.
    pub(crate) fn pairs(&self, mut f: impl FnMut(&K, &V) -> bool) -> bool {
        match self {
            Mapping::Slice(entries) => {
                for (k, v) in entries {
                    if !f(k, v) {
                        return false;
                    }
                }
            }
            Mapping::Map(map) => {
                for (k, v) in map {
                    if !f(k, v) {
                        return false;
                    }
                }
            }
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> Vec<&K> {
        match self {
            Mapping::Slice(entries) => entries.iter().map(|(k, _)| k).collect(),
            Mapping::Map(map) => map.keys().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_at_threshold() {
        let mut h: Mapping<String, usize> = Mapping::default();
        for i in 0..MAX_SLICE {
            h.add(i.to_string(), i);
        }
        assert!(matches!(h, Mapping::Slice(_)), "should still be a slice");
        for i in 0..MAX_SLICE {
            assert_eq!(h.find(i.to_string().as_str()), Some(&i));
        }

        // One more distinct key promotes to the map representation.
        h.add("overflow".to_string(), 99);
        assert!(matches!(h, Mapping::Map(_)), "should have promoted");
        assert_eq!(h.find("overflow"), Some(&99));
        for i in 0..MAX_SLICE {
            assert_eq!(h.find(i.to_string().as_str()), Some(&i));
        }
    }

    #[test]
    fn test_overwrite_duplicate() {
        let mut h: Mapping<String, usize> = Mapping::default();
        for i in 0..MAX_SLICE {
            h.add(i.to_string(), i);
        }
        // Overwriting an existing key does not promote.
        h.add("4".to_string(), 44);
        assert!(matches!(h, Mapping::Slice(_)));
        assert_eq!(h.find("4"), Some(&44));
    }

    #[test]
    fn test_slice_preserves_insertion_order() {
        let mut h: Mapping<String, usize> = Mapping::default();
        for (i, key) in ["b", "a", "c"].into_iter().enumerate() {
            h.add(key.to_string(), i);
        }
        let mut seen = Vec::new();
        h.pairs(|k, _| {
            seen.push(k.clone());
            true
        });
        assert_eq!(seen, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_pairs_early_exit() {
        let mut h: Mapping<String, usize> = Mapping::default();
        h.add("a".to_string(), 1);
        h.add("b".to_string(), 2);
        let mut count = 0;
        let finished = h.pairs(|_, _| {
            count += 1;
            false
        });
        assert!(!finished);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_find_or_insert() {
        let mut h: Mapping<String, usize> = Mapping::default();
        *h.find_or_insert("a".to_string(), || 0) += 1;
        *h.find_or_insert("a".to_string(), || 0) += 1;
        assert_eq!(h.find("a"), Some(&2));
    }
}
