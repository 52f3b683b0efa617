//! Proptest generators for property-based testing.

use proptest::prelude::*;

use padcollide_core::{Document, MatchKey, RenderedVariant};

/// A single line of printable text, possibly with its own trailing spaces.
pub fn line() -> impl Strategy<Value = String> {
    "[ -~]{0,24}".prop_map(String::from)
}

/// A document with between `min` and `max` lines (inclusive).
pub fn document(min: usize, max: usize) -> impl Strategy<Value = Document> {
    prop::collection::vec(line(), min..=max).prop_map(Document::from_lines)
}

/// Two documents that differ, suitable for a search.
pub fn document_pair(max_lines: usize) -> impl Strategy<Value = (Document, Document)> {
    (document(1, max_lines), document(1, max_lines))
        .prop_filter("documents must differ", |(a, b)| a != b)
}

/// An attempt index small enough to render quickly.
pub fn attempt() -> impl Strategy<Value = u64> {
    0u64..100_000
}

/// A match key of `len` lowercase hex characters.
pub fn match_key(len: usize) -> impl Strategy<Value = MatchKey> {
    prop::collection::vec(any::<u8>(), (len + 1) / 2).prop_map(move |bytes| {
        let mut hex = hex::encode(bytes);
        hex.truncate(len);
        MatchKey::new(hex)
    })
}

/// An arbitrary newline-terminated variant.
pub fn variant() -> impl Strategy<Value = RenderedVariant> {
    prop::collection::vec(line(), 1..6).prop_map(|lines| {
        let mut text = String::new();
        for l in lines {
            text.push_str(&l);
            text.push('\n');
        }
        RenderedVariant::new(text)
    })
}

/// A sequence of cache inserts drawn from a small key space, so that
/// overwrites are common.
pub fn cache_ops(max_ops: usize) -> impl Strategy<Value = Vec<(MatchKey, RenderedVariant)>> {
    prop::collection::vec((match_key(1), variant()), 1..=max_ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use padcollide::{Collider, SearchConfig, SearchOutcome};
    use padcollide_core::{Coordinates, PaddingScheme, Side};
    use padcollide_store::{MemoryCache, SqliteCacheStore, VariantCache};
    use std::collections::HashMap;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn render_is_pure(doc in document(1, 8), i in attempt()) {
            let a = PaddingScheme::Lines.render(&doc, i);
            let b = PaddingScheme::Lines.render(&doc, i);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn level_is_monotonic(doc in document(1, 8), i in attempt()) {
            let here = Coordinates::of(&doc, i).level;
            let next = Coordinates::of(&doc, i + 1).level;
            prop_assert!(next == here || next == here + 1);
        }

        #[test]
        fn memory_and_sqlite_caches_agree(ops in cache_ops(48)) {
            let mut memory = MemoryCache::new();
            let store = SqliteCacheStore::open_memory().unwrap();
            let mut sqlite = store.cache(Side::Real);
            let mut last = HashMap::new();

            for (key, variant) in &ops {
                memory.insert(key.clone(), variant.clone()).unwrap();
                sqlite.insert(key.clone(), variant.clone()).unwrap();
                last.insert(key.clone(), variant.clone());
            }

            prop_assert_eq!(memory.entries().unwrap(), sqlite.entries().unwrap());
            for (key, variant) in &last {
                let stored = sqlite.lookup(key).unwrap();
                prop_assert_eq!(stored.as_ref(), Some(variant));
            }
        }

        #[test]
        fn every_collision_verifies((real, fake) in document_pair(4)) {
            let mut collider = Collider::new(real, fake, &SearchConfig::new(2)).unwrap();
            match collider.run().unwrap() {
                SearchOutcome::Collision(c) => prop_assert!(c.verify(collider.digest())),
                other => prop_assert!(false, "unexpected outcome {:?}", other),
            }
        }
    }
}
