use proptest::prelude::*;
use searchcore::normalize::{Normalize, Normalizer, NormalizerConfig};
use searchcore::query::{intersect_postings, intersect_sorted};
use std::collections::BTreeSet;

fn sorted_ids() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::btree_set(0u32..300, 0..60).prop_map(|s| s.into_iter().collect())
}

proptest! {
    #[test]
    fn self_intersection_is_identity(ids in sorted_ids()) {
        prop_assert_eq!(intersect_sorted(&ids, &ids), ids.clone());
        prop_assert_eq!(intersect_postings(vec![ids.clone(), ids.clone()]), ids);
    }

    #[test]
    fn intersection_matches_set_semantics(lists in prop::collection::vec(sorted_ids(), 1..5)) {
        let expected: BTreeSet<u32> = lists
            .iter()
            .map(|l| l.iter().copied().collect::<BTreeSet<u32>>())
            .reduce(|a, b| a.intersection(&b).copied().collect())
            .unwrap_or_default();
        let got = intersect_postings(lists);
        prop_assert!(got.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(got, expected.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn stem_keys_are_well_formed(raw in "[A-Za-z0-9.,'-]{0,24}") {
        let normalizer = Normalizer::from_config(&NormalizerConfig::stem());
        if let Some(key) = normalizer.normalize(&raw) {
            prop_assert!(!key.is_empty());
            prop_assert!(key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'), "{}", key);
        }
    }

    #[test]
    fn stem_keys_are_fixed_points(raw in "[A-Za-z][a-z0-9-]{0,15}") {
        let normalizer = Normalizer::from_config(&NormalizerConfig::stem());
        if let Some(key) = normalizer.normalize(&raw) {
            prop_assert!(key.chars().count() > 1, "{} -> {}", raw, key);
            prop_assert!(!normalizer.is_stopword(&key), "{} -> {}", raw, key);
            prop_assert_eq!(normalizer.normalize(&key), Some(key.clone()), "{} -> {}", raw, key);
        }
    }

    #[test]
    fn tagged_keys_are_fixed_points(raw in "[A-Za-z0-9][a-z0-9-]{0,15}") {
        let normalizer = Normalizer::from_config(&NormalizerConfig::tagged());
        if let Some(key) = normalizer.normalize(&raw) {
            prop_assert_eq!(normalizer.normalize(&key), Some(key.clone()), "{} -> {}", raw, key);
        }
    }

    #[test]
    fn tagged_keys_carry_one_tag(raw in "[A-Za-z0-9]{0,16}") {
        let normalizer = Normalizer::from_config(&NormalizerConfig::tagged());
        if let Some(key) = normalizer.normalize(&raw) {
            let (text, tag) = key.rsplit_once('_').unwrap();
            prop_assert!(text.chars().count() > 1);
            prop_assert!(tag.chars().all(|c| c.is_ascii_uppercase() || c == '$'));
        }
    }
}
