//! Property-based checks of path grammar, picking and data round trips

use proptest::prelude::*;
use serde_json::{json, Value};

use schemer::{SchemePath, Segment, Selector};
use schemer_test_utils::draws_scheme;

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,7}"
}

fn segment() -> impl Strategy<Value = Segment> {
    (
        name(),
        prop::option::of("[a-z0-9]{1,5}"),
        prop::option::of((name(), prop::option::of("[a-z0-9.,]{1,6}|\\*"))),
    )
        .prop_map(|(field, binding, selector)| {
            let mut segment = Segment::field(field);
            if let Some(binding) = binding {
                segment = segment.with_binding(binding);
            }
            if let Some((key, value)) = selector {
                segment = segment.with_selector(Selector::new(key, value));
            }
            segment
        })
}

proptest! {
    #[test]
    fn prop_path_display_parses_back(segments in prop::collection::vec(segment(), 1..5)) {
        let path = SchemePath::new(segments);
        let reparsed: SchemePath = path.to_string().parse().unwrap();
        prop_assert_eq!(reparsed, path);
    }

    #[test]
    fn prop_pick_is_idempotent(ids in prop::collection::vec(1u32..50, 1..8)) {
        let mut scheme = draws_scheme();
        let root = scheme.root();
        let draws = scheme.get_node(root, "draws").unwrap();

        for &id in &ids {
            let first = scheme.pick(draws, "prizeId", Some(json!(id))).unwrap();
            let again = scheme.pick(draws, &format!("prizeId={id}"), None).unwrap();
            prop_assert_eq!(first, again);
        }

        let mut unique = ids.clone();
        unique.sort_unstable();
        unique.dedup();
        prop_assert_eq!(scheme.items(draws).len(), unique.len());
    }

    #[test]
    fn prop_export_initialize_round_trip(
        entries in prop::collection::btree_map(1u32..100, any::<bool>(), 0..6)
    ) {
        let items: Vec<Value> = entries
            .iter()
            .map(|(id, nth)| json!({"prizeId": id, "mechanics": if *nth { "nth" } else { "random" }}))
            .collect();
        let data = json!({"draws": items});

        let mut scheme = draws_scheme();
        let root = scheme.root();
        scheme.initialize(root, &data).unwrap();
        prop_assert_eq!(scheme.export().unwrap(), data.clone());

        let mut copy = draws_scheme();
        let copy_root = copy.root();
        copy.initialize(copy_root, &scheme.export().unwrap()).unwrap();
        prop_assert_eq!(copy.export().unwrap(), data);
    }
}
