//! End-to-end scenarios over the fixture schemes

use pretty_assertions::assert_eq;
use serde_json::json;

use schemer::{bag, candidates, property, Entry, NodeType, Scheme, SchemeConfig, SchemeError};
use schemer_test_utils::{competition_scheme, draws_scheme, inquiry_data, inquiry_scheme, leaf};
use tracing_subscriber::EnvFilter;

/// Route resolver logs to the test output; `RUST_LOG=schemer=trace` shows every segment
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_draws_pick_set_and_lookup() {
    init_tracing();
    let mut scheme = draws_scheme();
    let root = scheme.root();
    let draws = scheme.get_node(root, "draws").unwrap();

    let item = scheme
        .pick(draws, "prizeId", Some(json!([1, 2, 3])))
        .unwrap()
        .as_node()
        .unwrap();
    scheme.set(item, "mechanics", "nth").unwrap();

    assert_eq!(
        scheme.export().unwrap(),
        json!({"draws": [{"prizeId": [1, 2, 3], "mechanics": "nth"}]})
    );
    let mechanics = scheme.get_node(draws, "[prizeId=1,2,3].mechanics").unwrap();
    assert_eq!(scheme.value(mechanics), Some(json!("nth")));
}

#[test]
fn test_pick_is_idempotent() {
    let mut scheme = draws_scheme();
    let root = scheme.root();
    let draws = scheme.get_node(root, "draws").unwrap();

    let first = scheme.pick(draws, "prizeId=5", None).unwrap();
    let second = scheme.pick(draws, "prizeId", Some(json!(5))).unwrap();
    assert_eq!(first, second);
    assert_eq!(scheme.items(draws).len(), 1);
    assert!(scheme.has_picked(draws, "prizeId=5"));
}

#[test]
fn test_equivalent_prize_ids_pick_one_item() {
    let mut scheme = draws_scheme();
    let root = scheme.root();
    let draws = scheme.get_node(root, "draws").unwrap();

    let first = scheme.pick(draws, "prizeId", Some(json!("007"))).unwrap();
    assert_eq!(first.as_node().and_then(|item| scheme.key(item)), Some("prizeId=7"));
    assert!(scheme.has_picked(draws, "prizeId=7"));
    assert_eq!(scheme.pick(draws, "prizeId", Some(json!(7))).unwrap(), first);
    scheme.set(root, "draws[prizeId=07].mechanics", "nth").unwrap();

    assert_eq!(
        scheme.export().unwrap(),
        json!({"draws": [{"prizeId": 7, "mechanics": "nth"}]})
    );
}

#[test]
fn test_set_through_selector_picks_and_defaults_apply() {
    let mut scheme = draws_scheme();
    let root = scheme.root();
    scheme.set(root, "draws[prizeId=7].mechanics", "nth").unwrap();
    scheme.set(root, "draws", "prizeId=AB123").unwrap();

    assert_eq!(
        scheme.export().unwrap(),
        json!({"draws": [
            {"prizeId": 7, "mechanics": "nth"},
            {"prizeId": "AB123", "mechanics": "random"}
        ]})
    );
}

#[test]
fn test_invalid_prize_is_rejected_without_leftovers() {
    let mut scheme = draws_scheme();
    let root = scheme.root();
    let draws = scheme.get_node(root, "draws").unwrap();
    let before = scheme.len();

    let err = scheme.pick(draws, "prizeId", Some(json!("nope"))).unwrap_err();
    assert!(matches!(err, SchemeError::InvalidValue(_)));
    assert_eq!(scheme.len(), before);
    assert!(scheme.items(draws).is_empty());
}

#[test]
fn test_unique_key_collision() {
    let mut scheme = draws_scheme();
    let root = scheme.root();
    scheme.set(root, "draws[prizeId=1].mechanics", "nth").unwrap();
    scheme.set(root, "draws[prizeId=2].mechanics", "nth").unwrap();

    let err = scheme.set(root, "draws[prizeId=2].prizeId", 1).unwrap_err();
    assert!(err.is_collision());

    scheme.set(root, "draws[prizeId=2].prizeId", 3).unwrap();
    let draws = scheme.get_node(root, "draws").unwrap();
    assert!(scheme.has_picked(draws, "prizeId=3"));
    assert!(!scheme.has_picked(draws, "prizeId=2"));
}

#[test]
fn test_unset_removes_picked_item() {
    let mut scheme = draws_scheme();
    let root = scheme.root();
    scheme.set(root, "draws[prizeId=1].mechanics", "nth").unwrap();
    scheme.unset(root, "draws[prizeId=1].prizeId").unwrap();
    assert_eq!(scheme.export().unwrap(), json!({"draws": []}));
}

#[test]
fn test_unpicked_selector_reports_hint() {
    let scheme = draws_scheme();
    let root = scheme.root();
    let err = scheme.get(root, "draws[9].mechanics").unwrap_err();
    assert!(err.is_not_found());
    assert!(err.message().ends_with("Did you mean '[prizeId=9]'?"), "{err}");
}

#[test]
fn test_wildcard_path_points_at_template() {
    let scheme = draws_scheme();
    let root = scheme.root();
    let mechanics = scheme.get_node(root, "draws[prizeId=*].mechanics").unwrap();
    assert_eq!(scheme.path(mechanics), "draws[prizeId=*].mechanics");
    assert_eq!(scheme.get_node(root, &scheme.path(mechanics)).unwrap(), mechanics);
}

#[test]
fn test_wildcard_path_cannot_change_template() {
    let mut scheme = draws_scheme();
    let root = scheme.root();
    let err = scheme.set(root, "draws[prizeId=*].mechanics", "nth").unwrap_err();
    assert!(matches!(err, SchemeError::InvalidValue(_)));

    scheme.set(root, "draws", "prizeId=1").unwrap();
    assert_eq!(
        scheme.export().unwrap(),
        json!({"draws": [{"prizeId": 1, "mechanics": "random"}]})
    );
}

#[test]
fn test_undetermined_conditional_blocks_strict_export() {
    let mut scheme = competition_scheme();
    let root = scheme.root();
    scheme.set(root, "competition.name", "Spring").unwrap();

    let err = scheme.export().unwrap_err();
    assert!(err.is_undetermined());

    scheme.set_config(SchemeConfig::new().with_strict_export(false));
    let exported = scheme.export().unwrap();
    assert_eq!(exported["competition"]["name"], json!("Spring"));
    assert!(exported["competition"].get("winRate").is_none());
}

#[test]
fn test_conditional_group_switches_with_trigger() {
    let mut scheme = competition_scheme();
    let root = scheme.root();
    scheme.set(root, "competition.type", "draw").unwrap();
    scheme.set(root, "competition.drawStart", "2026-11-01").unwrap();
    scheme.set(root, "competition.draws[prizeId=4].mechanics", "nth").unwrap();

    assert_eq!(scheme.value(leaf(&scheme, "competition.drawStart")), Some(json!("2026-11-01")));
    assert!(scheme.try_find(root, "competition.winRate").unwrap().is_none());

    scheme.set(root, "competition.type", "instant").unwrap();
    assert!(scheme.try_find(root, "competition.draws").unwrap().is_none());
    scheme.set(root, "competition.winRate", "0.25").unwrap();
    assert_eq!(scheme.value(leaf(&scheme, "competition.winRate")), Some(json!(0.25)));
}

#[test]
fn test_static_options_pick_by_value() {
    let mut scheme = competition_scheme();
    let root = scheme.root();
    let channels = scheme.get_node(root, "competition.channels").unwrap();
    assert!(scheme.contains_primitives(channels));

    let picked = scheme.pick(channels, "web", None).unwrap();
    assert_eq!(picked.as_item().map(|item| item.value().clone()), Some(json!("web")));
    let err = scheme.pick(channels, "fax", None).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_name_collision_and_deferred_validation() {
    let mut scheme = draws_scheme();
    let root = scheme.root();

    let err = scheme.add(root, property("draws")).unwrap_err();
    assert!(matches!(err, SchemeError::ExistingName(_)));

    let err = scheme
        .add(root, candidates("prizes", [bag([property("title")])]))
        .unwrap_err();
    assert!(matches!(err, SchemeError::InvalidUniqueKey(_)));
    assert!(scheme.find(root, "prizes").unwrap().is_none());
}

#[test]
fn test_inquiry_round_trip() {
    init_tracing();
    let mut scheme = inquiry_scheme();
    let root = scheme.root();
    scheme.initialize(root, &inquiry_data()).unwrap();
    assert_eq!(scheme.export().unwrap(), inquiry_data());

    let mut copy = inquiry_scheme();
    let copy_root = copy.root();
    copy.initialize_json(copy_root, &scheme.to_json(root).unwrap()).unwrap();
    assert_eq!(copy.export().unwrap(), inquiry_data());
}

#[test]
fn test_inquiry_defaults_and_nested_candidates() {
    let mut scheme = inquiry_scheme();
    let root = scheme.root();
    let steps = scheme.get_node(root, "inquiry.steps").unwrap();
    let step = scheme.pick(steps, "type=typeText", None).unwrap().as_node().unwrap();

    assert_eq!(scheme.value(scheme.get_node(step, "title").unwrap()), Some(json!("Type something")));
    assert_eq!(scheme.value(leaf(&scheme, "inquiry.settings.users.maxCountOfQueries")), Some(json!(1)));

    let choose = scheme.pick(steps, "type=chooseOne", None).unwrap().as_node().unwrap();
    scheme.set(choose, "prompt.options[key=a].option", "Apple").unwrap();
    let option = scheme.get(choose, "prompt.options[key=a]").unwrap();
    assert_eq!(scheme.node_type(option.as_node().unwrap()), NodeType::Bag);
}

#[test]
fn test_initialize_requires_unique_key() {
    let mut scheme = inquiry_scheme();
    let root = scheme.root();
    let err = scheme
        .initialize(root, &json!({"inquiry": {"steps": [{"title": "Orphan"}]}}))
        .unwrap_err();
    assert!(err.is_undetermined());
}

#[test]
fn test_try_variants_swallow_missing_items_only() {
    init_tracing();
    let mut scheme = draws_scheme();
    let root = scheme.root();
    assert!(scheme.try_find(root, "draws[prizeId=1].mechanics").unwrap().is_none());
    assert_eq!(scheme.try_set(root, "unknown.field", 1).unwrap(), root);
    assert!(scheme.try_set(root, "draws[prizeId=2].mechanics", "never").is_err());
}

#[test]
fn test_traverse_visits_items_and_candidate_fields() {
    let mut scheme = draws_scheme();
    let root = scheme.root();
    scheme.set(root, "draws[prizeId=1].mechanics", "nth").unwrap();

    let draws = scheme.get_node(root, "draws").unwrap();
    let item = scheme.items(draws)[0].as_node().unwrap();

    let visited: Vec<_> = scheme
        .traverse(draws)
        .map(|visit| (visit.level, scheme.path(visit.node)))
        .collect();
    assert_eq!(visited.first(), Some(&(1, scheme.path(item))));
    assert!(visited.contains(&(3, "draws[prizeId=1].mechanics".to_string())));
    assert!(visited.contains(&(2, "draws[prizeId=*].prizeId".to_string())));
}

#[test]
fn test_entry_kinds() {
    let mut scheme = competition_scheme();
    let root = scheme.root();
    let channels = scheme.get_node(root, "competition.channels").unwrap();
    scheme.pick(channels, "kiosk", None).unwrap();
    assert!(matches!(scheme.items(channels).as_slice(), [Entry::Item(_)]));
    assert!(Scheme::new(property("")).is_err());
}
