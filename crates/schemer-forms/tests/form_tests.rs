//! Forms built over the fixture schemes

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

use schemer_forms::{input_name, scheme_path, FieldSpec, InputType, SchemeForm, INPUT_PREFIX};
use schemer_test_utils::{competition_scheme, inquiry_scheme};

fn by_path<'a>(form: &'a SchemeForm, path: &str) -> &'a FieldSpec {
    form.fields().find(|spec| spec.path() == path).unwrap()
}

#[test]
fn test_competition_fields_follow_the_trigger() {
    let mut scheme = competition_scheme();
    let form = SchemeForm::from(&scheme).unwrap();
    let paths: Vec<_> = form.fields().map(FieldSpec::path).collect();
    assert_eq!(paths, vec!["competition.name", "competition.type"]);

    let name = by_path(&form, "competition.name");
    assert_eq!(name.input_type(), InputType::Text);
    assert!(name.is_required());
    assert_eq!(name.validator(), Some("text"));

    let kind = by_path(&form, "competition.type");
    assert!(kind.is_required());
    assert_eq!(kind.options().keys().collect::<Vec<_>>(), vec!["instant", "draw"]);

    let root = scheme.root();
    scheme.set(root, "competition.type", "draw").unwrap();
    let form = SchemeForm::from(&scheme).unwrap();
    let paths: Vec<_> = form.fields().map(FieldSpec::path).collect();
    assert_eq!(
        paths,
        vec![
            "competition.name",
            "competition.type",
            "competition.drawStart",
            "competition.draws[prizeId=*].prizeId",
            "competition.draws[prizeId=*].mechanics",
        ]
    );
}

#[test]
fn test_switches_and_nullable_inputs() {
    let scheme = inquiry_scheme();
    let form = SchemeForm::from(&scheme).unwrap();

    let hello = by_path(&form, "inquiry.settings.users.sendHello");
    assert_eq!(hello.input_type(), InputType::Switch);
    assert!(!hello.is_required());
    assert_eq!(hello.value(), &json!(false));

    let steps = by_path(&form, "inquiry.steps[type=*].type");
    assert!(steps.has_unique_key());
    assert_eq!(steps.options().get("type=chooseOne").map(String::as_str), Some("type:chooseOne"));
}

#[test]
fn test_labels_come_from_slug_translation() {
    let scheme = competition_scheme();
    let form = SchemeForm::builder()
        .with_prefix("cfg_")
        .with_slug(|slug: &str| slug.replace(':', " = "))
        .build(&scheme)
        .unwrap();

    let kind = by_path(&form, "competition.type");
    assert_eq!(kind.label(), "type");
    assert_eq!(kind.options().get("draw").map(String::as_str), Some("type = draw"));
    assert!(kind.input_name().starts_with("cfg_"));
    assert_eq!(scheme_path("cfg_", kind.input_name()).as_deref(), Some("competition.type"));
}

#[test]
fn test_submitted_values_reach_the_scheme() {
    let mut scheme = competition_scheme();
    let root = scheme.root();
    scheme.set(root, "competition.type", "draw").unwrap();
    let form = SchemeForm::from(&scheme).unwrap();

    let mut submitted = IndexMap::new();
    submitted.insert(input_name(INPUT_PREFIX, "competition.name"), json!("Autumn"));
    submitted.insert(input_name(INPUT_PREFIX, "competition.drawStart"), json!("2026-12-01"));
    submitted.insert(input_name(INPUT_PREFIX, "competition.draws[prizeId=*].prizeId"), json!("AB100"));
    submitted.insert(input_name(INPUT_PREFIX, "competition.draws[prizeId=*].mechanics"), json!("mechanics=nth"));
    form.update_scheme(&mut scheme, &submitted).unwrap();

    let exported = scheme.export().unwrap();
    assert_eq!(exported["competition"]["name"], json!("Autumn"));
    assert_eq!(
        exported["competition"]["draws"],
        json!([{"prizeId": "AB100", "mechanics": "nth"}])
    );

    let form = SchemeForm::from(&scheme).unwrap().grouped_only();
    let record = by_path(&form, "competition.draws[prizeId=AB100].mechanics").export();
    assert_eq!(record.group.as_deref(), Some("prizeId=AB100"));
    assert_eq!(record.value, json!("mechanics=nth"));
}

#[test]
fn test_rejected_submission_surfaces_scheme_error() {
    let mut scheme = competition_scheme();
    let form = SchemeForm::from(&scheme).unwrap();
    let mut submitted = IndexMap::new();
    submitted.insert(input_name(INPUT_PREFIX, "competition.name"), json!(""));
    let err = form.update_scheme(&mut scheme, &submitted).unwrap_err();
    assert_eq!(err.to_string(), "invalid value: 'competition.name' must not be empty.");
}

proptest! {
    #[test]
    fn prop_input_names_decode_to_paths(path in "[a-zA-Z0-9_.\\[\\]=*,]{1,40}") {
        let name = input_name(INPUT_PREFIX, &path);
        prop_assert_eq!(scheme_path(INPUT_PREFIX, &name), Some(path));
    }
}
