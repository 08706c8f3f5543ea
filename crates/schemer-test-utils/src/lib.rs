//! Testing utilities for the schemer workspace
//!
//! Shared fixture schemes and custom validators.

#![allow(missing_docs)]

use std::sync::Arc;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{json, Value};

use schemer::{bag, candidates, group, property, Decl, Scheme, Validator};
use schemer_validators::{boolean, custom, nullable_boolean, nullable_numeric, numeric, text};

/// Prize ids: positive integers, codes like `AB123`, or a list of those
pub fn prize_identifier() -> Arc<dyn Validator> {
    let code = Regex::new(r"^[A-Z]{2}\d{3,}$").ok();
    let single = move |value: &Value| match value {
        Value::Number(n) => n.as_u64().is_some_and(|n| n > 0),
        Value::String(s) => code.as_ref().is_some_and(|re| re.is_match(s)),
        _ => false,
    };
    custom("prize_identifier", move |value| match value {
        Value::Array(items) => !items.is_empty() && items.iter().all(&single),
        other => single(other),
    })
}

/// Draw start: a `YYYY-MM-DD` date not before 2000
pub fn draw_start_date() -> Arc<dyn Validator> {
    let earliest = NaiveDate::from_ymd_opt(2000, 1, 1);
    custom("draw_start_date", move |value| {
        value
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .is_some_and(|date| earliest.map_or(true, |min| date >= min))
    })
}

/// `draws` options picked by prize id
pub fn draws_decl() -> Decl {
    candidates(
        "draws",
        [bag([
            property("prizeId").validated(prize_identifier()).unique_key(),
            property("mechanics").choices(["random", "nth"]).default("random"),
        ])],
    )
}

pub fn draws_scheme() -> Scheme {
    Scheme::new(bag([draws_decl()])).unwrap()
}

/// Competition whose type unlocks either draws or an instant win rate
pub fn competition_decl() -> Decl {
    bag([property("competition").children([
        property("name").validated(text()).into(),
        property("type")
            .choices(["instant", "draw"])
            .on("instant", property("winRate").validated(numeric()))
            .on(
                "draw",
                group([
                    property("drawStart").validated(draw_start_date()).into(),
                    draws_decl(),
                ]),
            )
            .into(),
        candidates("channels", ["web", "mobile", "kiosk"]),
    ])])
}

pub fn competition_scheme() -> Scheme {
    Scheme::new(competition_decl()).unwrap()
}

fn text_step() -> Decl {
    group([
        property("title").validated(text()).default("Type something"),
        property("titleAfter").validated(text()).default("Your text"),
        property("prompt").children([
            property("type").value("text"),
            property("maxLength").validated(nullable_numeric()),
        ]),
    ])
}

fn choice_step() -> Decl {
    group([
        property("title").validated(text()),
        property("titleAfter").children([
            property("onCorrect").validated(text()),
            property("onWrong").validated(text()),
        ]),
        property("prompt").children([
            property("type").value("options").into(),
            candidates(
                "options",
                [bag([
                    property("key").validated(text()).unique_key(),
                    property("option").validated(text()),
                    property("correct").validated(nullable_boolean()),
                ])],
            ),
        ]),
    ])
}

/// Inquiry with user settings and typed steps
pub fn inquiry_decl() -> Decl {
    bag([property("inquiry").children([
        property("settings").children([property("users").children([
            property("maxCountOfQueries").validated(numeric()).default(1),
            property("sendHello").validated(boolean()).default(false),
        ])])
        .into(),
        candidates(
            "steps",
            [bag([property("type")
                .choices(["typeText", "chooseOne"])
                .unique_key()
                .on("typeText", text_step())
                .on("chooseOne", choice_step())])],
        ),
    ])])
}

pub fn inquiry_scheme() -> Scheme {
    Scheme::new(inquiry_decl()).unwrap()
}

/// Inquiry data accepted by [`inquiry_scheme`]
pub fn inquiry_data() -> Value {
    json!({
        "inquiry": {
            "settings": {"users": {"maxCountOfQueries": 3, "sendHello": true}},
            "steps": [
                {
                    "type": "typeText",
                    "title": "Your name?",
                    "titleAfter": "Thanks",
                    "prompt": {"type": "text", "maxLength": 40}
                },
                {
                    "type": "chooseOne",
                    "title": "Pick a colour",
                    "titleAfter": {"onCorrect": "Right", "onWrong": "Nope"},
                    "prompt": {
                        "type": "options",
                        "options": [
                            {"key": "r", "option": "Red", "correct": true},
                            {"key": "g", "option": "Green", "correct": false}
                        ]
                    }
                }
            ]
        }
    })
}

/// Leaf node at `path` under the root
pub fn leaf(scheme: &Scheme, path: &str) -> schemer::NodeId {
    let root = scheme.root();
    scheme.find(root, path).unwrap().and_then(|entry| entry.as_node()).unwrap()
}
