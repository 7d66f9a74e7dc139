use crate::{
    build_request_from_string, explain, flatten_segments, flatten_string, RequestError,
    RequestOptions,
};
use blockprompt_editor::Composition;
use blockprompt_parser::{BlockDefinition, ParamDef, ParamType};
use serde_json::json;

fn defs() -> Vec<BlockDefinition> {
    vec![
        BlockDefinition::new("bounce", "Bounce")
            .with_param(
                ParamDef::new("speed", "Speed", ParamType::Number, 1)
                    .with_explain("set the animation speed to {value}"),
            )
            .with_param(ParamDef::new("color", "Color", ParamType::Color, "#000")),
        BlockDefinition::new("fade", "Fade"),
    ]
}

#[test]
fn test_explain_template() {
    assert_eq!(
        explain("set the animation speed to {value}", &json!(2)),
        "set the animation speed to 2"
    );
    assert_eq!(explain("no placeholder", &json!(2)), "no placeholder");
    assert_eq!(explain("{value} then {value}", &json!(true)), "true then {value}");
}

#[test]
fn test_flatten_effective_values() {
    let usages = flatten_string(
        "Go [[Block:bounce speed=2]] now",
        &defs(),
        &RequestOptions::default(),
    );

    assert_eq!(usages.len(), 1);
    let usage = &usages[0];
    assert_eq!(usage.name, "Bounce");
    assert_eq!(usage.params[0].value, json!(2));
    assert_eq!(usage.params[0].default, json!(1));
    assert_eq!(
        usage.params[0].explanation.as_deref(),
        Some("set the animation speed to 2")
    );
    assert_eq!(usage.params[1].value, json!("#000"));
    assert_eq!(usage.params[1].explanation, None);
    assert_eq!(usage.explanations().collect::<Vec<_>>(), vec!["set the animation speed to 2"]);
}

#[test]
fn test_unknown_blocks_are_skipped() {
    let usages = flatten_string(
        "[[Block:gone]] [[Block:fade]] [[Block:also_gone x=1]]",
        &defs(),
        &RequestOptions::default(),
    );
    assert_eq!(usages.len(), 1);
    assert_eq!(usages[0].id, "fade");
}

#[test]
fn test_segments_carry_context() {
    let mut composition = Composition::from_string("[[Block:bounce]] and [[Block:fade]]", &defs());
    let first = composition.segments()[1].id().to_string();
    composition
        .set_context(&first, Some("https://example.com/ref.gif".into()), None)
        .unwrap();

    let usages = flatten_segments(composition.segments(), &defs(), &RequestOptions::default());
    assert_eq!(
        usages[0].context.as_ref().and_then(|c| c.url.as_deref()),
        Some("https://example.com/ref.gif")
    );
    assert!(usages[1].context.is_none());
}

#[test]
fn test_options_drop_explanations() {
    let options = RequestOptions {
        include_explanations: false,
        ..RequestOptions::default()
    };
    let usages = flatten_string("[[Block:bounce]]", &defs(), &options);
    assert_eq!(usages[0].explanations().count(), 0);
}

#[test]
fn test_empty_prompt_rejected() {
    let err = build_request_from_string("   ", &defs(), &RequestOptions::default()).unwrap_err();
    assert!(matches!(err, RequestError::EmptyPrompt));

    let lenient = RequestOptions {
        reject_empty: false,
        ..RequestOptions::default()
    };
    assert!(build_request_from_string("", &defs(), &lenient).is_ok());
}
