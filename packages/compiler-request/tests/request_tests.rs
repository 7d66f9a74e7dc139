use blockprompt_common::{BlockLibrary, LibraryEntry};
use blockprompt_compiler_request::{
    build_request, build_request_from_string, GenerationRequest, RequestOptions,
};
use blockprompt_editor::Composition;
use blockprompt_parser::{BlockDefinition, ParamDef, ParamType};
use serde_json::{json, Value};

fn library() -> BlockLibrary {
    BlockLibrary::from_entries(vec![
        LibraryEntry::new(
            BlockDefinition::new("bounce", "Bounce").with_param(
                ParamDef::new("speed", "Speed", ParamType::Number, 1)
                    .with_explain("set the animation speed to {value}"),
            ),
            json!({"files": {"Bounce.tsx": "export const Bounce = () => null;"}}),
        ),
        LibraryEntry::new(
            BlockDefinition::new("glow", "Glow")
                .with_param(ParamDef::new("color", "Color", ParamType::Color, "#ff0")),
            Value::Null,
        ),
    ])
    .unwrap()
}

#[test]
fn test_request_json_shape() -> anyhow::Result<()> {
    let source = r##"Title [[Block:bounce speed=2]] with [[Block:glow color="#0af"]]"##;
    let request = build_request_from_string(source, &library(), &RequestOptions::default())?;
    let json: Value = serde_json::from_str(&request.to_json()?)?;

    assert_eq!(json["prompt"], json!(source));
    assert_eq!(json["blocks"].as_array().map(Vec::len), Some(2));

    let bounce = &json["blocks"][0];
    assert_eq!(bounce["id"], json!("bounce"));
    assert_eq!(bounce["def"]["params"][0]["type"], json!("number"));
    assert_eq!(
        bounce["def"]["params"][0]["explain"],
        json!("set the animation speed to {value}")
    );
    assert_eq!(bounce["params"][0]["value"], json!(2));
    assert_eq!(bounce["params"][0]["default"], json!(1));
    assert_eq!(bounce["project"]["files"]["Bounce.tsx"], json!("export const Bounce = () => null;"));
    assert!(bounce.get("context").is_none());

    assert_eq!(json["blocks"][1]["params"][0]["value"], json!("#0af"));
    assert_eq!(json["blocks"][1]["project"], Value::Null);

    let back: GenerationRequest = serde_json::from_value(json)?;
    assert_eq!(back, request);
    Ok(())
}

#[test]
fn test_segment_and_string_requests_agree() -> anyhow::Result<()> {
    let library = library();
    let source = "a [[Block:bounce]] b [[Block:missing]] c [[Block:glow]]";
    let composition = Composition::from_string(source, &library);

    let from_segments = build_request(composition.segments(), &library, &RequestOptions::default())?;
    let from_string = build_request_from_string(source, &library, &RequestOptions::default())?;

    assert_eq!(from_segments, from_string);
    assert_eq!(from_segments.blocks.len(), 2);
    Ok(())
}
