//! # Context Flattening
//!
//! Every block reference in a prompt becomes a [`ResolvedUsage`]: the
//! definition's schema, each declared parameter paired with its effective
//! value, rendered explanations, and attached context.
//!
//! References to ids missing from the lookup are skipped. Stale references
//! show up after a definition is deleted and are not an error here.

use crate::context::RequestOptions;
use blockprompt_editor::Segment;
use blockprompt_parser::{tokenize, DefinitionLookup, ParamDef, ParamValues};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Schema part of a usage record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageDef {
    pub params: Vec<ParamDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedParam {
    pub key: String,
    pub default: Value,
    /// Explicit value if the usage set one, else the default
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageContext {
    pub url: Option<String>,
    pub data: Option<Value>,
}

/// One flattened block usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedUsage {
    pub id: String,
    pub name: String,
    pub def: UsageDef,
    pub params: Vec<ResolvedParam>,
    #[serde(default)]
    pub project: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<UsageContext>,
}

impl ResolvedUsage {
    /// Rendered explanation sentences, in parameter order
    pub fn explanations(&self) -> impl Iterator<Item = &str> {
        self.params.iter().filter_map(|p| p.explanation.as_deref())
    }
}

/// Substitute the first `{value}` placeholder with the value's JSON rendering
///
/// ```
/// use blockprompt_compiler_request::explain;
/// use serde_json::json;
///
/// assert_eq!(explain("set the animation speed to {value}", &json!(2)), "set the animation speed to 2");
/// assert_eq!(explain("tint it {value}", &json!("red")), r#"tint it "red""#);
/// ```
pub fn explain(template: &str, value: &Value) -> String {
    template.replacen("{value}", &value.to_string(), 1)
}

fn resolve(
    block_id: &str,
    values: &ParamValues,
    context: Option<UsageContext>,
    lookup: &dyn DefinitionLookup,
    options: &RequestOptions,
) -> Option<ResolvedUsage> {
    let Some(def) = lookup.definition(block_id) else {
        debug!(block_id = %block_id, "Skipping usage of unknown block");
        return None;
    };

    let params = def
        .effective_values(values)
        .into_iter()
        .map(|(param, value)| ResolvedParam {
            key: param.key.clone(),
            default: param.default.clone(),
            value: value.clone(),
            explanation: param
                .explain
                .as_deref()
                .filter(|_| options.include_explanations)
                .map(|template| explain(template, value)),
        })
        .collect();

    let project = if options.include_project {
        lookup.project(block_id).cloned().unwrap_or(Value::Null)
    } else {
        Value::Null
    };

    Some(ResolvedUsage {
        id: def.id.clone(),
        name: def.name.clone(),
        def: UsageDef {
            params: def.params.clone(),
        },
        params,
        project,
        context,
    })
}

/// Flatten the block segments of a segment list, in order
pub fn flatten_segments(
    segments: &[Segment],
    lookup: &dyn DefinitionLookup,
    options: &RequestOptions,
) -> Vec<ResolvedUsage> {
    segments
        .iter()
        .filter_map(Segment::as_block)
        .filter_map(|block| {
            let context = (block.context_url.is_some() || block.context_data.is_some()).then(|| {
                UsageContext {
                    url: block.context_url.clone(),
                    data: block.context_data.clone(),
                }
            });
            resolve(&block.block_id, &block.values, context, lookup, options)
        })
        .collect()
}

/// Flatten the tokens of a canonical string, in order
pub fn flatten_string(
    source: &str,
    lookup: &dyn DefinitionLookup,
    options: &RequestOptions,
) -> Vec<ResolvedUsage> {
    tokenize(source)
        .iter()
        .filter_map(|token| resolve(token.block_id, &token.params(), None, lookup, options))
        .collect()
}
