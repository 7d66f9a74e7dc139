//! # Block Definitions
//!
//! A block definition is a reusable animation preset: a stable id, a display
//! name, and an ordered parameter schema. Tokens and block segments refer to
//! definitions by id and only carry the parameter values that differ from, or
//! explicitly restate, the defaults declared here.
//!
//! Definitions are owned by an external store. The only mutation allowed on a
//! definition is appending a new parameter ([`BlockDefinition::append_param`]).

use crate::error::{DefinitionError, DefinitionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Parameter values of a single block usage, keyed by parameter key
pub type ParamValues = BTreeMap<String, Value>;

/// Kind of value a parameter holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Color,
    Text,
    Number,
    Select,
}

impl ParamType {
    /// Check whether a JSON value has the shape this parameter type expects
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamType::Number => value.is_number(),
            ParamType::Color | ParamType::Text | ParamType::Select => value.is_string(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Color => "color",
            ParamType::Text => "text",
            ParamType::Number => "number",
            ParamType::Select => "select",
        }
    }
}

/// Declaration of one parameter of a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: ParamType,
    pub default: Value,

    /// Natural-language template containing a `{value}` placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<String>,

    /// Allowed choices for `select` parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl ParamDef {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        kind: ParamType,
        default: impl Into<Value>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            default: default.into(),
            explain: None,
            options: Vec::new(),
        }
    }

    pub fn with_explain(mut self, explain: impl Into<String>) -> Self {
        self.explain = Some(explain.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    fn validate(&self, block_id: &str) -> DefinitionResult<()> {
        if self.key.is_empty() || self.key.contains(|c: char| c.is_whitespace() || c == '=') {
            return Err(DefinitionError::InvalidParamKey {
                block_id: block_id.to_string(),
                key: self.key.clone(),
            });
        }

        if !self.kind.accepts(&self.default) {
            return Err(DefinitionError::DefaultTypeMismatch {
                block_id: block_id.to_string(),
                key: self.key.clone(),
                expected: self.kind.as_str(),
            });
        }

        if self.kind == ParamType::Select && !self.options.is_empty() {
            let default = self.default.as_str().unwrap_or_default();
            if !self.options.iter().any(|option| option == default) {
                return Err(DefinitionError::DefaultNotAnOption {
                    block_id: block_id.to_string(),
                    key: self.key.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Reusable animation preset referenced by tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamDef>,

    /// Explicit display hue override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_seed: Option<u32>,
}

impl BlockDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            params: Vec::new(),
            color_seed: None,
        }
    }

    pub fn with_param(mut self, param: ParamDef) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_color_seed(mut self, seed: u32) -> Self {
        self.color_seed = Some(seed);
        self
    }

    pub fn param(&self, key: &str) -> Option<&ParamDef> {
        self.params.iter().find(|p| p.key == key)
    }

    /// Declared parameter keys in declaration order
    pub fn param_keys(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.key.as_str())
    }

    /// Check structural constraints: id syntax, unique keys, typed defaults
    pub fn validate(&self) -> DefinitionResult<()> {
        if !is_valid_block_id(&self.id) {
            return Err(DefinitionError::InvalidBlockId(self.id.clone()));
        }

        for (i, param) in self.params.iter().enumerate() {
            param.validate(&self.id)?;
            if self.params[..i].iter().any(|p| p.key == param.key) {
                return Err(DefinitionError::DuplicateParam {
                    block_id: self.id.clone(),
                    key: param.key.clone(),
                });
            }
        }

        Ok(())
    }

    /// Append a new parameter; existing parameters are never touched
    pub fn append_param(&mut self, param: ParamDef) -> DefinitionResult<()> {
        if self.param(&param.key).is_some() {
            return Err(DefinitionError::DuplicateParam {
                block_id: self.id.clone(),
                key: param.key,
            });
        }
        param.validate(&self.id)?;
        self.params.push(param);
        Ok(())
    }

    /// Every declared parameter set to its default
    pub fn defaults(&self) -> ParamValues {
        self.params
            .iter()
            .map(|p| (p.key.clone(), p.default.clone()))
            .collect()
    }

    /// Declared parameters paired with their effective value (explicit or default)
    pub fn effective_values<'a>(&'a self, values: &'a ParamValues) -> Vec<(&'a ParamDef, &'a Value)> {
        self.params
            .iter()
            .map(|p| (p, values.get(&p.key).unwrap_or(&p.default)))
            .collect()
    }
}

/// Read access to block definitions by id
///
/// Everything that resolves tokens (rendering, segment conversion, flattening)
/// goes through this seam instead of a concrete store.
pub trait DefinitionLookup {
    fn definition(&self, id: &str) -> Option<&BlockDefinition>;

    /// Opaque project data attached to the definition, if the lookup tracks any
    fn project(&self, _id: &str) -> Option<&Value> {
        None
    }
}

impl DefinitionLookup for [BlockDefinition] {
    fn definition(&self, id: &str) -> Option<&BlockDefinition> {
        self.iter().find(|def| def.id == id)
    }
}

impl DefinitionLookup for Vec<BlockDefinition> {
    fn definition(&self, id: &str) -> Option<&BlockDefinition> {
        self.as_slice().definition(id)
    }
}

impl DefinitionLookup for HashMap<String, BlockDefinition> {
    fn definition(&self, id: &str) -> Option<&BlockDefinition> {
        self.get(id)
    }
}

/// Block ids are non-empty runs of `[A-Za-z0-9_-]`
pub fn is_valid_block_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fade() -> BlockDefinition {
        BlockDefinition::new("fade_in", "Fade In")
            .with_param(ParamDef::new("color", "Color", ParamType::Color, "#000"))
            .with_param(
                ParamDef::new("speed", "Speed", ParamType::Number, 1)
                    .with_explain("set the animation speed to {value}"),
            )
    }

    #[test]
    fn test_valid_definition() {
        assert!(fade().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_id() {
        let def = BlockDefinition::new("fade in", "Fade");
        assert!(matches!(def.validate(), Err(DefinitionError::InvalidBlockId(_))));
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let def = fade().with_param(ParamDef::new("speed", "Again", ParamType::Number, 2));
        assert!(matches!(
            def.validate(),
            Err(DefinitionError::DuplicateParam { .. })
        ));
    }

    #[test]
    fn test_rejects_mistyped_default() {
        let def = BlockDefinition::new("x", "X")
            .with_param(ParamDef::new("speed", "Speed", ParamType::Number, "fast"));
        assert!(matches!(
            def.validate(),
            Err(DefinitionError::DefaultTypeMismatch { expected: "number", .. })
        ));
    }

    #[test]
    fn test_select_default_must_be_option() {
        let def = BlockDefinition::new("x", "X").with_param(
            ParamDef::new("ease", "Ease", ParamType::Select, "bounce")
                .with_options(["linear", "ease-in"]),
        );
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_append_param_is_append_only() {
        let mut def = fade();
        def.append_param(ParamDef::new("delay", "Delay", ParamType::Number, 0))
            .unwrap();
        assert_eq!(def.param_keys().collect::<Vec<_>>(), vec!["color", "speed", "delay"]);

        let err = def
            .append_param(ParamDef::new("color", "Other", ParamType::Color, "#fff"))
            .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateParam { .. }));
        assert_eq!(def.param("color").unwrap().default, json!("#000"));
    }

    #[test]
    fn test_effective_values_fall_back_to_defaults() {
        let def = fade();
        let mut values = ParamValues::new();
        values.insert("speed".to_string(), json!(2));

        let effective = def.effective_values(&values);
        assert_eq!(effective[0].1, &json!("#000"));
        assert_eq!(effective[1].1, &json!(2));
    }

    #[test]
    fn test_definition_json_shape() {
        let json = serde_json::to_value(fade().with_color_seed(200)).unwrap();
        assert_eq!(json["colorSeed"], json!(200));
        assert_eq!(json["params"][1]["type"], json!("number"));
        assert_eq!(json["params"][1]["explain"], json!("set the animation speed to {value}"));
        assert!(json["params"][0].get("explain").is_none());
    }
}
