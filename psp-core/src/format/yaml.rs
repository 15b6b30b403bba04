//! YAML component info blocks
//!
//! Newer EXP versions write the info block as a YAML mapping:
//!
//! ```text
//! name: dark halo
//! parameters: {nlevel: 1, indexing: true}
//! force:
//!   id: sphereSL
//!   parameters: {Lmax: 4}
//! ```
//!
//! `id` may also sit at the top level, and `force` may hold the force
//! parameters directly.

use alloc::string::{String, ToString};
use serde_yaml::Value;

use super::header::ComponentInfo;
use crate::validation::parsing::{ParamValue, Parameters};

pub(crate) fn parse_info(text: &str) -> Result<ComponentInfo, &'static str> {
    let root: Value = serde_yaml::from_str(text).map_err(|_| "invalid YAML info block")?;
    if !root.is_mapping() {
        return Err("YAML info block is not a mapping");
    }

    let name = root
        .get("name")
        .and_then(scalar_text)
        .filter(|name| !name.is_empty())
        .ok_or("YAML info block has no name")?;

    let force = root.get("force");
    let id = root
        .get("id")
        .or_else(|| force.and_then(|f| f.get("id")))
        .and_then(scalar_text)
        .unwrap_or_default();

    let parameters = root.get("parameters").map(to_parameters).unwrap_or_default();
    let force_parameters = match force {
        Some(force) => match force.get("parameters") {
            Some(params) => to_parameters(params),
            None => {
                let mut params = to_parameters(force);
                params.remove("id");
                params
            }
        },
        None => Parameters::new(),
    };

    Ok(ComponentInfo {
        name,
        id,
        parameters,
        force_parameters,
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn to_parameters(value: &Value) -> Parameters {
    let mut params = Parameters::new();
    if let Value::Mapping(map) = value {
        for (key, value) in map {
            if let Some(key) = scalar_text(key).filter(|k| !k.is_empty()) {
                params.insert(key, to_param_value(value));
            }
        }
    }
    params
}

/// YAML scalars keep their YAML type; booleans become `true`/`false` text
/// so [`ParamValue::as_bool`] reads them.
fn to_param_value(value: &Value) -> ParamValue {
    match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(v), _) => ParamValue::Int(v),
            (None, Some(v)) => ParamValue::Float(v),
            (None, None) => ParamValue::Str(n.to_string()),
        },
        Value::Bool(b) => ParamValue::Str(b.to_string()),
        Value::String(s) => ParamValue::Str(s.clone()),
        Value::Null => ParamValue::Str(String::new()),
        other => ParamValue::Str(
            serde_yaml::to_string(other)
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
        ),
    }
}
