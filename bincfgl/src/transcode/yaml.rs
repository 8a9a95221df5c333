//! YAML transcoding: convert CFGL values to YAML text.
//!
//! Mapping from CFGL to YAML:
//!   - Value::Integer  -> YAML integer
//!   - Value::Float    -> YAML float (always written with a fractional part)
//!   - Value::Text     -> YAML string (quoted when it would read as another type)
//!   - Value::Mapping  -> YAML mapping, in insertion order

use libcfgl::Value;

/// Encode a CFGL Value as a YAML string.
pub fn encode(value: &Value) -> Result<String, String> {
    let yaml_value = value_to_yaml(value);
    serde_yaml::to_string(&yaml_value).map_err(|e| format!("YAML encode error: {}", e))
}

fn value_to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Integer(n) => serde_yaml::Value::Number(serde_yaml::Number::from(*n)),
        Value::Float(f) => serde_yaml::Value::Number(serde_yaml::Number::from(*f)),
        Value::Text(s) => serde_yaml::Value::String(s.clone()),
        Value::Mapping(map) => {
            let mut out = serde_yaml::Mapping::new();
            for (k, v) in map {
                out.insert(serde_yaml::Value::String(k.clone()), value_to_yaml(v));
            }
            serde_yaml::Value::Mapping(out)
        }
    }
}
