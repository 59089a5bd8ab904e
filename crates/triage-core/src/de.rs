//! Lenient readers for validator JSON. The validator is an external program and
//! older reports carry numbers, `null`s or missing keys where newer ones carry
//! strings; none of that may break loading a report.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::model::EngineRef;

/// Reads any JSON scalar as text. Absent and `null` become `""`.
pub(crate) fn lenient_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(d)?;
    Ok(match raw {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    })
}

/// Engine ids are numeric in the web report and textual in some CLI reports.
pub(crate) fn lenient_engine<'de, D>(d: D) -> Result<EngineRef, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(d)?;
    Ok(match raw {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => EngineRef::Number(i),
            None => EngineRef::Name(n.to_string()),
        },
        Some(Value::String(s)) => EngineRef::Name(s),
        Some(Value::Bool(b)) => EngineRef::Name(b.to_string()),
        _ => EngineRef::default(),
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "lenient_string")]
        text: String,
        #[serde(default, deserialize_with = "lenient_engine")]
        engine: EngineRef,
    }

    #[test]
    fn scalars_become_text() {
        let p: Sample = serde_json::from_str(r#"{"text": 0.5, "engine": 2}"#).unwrap();
        assert_eq!(p.text, "0.5");
        assert_eq!(p.engine, EngineRef::Number(2));

        let p: Sample = serde_json::from_str(r#"{"text": null, "engine": "xpath"}"#).unwrap();
        assert_eq!(p.text, "");
        assert_eq!(p.engine, EngineRef::Name("xpath".into()));

        let p: Sample = serde_json::from_str("{}").unwrap();
        assert_eq!(p.text, "");
        assert_eq!(p.engine, EngineRef::default());
    }
}
