//! Embedded JSON Schema for the dashboard manifest.
//!
//! The manifest is validated as a raw `serde_json::Value` before it is
//! deserialized, so shape errors carry a JSON Pointer instead of a serde
//! line/column. Validation is available behind the `schemaval` feature;
//! without it only serde's `deny_unknown_fields` checks apply.

use serde_json::Value;

use crate::IoResult;

/// Draft-07 schema for `manifest.json`.
pub const MANIFEST_SCHEMA: &str = r##"{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "title": "sales dashboard manifest",
  "type": "object",
  "additionalProperties": false,
  "required": ["sources"],
  "properties": {
    "id": { "type": "string", "minLength": 1 },
    "sources": {
      "type": "object",
      "additionalProperties": false,
      "required": ["sales", "customers", "cities", "stock_items", "employees"],
      "properties": {
        "sales":       { "$ref": "#/definitions/source" },
        "customers":   { "$ref": "#/definitions/source" },
        "cities":      { "$ref": "#/definitions/source" },
        "stock_items": { "$ref": "#/definitions/source" },
        "employees":   { "$ref": "#/definitions/source" }
      }
    },
    "inputs_sha256": {
      "type": "object",
      "additionalProperties": false,
      "propertyNames": { "enum": ["sales", "customers", "cities", "stock_items", "employees"] },
      "patternProperties": {
        ".*": { "type": "string", "pattern": "^[0-9a-f]{64}$" }
      }
    },
    "limits": {
      "type": "object",
      "additionalProperties": false,
      "properties": {
        "top_n":        { "type": "integer", "minimum": 1 },
        "state_rows":   { "type": "integer", "minimum": 1 },
        "preview_rows": { "type": "integer", "minimum": 0 }
      }
    }
  },
  "definitions": {
    "source": {
      "type": "object",
      "additionalProperties": false,
      "required": ["path"],
      "properties": {
        "path":           { "type": "string", "minLength": 1 },
        "format":         { "enum": ["csv", "xlsx"] },
        "encoding":       { "type": "string", "minLength": 1 },
        "promote_header": { "type": "boolean" },
        "sheet":          { "type": "string", "minLength": 1 }
      }
    }
  }
}"##;

/// Validate a manifest value against [`MANIFEST_SCHEMA`].
#[cfg(feature = "schemaval")]
pub fn validate_manifest_value(value: &Value) -> IoResult<()> {
    use crate::IoError;
    use jsonschema::{Draft, JSONSchema};

    let schema: Value = serde_json::from_str(MANIFEST_SCHEMA)
        .map_err(|e| IoError::Schema(format!("embedded schema: {e}")))?;
    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema)
        .map_err(|e| IoError::Schema(format!("embedded schema: {e}")))?;

    if let Err(errors) = compiled.validate(value) {
        let mut msgs: Vec<String> = errors
            .map(|e| {
                let ptr = e.instance_path.to_string();
                let ptr = if ptr.is_empty() { "/".to_string() } else { ptr };
                format!("{ptr}: {e}")
            })
            .collect();
        msgs.sort();
        return Err(IoError::Schema(msgs.join("; ")));
    }
    Ok(())
}

#[cfg(not(feature = "schemaval"))]
#[inline]
pub fn validate_manifest_value(_value: &Value) -> IoResult<()> {
    Ok(())
}

#[cfg(all(test, feature = "schemaval"))]
mod tests {
    use super::*;
    use crate::IoError;
    use serde_json::json;

    fn sources() -> Value {
        json!({
            "sales": { "path": "FactSale.csv" },
            "customers": { "path": "DimCustomer.csv", "encoding": "latin1", "promote_header": true },
            "cities": { "path": "DimCity.csv" },
            "stock_items": { "path": "DimStockItem.csv" },
            "employees": { "path": "DimEmployee.xlsx", "format": "xlsx" }
        })
    }

    #[test]
    fn minimal_manifest_is_valid() {
        assert!(validate_manifest_value(&json!({ "sources": sources() })).is_ok());
    }

    #[test]
    fn unknown_format_is_rejected() {
        let mut s = sources();
        s["sales"]["format"] = json!("parquet");
        let err = validate_manifest_value(&json!({ "sources": s })).unwrap_err();
        match err {
            IoError::Schema(msg) => assert!(msg.contains("/sources/sales/format"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn digest_must_be_lower_hex() {
        let m = json!({ "sources": sources(), "inputs_sha256": { "sales": "ABC" } });
        assert!(matches!(validate_manifest_value(&m), Err(IoError::Schema(_))));
    }

    #[test]
    fn missing_source_is_rejected() {
        let mut s = sources();
        s.as_object_mut().unwrap().remove("employees");
        assert!(validate_manifest_value(&json!({ "sources": s })).is_err());
    }
}
