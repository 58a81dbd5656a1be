use jsonschema::JSONSchema;
use log::{info, warn};
use serde_json::Value;

use crate::error::{PlanError, Result};

/// included sample catalog schema
static CATALOG_SCHEMA: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/schema/sample_catalog.json"));

/// Compile the embedded sample catalog schema
pub fn load_schema() -> Result<JSONSchema> {
    let schema_json: Value = serde_json::from_str(CATALOG_SCHEMA)
        .map_err(|err| PlanError::EmbeddedSchema(format!("not JSON: {err}")))?;
    compile_schema(&schema_json)
}

fn compile_schema(schema: &Value) -> Result<JSONSchema> {
    JSONSchema::options()
        .compile(schema)
        .map_err(|err| PlanError::EmbeddedSchema(err.to_string()))
}

/// Check a raw catalog document, collecting every violation into one error
pub fn validate(schema: &JSONSchema, json: &Value) -> Result<()> {
    info!("Validating sample catalog against JSON schema");
    let result = schema.validate(json).map_err(|errors| {
        errors
            .map(|err| format!("{} at {}", err, err.instance_path))
            .collect::<Vec<String>>()
    });

    match result {
        Ok(()) => Ok(()),
        Err(messages) => {
            warn!("Sample catalog fails validation");
            Err(PlanError::Catalog(messages.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn embedded_schema_compiles() {
        assert!(load_schema().is_ok());
    }

    #[test]
    fn broken_schema_is_not_a_catalog_error() {
        let schema = serde_json::json!({ "type": "no-such-type" });
        assert!(matches!(compile_schema(&schema), Err(PlanError::EmbeddedSchema(_))));
    }

    #[test]
    fn accepts_minimal_catalog() {
        let schema = load_schema().unwrap();
        let catalog = json!({
            "individuals": [{
                "id": "IND1",
                "samples": [{
                    "name": "SAMP1",
                    "library": "LIB1",
                    "sequencing": "SEQ1",
                    "tumor": false,
                    "platform": "ILLUMINA",
                    "center": "CTR1",
                    "date_sequenced": "2020-01-01",
                    "fastqs": [{ "read1": "a_1.fq" }]
                }]
            }]
        });
        assert!(validate(&schema, &catalog).is_ok());
    }

    #[test]
    fn reports_every_violation() {
        let schema = load_schema().unwrap();
        let catalog = json!({
            "individuals": [{
                "id": "IND1",
                "samples": [{ "name": "SAMP1", "tumor": "yes" }]
            }]
        });
        match validate(&schema, &catalog) {
            Err(PlanError::Catalog(message)) => {
                assert!(message.contains("library"));
                assert!(message.contains("/individuals/0/samples/0/tumor"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
