//! Command implementations.

use std::fs;
use std::path::Path;

use ormkit_core::{ModelRegistry, ThroughRelationship};
use serde_json::json;

use crate::Command;

/// Run a command and return its printable output.
pub fn run(command: &Command) -> Result<String, Box<dyn std::error::Error>> {
    match command {
        Command::Validate { file } => validate(file),
        Command::Resolve {
            file,
            parent,
            through,
            target,
            json,
        } => resolve(file, parent, through, target, *json),
    }
}

fn load(file: &Path) -> Result<ModelRegistry, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file)
        .map_err(|e| format!("cannot read {}: {}", file.display(), e))?;
    let registry = ModelRegistry::new();
    let loaded = registry.load_json(&content)?;
    tracing::info!(file = %file.display(), models = loaded.len(), "model definitions loaded");
    Ok(registry)
}

fn validate(file: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let registry = load(file)?;
    let mut lines = vec![format!("{} model(s) valid", registry.len())];
    for name in registry.model_names() {
        if let Some(model) = registry.get(&name) {
            lines.push(format!(
                "  {} -> {} ({} columns, {} relations)",
                model.name,
                model.table,
                model.attributes.len(),
                model.relations.len()
            ));
        }
    }
    Ok(lines.join("\n"))
}

fn resolve(
    file: &Path,
    parent: &str,
    through: &str,
    target: &str,
    as_json: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let registry = load(file)?;
    let resolved = registry.resolve_through(parent, through, target)?;

    if as_json {
        Ok(serde_json::to_string_pretty(&to_json(&resolved))?)
    } else {
        Ok(format_resolved(parent, through, target, &resolved))
    }
}

fn to_json(resolved: &ThroughRelationship) -> serde_json::Value {
    json!({
        "throughRelationshipType": resolved.through_kind.tag(),
        "throughModel": resolved.through_model.name,
        "throughKey": resolved.through_key,
        "targetRelationshipType": resolved.target_kind.tag(),
        "targetModel": resolved.target_model.name,
        "targetKey": resolved.target_key,
        "relationshipCombination": resolved.combination,
    })
}

fn format_resolved(
    parent: &str,
    through: &str,
    target: &str,
    resolved: &ThroughRelationship,
) -> String {
    let [first, second] = resolved.join_path();
    format!(
        "{parent}.{through}.{target}: {}\n  {:<14} {} ON {}\n  {:<14} {} ON {}",
        resolved.combination,
        first.kind.tag(),
        first.table,
        first.key,
        second.kind.tag(),
        second.table,
        second.key,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    const MODELS: &str = r#"[
        {
            "name": "Order",
            "table": "orders",
            "attributes": {"id": {"type": "int64", "primaryKey": true}},
            "hasMany": {"items": {"model": "Item", "key": "order_id"}}
        },
        {
            "name": "Item",
            "table": "items",
            "attributes": {"id": {"type": "int64", "primaryKey": true}},
            "belongsTo": {"supplier": {"model": "Supplier", "key": "supplier_id"}}
        },
        {
            "name": "Supplier",
            "table": "suppliers",
            "attributes": {"id": {"type": "int64", "primaryKey": true}}
        }
    ]"#;

    fn models_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn resolve_command(file: PathBuf, target: &str, json: bool) -> Command {
        Command::Resolve {
            file,
            parent: "Order".into(),
            through: "items".into(),
            target: target.into(),
            json,
        }
    }

    #[test]
    fn test_validate() {
        let file = models_file(MODELS);
        let output = run(&Command::Validate {
            file: file.path().to_path_buf(),
        })
        .unwrap();

        assert!(output.starts_with("3 model(s) valid"));
        assert!(output.contains("Item -> items (1 columns, 1 relations)"));
    }

    #[test]
    fn test_validate_rejects_missing_table() {
        let file = models_file(r#"[{"name": "Order", "attributes": {"id": {"type": "int64"}}}]"#);
        let err = run(&Command::Validate {
            file: file.path().to_path_buf(),
        })
        .unwrap_err();

        assert!(err.to_string().contains("no table name"));
    }

    #[test]
    fn test_resolve_text() {
        let file = models_file(MODELS);
        let output = run(&resolve_command(file.path().to_path_buf(), "supplier", false)).unwrap();

        assert!(output.starts_with("Order.items.supplier: hasMany-belongsTo"));
        assert!(output.contains("items ON order_id"));
        assert!(output.contains("suppliers ON supplier_id"));
    }

    #[test]
    fn test_resolve_json() {
        let file = models_file(MODELS);
        let output = run(&resolve_command(file.path().to_path_buf(), "supplier", true)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["throughModel"], "Item");
        assert_eq!(value["targetKey"], "supplier_id");
        assert_eq!(value["relationshipCombination"], "hasMany-belongsTo");
    }

    #[test]
    fn test_resolve_failure() {
        let file = models_file(MODELS);
        let err = run(&resolve_command(file.path().to_path_buf(), "warehouse", false)).unwrap_err();

        assert_eq!(err.to_string(), "invalid target relation [warehouse]");
    }

    #[test]
    fn test_missing_file() {
        let err = run(&Command::Validate {
            file: PathBuf::from("/nonexistent/models.json"),
        })
        .unwrap_err();
        assert!(err.to_string().starts_with("cannot read"));
    }
}
