//! MCP tools backed by the static catalog.

pub mod execute;
pub mod explore;

pub use execute::{ExecuteApiTool, ExecuteParams};
pub use explore::{Depth, ExploreCatalogTool, ExploreParams};

use serde_json::Value;

/// JavaScript-style truthiness for loosely typed tool arguments.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Descriptions over 100 characters are cut to 97 plus `...`.
pub(crate) fn truncate_description(text: &str) -> String {
    if text.chars().count() > 100 {
        let head: String = text.chars().take(97).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(-1.5)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate_description("short"), "short");
        let long = "x".repeat(101);
        let cut = truncate_description(&long);
        assert_eq!(cut.chars().count(), 100);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_description(&"y".repeat(100)), "y".repeat(100));
    }
}
