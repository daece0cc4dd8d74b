//! Session configuration.

use serde::{Deserialize, Serialize};

/// Tunables for an [`EditorSession`](crate::editor_session::EditorSession).
///
/// Every field has a default, so a host can pass `{}` or only the keys it
/// cares about:
///
/// ```rust
/// use catalog_editor_core::editor_config::EditorConfig;
///
/// let config: EditorConfig = serde_json::from_str(r#"{"max_history": 50}"#)?;
/// assert_eq!(config.max_history, Some(50));
/// assert_eq!(config.json_indent, 4);
/// assert_eq!(config.default_file_name, "products.json");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Snapshots kept for undo. `None` keeps all of them.
    pub max_history: Option<usize>,
    /// Spaces per indentation level in JSON exports.
    pub json_indent: usize,
    /// File name used for exports until a file is loaded.
    pub default_file_name: String,
    /// Name given to records created with "add product".
    pub new_product_name: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history: None,
            json_indent: 4,
            default_file_name: "products.json".to_string(),
            new_product_name: "New Product".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            max_history: Some(max_history),
            ..Self::default()
        }
    }
}
