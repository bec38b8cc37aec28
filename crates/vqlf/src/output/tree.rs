//! Filter tree output formatting.

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;
use vql_filter::filter::to_vql;
use vql_filter::mapping::to_mapping;
use vql_filter::tree::{FilterTree, NodeId, NodeKind};

use super::helpers::dim;

/// JSON output structure for a filter tree.
#[derive(Serialize)]
pub struct TreeOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    pub vql: String,
    pub nodes: usize,
    pub mapping: Value,
}

/// Formats a tree as JSON: its canonical mapping plus the rendered text.
pub fn format_tree_json(tree: &FilterTree, name: Option<&str>) -> Result<String, serde_json::Error> {
    let output = TreeOutput {
        name,
        vql: to_vql(tree),
        nodes: tree.len(),
        mapping: to_mapping(tree),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats a tree as an indented outline with node ids.
///
/// ```text
/// AND #0
/// ├── chr = 'chr1' #1
/// └── OR #2
///     ├── ref = 'A' #3
///     └── ref = 'G' #4 (disabled)
/// ```
pub fn format_tree_table(tree: &FilterTree, use_colors: bool) -> String {
    let mut output = String::new();
    write_node(tree, tree.root(), "", None, use_colors, &mut output);
    output
}

fn write_node(
    tree: &FilterTree,
    id: NodeId,
    indent: &str,
    is_last: Option<bool>,
    use_colors: bool,
    output: &mut String,
) {
    let Some(node) = tree.get(id) else {
        return;
    };

    let branch = match is_last {
        None => "",
        Some(true) => "└── ",
        Some(false) => "├── ",
    };

    let label = match node.kind() {
        NodeKind::Logic { operator, .. } => {
            let text = operator.to_string();
            if use_colors {
                text.cyan().bold().to_string()
            } else {
                text
            }
        }
        NodeKind::Condition(condition) => condition.to_string(),
    };
    let label = if !node.is_enabled() && use_colors {
        label.strikethrough().to_string()
    } else {
        label
    };

    output.push_str(indent);
    output.push_str(branch);
    output.push_str(&label);
    output.push(' ');
    output.push_str(&dim(&id.to_string(), use_colors));
    if !node.is_enabled() {
        output.push(' ');
        output.push_str(&dim("(disabled)", use_colors));
    }
    output.push('\n');

    let child_indent = match is_last {
        None => indent.to_string(),
        Some(true) => format!("{indent}    "),
        Some(false) => format!("{indent}│   "),
    };
    let children = tree.children(id);
    for (index, child) in children.iter().enumerate() {
        let last = index + 1 == children.len();
        write_node(tree, *child, &child_indent, Some(last), use_colors, output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vql_filter::filter::FilterCompiler;
    use vql_filter::tree::FilterEditor;

    #[test]
    fn test_format_tree_table_outline() {
        let tree = FilterCompiler::compile("chr = 'chr1' AND (ref = 'A' OR ref = 'G')").unwrap();
        let ids = tree.depth_first();
        let expected = format!(
            "AND {}\n├── chr = 'chr1' {}\n└── OR {}\n    ├── ref = 'A' {}\n    └── ref = 'G' {}\n",
            ids[0], ids[1], ids[2], ids[3], ids[4]
        );
        assert_eq!(format_tree_table(&tree, false), expected);
    }

    #[test]
    fn test_format_tree_table_marks_disabled() {
        let mut editor =
            FilterEditor::with_tree(FilterCompiler::compile("a = 1 AND b = 2").unwrap());
        let second = editor.tree().children(editor.tree().root())[1];
        editor.set_enabled(second, false).unwrap();

        let output = format_tree_table(editor.tree(), false);
        assert!(output.contains(&format!("└── b = 2 {second} (disabled)")));
    }

    #[test]
    fn test_format_tree_table_empty() {
        let output = format_tree_table(&FilterTree::new(), false);
        assert!(output.starts_with("AND #"));
        assert_eq!(output.lines().count(), 1);
    }

    #[test]
    fn test_format_tree_json() {
        let tree = FilterCompiler::compile("pos > 100").unwrap();
        let json: Value = serde_json::from_str(&format_tree_json(&tree, Some("big")).unwrap()).unwrap();
        assert_eq!(json["name"], "big");
        assert_eq!(json["vql"], "pos > 100");
        assert_eq!(json["nodes"], 2);
        assert_eq!(json["mapping"]["$and"][0]["operator"], "$gt");
    }
}
