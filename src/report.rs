// src/report.rs

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use trellis_core::{Edge, PropertyRegistry};
use trellis_layout::{LayoutResult, NodeId};

use crate::document::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented tree with positions and sizes
    Tree,
    /// Nested JSON of every computed layout
    Json,
    /// Tree plus box edges, overflow and cache counters
    Detailed,
}

#[derive(Debug, Serialize)]
struct NodeReport<'a> {
    id: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    layout: LayoutResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<NodeReport<'a>>,
}

pub fn render(document: &Document, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Tree => render_tree(document, None),
        OutputFormat::Json => render_json(document),
        OutputFormat::Detailed => render_detailed(document),
    }
}

fn render_json(document: &Document) -> Result<String> {
    let report = collect(document, document.root)?;
    let mut output = serde_json::to_string_pretty(&report).context("Failed to serialize layout")?;
    output.push('\n');
    Ok(output)
}

fn collect(document: &Document, id: NodeId) -> Result<NodeReport<'_>> {
    let children = document
        .tree
        .children(id)?
        .iter()
        .map(|&child| collect(document, child))
        .collect::<Result<Vec<_>>>()?;
    Ok(NodeReport {
        id,
        name: document.name(id),
        text: document.text(id),
        layout: *document.tree.layout(id)?,
        children,
    })
}

/// Renders the node tree; with a registry, each node also lists its box
/// edges and the style properties it sets.
fn render_tree(document: &Document, registry: Option<&PropertyRegistry>) -> Result<String> {
    let mut output = String::new();
    render_node(&mut output, document, document.root, "", true, true, registry)?;
    Ok(output)
}

fn render_node(
    output: &mut String,
    document: &Document,
    id: NodeId,
    prefix: &str,
    is_root: bool,
    is_last: bool,
    registry: Option<&PropertyRegistry>,
) -> Result<()> {
    let layout = document.tree.layout(id)?;
    let branch = match (is_root, is_last) {
        (true, _) => "",
        (false, true) => "└── ",
        (false, false) => "├── ",
    };

    output.push_str(&format!("{}{}{}", prefix, branch, document.name(id).unwrap_or("node")));
    if let Some(text) = document.text(id) {
        output.push_str(&format!(" \"{}\"", text));
    }
    output.push_str(&format!(
        " pos:({}, {}) size:({}, {})\n",
        layout.left, layout.top, layout.width, layout.height
    ));

    let child_prefix = match (is_root, is_last) {
        (true, _) => prefix.to_string(),
        (false, true) => format!("{}    ", prefix),
        (false, false) => format!("{}│   ", prefix),
    };

    if let Some(registry) = registry {
        let changed = registry
            .non_default(document.tree.style(id)?)
            .iter()
            .map(|(meta, value)| format!("{}={}", meta.name, value))
            .collect::<Vec<_>>();
        if !changed.is_empty() {
            output.push_str(&format!("{}  • style: {}\n", child_prefix, changed.join(" ")));
        }
        let edges = |values: [f32; 4]| {
            Edge::PHYSICAL
                .iter()
                .zip(values)
                .map(|(edge, value)| format!("{}={}", edge, value))
                .collect::<Vec<_>>()
                .join(" ")
        };
        output.push_str(&format!("{}  • margin: {}\n", child_prefix, edges(layout.margin)));
        output.push_str(&format!("{}  • padding: {}\n", child_prefix, edges(layout.padding)));
        output.push_str(&format!("{}  • border: {}\n", child_prefix, edges(layout.border)));
        output.push_str(&format!("{}  • direction: {}\n", child_prefix, layout.direction));
        if layout.had_overflow {
            output.push_str(&format!("{}  • overflow\n", child_prefix));
        }
    }

    let children = document.tree.children(id)?;
    for (index, &child) in children.iter().enumerate() {
        render_node(output, document, child, &child_prefix, false, index + 1 == children.len(), registry)?;
    }
    Ok(())
}

fn render_detailed(document: &Document) -> Result<String> {
    let stats = document.tree.last_pass_stats();
    let config = document.tree.config();

    let mut output = String::new();
    output.push_str("=== TRELLIS LAYOUT ===\n\n");
    output.push_str(&format!("Nodes: {}\n", document.tree.len()));
    output.push_str(&format!("Point scale factor: {}\n", config.point_scale_factor));
    output.push_str(&format!(
        "Cache: {} hits, {} misses ({:.0}%), {} measure calls\n\n",
        stats.hits,
        stats.misses,
        stats.hit_rate() * 100.0,
        stats.measure_calls
    ));
    output.push_str(&render_tree(document, Some(&PropertyRegistry::new()))?);
    output.push_str("\n=== END LAYOUT ===\n");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Direction;
    use trellis_layout::LayoutConfig;

    fn sample() -> Document {
        let source = r#"{
            "name": "root",
            "style": { "width": 100, "height": 40, "flex-direction": "row" },
            "children": [
                { "name": "a", "style": { "width": 30 } },
                { "name": "b", "style": { "flex-grow": 1 } }
            ]
        }"#;
        let mut document = Document::from_json(source, LayoutConfig::default()).unwrap();
        document.layout(None, None, Direction::Ltr).unwrap();
        document
    }

    #[test]
    fn test_tree_output() {
        let output = render(&sample(), OutputFormat::Tree).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "root pos:(0, 0) size:(100, 40)");
        assert_eq!(lines[1], "├── a pos:(0, 0) size:(30, 40)");
        assert_eq!(lines[2], "└── b pos:(30, 0) size:(70, 40)");
    }

    #[test]
    fn test_json_output() {
        let output = render(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["name"], "root");
        assert_eq!(value["children"][1]["layout"]["width"], 70.0);
        assert_eq!(value["children"][1]["layout"]["direction"], "ltr");
    }

    #[test]
    fn test_detailed_output() {
        let output = render(&sample(), OutputFormat::Detailed).unwrap();
        assert!(output.contains("Nodes: 3"));
        assert!(output.contains("• direction: ltr"));
        assert!(output.contains("• style: flex-direction=row width=100 height=40"));
        assert!(output.contains("• style: flex-grow=1"));
    }
}
