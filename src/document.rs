// src/document.rs

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use trellis_core::{Direction, Style};
use trellis_layout::{
    LayoutConfig, LayoutTree, MeasureInput, MeasureMode, MeasureProvider, NodeId, Size,
};

/// Advance of one character in layout units.
pub const CHAR_WIDTH: f32 = 8.0;
/// Height of one line of text in layout units.
pub const LINE_HEIGHT: f32 = 16.0;

/// One node of a JSON layout document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentNode {
    /// Label shown in reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub style: Style,
    /// Text content; turns the node into a measured leaf.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentNode>,
}

/// A document loaded into a [`LayoutTree`].
#[derive(Debug)]
pub struct Document {
    pub tree: LayoutTree,
    pub root: NodeId,
    texts: HashMap<NodeId, String>,
    names: HashMap<NodeId, String>,
}

impl Document {
    pub fn load<P: AsRef<Path>>(path: P, config: LayoutConfig) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;
        Self::from_json(&source, config)
            .with_context(|| format!("Failed to load document: {}", path.display()))
    }

    pub fn from_json(source: &str, config: LayoutConfig) -> Result<Self> {
        let root: DocumentNode = serde_json::from_str(source).context("Invalid document JSON")?;
        Self::from_node(&root, config)
    }

    pub fn from_node(root: &DocumentNode, config: LayoutConfig) -> Result<Self> {
        let mut tree = LayoutTree::with_config(config);
        let mut texts = HashMap::new();
        let mut names = HashMap::new();
        let root = Self::build(&mut tree, &mut texts, &mut names, root)?;
        debug!("Loaded document with {} nodes", tree.len());
        Ok(Self { tree, root, texts, names })
    }

    fn build(
        tree: &mut LayoutTree,
        texts: &mut HashMap<NodeId, String>,
        names: &mut HashMap<NodeId, String>,
        source: &DocumentNode,
    ) -> Result<NodeId> {
        let id = tree.new_node_with_style(source.style.clone());
        if let Some(name) = &source.name {
            names.insert(id, name.clone());
        }

        if let Some(text) = &source.text {
            if !source.children.is_empty() {
                return Err(anyhow!("Text node {} cannot have children", id));
            }
            tree.set_measured(id, true)?;
            texts.insert(id, text.clone());
        }

        for child in &source.children {
            let child_id = Self::build(tree, texts, names, child)?;
            tree.add_child(id, child_id)?;
        }
        Ok(id)
    }

    /// Runs a layout pass, measuring text with [`TextMeasurer`].
    pub fn layout(&mut self, width: Option<f32>, height: Option<f32>, direction: Direction) -> Result<()> {
        let mut measurer = TextMeasurer::new(&self.texts);
        self.tree
            .calculate_layout_with_measure(self.root, width, height, direction, &mut measurer)
            .context("Layout failed")?;
        Ok(())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.texts.get(&id).map(String::as_str)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }
}

/// Fixed-advance text measurement with greedy word wrapping.
pub struct TextMeasurer<'a> {
    texts: &'a HashMap<NodeId, String>,
    char_width: f32,
    line_height: f32,
}

impl<'a> TextMeasurer<'a> {
    pub fn new(texts: &'a HashMap<NodeId, String>) -> Self {
        Self {
            texts,
            char_width: CHAR_WIDTH,
            line_height: LINE_HEIGHT,
        }
    }

    /// Widest line in characters and the number of lines when wrapping at
    /// `max_chars`.
    fn wrap(text: &str, max_chars: Option<usize>) -> (usize, usize) {
        let mut widest = 0;
        let mut lines = 0;

        for paragraph in text.split('\n') {
            let mut current = 0;
            lines += 1;
            for word in paragraph.split_whitespace() {
                let len = word.chars().count();
                if current == 0 {
                    current = len;
                } else if max_chars.map(|max| current + 1 + len > max).unwrap_or(false) {
                    widest = widest.max(current);
                    lines += 1;
                    current = len;
                } else {
                    current += 1 + len;
                }
            }
            widest = widest.max(current);
        }
        (widest, lines)
    }
}

impl MeasureProvider for TextMeasurer<'_> {
    fn measure(&mut self, node: NodeId, input: MeasureInput) -> Result<Size> {
        let text = self
            .texts
            .get(&node)
            .ok_or_else(|| anyhow!("No text registered for node {}", node))?;

        let max_chars = match input.width_mode {
            MeasureMode::Undefined => None,
            _ => Some((input.width / self.char_width).floor().max(0.0) as usize),
        };
        let (widest, lines) = if text.is_empty() { (0, 0) } else { Self::wrap(text, max_chars) };
        let natural_width = widest as f32 * self.char_width;
        let natural_height = lines as f32 * self.line_height;

        let width = match input.width_mode {
            MeasureMode::Exactly => input.width,
            MeasureMode::AtMost => natural_width.min(input.width),
            MeasureMode::Undefined => natural_width,
        };
        let height = match input.height_mode {
            MeasureMode::Exactly => input.height,
            MeasureMode::AtMost => natural_height.min(input.height),
            MeasureMode::Undefined => natural_height,
        };
        Ok(Size::new(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_counts_lines() {
        assert_eq!(TextMeasurer::wrap("hello world", None), (11, 1));
        assert_eq!(TextMeasurer::wrap("hello world", Some(5)), (5, 2));
        assert_eq!(TextMeasurer::wrap("a b c", Some(3)), (3, 2));
        assert_eq!(TextMeasurer::wrap("one\ntwo", None), (3, 2));
        assert_eq!(TextMeasurer::wrap("unbreakable", Some(4)), (11, 1));
    }

    #[test]
    fn test_measure_text() {
        let mut texts = HashMap::new();
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        texts.insert(node, "hello world".to_string());
        let mut measurer = TextMeasurer::new(&texts);

        let unbounded = MeasureInput::new(None, MeasureMode::Undefined, None, MeasureMode::Undefined);
        assert_eq!(measurer.measure(node, unbounded).unwrap(), Size::new(88.0, 16.0));

        let narrow = MeasureInput::new(Some(48.0), MeasureMode::AtMost, None, MeasureMode::Undefined);
        assert_eq!(measurer.measure(node, narrow).unwrap(), Size::new(40.0, 32.0));
    }

    #[test]
    fn test_document_from_json() {
        let source = r#"{
            "style": { "width": 200, "flex-direction": "row" },
            "children": [
                { "name": "label", "text": "hi" },
                { "style": { "flex-grow": 1 } }
            ]
        }"#;
        let mut document = Document::from_json(source, LayoutConfig::default()).unwrap();
        document.layout(None, None, Direction::Ltr).unwrap();

        let children = document.tree.children(document.root).unwrap().to_vec();
        assert_eq!(document.name(children[0]), Some("label"));
        assert_eq!(document.text(children[0]), Some("hi"));

        let label = document.tree.layout(children[0]).unwrap();
        assert_eq!((label.width, label.height), (16.0, 16.0));
        let filler = document.tree.layout(children[1]).unwrap();
        assert_eq!((filler.left, filler.width), (16.0, 184.0));
    }

    #[test]
    fn test_text_node_with_children_is_rejected() {
        let source = r#"{ "text": "x", "children": [ {} ] }"#;
        assert!(Document::from_json(source, LayoutConfig::default()).is_err());
    }
}
