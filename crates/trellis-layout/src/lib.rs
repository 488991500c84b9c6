// crates/trellis-layout/src/lib.rs

use glam::Vec2;
use serde::Serialize;
use trellis_core::{Direction, Edge, StyleError};

mod absolute;
pub mod cache;
pub mod constraints;
pub mod flexbox;
pub mod measure;
mod resolve;
pub mod rounding;
pub mod tree;

pub use cache::CacheStats;
pub use constraints::*;
pub use measure::*;
pub use tree::*;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {child} already has parent {parent}; remove it first")]
    AlreadyHasParent { child: NodeId, parent: NodeId },

    #[error("Child index {index} out of bounds for {len} children")]
    ChildIndexOutOfBounds { index: usize, len: usize },

    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Inserting {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("Node {0} is a measured leaf and cannot have children")]
    MeasuredNodeWithChildren(NodeId),

    #[error("Measuring node {node} failed")]
    Measure {
        node: NodeId,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Style(#[from] StyleError),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Engine-wide settings, owned by the [`LayoutTree`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Device pixels per layout point; results snap to `1 / point_scale_factor`.
    /// Zero disables rounding.
    pub point_scale_factor: f32,
    /// Log every node's computed box at debug level.
    pub debug: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            point_scale_factor: 1.0,
            debug: false,
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_point_scale_factor(mut self, scale: f32) -> Self {
        self.point_scale_factor = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Size along the row axis or the column axis.
    pub fn along(&self, row: bool) -> f32 {
        if row { self.width } else { self.height }
    }

    pub(crate) fn from_axes(row: bool, main: f32, cross: f32) -> Self {
        if row {
            Size::new(main, cross)
        } else {
            Size::new(cross, main)
        }
    }
}

impl From<Size> for Vec2 {
    fn from(size: Size) -> Self {
        Vec2::new(size.width, size.height)
    }
}

/// Computed box of one node. Positions are relative to the parent's border
/// box; edge arrays are indexed by physical edge (left, top, right, bottom).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LayoutResult {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub margin: [f32; 4],
    pub border: [f32; 4],
    pub padding: [f32; 4],
    pub direction: Direction,
    /// Children overflowed the main axis.
    pub had_overflow: bool,
}

impl LayoutResult {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Computed margin for an edge; `Start`/`End` follow the layout
    /// direction and shorthand edges read as zero.
    pub fn margin(&self, edge: Edge) -> f32 {
        Self::edge_value(&self.margin, edge, self.direction)
    }

    pub fn border(&self, edge: Edge) -> f32 {
        Self::edge_value(&self.border, edge, self.direction)
    }

    pub fn padding(&self, edge: Edge) -> f32 {
        Self::edge_value(&self.padding, edge, self.direction)
    }

    fn edge_value(values: &[f32; 4], edge: Edge, direction: Direction) -> f32 {
        edge.to_physical(direction)
            .map(|physical| values[physical.index()])
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = LayoutConfig::new().with_point_scale_factor(2.0).with_debug(true);
        assert_eq!(config.point_scale_factor, 2.0);
        assert!(config.debug);
        assert_eq!(LayoutConfig::new().with_point_scale_factor(f32::NAN).point_scale_factor, 0.0);
    }

    #[test]
    fn test_layout_result_edges() {
        let layout = LayoutResult {
            margin: [1.0, 2.0, 3.0, 4.0],
            direction: Direction::Rtl,
            ..LayoutResult::default()
        };
        assert_eq!(layout.margin(Edge::Start), 3.0);
        assert_eq!(layout.margin(Edge::End), 1.0);
        assert_eq!(layout.margin(Edge::Bottom), 4.0);
        assert_eq!(layout.margin(Edge::All), 0.0);
    }
}
