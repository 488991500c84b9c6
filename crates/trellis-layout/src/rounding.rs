// crates/trellis-layout/src/rounding.rs

use tracing::debug;

use crate::tree::NodeFlags;
use crate::{LayoutTree, NodeId, Result};

const EPSILON: f32 = 1e-4;

/// Snaps `value` to the grid `1 / scale`, rounding half up, or up whenever
/// `ceil` is set and the value is not already on the grid.
pub fn round_to_grid(value: f32, scale: f32, ceil: bool) -> f32 {
    if scale <= 0.0 || !value.is_finite() {
        return value;
    }
    let scaled = value * scale;
    let nearest = scaled.round();
    let snapped = if (scaled - nearest).abs() < EPSILON {
        nearest
    } else if ceil {
        scaled.ceil()
    } else {
        (scaled + 0.5).floor()
    };
    snapped / scale
}

fn is_fractional(value: f32, scale: f32) -> bool {
    let scaled = value * scale;
    (scaled - scaled.round()).abs() >= EPSILON
}

/// Rounds the subtree under `root` from its unrounded results. Edges are
/// snapped in absolute coordinates so neighbours stay flush.
pub(crate) fn round_layout(tree: &mut LayoutTree, root: NodeId) -> Result<()> {
    let scale = tree.config.point_scale_factor;
    round_node(tree, root, 0.0, 0.0, scale)
}

fn round_node(tree: &mut LayoutTree, id: NodeId, parent_left: f32, parent_top: f32, scale: f32) -> Result<()> {
    let node = tree.node(id)?;
    let unrounded = node.unrounded;
    let text = node.is_measured();
    let children = node.children.clone();

    let left = parent_left + unrounded.left;
    let top = parent_top + unrounded.top;
    let mut layout = unrounded;

    if scale > 0.0 {
        let right = left + unrounded.width;
        let bottom = top + unrounded.height;
        let ceil_width = text && is_fractional(unrounded.width, scale);
        let ceil_height = text && is_fractional(unrounded.height, scale);

        layout.left = round_to_grid(left, scale, false) - round_to_grid(parent_left, scale, false);
        layout.top = round_to_grid(top, scale, false) - round_to_grid(parent_top, scale, false);
        layout.width = round_to_grid(right, scale, ceil_width) - round_to_grid(left, scale, false);
        layout.height = round_to_grid(bottom, scale, ceil_height) - round_to_grid(top, scale, false);
    }

    let debug = tree.config.debug;
    let node = tree.node_mut(id)?;
    if node.layout != layout {
        node.layout = layout;
        node.flags.insert(NodeFlags::HAS_NEW_LAYOUT);
    }
    if debug {
        debug!(
            "Node {} at ({}, {}) size {}x{}",
            id, layout.left, layout.top, layout.width, layout.height
        );
    }

    for child in children {
        round_node(tree, child, left, top, scale)?;
    }
    Ok(())
}
