// crates/trellis-layout/src/resolve.rs
// Flex line bookkeeping and the free-space distribution steps.

use trellis_core::{Align, Direction, Edge, FlexDirection, Justify, Style, Wrap};

use crate::{AxisBounds, NodeId};

/// Main and cross axis of one container, with the edges each axis starts
/// from after direction, reversal and wrap-reverse are applied.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Axes {
    pub main: FlexDirection,
    pub cross_lead: Edge,
    pub cross_trail: Edge,
}

impl Axes {
    pub fn new(style: &Style, direction: Direction) -> Self {
        let main = style.flex_direction.resolve(direction);
        let cross = main.cross(direction);
        let (cross_lead, cross_trail) = if style.flex_wrap == Wrap::WrapReverse {
            (cross.trailing_edge(), cross.leading_edge())
        } else {
            (cross.leading_edge(), cross.trailing_edge())
        };
        Self { main, cross_lead, cross_trail }
    }

    pub fn is_row(&self) -> bool {
        self.main.is_row()
    }

    pub fn main_lead(&self) -> Edge {
        self.main.leading_edge()
    }

    pub fn main_trail(&self) -> Edge {
        self.main.trailing_edge()
    }

    pub fn main_sum(&self, edges: &[f32; 4]) -> f32 {
        edges[self.main_lead().index()] + edges[self.main_trail().index()]
    }

    pub fn cross_sum(&self, edges: &[f32; 4]) -> f32 {
        edges[self.cross_lead.index()] + edges[self.cross_trail.index()]
    }
}

/// A flow child being sized and placed by its container.
#[derive(Debug, Clone)]
pub(crate) struct FlexItem {
    pub id: NodeId,
    pub style: Style,
    pub direction: Direction,
    pub margin: [f32; 4],
    pub auto_margin: [bool; 4],
    pub align: Align,
    pub grow: f32,
    pub shrink: f32,
    /// Flex basis of the border box.
    pub basis: f32,
    /// Basis clamped by min/max.
    pub hypothetical: f32,
    /// Resolved main size.
    pub target: f32,
    pub cross: f32,
    pub main_bounds: AxisBounds,
    pub cross_bounds: AxisBounds,
    pub frozen: bool,
    pub violation: f32,
    /// Offsets of the border box from the container's leading main and
    /// cross edges.
    pub main_pos: f32,
    pub cross_pos: f32,
}

impl FlexItem {
    pub fn margin_main(&self, axes: &Axes) -> f32 {
        axes.main_sum(&self.margin)
    }

    pub fn margin_cross(&self, axes: &Axes) -> f32 {
        axes.cross_sum(&self.margin)
    }

    pub fn outer_hypothetical(&self, axes: &Axes) -> f32 {
        self.hypothetical + self.margin_main(axes)
    }

    pub fn outer_target(&self, axes: &Axes) -> f32 {
        self.target + self.margin_main(axes)
    }

    pub fn outer_cross(&self, axes: &Axes) -> f32 {
        self.cross + self.margin_cross(axes)
    }

    pub fn main_auto_margins(&self, axes: &Axes) -> usize {
        [axes.main_lead(), axes.main_trail()]
            .iter()
            .filter(|edge| self.auto_margin[edge.index()])
            .count()
    }

    pub fn has_cross_auto_margin(&self, axes: &Axes) -> bool {
        self.auto_margin[axes.cross_lead.index()] || self.auto_margin[axes.cross_trail.index()]
    }
}

/// Items `start..end` of the container's flow children.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FlexLine {
    pub start: usize,
    pub end: usize,
    /// Sum of the items' outer hypothetical main sizes.
    pub consumed: f32,
    pub grow: f32,
    pub cross: f32,
    pub cross_start: f32,
    /// Content extent along the main axis after justification.
    pub main_extent: f32,
}

/// Breaks items into lines. Without wrapping everything lands on one line.
pub(crate) fn collect_lines(
    items: &[FlexItem],
    axes: &Axes,
    wrap: bool,
    available_main: Option<f32>,
) -> Vec<FlexLine> {
    let mut lines = Vec::new();
    let mut line = FlexLine::default();

    for (index, item) in items.iter().enumerate() {
        let outer = item.outer_hypothetical(axes);
        let overflows = available_main
            .map(|available| line.consumed + outer > available)
            .unwrap_or(false);
        if wrap && index > line.start && overflows {
            line.end = index;
            lines.push(line);
            line = FlexLine { start: index, ..FlexLine::default() };
        }
        line.consumed += outer;
        line.grow += item.grow;
    }

    line.end = items.len();
    if line.end > line.start || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Resolves the main size of every item on one line against
/// `available_main`, freezing items that hit their min or max until the
/// distribution is stable. Returns the free space left afterwards.
pub(crate) fn resolve_flexible_lengths(items: &mut [FlexItem], axes: &Axes, available_main: f32) -> f32 {
    let consumed: f32 = items.iter().map(|item| item.outer_hypothetical(axes)).sum();
    let growing = available_main - consumed > 0.0;

    for item in items.iter_mut() {
        item.target = item.hypothetical;
        item.violation = 0.0;
        let factor = if growing { item.grow } else { item.shrink };
        item.frozen = factor <= 0.0
            || (growing && item.basis > item.hypothetical)
            || (!growing && item.basis < item.hypothetical);
    }

    loop {
        if items.iter().all(|item| item.frozen) {
            break;
        }

        let used: f32 = items
            .iter()
            .map(|item| {
                let size = if item.frozen { item.target } else { item.basis };
                size + item.margin_main(axes)
            })
            .sum();
        let remaining = available_main - used;

        let mut total: f32 = items
            .iter()
            .filter(|item| !item.frozen)
            .map(|item| if growing { item.grow } else { item.shrink * item.basis })
            .sum();
        if total <= 0.0 || !total.is_finite() {
            break;
        }
        // Factors summing below one only claim their share of the space.
        if total < 1.0 {
            total = 1.0;
        }

        let mut total_violation = 0.0;
        for item in items.iter_mut().filter(|item| !item.frozen) {
            let weight = if growing { item.grow } else { item.shrink * item.basis };
            let unclamped = item.basis + remaining * weight / total;
            let clamped = item.main_bounds.constrain(unclamped);
            item.violation = clamped - unclamped;
            item.target = clamped;
            total_violation += item.violation;
        }

        if total_violation == 0.0 {
            break;
        }
        for item in items.iter_mut().filter(|item| !item.frozen) {
            if (total_violation > 0.0 && item.violation > 0.0)
                || (total_violation < 0.0 && item.violation < 0.0)
            {
                item.frozen = true;
            }
        }
    }

    let used: f32 = items.iter().map(|item| item.outer_target(axes)).sum();
    available_main - used
}

/// Leading offset and gap between items for justify-content. Negative free
/// space makes the space-* modes behave like flex-start.
pub(crate) fn justify_spacing(justify: Justify, free: f32, count: usize) -> (f32, f32) {
    let n = count as f32;
    match justify {
        Justify::FlexStart => (0.0, 0.0),
        Justify::Center => (free / 2.0, 0.0),
        Justify::FlexEnd => (free, 0.0),
        Justify::SpaceBetween if count > 1 && free > 0.0 => (0.0, free / (n - 1.0)),
        Justify::SpaceAround if count > 0 && free > 0.0 => (free / n / 2.0, free / n),
        Justify::SpaceEvenly if free > 0.0 => (free / (n + 1.0), free / (n + 1.0)),
        _ => (0.0, 0.0),
    }
}

/// Leading offset, gap between lines and extra cross size per line for
/// align-content.
pub(crate) fn align_content_spacing(align: Align, free: f32, lines: usize) -> (f32, f32, f32) {
    let n = lines as f32;
    match align {
        Align::FlexEnd => (free, 0.0, 0.0),
        Align::Center => (free / 2.0, 0.0, 0.0),
        Align::Stretch if free > 0.0 && lines > 0 => (0.0, 0.0, free / n),
        Align::SpaceBetween if free > 0.0 && lines > 1 => (0.0, free / (n - 1.0), 0.0),
        Align::SpaceAround if free > 0.0 && lines > 0 => (free / n / 2.0, free / n, 0.0),
        Align::SpaceEvenly if free > 0.0 => (free / (n + 1.0), free / (n + 1.0), 0.0),
        _ => (0.0, 0.0, 0.0),
    }
}
