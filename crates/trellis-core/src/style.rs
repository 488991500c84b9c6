// crates/trellis-core/src/style.rs

use serde::{Deserialize, Serialize};

use crate::{
    Align, Direction, Display, Edge, FlexDirection, Justify, Overflow, PositionType, StyleValue,
    Wrap,
};

/// Per-edge values for margin, padding, border and position offsets.
///
/// Lookups for a physical edge fall back in order: the direction-relative
/// edge (`start`/`end`), the physical edge, the axis shorthand
/// (`horizontal`/`vertical`), then `all`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Edges {
    #[serde(skip_serializing_if = "StyleValue::is_undefined")]
    pub left: StyleValue,
    #[serde(skip_serializing_if = "StyleValue::is_undefined")]
    pub top: StyleValue,
    #[serde(skip_serializing_if = "StyleValue::is_undefined")]
    pub right: StyleValue,
    #[serde(skip_serializing_if = "StyleValue::is_undefined")]
    pub bottom: StyleValue,
    #[serde(skip_serializing_if = "StyleValue::is_undefined")]
    pub start: StyleValue,
    #[serde(skip_serializing_if = "StyleValue::is_undefined")]
    pub end: StyleValue,
    #[serde(skip_serializing_if = "StyleValue::is_undefined")]
    pub horizontal: StyleValue,
    #[serde(skip_serializing_if = "StyleValue::is_undefined")]
    pub vertical: StyleValue,
    #[serde(skip_serializing_if = "StyleValue::is_undefined")]
    pub all: StyleValue,
}

impl Edges {
    pub fn get(&self, edge: Edge) -> StyleValue {
        match edge {
            Edge::Left => self.left,
            Edge::Top => self.top,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
            Edge::Start => self.start,
            Edge::End => self.end,
            Edge::Horizontal => self.horizontal,
            Edge::Vertical => self.vertical,
            Edge::All => self.all,
        }
    }

    pub fn set(&mut self, edge: Edge, value: StyleValue) {
        let slot = match edge {
            Edge::Left => &mut self.left,
            Edge::Top => &mut self.top,
            Edge::Right => &mut self.right,
            Edge::Bottom => &mut self.bottom,
            Edge::Start => &mut self.start,
            Edge::End => &mut self.end,
            Edge::Horizontal => &mut self.horizontal,
            Edge::Vertical => &mut self.vertical,
            Edge::All => &mut self.all,
        };
        *slot = value;
    }

    /// Effective value for a physical edge under `direction`.
    pub fn resolve(&self, edge: Edge, direction: Direction) -> StyleValue {
        let rtl = direction == Direction::Rtl;
        let relative = match edge {
            Edge::Left if rtl => self.end,
            Edge::Left => self.start,
            Edge::Right if rtl => self.start,
            Edge::Right => self.end,
            _ => StyleValue::Undefined,
        };
        let shorthand = match edge {
            Edge::Top | Edge::Bottom => self.vertical,
            _ => self.horizontal,
        };

        [relative, self.get(edge), shorthand, self.all]
            .into_iter()
            .find(|value| !value.is_undefined())
            .unwrap_or_default()
    }
}

/// All layout-affecting properties of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Style {
    pub direction: Direction,
    pub flex_direction: FlexDirection,
    pub justify_content: Justify,
    pub align_content: Align,
    pub align_items: Align,
    pub align_self: Align,
    pub position_type: PositionType,
    pub flex_wrap: Wrap,
    pub overflow: Overflow,
    pub display: Display,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex_grow: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex_shrink: Option<f32>,
    pub flex_basis: StyleValue,

    pub width: StyleValue,
    pub height: StyleValue,
    #[serde(skip_serializing_if = "StyleValue::is_undefined")]
    pub min_width: StyleValue,
    #[serde(skip_serializing_if = "StyleValue::is_undefined")]
    pub min_height: StyleValue,
    #[serde(skip_serializing_if = "StyleValue::is_undefined")]
    pub max_width: StyleValue,
    #[serde(skip_serializing_if = "StyleValue::is_undefined")]
    pub max_height: StyleValue,
    /// Width divided by height
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f32>,

    pub margin: Edges,
    pub padding: Edges,
    pub border: Edges,
    pub position: Edges,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            direction: Direction::Inherit,
            flex_direction: FlexDirection::Column,
            justify_content: Justify::FlexStart,
            align_content: Align::FlexStart,
            align_items: Align::Stretch,
            align_self: Align::Auto,
            position_type: PositionType::Relative,
            flex_wrap: Wrap::NoWrap,
            overflow: Overflow::Visible,
            display: Display::Flex,
            flex: None,
            flex_grow: None,
            flex_shrink: None,
            flex_basis: StyleValue::Auto,
            width: StyleValue::Auto,
            height: StyleValue::Auto,
            min_width: StyleValue::Undefined,
            min_height: StyleValue::Undefined,
            max_width: StyleValue::Undefined,
            max_height: StyleValue::Undefined,
            aspect_ratio: None,
            margin: Edges::default(),
            padding: Edges::default(),
            border: Edges::default(),
            position: Edges::default(),
        }
    }
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// flex-grow, falling back to a positive `flex` shorthand.
    pub fn resolved_flex_grow(&self) -> f32 {
        match (self.flex_grow, self.flex) {
            (Some(grow), _) => grow,
            (None, Some(flex)) if flex > 0.0 => flex,
            _ => 0.0,
        }
    }

    /// flex-shrink, falling back to a negative `flex` shorthand.
    pub fn resolved_flex_shrink(&self) -> f32 {
        match (self.flex_shrink, self.flex) {
            (Some(shrink), _) => shrink,
            (None, Some(flex)) if flex < 0.0 => -flex,
            _ => 0.0,
        }
    }

    /// flex-basis; a positive `flex` shorthand implies a zero basis.
    pub fn resolved_flex_basis(&self) -> StyleValue {
        if !self.flex_basis.is_auto() && !self.flex_basis.is_undefined() {
            return self.flex_basis;
        }
        match self.flex {
            Some(flex) if flex > 0.0 => StyleValue::Point(0.0),
            _ => StyleValue::Auto,
        }
    }

    /// The aspect ratio when it can be used: finite and positive.
    pub fn effective_aspect_ratio(&self) -> Option<f32> {
        self.aspect_ratio.filter(|ratio| ratio.is_finite() && *ratio > 0.0)
    }

    pub fn dimension(&self, row: bool) -> StyleValue {
        if row { self.width } else { self.height }
    }

    pub fn min_dimension(&self, row: bool) -> StyleValue {
        if row { self.min_width } else { self.min_height }
    }

    pub fn max_dimension(&self, row: bool) -> StyleValue {
        if row { self.max_width } else { self.max_height }
    }

    /// Whether this is absolutely positioned.
    pub fn is_absolute(&self) -> bool {
        self.position_type == PositionType::Absolute
    }

    pub fn is_hidden(&self) -> bool {
        self.display == Display::None
    }

    /// align-self, falling back to the parent's align-items.
    pub fn resolved_align_self(&self, parent: &Style) -> Align {
        match self.align_self {
            Align::Auto => parent.align_items,
            align => align,
        }
    }
}
