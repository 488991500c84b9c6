// crates/trellis-layout/src/absolute.rs
// Absolutely positioned children, laid out after their container is sized.

use trellis_core::{Align, Direction, Edge, Justify, Style};

use crate::flexbox::{physical_offset, resolve_edges, sum_edges, LayoutInput};
use crate::resolve::Axes;
use crate::{LayoutTree, MeasureMode, MeasureProvider, NodeId, Result, Size};

/// The sized container an absolute child is placed in.
pub(crate) struct AbsoluteContainer<'a> {
    pub style: &'a Style,
    pub direction: Direction,
    pub axes: Axes,
    pub size: Size,
    pub padding: [f32; 4],
    pub border: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Placement {
    Start,
    Center,
    End,
}

impl AbsoluteContainer<'_> {
    /// Padding box width and height; insets and percentages refer to it.
    fn padding_box(&self) -> (f32, f32) {
        let b = &self.border;
        (
            (self.size.width - b[Edge::Left.index()] - b[Edge::Right.index()]).max(0.0),
            (self.size.height - b[Edge::Top.index()] - b[Edge::Bottom.index()]).max(0.0),
        )
    }

    /// Position along one physical axis for a child with no insets on it,
    /// following justify-content on the main axis and alignment on the cross.
    fn static_position(&self, horizontal: bool, child_style: &Style, child_size: f32, margin: &[f32; 4]) -> f32 {
        let axes = &self.axes;
        let on_main = axes.is_row() == horizontal;
        let (lead, trail) = if on_main {
            (axes.main_lead(), axes.main_trail())
        } else {
            (axes.cross_lead, axes.cross_trail)
        };

        let placement = if on_main {
            match self.style.justify_content {
                Justify::Center => Placement::Center,
                Justify::FlexEnd => Placement::End,
                _ => Placement::Start,
            }
        } else {
            match child_style.resolved_align_self(self.style) {
                Align::Center => Placement::Center,
                Align::FlexEnd => Placement::End,
                _ => Placement::Start,
            }
        };

        let pb = sum_edges(&self.padding, &self.border);
        let extent = if horizontal { self.size.width } else { self.size.height };
        let (pb_lead, pb_trail) = (pb[lead.index()], pb[trail.index()]);
        let (margin_lead, margin_trail) = (margin[lead.index()], margin[trail.index()]);

        let offset = match placement {
            Placement::Start => pb_lead + margin_lead,
            Placement::Center => {
                let outer = child_size + margin_lead + margin_trail;
                pb_lead + (extent - pb_lead - pb_trail - outer) / 2.0 + margin_lead
            }
            Placement::End => extent - pb_trail - margin_trail - child_size,
        };
        physical_offset(lead, offset, child_size, extent)
    }
}

impl LayoutTree {
    pub(crate) fn layout_absolute_child(
        &mut self,
        child: NodeId,
        container: &AbsoluteContainer<'_>,
        measure: &mut dyn MeasureProvider,
    ) -> Result<()> {
        let style = self.node(child)?.style.clone();
        let direction = style.direction.resolve(container.direction);
        let (box_width, box_height) = container.padding_box();
        let border = &container.border;

        let margin = resolve_edges(&style.margin, direction, Some(box_width));
        let inset = |edge: Edge, reference: f32| style.position.resolve(edge, direction).resolve(Some(reference));
        let left = inset(Edge::Left, box_width);
        let right = inset(Edge::Right, box_width);
        let top = inset(Edge::Top, box_height);
        let bottom = inset(Edge::Bottom, box_height);
        let margin_row = margin[Edge::Left.index()] + margin[Edge::Right.index()];
        let margin_column = margin[Edge::Top.index()] + margin[Edge::Bottom.index()];

        let mut width = style.width.resolve(Some(box_width)).or(match (left, right) {
            (Some(left), Some(right)) => Some((box_width - left - right - margin_row).max(0.0)),
            _ => None,
        });
        let mut height = style.height.resolve(Some(box_height)).or(match (top, bottom) {
            (Some(top), Some(bottom)) => Some((box_height - top - bottom - margin_column).max(0.0)),
            _ => None,
        });
        if let Some(ratio) = style.effective_aspect_ratio() {
            match (width, height) {
                (Some(w), None) => height = Some(w / ratio),
                (None, Some(h)) => width = Some(h * ratio),
                _ => {}
            }
        }

        let owner = (Some(box_width), Some(box_height));
        let (width, height) = match (width, height) {
            (Some(width), Some(height)) => (width, height),
            _ => {
                // Content sizing, wrapping at the container's width.
                let width_input = match width {
                    Some(width) => (Some(width), MeasureMode::Exactly),
                    None => (Some((box_width - margin_row).max(0.0)), MeasureMode::AtMost),
                };
                let height_input = match height {
                    Some(height) => (Some(height), MeasureMode::Exactly),
                    None => (None, MeasureMode::Undefined),
                };
                let measured = self.layout_node(
                    child,
                    LayoutInput::new(width_input, height_input, owner, container.direction, false),
                    measure,
                )?;
                (width.unwrap_or(measured.width), height.unwrap_or(measured.height))
            }
        };

        let size = self.layout_node(
            child,
            LayoutInput::new(
                (Some(width), MeasureMode::Exactly),
                (Some(height), MeasureMode::Exactly),
                owner,
                container.direction,
                true,
            ),
            measure,
        )?;

        let x = match (left, right) {
            (Some(left), _) => border[Edge::Left.index()] + left + margin[Edge::Left.index()],
            (None, Some(right)) => {
                container.size.width - border[Edge::Right.index()] - right - margin[Edge::Right.index()] - size.width
            }
            (None, None) => container.static_position(true, &style, size.width, &margin),
        };
        let y = match (top, bottom) {
            (Some(top), _) => border[Edge::Top.index()] + top + margin[Edge::Top.index()],
            (None, Some(bottom)) => {
                container.size.height - border[Edge::Bottom.index()] - bottom - margin[Edge::Bottom.index()] - size.height
            }
            (None, None) => container.static_position(false, &style, size.height, &margin),
        };

        let node = self.node_mut(child)?;
        node.unrounded.left = x;
        node.unrounded.top = y;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{FlexDirection, PositionType, StyleValue};

    fn absolute(style: Style) -> Style {
        Style { position_type: PositionType::Absolute, ..style }
    }

    fn container(tree: &mut LayoutTree, style: Style) -> NodeId {
        tree.new_node_with_style(Style {
            width: StyleValue::Point(200.0),
            height: StyleValue::Point(100.0),
            ..style
        })
    }

    #[test]
    fn test_insets_place_and_size() {
        let mut tree = LayoutTree::new();
        let mut root_style = Style::default();
        root_style.border.all = StyleValue::Point(2.0);
        let root = container(&mut tree, root_style);

        let mut style = absolute(Style::default());
        style.position.left = StyleValue::Point(10.0);
        style.position.right = StyleValue::Point(20.0);
        style.position.bottom = StyleValue::Point(5.0);
        style.height = StyleValue::Point(30.0);
        let child = tree.new_node_with_style(style);
        tree.add_child(root, child).unwrap();
        tree.calculate_layout(root, None, None, Direction::Ltr).unwrap();

        let layout = tree.layout(child).unwrap();
        assert_eq!(layout.left, 12.0);
        assert_eq!(layout.width, 166.0);
        assert_eq!(layout.top, 100.0 - 2.0 - 5.0 - 30.0);
        assert_eq!(layout.height, 30.0);
    }

    #[test]
    fn test_absolute_child_skips_flow() {
        let mut tree = LayoutTree::new();
        let root = container(&mut tree, Style::default());
        let overlay = tree.new_node_with_style(absolute(Style {
            width: StyleValue::Point(50.0),
            height: StyleValue::Point(50.0),
            ..Style::default()
        }));
        let flow = tree.new_node_with_style(Style { height: StyleValue::Point(20.0), ..Style::default() });
        tree.add_child(root, overlay).unwrap();
        tree.add_child(root, flow).unwrap();
        tree.calculate_layout(root, None, None, Direction::Ltr).unwrap();

        assert_eq!(tree.layout(flow).unwrap().top, 0.0);
        assert_eq!(tree.layout(overlay).unwrap().position(), glam::Vec2::ZERO);
    }

    #[test]
    fn test_static_position_follows_justify_and_align() {
        let mut tree = LayoutTree::new();
        let root = container(
            &mut tree,
            Style {
                flex_direction: FlexDirection::Row,
                justify_content: Justify::Center,
                align_items: Align::FlexEnd,
                ..Style::default()
            },
        );
        let child = tree.new_node_with_style(absolute(Style {
            width: StyleValue::Point(40.0),
            height: StyleValue::Point(10.0),
            ..Style::default()
        }));
        tree.add_child(root, child).unwrap();
        tree.calculate_layout(root, None, None, Direction::Ltr).unwrap();

        let layout = tree.layout(child).unwrap();
        assert_eq!((layout.left, layout.top), (80.0, 90.0));
    }

    #[test]
    fn test_percent_size_against_padding_box() {
        let mut tree = LayoutTree::new();
        let root = container(&mut tree, Style::default());
        let child = tree.new_node_with_style(absolute(Style {
            width: StyleValue::Percent(25.0),
            aspect_ratio: Some(2.0),
            ..Style::default()
        }));
        tree.add_child(root, child).unwrap();
        tree.calculate_layout(root, None, None, Direction::Ltr).unwrap();

        let layout = tree.layout(child).unwrap();
        assert_eq!((layout.width, layout.height), (50.0, 25.0));
    }
}
