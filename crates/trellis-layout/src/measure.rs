// crates/trellis-layout/src/measure.rs

use crate::{NodeId, Size};

/// How an available size constrains a measurement along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MeasureMode {
    /// No constraint; the reported size is the content's natural size.
    #[default]
    Undefined,
    /// The result must equal the available size.
    Exactly,
    /// The result must not exceed the available size.
    AtMost,
}

/// Constraints handed to a [`MeasureProvider`]. Sizes exclude the node's
/// padding and border; an unconstrained axis carries `f32::INFINITY`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureInput {
    pub width: f32,
    pub width_mode: MeasureMode,
    pub height: f32,
    pub height_mode: MeasureMode,
}

impl MeasureInput {
    pub fn new(
        width: Option<f32>,
        width_mode: MeasureMode,
        height: Option<f32>,
        height_mode: MeasureMode,
    ) -> Self {
        let axis = |size: Option<f32>, mode: MeasureMode| match (size, mode) {
            (Some(size), MeasureMode::Exactly | MeasureMode::AtMost) => (size.max(0.0), mode),
            _ => (f32::INFINITY, MeasureMode::Undefined),
        };
        let (width, width_mode) = axis(width, width_mode);
        let (height, height_mode) = axis(height, height_mode);
        Self { width, width_mode, height, height_mode }
    }
}

/// Content sizing for measured leaves (text and the like).
///
/// Called during [`crate::LayoutTree::calculate_layout_with_measure`]; the
/// same input must yield the same size for a node until it is marked dirty.
pub trait MeasureProvider {
    fn measure(&mut self, node: NodeId, input: MeasureInput) -> anyhow::Result<Size>;
}

impl<F> MeasureProvider for F
where
    F: FnMut(NodeId, MeasureInput) -> anyhow::Result<Size>,
{
    fn measure(&mut self, node: NodeId, input: MeasureInput) -> anyhow::Result<Size> {
        self(node, input)
    }
}

/// Provider used when the caller supplies none; any measured leaf fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMeasure;

impl MeasureProvider for NoMeasure {
    fn measure(&mut self, node: NodeId, _input: MeasureInput) -> anyhow::Result<Size> {
        anyhow::bail!("no measure provider registered for node {}", node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_normalizes_undefined_axes() {
        let input = MeasureInput::new(Some(100.0), MeasureMode::AtMost, None, MeasureMode::Exactly);
        assert_eq!(input.width, 100.0);
        assert_eq!(input.width_mode, MeasureMode::AtMost);
        assert_eq!(input.height, f32::INFINITY);
        assert_eq!(input.height_mode, MeasureMode::Undefined);

        let input = MeasureInput::new(Some(-3.0), MeasureMode::Exactly, Some(5.0), MeasureMode::Undefined);
        assert_eq!(input.width, 0.0);
        assert_eq!(input.height_mode, MeasureMode::Undefined);
    }

    #[test]
    fn test_closure_provider() {
        let mut calls = 0;
        let mut provider = |_node: NodeId, input: MeasureInput| -> anyhow::Result<Size> {
            calls += 1;
            Ok(Size::new(input.width.min(40.0), 10.0))
        };
        let input = MeasureInput::new(Some(25.0), MeasureMode::AtMost, None, MeasureMode::Undefined);
        let size = provider.measure(NodeId::new(0, 0), input).unwrap();
        assert_eq!(size, Size::new(25.0, 10.0));
        drop(provider);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_no_measure_fails() {
        let input = MeasureInput::new(None, MeasureMode::Undefined, None, MeasureMode::Undefined);
        assert!(NoMeasure.measure(NodeId::new(3, 1), input).is_err());
    }
}
