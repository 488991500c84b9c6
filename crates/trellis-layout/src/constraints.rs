// crates/trellis-layout/src/constraints.rs

/// Min/max bounds for one axis of one node, plus the floor set by its own
/// padding and border.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub min: f32,
    pub max: f32,
    pub floor: f32,
}

impl Default for AxisBounds {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: f32::INFINITY,
            floor: 0.0,
        }
    }
}

impl AxisBounds {
    pub fn new(min: Option<f32>, max: Option<f32>, floor: f32) -> Self {
        Self {
            min: min.filter(|v| v.is_finite()).unwrap_or(0.0),
            max: max.filter(|v| !v.is_nan()).unwrap_or(f32::INFINITY),
            floor: floor.max(0.0),
        }
    }

    /// Applies max, then min, then the padding+border floor. When min
    /// exceeds max the min wins.
    pub fn constrain(&self, size: f32) -> f32 {
        let mut size = size;
        if size > self.max {
            size = self.max;
        }
        if size < self.min {
            size = self.min;
        }
        size.max(self.floor)
    }

    /// Like [`AxisBounds::constrain`] but ignores the padding+border floor.
    pub fn constrain_bounds(&self, size: f32) -> f32 {
        let mut size = size;
        if size > self.max {
            size = self.max;
        }
        if size < self.min {
            size = self.min;
        }
        size
    }

    pub fn is_constrained(&self) -> bool {
        self.max != f32::INFINITY
    }

    /// Tightens an available size and mode by the max bound, the way
    /// children see a parent's `max-width`/`max-height`.
    pub fn constrain_available(
        &self,
        available: Option<f32>,
        mode: crate::MeasureMode,
    ) -> (Option<f32>, crate::MeasureMode) {
        use crate::MeasureMode;
        if !self.is_constrained() {
            return (available, mode);
        }
        match (available, mode) {
            (Some(size), MeasureMode::Exactly | MeasureMode::AtMost) => {
                (Some(size.min(self.max)), mode)
            }
            _ => (Some(self.max), MeasureMode::AtMost),
        }
    }
}

/// Bounds for both axes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConstraintBox {
    pub width: AxisBounds,
    pub height: AxisBounds,
}

impl ConstraintBox {
    pub fn new(width: AxisBounds, height: AxisBounds) -> Self {
        Self { width, height }
    }

    pub fn axis(&self, row: bool) -> &AxisBounds {
        if row { &self.width } else { &self.height }
    }

    pub fn constrain_width(&self, width: f32) -> f32 {
        self.width.constrain(width)
    }

    pub fn constrain_height(&self, height: f32) -> f32 {
        self.height.constrain(height)
    }
}
