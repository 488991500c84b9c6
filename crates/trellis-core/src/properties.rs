// crates/trellis-core/src/properties.rs
use std::fmt;

use crate::{
    Align, Direction, Display, Edge, FlexDirection, Justify, Overflow, PositionType, Style,
    StyleError, StyleValue, Wrap,
};

/// Every style property that can be read or written through the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyId {
    Direction,
    FlexDirection,
    JustifyContent,
    AlignContent,
    AlignItems,
    AlignSelf,
    PositionType,
    FlexWrap,
    Overflow,
    Display,
    Flex,
    FlexGrow,
    FlexShrink,
    FlexBasis,
    Width,
    Height,
    MinWidth,
    MinHeight,
    MaxWidth,
    MaxHeight,
    AspectRatio,
    Margin(Edge),
    Padding(Edge),
    Border(Edge),
    Position(Edge),
}

/// Kind of value a property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyValueType {
    Direction,
    FlexDirection,
    Justify,
    Align,
    PositionType,
    Wrap,
    Overflow,
    Display,
    Float,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Direction(Direction),
    FlexDirection(FlexDirection),
    Justify(Justify),
    Align(Align),
    PositionType(PositionType),
    Wrap(Wrap),
    Overflow(Overflow),
    Display(Display),
    /// Scalar factor; `None` when unset
    Float(Option<f32>),
    Value(StyleValue),
}

impl PropertyValue {
    pub fn value_type(&self) -> PropertyValueType {
        match self {
            PropertyValue::Direction(_) => PropertyValueType::Direction,
            PropertyValue::FlexDirection(_) => PropertyValueType::FlexDirection,
            PropertyValue::Justify(_) => PropertyValueType::Justify,
            PropertyValue::Align(_) => PropertyValueType::Align,
            PropertyValue::PositionType(_) => PropertyValueType::PositionType,
            PropertyValue::Wrap(_) => PropertyValueType::Wrap,
            PropertyValue::Overflow(_) => PropertyValueType::Overflow,
            PropertyValue::Display(_) => PropertyValueType::Display,
            PropertyValue::Float(_) => PropertyValueType::Float,
            PropertyValue::Value(_) => PropertyValueType::Value,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            PropertyValue::Float(value) => *value,
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<StyleValue> {
        match self {
            PropertyValue::Value(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_align(&self) -> Option<Align> {
        match self {
            PropertyValue::Align(align) => Some(*align),
            _ => None,
        }
    }

    /// Integer code for keyword values, as carried across a language bridge.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            PropertyValue::Direction(v) => Some(v.as_i32()),
            PropertyValue::FlexDirection(v) => Some(v.as_i32()),
            PropertyValue::Justify(v) => Some(v.as_i32()),
            PropertyValue::Align(v) => Some(v.as_i32()),
            PropertyValue::PositionType(v) => Some(v.as_i32()),
            PropertyValue::Wrap(v) => Some(v.as_i32()),
            PropertyValue::Overflow(v) => Some(v.as_i32()),
            PropertyValue::Display(v) => Some(v.as_i32()),
            PropertyValue::Float(_) | PropertyValue::Value(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Direction(v) => write!(f, "{}", v),
            PropertyValue::FlexDirection(v) => write!(f, "{}", v),
            PropertyValue::Justify(v) => write!(f, "{}", v),
            PropertyValue::Align(v) => write!(f, "{}", v),
            PropertyValue::PositionType(v) => write!(f, "{}", v),
            PropertyValue::Wrap(v) => write!(f, "{}", v),
            PropertyValue::Overflow(v) => write!(f, "{}", v),
            PropertyValue::Display(v) => write!(f, "{}", v),
            PropertyValue::Float(Some(v)) => write!(f, "{}", v),
            PropertyValue::Float(None) => write!(f, "unset"),
            PropertyValue::Value(v) => write!(f, "{}", v),
        }
    }
}

impl PropertyId {
    /// All properties, edge properties expanded over every edge.
    pub fn all() -> Vec<PropertyId> {
        let mut ids = vec![
            PropertyId::Direction,
            PropertyId::FlexDirection,
            PropertyId::JustifyContent,
            PropertyId::AlignContent,
            PropertyId::AlignItems,
            PropertyId::AlignSelf,
            PropertyId::PositionType,
            PropertyId::FlexWrap,
            PropertyId::Overflow,
            PropertyId::Display,
            PropertyId::Flex,
            PropertyId::FlexGrow,
            PropertyId::FlexShrink,
            PropertyId::FlexBasis,
            PropertyId::Width,
            PropertyId::Height,
            PropertyId::MinWidth,
            PropertyId::MinHeight,
            PropertyId::MaxWidth,
            PropertyId::MaxHeight,
            PropertyId::AspectRatio,
        ];
        for edge in Edge::ALL {
            ids.push(PropertyId::Margin(*edge));
            ids.push(PropertyId::Padding(*edge));
            ids.push(PropertyId::Border(*edge));
            ids.push(PropertyId::Position(*edge));
        }
        ids
    }

    pub fn value_type(self) -> PropertyValueType {
        match self {
            PropertyId::Direction => PropertyValueType::Direction,
            PropertyId::FlexDirection => PropertyValueType::FlexDirection,
            PropertyId::JustifyContent => PropertyValueType::Justify,
            PropertyId::AlignContent | PropertyId::AlignItems | PropertyId::AlignSelf => {
                PropertyValueType::Align
            }
            PropertyId::PositionType => PropertyValueType::PositionType,
            PropertyId::FlexWrap => PropertyValueType::Wrap,
            PropertyId::Overflow => PropertyValueType::Overflow,
            PropertyId::Display => PropertyValueType::Display,
            PropertyId::Flex
            | PropertyId::FlexGrow
            | PropertyId::FlexShrink
            | PropertyId::AspectRatio => PropertyValueType::Float,
            _ => PropertyValueType::Value,
        }
    }

    /// Kebab-case name, e.g. `flex-direction` or `margin-left`.
    pub fn name(self) -> String {
        let simple = match self {
            PropertyId::Direction => "direction",
            PropertyId::FlexDirection => "flex-direction",
            PropertyId::JustifyContent => "justify-content",
            PropertyId::AlignContent => "align-content",
            PropertyId::AlignItems => "align-items",
            PropertyId::AlignSelf => "align-self",
            PropertyId::PositionType => "position-type",
            PropertyId::FlexWrap => "flex-wrap",
            PropertyId::Overflow => "overflow",
            PropertyId::Display => "display",
            PropertyId::Flex => "flex",
            PropertyId::FlexGrow => "flex-grow",
            PropertyId::FlexShrink => "flex-shrink",
            PropertyId::FlexBasis => "flex-basis",
            PropertyId::Width => "width",
            PropertyId::Height => "height",
            PropertyId::MinWidth => "min-width",
            PropertyId::MinHeight => "min-height",
            PropertyId::MaxWidth => "max-width",
            PropertyId::MaxHeight => "max-height",
            PropertyId::AspectRatio => "aspect-ratio",
            PropertyId::Margin(edge) => return format!("margin-{}", edge),
            PropertyId::Padding(edge) => return format!("padding-{}", edge),
            PropertyId::Border(edge) => return format!("border-{}", edge),
            PropertyId::Position(edge) => return format!("position-{}", edge),
        };
        simple.to_string()
    }
}

impl Style {
    /// Reads one property; unset properties report their defaults.
    pub fn get(&self, id: PropertyId) -> PropertyValue {
        match id {
            PropertyId::Direction => PropertyValue::Direction(self.direction),
            PropertyId::FlexDirection => PropertyValue::FlexDirection(self.flex_direction),
            PropertyId::JustifyContent => PropertyValue::Justify(self.justify_content),
            PropertyId::AlignContent => PropertyValue::Align(self.align_content),
            PropertyId::AlignItems => PropertyValue::Align(self.align_items),
            PropertyId::AlignSelf => PropertyValue::Align(self.align_self),
            PropertyId::PositionType => PropertyValue::PositionType(self.position_type),
            PropertyId::FlexWrap => PropertyValue::Wrap(self.flex_wrap),
            PropertyId::Overflow => PropertyValue::Overflow(self.overflow),
            PropertyId::Display => PropertyValue::Display(self.display),
            PropertyId::Flex => PropertyValue::Float(self.flex),
            PropertyId::FlexGrow => PropertyValue::Float(self.flex_grow),
            PropertyId::FlexShrink => PropertyValue::Float(self.flex_shrink),
            PropertyId::AspectRatio => PropertyValue::Float(self.aspect_ratio),
            PropertyId::FlexBasis => PropertyValue::Value(self.flex_basis),
            PropertyId::Width => PropertyValue::Value(self.width),
            PropertyId::Height => PropertyValue::Value(self.height),
            PropertyId::MinWidth => PropertyValue::Value(self.min_width),
            PropertyId::MinHeight => PropertyValue::Value(self.min_height),
            PropertyId::MaxWidth => PropertyValue::Value(self.max_width),
            PropertyId::MaxHeight => PropertyValue::Value(self.max_height),
            PropertyId::Margin(edge) => PropertyValue::Value(self.margin.get(edge)),
            PropertyId::Padding(edge) => PropertyValue::Value(self.padding.get(edge)),
            PropertyId::Border(edge) => PropertyValue::Value(self.border.get(edge)),
            PropertyId::Position(edge) => PropertyValue::Value(self.position.get(edge)),
        }
    }

    /// Writes one property. The value must be of the property's kind; a NaN
    /// float clears the factor.
    pub fn set(&mut self, id: PropertyId, value: PropertyValue) -> Result<(), StyleError> {
        let mismatch = || StyleError::TypeMismatch {
            property: id.name(),
            expected: id.value_type(),
            found: value.value_type(),
        };

        match (id, value) {
            (PropertyId::Direction, PropertyValue::Direction(v)) => self.direction = v,
            (PropertyId::FlexDirection, PropertyValue::FlexDirection(v)) => self.flex_direction = v,
            (PropertyId::JustifyContent, PropertyValue::Justify(v)) => self.justify_content = v,
            (PropertyId::AlignContent, PropertyValue::Align(v)) => self.align_content = v,
            (PropertyId::AlignItems, PropertyValue::Align(v)) => self.align_items = v,
            (PropertyId::AlignSelf, PropertyValue::Align(v)) => self.align_self = v,
            (PropertyId::PositionType, PropertyValue::PositionType(v)) => self.position_type = v,
            (PropertyId::FlexWrap, PropertyValue::Wrap(v)) => self.flex_wrap = v,
            (PropertyId::Overflow, PropertyValue::Overflow(v)) => self.overflow = v,
            (PropertyId::Display, PropertyValue::Display(v)) => self.display = v,
            (PropertyId::Flex, PropertyValue::Float(v)) => self.flex = v.filter(|f| !f.is_nan()),
            (PropertyId::FlexGrow, PropertyValue::Float(v)) => {
                self.flex_grow = v.filter(|f| !f.is_nan())
            }
            (PropertyId::FlexShrink, PropertyValue::Float(v)) => {
                self.flex_shrink = v.filter(|f| !f.is_nan())
            }
            (PropertyId::AspectRatio, PropertyValue::Float(v)) => {
                self.aspect_ratio = v.filter(|f| !f.is_nan())
            }
            (PropertyId::FlexBasis, PropertyValue::Value(v)) => self.flex_basis = v,
            (PropertyId::Width, PropertyValue::Value(v)) => self.width = v,
            (PropertyId::Height, PropertyValue::Value(v)) => self.height = v,
            (PropertyId::MinWidth, PropertyValue::Value(v)) => self.min_width = v,
            (PropertyId::MinHeight, PropertyValue::Value(v)) => self.min_height = v,
            (PropertyId::MaxWidth, PropertyValue::Value(v)) => self.max_width = v,
            (PropertyId::MaxHeight, PropertyValue::Value(v)) => self.max_height = v,
            (PropertyId::Margin(edge), PropertyValue::Value(v)) => self.margin.set(edge, v),
            (PropertyId::Padding(edge), PropertyValue::Value(v)) => self.padding.set(edge, v),
            (PropertyId::Border(edge), PropertyValue::Value(v)) => self.border.set(edge, v),
            (PropertyId::Position(edge), PropertyValue::Value(v)) => self.position.set(edge, v),
            _ => return Err(mismatch()),
        }
        Ok(())
    }
}
