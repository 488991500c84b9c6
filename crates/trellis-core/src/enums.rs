// crates/trellis-core/src/enums.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::StyleError;

/// Declares a style keyword enum together with its integer codes and its
/// kebab-case keyword spelling.
macro_rules! style_enum {
    (
        $(#[$meta:meta])*
        $name:ident default $default:ident {
            $($variant:ident = $code:tt => $keyword:tt,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $keyword)]
                $variant,
            )+
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Integer code used when crossing a language boundary.
            pub fn as_i32(self) -> i32 {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            pub fn keyword(self) -> &'static str {
                match self {
                    $($name::$variant => $keyword,)+
                }
            }
        }

        impl TryFrom<i32> for $name {
            type Error = StyleError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                match value {
                    $($code => Ok($name::$variant),)+
                    other => Err(StyleError::InvalidEnumValue {
                        kind: stringify!($name),
                        value: other,
                    }),
                }
            }
        }

        impl FromStr for $name {
            type Err = StyleError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim() {
                    $($keyword => Ok($name::$variant),)+
                    _ => Err(StyleError::InvalidValue(value.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.keyword())
            }
        }
    };
}

style_enum! {
    /// Inline direction; `Inherit` takes the parent's resolved direction.
    Direction default Inherit {
        Inherit = 0 => "inherit",
        Ltr = 1 => "ltr",
        Rtl = 2 => "rtl",
    }
}

style_enum! {
    FlexDirection default Column {
        Column = 0 => "column",
        ColumnReverse = 1 => "column-reverse",
        Row = 2 => "row",
        RowReverse = 3 => "row-reverse",
    }
}

style_enum! {
    Justify default FlexStart {
        FlexStart = 0 => "flex-start",
        Center = 1 => "center",
        FlexEnd = 2 => "flex-end",
        SpaceBetween = 3 => "space-between",
        SpaceAround = 4 => "space-around",
        SpaceEvenly = 5 => "space-evenly",
    }
}

style_enum! {
    /// Shared by align-items, align-self and align-content.
    Align default FlexStart {
        Auto = 0 => "auto",
        FlexStart = 1 => "flex-start",
        Center = 2 => "center",
        FlexEnd = 3 => "flex-end",
        Stretch = 4 => "stretch",
        Baseline = 5 => "baseline",
        SpaceBetween = 6 => "space-between",
        SpaceAround = 7 => "space-around",
        SpaceEvenly = 8 => "space-evenly",
    }
}

style_enum! {
    PositionType default Relative {
        Relative = 0 => "relative",
        Absolute = 1 => "absolute",
    }
}

style_enum! {
    Wrap default NoWrap {
        NoWrap = 0 => "nowrap",
        Wrap = 1 => "wrap",
        WrapReverse = 2 => "wrap-reverse",
    }
}

style_enum! {
    Overflow default Visible {
        Visible = 0 => "visible",
        Hidden = 1 => "hidden",
        Scroll = 2 => "scroll",
    }
}

style_enum! {
    Display default Flex {
        Flex = 0 => "flex",
        None = 1 => "none",
    }
}

style_enum! {
    /// Box edges. The first four are physical; `Start`/`End` follow the
    /// direction; `Horizontal`, `Vertical` and `All` are shorthands.
    Edge default All {
        Left = 0 => "left",
        Top = 1 => "top",
        Right = 2 => "right",
        Bottom = 3 => "bottom",
        Start = 4 => "start",
        End = 5 => "end",
        Horizontal = 6 => "horizontal",
        Vertical = 7 => "vertical",
        All = 8 => "all",
    }
}

impl Direction {
    /// `Inherit` takes the parent's direction, falling back to LTR.
    pub fn resolve(self, parent: Direction) -> Direction {
        match (self, parent) {
            (Direction::Inherit, Direction::Inherit) => Direction::Ltr,
            (Direction::Inherit, parent) => parent,
            (own, _) => own,
        }
    }
}

impl FlexDirection {
    pub fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }

    pub fn is_column(self) -> bool {
        !self.is_row()
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }

    /// Rows run right to left under RTL.
    pub fn resolve(self, direction: Direction) -> FlexDirection {
        match (self, direction) {
            (FlexDirection::Row, Direction::Rtl) => FlexDirection::RowReverse,
            (FlexDirection::RowReverse, Direction::Rtl) => FlexDirection::Row,
            (flex_direction, _) => flex_direction,
        }
    }

    /// The cross axis for this main axis.
    pub fn cross(self, direction: Direction) -> FlexDirection {
        if self.is_column() {
            FlexDirection::Row.resolve(direction)
        } else {
            FlexDirection::Column
        }
    }

    /// Physical edge where this axis starts.
    pub fn leading_edge(self) -> Edge {
        match self {
            FlexDirection::Column => Edge::Top,
            FlexDirection::ColumnReverse => Edge::Bottom,
            FlexDirection::Row => Edge::Left,
            FlexDirection::RowReverse => Edge::Right,
        }
    }

    pub fn trailing_edge(self) -> Edge {
        match self {
            FlexDirection::Column => Edge::Bottom,
            FlexDirection::ColumnReverse => Edge::Top,
            FlexDirection::Row => Edge::Right,
            FlexDirection::RowReverse => Edge::Left,
        }
    }
}

impl Edge {
    pub const PHYSICAL: [Edge; 4] = [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom];

    pub fn is_physical(self) -> bool {
        matches!(self, Edge::Left | Edge::Top | Edge::Right | Edge::Bottom)
    }

    /// Index into per-edge arrays; valid for physical edges only.
    pub fn index(self) -> usize {
        self.as_i32() as usize
    }

    /// Maps `Start`/`End` onto a physical edge.
    pub fn to_physical(self, direction: Direction) -> Option<Edge> {
        let rtl = direction == Direction::Rtl;
        match self {
            Edge::Start => Some(if rtl { Edge::Right } else { Edge::Left }),
            Edge::End => Some(if rtl { Edge::Left } else { Edge::Right }),
            edge if edge.is_physical() => Some(edge),
            _ => None,
        }
    }
}
