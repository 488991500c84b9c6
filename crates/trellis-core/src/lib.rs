// crates/trellis-core/src/lib.rs
pub mod enums;
pub mod properties;
pub mod property_registry;
pub mod style;
pub mod value;

pub use enums::*;
pub use properties::*;
pub use property_registry::*;
pub use style::*;
pub use value::*;

#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("Invalid style value: {0:?}")]
    InvalidValue(String),

    #[error("Invalid {kind} code: {value}")]
    InvalidEnumValue { kind: &'static str, value: i32 },

    #[error("Invalid unit tag: {0}")]
    InvalidUnit(u32),

    #[error("Property {property} expects {expected:?}, got {found:?}")]
    TypeMismatch {
        property: String,
        expected: PropertyValueType,
        found: PropertyValueType,
    },
}

pub type Result<T> = std::result::Result<T, StyleError>;
