// crates/trellis-core/src/property_registry.rs

use std::collections::HashMap;

use crate::{PropertyId, PropertyValue, PropertyValueType, Style};

/// Metadata about a property: its name, value kind and default.
#[derive(Debug, Clone)]
pub struct PropertyMetadata {
    pub id: PropertyId,
    pub name: String,
    pub value_type: PropertyValueType,
    pub default_value: PropertyValue,
}

/// Single source of truth for property names and defaults, built from the
/// property table so it can never drift from [`Style`].
#[derive(Debug, Clone)]
pub struct PropertyRegistry {
    properties: Vec<PropertyMetadata>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<PropertyId, usize>,
}

impl PropertyRegistry {
    pub fn new() -> Self {
        let defaults = Style::default();
        let mut registry = PropertyRegistry {
            properties: Vec::new(),
            by_name: HashMap::new(),
            by_id: HashMap::new(),
        };

        for id in PropertyId::all() {
            registry.register_property(PropertyMetadata {
                id,
                name: id.name(),
                value_type: id.value_type(),
                default_value: defaults.get(id),
            });
        }
        registry
    }

    fn register_property(&mut self, metadata: PropertyMetadata) {
        let index = self.properties.len();
        self.by_name.insert(metadata.name.clone(), index);
        self.by_id.insert(metadata.id, index);
        self.properties.push(metadata);
    }

    pub fn get_property_metadata(&self, id: PropertyId) -> Option<&PropertyMetadata> {
        self.by_id.get(&id).map(|&index| &self.properties[index])
    }

    /// Looks a property up by its kebab-case name.
    pub fn lookup(&self, name: &str) -> Option<&PropertyMetadata> {
        self.by_name.get(name).map(|&index| &self.properties[index])
    }

    pub fn get_default_value(&self, id: PropertyId) -> Option<&PropertyValue> {
        self.get_property_metadata(id).map(|meta| &meta.default_value)
    }

    pub fn all_properties(&self) -> &[PropertyMetadata] {
        &self.properties
    }

    /// Properties of `style` that differ from their defaults, in table order.
    pub fn non_default<'a>(&'a self, style: &Style) -> Vec<(&'a PropertyMetadata, PropertyValue)> {
        self.properties
            .iter()
            .map(|meta| (meta, style.get(meta.id)))
            .filter(|(meta, value)| *value != meta.default_value)
            .collect()
    }
}

impl Default for PropertyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Edge, FlexDirection, StyleValue};

    #[test]
    fn test_property_registry_lookup() {
        let registry = PropertyRegistry::new();

        let meta = registry.lookup("flex-direction").unwrap();
        assert_eq!(meta.id, PropertyId::FlexDirection);
        assert_eq!(meta.value_type, PropertyValueType::FlexDirection);
        assert_eq!(meta.default_value, PropertyValue::FlexDirection(FlexDirection::Column));

        let meta = registry.lookup("padding-vertical").unwrap();
        assert_eq!(meta.id, PropertyId::Padding(Edge::Vertical));
        assert_eq!(meta.default_value, PropertyValue::Value(StyleValue::Undefined));

        assert!(registry.lookup("grid-template-rows").is_none());
    }

    #[test]
    fn test_non_default_properties() {
        let registry = PropertyRegistry::new();
        let mut style = Style::default();
        assert!(registry.non_default(&style).is_empty());

        style.width = StyleValue::Point(48.0);
        style.margin.end = StyleValue::Point(8.0);
        style.flex_grow = Some(1.0);
        let changed: Vec<String> = registry
            .non_default(&style)
            .iter()
            .map(|(meta, value)| format!("{}={}", meta.name, value))
            .collect();
        assert_eq!(changed, vec!["flex-grow=1", "width=48", "margin-end=8"]);
    }

    #[test]
    fn test_every_property_registered() {
        let registry = PropertyRegistry::new();
        assert_eq!(registry.all_properties().len(), PropertyId::all().len());
        assert_eq!(
            registry.get_default_value(PropertyId::Width),
            Some(&PropertyValue::Value(StyleValue::Auto))
        );
    }
}
