// Copyright (c) 2025 - Cowboy AI, Inc.
//! Optional collaborator references and capability contracts

use std::fmt;

use crate::graph::{ComponentRef, PropertyValue};

/// Optional reference to a collaborator
///
/// `Supplied` is used verbatim and never owned by the receiving component.
/// `Absent` makes the receiving component build its own owned instance.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference<T> {
    /// Caller-supplied collaborator
    Supplied(T),
    /// No collaborator; one is constructed as an owned child
    Absent,
}

impl<T> Reference<T> {
    /// Whether a collaborator was supplied
    pub fn is_supplied(&self) -> bool {
        matches!(self, Reference::Supplied(_))
    }

    /// Borrow the supplied value
    pub fn as_ref(&self) -> Reference<&T> {
        match self {
            Reference::Supplied(value) => Reference::Supplied(value),
            Reference::Absent => Reference::Absent,
        }
    }

    /// The supplied value, if any
    pub fn supplied(self) -> Option<T> {
        match self {
            Reference::Supplied(value) => Some(value),
            Reference::Absent => None,
        }
    }
}

impl<T> Default for Reference<T> {
    fn default() -> Self {
        Reference::Absent
    }
}

impl<T> From<Option<T>> for Reference<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Reference::Absent, Reference::Supplied)
    }
}

/// Capability contract of a network-like collaborator
///
/// Any component exposing a stable network identifier and the identifiers of
/// its subnets satisfies it.
pub trait NetworkCapability: fmt::Debug + Send + Sync {
    /// Component providing the network
    fn component(&self) -> ComponentRef;

    /// Region the network lives in
    fn region(&self) -> &str;

    /// Network identifier
    fn network_id(&self) -> PropertyValue;

    /// Subnet identifiers, in creation order
    fn subnet_ids(&self) -> Vec<PropertyValue>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_from_option() {
        assert_eq!(Reference::from(Some(3)), Reference::Supplied(3));
        assert_eq!(Reference::<u8>::from(None), Reference::Absent);
        assert!(!Reference::<u8>::default().is_supplied());
    }

    #[test]
    fn test_reference_supplied_value() {
        let reference = Reference::Supplied("net".to_string());
        assert_eq!(reference.as_ref(), Reference::Supplied(&"net".to_string()));
        assert_eq!(reference.supplied(), Some("net".to_string()));
    }
}
