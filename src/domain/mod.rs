// Copyright (c) 2025 - Cowboy AI, Inc.
//! Composition Domain Models
//!
//! Value objects and pure invariant checks shared by the engine and the
//! bundled components.
//!
//! # Value Objects with Invariants
//!
//! - [`ComponentName`] - Validated component name, seed of child names
//! - [`Ipv4Cidr`] - IPv4 block with `/24` subnet carving
//! - [`ResourceType`] - Provider type tags of resource nodes
//!
//! # Validation
//!
//! - [`invariants`] - Pure checks returning [`ValidationError`]s that name
//!   the offending configuration field

pub mod invariants;
pub mod naming;
pub mod network;
pub mod resource_type;

pub use invariants::{ValidationError, ValidationResult};
pub use naming::{environment_slug, ComponentName, NameError};
pub use network::{availability_zone, Ipv4Cidr, NetworkError, ZONE_LETTERS};
pub use resource_type::ResourceType;
