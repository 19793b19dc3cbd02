// Copyright (c) 2025 - Cowboy AI, Inc.
//! Component Configuration
//!
//! Every component declares a typed configuration with a static default for
//! each option. Callers supply a partial [`ConfigTree`] that is merged over
//! those defaults, and the merged tree is read back into the typed struct.
//!
//! ```text
//! defaults(DefaultSource) ──► ConfigTree ──┐
//!                                          ├─► merge() ──► typed Config
//! caller overrides ─────────► ConfigTree ──┘
//! ```
//!
//! # Module Organization
//!
//! - [`tree`] - Tagged configuration tree (leaf vs. group)
//! - [`merge`](mod@merge) - Recursive merge of overrides over defaults
//! - [`defaults`] - Environment-derived default source

pub mod defaults;
pub mod merge;
pub mod tree;

pub use defaults::{DefaultSource, FALLBACK_AWS_REGION};
pub use merge::merge;
pub use tree::ConfigTree;

use crate::domain::ValidationError;
use serde::{de::DeserializeOwned, Serialize};

/// Merged configuration in both typed and tree form
#[derive(Debug, Clone)]
pub struct ResolvedConfig<T> {
    /// Typed configuration handed to validation and population
    pub config: T,
    /// Effective configuration tree recorded on the component
    pub tree: ConfigTree,
}

/// Merge `overrides` over `defaults` and read the result back as `T`
///
/// Fails when the merged tree is not a complete `T` (unknown option, wrong
/// value type, or a required option left without a value).
pub fn resolve<T>(defaults: &T, overrides: &ConfigTree) -> Result<ResolvedConfig<T>, ValidationError>
where
    T: Serialize + DeserializeOwned,
{
    let base = ConfigTree::from_serialize(defaults)
        .map_err(|e| ValidationError::invalid("<defaults>", e.to_string()))?;
    let tree = merge(&base, overrides);
    let config = serde_path_to_error::deserialize(tree.clone().into_value())
        .map_err(|e| ValidationError::from_deserialize(&e))?;

    Ok(ResolvedConfig { config, tree })
}
