// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Package Registry
//!
//! Packages are named, independently-schemed payloads stored under `pkgs`.
//! Each known package kind implements [`Package`]; the [`PackageRegistry`] is a
//! dispatch table from package id to that kind's validator, so adding a new
//! package never touches [`Envelope`].
//!
//! Unknown package ids are passed through untouched.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::envelope::Envelope;
use crate::domain::error::SchemaError;
use crate::domain::intent::Intent;

/// A typed package schema.
pub trait Package: Sized {
    /// Namespaced key under `pkgs`, e.g. `"at.intent.v1"`.
    const ID: &'static str;

    /// Structurally validate `value` and decode it into the typed payload.
    fn from_value(value: &Value) -> Result<Self, SchemaError>;

    /// Serialize back into the wire representation.
    fn to_value(&self) -> Value;
}

/// Validator entry stored in the dispatch table.
pub type PackageValidator = fn(&Value) -> Result<(), SchemaError>;

fn validate_as<P: Package>(value: &Value) -> Result<(), SchemaError> {
    P::from_value(value).map(|_| ())
}

/// Decode the package of kind `P` from `envelope`.
///
/// Returns `Ok(None)` when the package is absent. Presence with an invalid
/// payload is an error, never "absent".
pub fn extract<P: Package>(envelope: &Envelope) -> Result<Option<P>, SchemaError> {
    envelope.package(P::ID).map(P::from_value).transpose()
}

/// Dispatch table from package id to validator.
#[derive(Debug, Clone, Default)]
pub struct PackageRegistry {
    validators: BTreeMap<&'static str, PackageValidator>,
}

impl PackageRegistry {
    /// A registry with no known packages; every package passes through.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with every standardized package registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register::<Intent>();
        registry
    }

    pub fn register<P: Package>(&mut self) -> &mut Self {
        self.validators.insert(P::ID, validate_as::<P>);
        self
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.validators.contains_key(id)
    }

    pub fn registered_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.validators.keys().copied()
    }

    /// Validate a single payload. Unknown ids are accepted as-is.
    pub fn validate_package(&self, id: &str, value: &Value) -> Result<(), SchemaError> {
        match self.validators.get(id) {
            Some(validate) => validate(value),
            None => Ok(()),
        }
    }

    /// Validate every registered package present in `envelope`.
    pub fn validate(&self, envelope: &Envelope) -> Result<(), SchemaError> {
        for (id, value) in &envelope.pkgs {
            self.validate_package(id, value)?;
        }
        Ok(())
    }
}
