// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent-Token Envelope (v0)
//!
//! The versioned top-level token structure. The kernel is deliberately tiny:
//!
//! ```text
//! { "v": 0, "pkgs": { "<package-id>": <opaque JSON>, ... } }
//! ```
//!
//! `pkgs` is an open registry. The envelope never interprets package
//! payloads; typed access goes through [`crate::domain::package`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The only envelope version this implementation accepts.
pub const SUPPORTED_VERSION: u64 = 0;

/// Maximum accepted encoded token length, in characters.
pub const MAX_TOKEN_LENGTH: usize = 16_384;

/// Decoded Agent-Token envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub v: u64,
    pub pkgs: Map<String, Value>,
}

impl Envelope {
    /// An empty envelope at the supported version.
    pub fn new() -> Self {
        Self::with_packages(Map::new())
    }

    pub fn with_packages(pkgs: Map<String, Value>) -> Self {
        Self {
            v: SUPPORTED_VERSION,
            pkgs,
        }
    }

    /// Raw payload stored under `id`, if any.
    pub fn package(&self, id: &str) -> Option<&Value> {
        self.pkgs.get(id)
    }

    pub fn package_ids(&self) -> impl Iterator<Item = &str> {
        self.pkgs.keys().map(String::as_str)
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
