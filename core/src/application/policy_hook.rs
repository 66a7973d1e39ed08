// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;

use crate::domain::envelope::Envelope;
use crate::domain::intent::Intent;
use crate::domain::policy::{PolicyEvaluation, RequestContext};

/// Everything a hook may inspect. Borrowed for the duration of one request.
#[derive(Debug, Clone, Copy)]
pub struct PolicyHookContext<'a> {
    pub request: &'a RequestContext,
    pub envelope: &'a Envelope,
    pub intent: Option<&'a Intent>,
}

/// Higher-level policy consulted after the built-in checks pass.
///
/// This is the seam for a rules engine or an LLM judge, and the only place a
/// [`crate::domain::policy::PolicyDecision::Challenge`] originates. Returning
/// `Err` is treated as a denial.
#[async_trait]
pub trait PolicyHook: Send + Sync {
    async fn decide(&self, ctx: PolicyHookContext<'_>) -> anyhow::Result<PolicyEvaluation>;
}
