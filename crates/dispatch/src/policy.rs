//! DispatchPolicy trait - pluggable dispatch decisions
//!
//! The relay's primary extension point. Policies are plain handlers invoked in
//! registration order against the open `DispatchContext`; each gets the full
//! addressing API and may veto the frame outright. This replaces the
//! event-bus listener pattern with an explicit, ordered handler list.

use tracing::trace;

use crate::context::DispatchContext;

/// One dispatch decision handler.
///
/// Implementations decide who hears a frame: add targets, raise or override
/// volumes, attach rendering hints, or cancel the frame entirely. A policy
/// must not assume it runs first or last; arbitration in the context makes
/// ordering between non-forced instructions commutative up to volume.
pub trait DispatchPolicy: Send + Sync {
    /// Policy name (used for logging)
    fn name(&self) -> &str;

    /// Apply this policy to an open context.
    fn apply(&self, ctx: &mut DispatchContext<'_>);
}

/// Closure adapter, mainly for tests and one-off handlers.
pub struct FnPolicy<F> {
    name: String,
    f: F,
}

impl<F> FnPolicy<F>
where
    F: Fn(&mut DispatchContext<'_>) + Send + Sync,
{
    /// Wrap a closure as a named policy.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> DispatchPolicy for FnPolicy<F>
where
    F: Fn(&mut DispatchContext<'_>) + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, ctx: &mut DispatchContext<'_>) {
        (self.f)(ctx)
    }
}

/// Default dispatch behavior: everyone in the connected snapshot hears the
/// frame at a fixed volume.
pub struct BroadcastPolicy {
    volume: i32,
}

impl BroadcastPolicy {
    /// Broadcast at the given volume.
    pub fn new(volume: i32) -> Self {
        Self { volume }
    }
}

impl DispatchPolicy for BroadcastPolicy {
    fn name(&self) -> &str {
        "broadcast"
    }

    fn apply(&self, ctx: &mut DispatchContext<'_>) {
        ctx.address_all_except_speaker_at(self.volume);
    }
}

/// Ordered list of dispatch policies.
///
/// Policies run in registration order. Every registered policy runs even when
/// an earlier one canceled the frame; cancellation decides the outcome only
/// after the whole chain has been applied. There is no un-cancel.
#[derive(Default)]
pub struct PolicyRegistry {
    policies: Vec<Box<dyn DispatchPolicy>>,
}

impl PolicyRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a policy. Registration order is invocation order.
    pub fn register(&mut self, policy: Box<dyn DispatchPolicy>) {
        self.policies.push(policy);
    }

    /// Number of registered policies.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// True when no policy is registered.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Run all policies against an open context, in order.
    pub fn apply_all(&self, ctx: &mut DispatchContext<'_>) {
        for policy in &self.policies {
            trace!(policy = policy.name(), "Applying dispatch policy");
            policy.apply(ctx);
        }
    }
}
