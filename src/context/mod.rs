//! Parent/child context propagation
//!
//! # Overview
//!
//! A parent stream publishes one [`Context`] per emitted record. The context
//! parametrizes exactly one invocation of each child stream and is dropped
//! once that invocation finishes. [`ChildContext`] describes how a parent
//! record is turned into a context.

mod parent;
mod types;

pub use parent::{ChildContext, ContextField};
pub use types::Context;
