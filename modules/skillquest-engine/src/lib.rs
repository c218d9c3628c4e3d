//! Quest progress engine.
//!
//! Action Events enter through the `EventDispatcher`, which resolves a
//! `Handler` from the `HandlerRegistry`. Handlers forward (or derive and
//! forward) events to the `ProgressEngine`, which applies the aggregation
//! policy declared for the action type to every matching open assignment.

pub mod dispatcher;
pub mod engine;
pub mod handlers;
pub mod policy;
pub mod registry;
pub mod traits;

pub use dispatcher::EventDispatcher;
pub use engine::ProgressEngine;
pub use handlers::{Handler, HandlerContext};
pub use policy::{AggregationPolicy, PolicyTable};
pub use registry::HandlerRegistry;
pub use traits::CompletionSource;
