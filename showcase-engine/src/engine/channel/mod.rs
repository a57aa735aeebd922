//! Decoupled publish/subscribe channel between the loader and the UI layers.
//!
//! Publishers and subscribers only share an [`event_channel::EventChannel`]
//! handle and an event name. Payloads travel as `serde_json::Value` so the same
//! messages can be forwarded verbatim to the web frontend.
//!
//! ## Delivery rules
//!
//! - Fan-out is synchronous and runs in subscription order.
//! - Handlers registered during a fan-out miss that fan-out.
//! - A publish issued from inside a handler is queued and delivered once the
//!   current fan-out finishes.
//! - A panicking handler is logged and skipped; the remaining handlers still run.
//!   This needs an unwinding panic strategy. `wasm32-unknown-unknown` builds
//!   abort on panic, so there a panicking handler ends the whole app.

/// Subscriber registry, publish fan-out and subscription handles.
pub mod event_channel;

/// Typed payloads carried on the channel.
pub mod payloads;
