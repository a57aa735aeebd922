//! JSON-RPC 2.0 communication layer for React frontend integration.
//!
//! Implements bidirectional messaging between Bevy engine and React UI via
//! iframe postMessage, supporting both request-response and notification patterns.
//!
//! ## Message Flow
//!
//! ```text
//! React (Parent Window)  <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Process request
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! Every `loadedSource`, `loadFailed` and `loadingScreenDone` publish on the
//! event channel is forwarded as a notification with the channel payload as
//! `params`.
//!
//! ## Methods
//!
//! - `start`: confirm the start prompt on the user's behalf. Fails with
//!   `-32000` unless the loading screen is awaiting confirmation.
//! - `get_loading_state`: state, capability flags, counters and log lines.
//!
//! Requests without an `id` are executed but never answered.
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//! - `-32000`: Loading screen not ready for the request

/// JSON-RPC 2.0 bidirectional communication system for React integration.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
