use crate::engine::channel::event_channel::EventChannel;
use crate::engine::presentation::controller::PresentationController;
use bevy::prelude::*;
use constants::events::{CAPABILITY_CHECK, LOAD_FAILED, LOADED_SOURCE, LOADING_SCREEN_DONE};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

#[cfg(target_arch = "wasm32")]
use crate::engine::{channel::event_channel::ChannelEvent, channel::payloads::CapabilityCheck};

/// Channel events mirrored to the frontend as notifications of the same name.
pub const FORWARDED_EVENTS: [&str; 4] = [CAPABILITY_CHECK, LOADED_SOURCE, LOAD_FAILED, LOADING_SCREEN_DONE];

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

impl RpcResponse {
    fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id: Some(id),
        }
    }

    fn failure(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }
    }
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

impl RpcNotification {
    pub fn new(method: &str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Error)]
#[error("JSON-RPC error {code}: {message}")]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication between React and Bevy.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Queue response for transmission to React frontend.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Notifications collected by channel handlers until the next frame.
#[derive(Resource, Clone, Default)]
pub struct ChannelForwarder(Arc<Mutex<Vec<RpcNotification>>>);

impl ChannelForwarder {
    /// Mirror every [`FORWARDED_EVENTS`] publish on `channel`.
    pub fn attach(channel: &EventChannel) -> Self {
        let forwarder = Self::default();
        for event in FORWARDED_EVENTS {
            let queue = forwarder.0.clone();
            channel.subscribe(event, move |payload| {
                queue
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(RpcNotification::new(event, payload.clone()));
            });
        }
        forwarder
    }

    fn take(&self) -> Vec<RpcNotification> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Plugin establishing WebRPC communication layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        let channel = app.world_mut().get_resource_or_init::<EventChannel>().clone();

        app.init_resource::<WebRpcInterface>()
            .insert_resource(ChannelForwarder::attach(&channel))
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    forward_channel_events,
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Filter messages to ensure they contain string data.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {:?}", e);
            return;
        }
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(Arc<Mutex<Vec<String>>>);

/// Event representing incoming RPC message from React frontend.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn forward_channel_events(forwarder: Res<ChannelForwarder>, mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in forwarder.take() {
        rpc_interface.outgoing_notifications.push(notification);
    }
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    controller: Option<Res<PresentationController>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("Processing RPC method: {}", request.method);
                if let Some(response) = handle_rpc_request(&request, controller.as_deref()) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => warn!("Dropping unparseable RPC message: {}", parse_error),
        }
    }
}

/// Execute `request` and build its response.
///
/// Requests without an ID are notifications: they still run, but nothing is
/// sent back.
fn handle_rpc_request(
    request: &RpcRequest,
    controller: Option<&PresentationController>,
) -> Option<RpcResponse> {
    let result = if request.jsonrpc != "2.0" {
        Err(RpcError::invalid_request(&format!(
            "Unsupported jsonrpc version '{}'",
            request.jsonrpc
        )))
    } else {
        match request.method.as_str() {
            "start" => expect_no_params(&request.params).and_then(|_| handle_start(controller)),
            "get_loading_state" => {
                expect_no_params(&request.params).and_then(|_| handle_get_loading_state(controller))
            }
            _ => {
                warn!("Unknown RPC method: {}", request.method);
                Err(RpcError::method_not_found(&request.method))
            }
        }
    };

    let id = request.id.clone()?;
    Some(match result {
        Ok(result_value) => RpcResponse::success(id, result_value),
        Err(error) => RpcResponse::failure(id, error),
    })
}

fn expect_no_params(params: &serde_json::Value) -> Result<(), RpcError> {
    let empty = match params {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if empty {
        Ok(())
    } else {
        Err(RpcError::invalid_params("Method takes no parameters"))
    }
}

/// User confirmation relayed from the host page.
fn handle_start(controller: Option<&PresentationController>) -> Result<serde_json::Value, RpcError> {
    let controller =
        controller.ok_or_else(|| RpcError::internal_error("Loading screen not initialised"))?;

    match controller.confirm_start() {
        Ok(state) => {
            info!("Start confirmed over RPC");
            Ok(serde_json::json!({
                "success": true,
                "state": state
            }))
        }
        Err(e) => Err(RpcError::not_ready(
            &e.to_string(),
            serde_json::json!({ "state": controller.state() }),
        )),
    }
}

fn handle_get_loading_state(
    controller: Option<&PresentationController>,
) -> Result<serde_json::Value, RpcError> {
    let controller =
        controller.ok_or_else(|| RpcError::internal_error("Loading screen not initialised"))?;

    serde_json::to_value(controller.snapshot())
        .map_err(|e| RpcError::internal_error(&format!("Failed to serialise state: {}", e)))
}

/// Send queued notifications and responses to React frontend.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to parent window (React frontend).
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No-op for non-WASM targets.
        let _ = message;
    }
}

/// Tell the host page about the environment when the engine itself will not
/// start, so its own notice can take over.
#[cfg(target_arch = "wasm32")]
pub fn report_capabilities_to_host(check: CapabilityCheck) {
    match serde_json::to_value(check) {
        Ok(params) => send_message_to_parent(&RpcNotification::new(CapabilityCheck::NAME, params)),
        Err(e) => error!("Failed to serialise capability check: {}", e),
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_request(message: &str) -> Self {
        Self {
            code: -32600,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }

    /// Server-defined: the request is valid but the loading screen is not in
    /// a state that accepts it.
    pub fn not_ready(message: &str, data: serde_json::Value) -> Self {
        Self {
            code: -32000,
            message: message.to_string(),
            data: Some(data),
        }
    }
}
