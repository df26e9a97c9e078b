use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::tools::placement_integrity::identity::{
    extract_original_store_id, is_valid_instance_id,
};
use crate::tools::placement_integrity::monitor::{active_monitor_status, stop_active_monitor};
use crate::tools::placement_integrity::{
    ActiveMonitor, CenterCollisionAlert, FurniturePlaced, FurnitureRegistry, InstanceQuarantined,
    InstanceReleased, IntegrityMonitor, ManipulationRequest, PlaceFurnitureEvent, PlacementError,
    PlacementIntegrityPlugin, PlacementIntegritySet, PositionCorrected, QuarantineRequest,
    ReleaseRequest,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

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
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone)]
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
    /// Send notification to React frontend without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to React frontend.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Raw incoming messages. Filled by the browser `message` listener on WASM;
/// native hosts push into it directly.
#[derive(Resource, Default, Clone)]
pub struct MessageQueue(Arc<Mutex<Vec<String>>>);

impl MessageQueue {
    pub fn push(&self, message: String) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push(message);
        }
    }
}

/// Serialized messages that would have gone to the parent window (native only).
#[derive(Resource, Default)]
pub struct NativeOutbox(pub Vec<String>);

/// Plugin establishing WebRPC communication layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<PlacementIntegrityPlugin>() {
            app.add_plugins(PlacementIntegrityPlugin);
        }

        app.init_resource::<WebRpcInterface>()
            .init_resource::<MessageQueue>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .before(PlacementIntegritySet::Requests),
            )
            .add_systems(
                PostUpdate,
                (forward_integrity_notifications, send_outgoing_messages)
                    .chain()
                    .after(PlacementIntegritySet::Guard),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);

        #[cfg(not(target_arch = "wasm32"))]
        app.init_resource::<NativeOutbox>();
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(queue: Res<MessageQueue>) {
    let queue_clone = queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Filter messages to ensure they contain string data.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                queue_clone.push(message_str);
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {:?}", e);
        }
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
}

/// Event representing incoming RPC message from React frontend.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

/// Integrity monitor as seen by the requests handled this frame.
struct MonitorView<'a> {
    monitor: Option<&'a IntegrityMonitor>,
    stoppable: Result<(), PlacementError>,
}

/// Writers for the requests the frontend can make of the integrity tools.
#[derive(SystemParam)]
struct IntegrityRequests<'w, 's> {
    commands: Commands<'w, 's>,
    place: EventWriter<'w, PlaceFurnitureEvent>,
    quarantine: EventWriter<'w, QuarantineRequest>,
    release: EventWriter<'w, ReleaseRequest>,
    manipulation: EventWriter<'w, ManipulationRequest>,
}

fn process_incoming_messages(
    message_queue: Res<MessageQueue>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let messages = if let Ok(mut queue) = message_queue.0.lock() {
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
    mut rpc_interface: ResMut<WebRpcInterface>,
    registry: FurnitureRegistry,
    monitor: Option<Res<IntegrityMonitor>>,
    active_monitor: Res<ActiveMonitor>,
    mut requests: IntegrityRequests,
) {
    let mut monitor_view = MonitorView {
        monitor: monitor.as_deref(),
        stoppable: active_monitor_status(&active_monitor, monitor.as_deref()),
    };

    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                if let Some(response) =
                    handle_rpc_request(&request, &registry, &mut monitor_view, &mut requests)
                {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("Rejected RPC message: {}", parse_error);
                rpc_interface.send_notification(
                    "debug_message",
                    serde_json::json!({
                        "message": format!("Parse error: {}", parse_error)
                    }),
                );
            }
        }
    }
}

/// Handle individual RPC request and generate response based on method.
fn handle_rpc_request(
    request: &RpcRequest,
    registry: &FurnitureRegistry,
    monitor_view: &mut MonitorView,
    requests: &mut IntegrityRequests,
) -> Option<RpcResponse> {
    // Only generate responses for requests with IDs (notifications have no ID).
    let id = request.id.clone()?;

    let result = match request.method.as_str() {
        "place_furniture" => handle_place_furniture(&request.params, requests),
        "quarantine_instance" => handle_quarantine_instance(&request.params, registry, requests),
        "release_instance" => handle_release_instance(&request.params, registry, requests),
        "get_quarantine_stats" => handle_get_quarantine_stats(registry),
        "validate_instance_id" => handle_validate_instance_id(&request.params),
        "begin_manipulation" => handle_manipulation(&request.params, registry, requests, true),
        "end_manipulation" => handle_manipulation(&request.params, registry, requests, false),
        "get_monitor_status" => handle_get_monitor_status(monitor_view),
        "stop_integrity_monitor" => handle_stop_integrity_monitor(monitor_view, requests),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            return Some(create_error_response(
                id,
                -32601,
                "Method not found",
                Some(serde_json::json!({"method": request.method})),
            ));
        }
    };

    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

fn parse_params<T: DeserializeOwned>(params: &serde_json::Value) -> Result<T, PlacementError> {
    serde_json::from_value::<T>(params.clone())
        .map_err(|e| PlacementError::InvalidParams(e.to_string()))
}

#[derive(Deserialize)]
struct InstanceParams {
    instance_id: String,
}

fn handle_place_furniture(
    params: &serde_json::Value,
    requests: &mut IntegrityRequests,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct PlaceParams {
        store_id: String,
        furniture_type: Option<String>,
        position: [f32; 3],
    }

    let parsed = parse_params::<PlaceParams>(params)?;
    if parsed.store_id.is_empty() {
        return Err(PlacementError::InvalidParams("store_id must not be empty".into()).into());
    }

    requests.place.write(PlaceFurnitureEvent {
        original_store_id: parsed.store_id.clone(),
        furniture_type: parsed.furniture_type,
        position: Vec3::from_array(parsed.position),
    });

    Ok(serde_json::json!({
        "queued": true,
        "store_id": parsed.store_id
    }))
}

fn handle_quarantine_instance(
    params: &serde_json::Value,
    registry: &FurnitureRegistry,
    requests: &mut IntegrityRequests,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct QuarantineParams {
        instance_id: String,
        index: Option<u32>,
    }

    let parsed = parse_params::<QuarantineParams>(params)?;
    registry.find(&parsed.instance_id)?;

    requests.quarantine.write(QuarantineRequest {
        instance_id: parsed.instance_id.clone(),
        index: parsed.index,
    });

    Ok(serde_json::json!({
        "queued": true,
        "instance_id": parsed.instance_id
    }))
}

fn handle_release_instance(
    params: &serde_json::Value,
    registry: &FurnitureRegistry,
    requests: &mut IntegrityRequests,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct ReleaseParams {
        instance_id: String,
        target_index: u32,
    }

    let parsed = parse_params::<ReleaseParams>(params)?;
    registry.find(&parsed.instance_id)?;

    requests.release.write(ReleaseRequest {
        instance_id: parsed.instance_id.clone(),
        target_index: parsed.target_index,
    });

    Ok(serde_json::json!({
        "queued": true,
        "instance_id": parsed.instance_id
    }))
}

fn handle_get_quarantine_stats(
    registry: &FurnitureRegistry,
) -> Result<serde_json::Value, RpcError> {
    serde_json::to_value(registry.stats()).map_err(|e| RpcError::internal_error(&e.to_string()))
}

fn handle_validate_instance_id(params: &serde_json::Value) -> Result<serde_json::Value, RpcError> {
    let parsed = parse_params::<InstanceParams>(params)?;
    Ok(serde_json::json!({
        "valid": is_valid_instance_id(&parsed.instance_id),
        "original_store_id": extract_original_store_id(&parsed.instance_id)
    }))
}

fn handle_manipulation(
    params: &serde_json::Value,
    registry: &FurnitureRegistry,
    requests: &mut IntegrityRequests,
    active: bool,
) -> Result<serde_json::Value, RpcError> {
    let parsed = parse_params::<InstanceParams>(params)?;
    registry.find(&parsed.instance_id)?;

    requests.manipulation.write(ManipulationRequest {
        instance_id: parsed.instance_id.clone(),
        active,
    });

    Ok(serde_json::json!({
        "instance_id": parsed.instance_id,
        "monitoring_suspended": active
    }))
}

fn handle_get_monitor_status(monitor_view: &MonitorView) -> Result<serde_json::Value, RpcError> {
    let Some(monitor) = monitor_view.monitor else {
        return Ok(serde_json::json!({
            "running": false
        }));
    };

    Ok(serde_json::json!({
        "running": true,
        "stoppable": monitor_view.stoppable.is_ok(),
        "period_ms": monitor.period().as_millis() as u64,
        "ticks": monitor.ticks(),
        "corrections": monitor.corrections()
    }))
}

/// Only the monitor started through `ActiveMonitor` can be stopped from here.
fn handle_stop_integrity_monitor(
    monitor_view: &mut MonitorView,
    requests: &mut IntegrityRequests,
) -> Result<serde_json::Value, RpcError> {
    monitor_view.stoppable.clone()?;
    monitor_view.stoppable = Err(PlacementError::MonitorNotRunning);

    requests.commands.queue(|world: &mut World| {
        if !stop_active_monitor(world) {
            warn!("Integrity monitor changed before the queued stop ran");
        }
    });

    Ok(serde_json::json!({
        "stopped": true
    }))
}

/// Push integrity events to the frontend as notifications.
fn forward_integrity_notifications(
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut alerts: EventReader<CenterCollisionAlert>,
    mut corrections: EventReader<PositionCorrected>,
    mut placed: EventReader<FurniturePlaced>,
    mut quarantined: EventReader<InstanceQuarantined>,
    mut released: EventReader<InstanceReleased>,
) {
    for alert in alerts.read() {
        rpc_interface.send_notification(
            "center_collision_alert",
            serde_json::json!({
                "instance_id": alert.instance_id,
                "original": alert.original.to_array(),
                "corrected": alert.corrected.to_array()
            }),
        );
    }

    for correction in corrections.read() {
        rpc_interface.send_notification(
            "position_corrected",
            serde_json::json!({
                "instance_id": correction.instance_id,
                "original": correction.original.to_array(),
                "corrected": correction.corrected.to_array()
            }),
        );
    }

    for event in placed.read() {
        rpc_interface.send_notification(
            "furniture_placed",
            serde_json::json!({
                "instance_id": event.instance_id,
                "position": event.position.to_array()
            }),
        );
    }

    for event in quarantined.read() {
        rpc_interface.send_notification(
            "instance_quarantined",
            serde_json::json!({
                "instance_id": event.instance_id,
                "position": event.position.to_array()
            }),
        );
    }

    for event in released.read() {
        rpc_interface.send_notification(
            "instance_released",
            serde_json::json!({
                "instance_id": event.instance_id,
                "position": event.position.to_array()
            }),
        );
    }
}

/// Create standardized error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Send queued notifications and responses to React frontend.
fn send_outgoing_messages(
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut outbox: Option<ResMut<NativeOutbox>>,
) {
    let notifications = std::mem::take(&mut rpc_interface.outgoing_notifications);
    let responses = std::mem::take(&mut rpc_interface.outgoing_responses);

    // Notifications first, responses second to maintain order.
    let serialized = notifications
        .iter()
        .map(serde_json::to_string)
        .chain(responses.iter().map(serde_json::to_string));

    for message in serialized {
        match message {
            Ok(json) => send_message_to_parent(json, outbox.as_deref_mut()),
            Err(e) => error!("Failed to serialize message: {}", e),
        }
    }
}

/// Send serialized message to parent window (React frontend).
fn send_message_to_parent(json: String, outbox: Option<&mut NativeOutbox>) {
    #[cfg(target_arch = "wasm32")]
    {
        let _ = outbox;
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

    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Some(outbox) = outbox {
            outbox.0.push(json);
        }
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
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
}

impl From<PlacementError> for RpcError {
    fn from(err: PlacementError) -> Self {
        match &err {
            PlacementError::UnknownInstance(instance_id) => Self {
                data: Some(serde_json::json!({ "instance_id": instance_id })),
                ..Self::invalid_params(&err.to_string())
            },
            PlacementError::InvalidParams(_) => Self::invalid_params(&err.to_string()),
            // Implementation-defined server error range.
            PlacementError::MonitorNotRunning | PlacementError::StaleMonitorHandle => Self {
                code: -32000,
                message: err.to_string(),
                data: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::placement_integrity::quarantine::allocate_quarantine_slot;
    use crate::tools::placement_integrity::{
        FurnitureInstance, PositionGuard, start_integrity_monitor,
    };
    use bevy::transform::TransformPlugin;
    use std::time::Duration;

    fn rpc_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, TransformPlugin))
            .add_plugins(WebRpcPlugin);
        app.update();
        app
    }

    fn call(app: &mut App, id: u64, method: &str, params: serde_json::Value) {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id
        });
        app.world()
            .resource::<MessageQueue>()
            .push(request.to_string());
        app.update();
    }

    fn delivered(app: &mut App) -> Vec<serde_json::Value> {
        std::mem::take(&mut app.world_mut().resource_mut::<NativeOutbox>().0)
            .iter()
            .map(|raw| serde_json::from_str(raw).expect("valid json"))
            .collect()
    }

    fn response(messages: &[serde_json::Value], id: u64) -> serde_json::Value {
        messages
            .iter()
            .find(|m| m["id"] == serde_json::json!(id))
            .cloned()
            .expect("response present")
    }

    fn spawn_instance(app: &mut App, position: Vec3) -> String {
        let instance = FurnitureInstance::new("bookcase");
        let instance_id = instance.instance_id.clone();
        app.world_mut()
            .spawn((instance, PositionGuard, Transform::from_translation(position)));
        instance_id
    }

    #[test]
    fn unknown_method_is_rejected() {
        let mut app = rpc_app();
        call(&mut app, 1, "teleport", serde_json::json!({}));
        let messages = delivered(&mut app);
        assert_eq!(response(&messages, 1)["error"]["code"], -32601);
    }

    #[test]
    fn place_then_query_stats() {
        let mut app = rpc_app();
        call(
            &mut app,
            1,
            "place_furniture",
            serde_json::json!({"store_id": "sofa-1", "position": [0.0, 0.0, 0.0]}),
        );
        let messages = delivered(&mut app);
        assert_eq!(response(&messages, 1)["result"]["queued"], true);
        assert!(messages.iter().any(|m| m["method"] == "furniture_placed"));
        assert!(messages.iter().any(|m| m["method"] == "position_corrected"));

        call(&mut app, 2, "get_quarantine_stats", serde_json::Value::Null);
        let stats = response(&delivered(&mut app), 2)["result"].clone();
        assert_eq!(stats["total"], 1);
        assert_eq!(stats["quarantined_count"], 0);
    }

    #[test]
    fn quarantine_and_release_round_trip() {
        let mut app = rpc_app();
        let instance_id = spawn_instance(&mut app, Vec3::new(1.0, 0.0, 1.0));

        call(
            &mut app,
            1,
            "quarantine_instance",
            serde_json::json!({"instance_id": instance_id}),
        );
        let messages = delivered(&mut app);
        assert_eq!(response(&messages, 1)["result"]["queued"], true);
        assert!(messages.iter().any(|m| m["method"] == "instance_quarantined"));

        call(&mut app, 2, "get_quarantine_stats", serde_json::json!({}));
        let stats = response(&delivered(&mut app), 2)["result"].clone();
        assert_eq!(stats["quarantined_count"], 1);
        assert_eq!(
            stats["quarantined_items"][0]["position"],
            serde_json::json!(allocate_quarantine_slot(0).to_array())
        );
        assert_eq!(stats["quarantined_items"][0]["reason"], "problematic_position");

        call(
            &mut app,
            3,
            "release_instance",
            serde_json::json!({"instance_id": instance_id, "target_index": 0}),
        );
        let released = delivered(&mut app)
            .into_iter()
            .find(|m| m["method"] == "instance_released")
            .expect("release notification");
        let actual = app
            .world_mut()
            .query::<(&FurnitureInstance, &Transform)>()
            .iter(app.world())
            .find(|(instance, _)| instance.instance_id == instance_id)
            .map(|(_, transform)| transform.translation)
            .expect("released instance");
        assert_eq!(
            released["params"]["position"],
            serde_json::json!(actual.to_array())
        );

        call(&mut app, 4, "get_quarantine_stats", serde_json::json!({}));
        let stats = response(&delivered(&mut app), 4)["result"].clone();
        assert_eq!(stats["quarantined_count"], 0);
    }

    #[test]
    fn unknown_instance_reports_its_id() {
        let mut app = rpc_app();
        call(
            &mut app,
            7,
            "quarantine_instance",
            serde_json::json!({"instance_id": "ghost_123"}),
        );
        let error = response(&delivered(&mut app), 7)["error"].clone();
        assert_eq!(error["code"], -32602);
        assert_eq!(error["data"]["instance_id"], "ghost_123");
    }

    #[test]
    fn missing_params_are_invalid() {
        let mut app = rpc_app();
        call(&mut app, 3, "release_instance", serde_json::json!({"instance_id": "x"}));
        assert_eq!(response(&delivered(&mut app), 3)["error"]["code"], -32602);
    }

    #[test]
    fn validate_instance_id_reports_store_id() {
        let mut app = rpc_app();
        let instance_id = spawn_instance(&mut app, Vec3::ONE);
        call(
            &mut app,
            5,
            "validate_instance_id",
            serde_json::json!({"instance_id": instance_id}),
        );
        let result = response(&delivered(&mut app), 5)["result"].clone();
        assert_eq!(result["valid"], true);
        assert_eq!(result["original_store_id"], "bookcase");
    }

    #[test]
    fn monitor_can_be_stopped_once() {
        let mut app = rpc_app();
        assert!(app.world().contains_resource::<IntegrityMonitor>());

        call(&mut app, 1, "stop_integrity_monitor", serde_json::Value::Null);
        assert_eq!(response(&delivered(&mut app), 1)["result"]["stopped"], true);
        assert!(!app.world().contains_resource::<IntegrityMonitor>());

        call(&mut app, 2, "stop_integrity_monitor", serde_json::Value::Null);
        assert_eq!(response(&delivered(&mut app), 2)["error"]["code"], -32000);
    }

    #[test]
    fn stale_handle_does_not_report_a_stop() {
        let mut app = rpc_app();
        let _newer = start_integrity_monitor(app.world_mut(), Duration::from_secs(3));

        call(&mut app, 1, "stop_integrity_monitor", serde_json::Value::Null);
        let reply = response(&delivered(&mut app), 1);
        assert!(reply["result"].is_null());
        assert_eq!(reply["error"]["code"], -32000);
        assert!(app.world().contains_resource::<IntegrityMonitor>());

        call(&mut app, 2, "get_monitor_status", serde_json::Value::Null);
        let status = response(&delivered(&mut app), 2)["result"].clone();
        assert_eq!(status["running"], true);
        assert_eq!(status["stoppable"], false);
        assert_eq!(status["period_ms"], 3000);
    }

    #[test]
    fn duplicate_stop_in_one_frame_is_rejected() {
        let mut app = rpc_app();
        let queue = app.world().resource::<MessageQueue>().clone();
        for id in [1, 2] {
            queue.push(
                serde_json::json!({
                    "jsonrpc": "2.0",
                    "method": "stop_integrity_monitor",
                    "id": id
                })
                .to_string(),
            );
        }
        app.update();

        let messages = delivered(&mut app);
        assert_eq!(response(&messages, 1)["result"]["stopped"], true);
        assert_eq!(response(&messages, 2)["error"]["code"], -32000);
        assert!(!app.world().contains_resource::<IntegrityMonitor>());

        call(&mut app, 3, "get_monitor_status", serde_json::Value::Null);
        assert_eq!(response(&delivered(&mut app), 3)["result"]["running"], false);
    }
}
