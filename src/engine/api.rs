//! Augury API Module
//! REST surface over the fleet engine with OpenAPI documentation

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

use crate::engine::fleet::{
    ChannelKind, EndpointSummary, EndpointView, FleetEngine, FleetError, NodeView, UpdateError,
};
use crate::engine::observability::UpdateMetrics;

/// Shared handle to the fleet. One lock guards every read-modify-write.
#[derive(Clone)]
pub struct ApiState {
    pub fleet: Arc<Mutex<FleetEngine>>,
}

impl ApiState {
    pub fn new(fleet: FleetEngine) -> Self {
        Self {
            fleet: Arc::new(Mutex::new(fleet)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, FleetEngine>, StatusCode> {
        self.fleet.lock().map_err(|_| {
            error!("fleet state lock poisoned");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}

impl From<FleetError> for StatusCode {
    fn from(err: FleetError) -> Self {
        match err {
            FleetError::NodeNotFound(_) | FleetError::EndpointNotFound(_) => StatusCode::NOT_FOUND,
            FleetError::ChannelNotFound(_) | FleetError::ArtifactNotInChannel { .. } => {
                StatusCode::BAD_REQUEST
            }
            FleetError::DuplicateIdentifier(_) => StatusCode::CONFLICT,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list_nodes,
        get_node,
        poll_node,
        get_endpoint,
        poll_endpoint,
        set_battery,
        set_backlog,
        list_ota_channels,
        list_ota_channel,
        post_ota_artifact,
        clear_ota_artifact,
        list_dfu_channels,
        list_dfu_channel,
        post_dfu_artifact,
        clear_dfu_artifact,
        get_metrics,
    ),
    components(schemas(EndpointSummary, UpdateError)),
    tags(
        (name = "nodes", description = "Gateway state and OTA polling"),
        (name = "endpoints", description = "Sensor state and DFU polling"),
        (name = "channels", description = "Artifact queues"),
        (name = "metrics", description = "Update statistics"),
    )
)]
pub struct ApiDoc;

pub fn create_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/openapi.json", get(openapi_spec))
        .route("/api/nodes", get(list_nodes))
        .route("/api/nodes/{uuid}", get(get_node))
        .route("/api/nodes/{uuid}/poll", post(poll_node))
        .route("/api/endpoints/{serial}", get(get_endpoint))
        .route("/api/endpoints/{serial}/poll", post(poll_endpoint))
        .route("/api/endpoints/{serial}/battery", put(set_battery))
        .route("/api/endpoints/{serial}/backlog", put(set_backlog))
        .route("/api/ota", get(list_ota_channels))
        .route("/api/ota/{channel}", get(list_ota_channel).post(post_ota_artifact))
        .route("/api/ota/{channel}/clear", post(clear_ota_artifact))
        .route("/api/dfu", get(list_dfu_channels))
        .route("/api/dfu/{channel}", get(list_dfu_channel).post(post_dfu_artifact))
        .route("/api/dfu/{channel}/clear", post(clear_dfu_artifact))
        .route("/api/metrics", get(get_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Result of polling a device's channel
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PollResponse {
    pub updated: bool,
    pub version: String,
    pub last_error: Option<UpdateError>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ArtifactRequest {
    pub artifact: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChannelResponse {
    pub channel: String,
    /// Queued artifacts, oldest first
    pub artifacts: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChannelIndexResponse {
    pub channels: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BatteryRequest {
    pub battery: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BacklogRequest {
    pub backlog: u32,
}

// ========== Nodes ==========

#[utoipa::path(
    get,
    path = "/api/nodes",
    responses(
        (status = 200, description = "All nodes", body = Vec<NodeView>)
    ),
    tag = "nodes"
)]
async fn list_nodes(State(state): State<ApiState>) -> Result<Json<Vec<NodeView>>, StatusCode> {
    Ok(Json(state.lock()?.node_views()))
}

#[utoipa::path(
    get,
    path = "/api/nodes/{uuid}",
    params(
        ("uuid" = String, Path, description = "Node identifier"),
    ),
    responses(
        (status = 200, description = "Node state", body = NodeView),
        (status = 404, description = "Unknown node")
    ),
    tag = "nodes"
)]
async fn get_node(
    State(state): State<ApiState>,
    Path(uuid): Path<String>,
) -> Result<Json<NodeView>, StatusCode> {
    Ok(Json(state.lock()?.node_view(&uuid)?))
}

#[utoipa::path(
    post,
    path = "/api/nodes/{uuid}/poll",
    params(
        ("uuid" = String, Path, description = "Node identifier"),
    ),
    responses(
        (status = 200, description = "Poll outcome", body = PollResponse),
        (status = 404, description = "Unknown node")
    ),
    tag = "nodes"
)]
async fn poll_node(
    State(state): State<ApiState>,
    Path(uuid): Path<String>,
) -> Result<Json<PollResponse>, StatusCode> {
    let mut fleet = state.lock()?;
    let updated = fleet.poll_node(&uuid)?;
    let view = fleet.node_view(&uuid)?;
    Ok(Json(PollResponse {
        updated,
        version: view.version,
        last_error: view.last_error,
    }))
}

// ========== Endpoints ==========

#[utoipa::path(
    get,
    path = "/api/endpoints/{serial}",
    params(
        ("serial" = String, Path, description = "Endpoint serial number"),
    ),
    responses(
        (status = 200, description = "Endpoint state", body = EndpointView),
        (status = 404, description = "Unknown endpoint")
    ),
    tag = "endpoints"
)]
async fn get_endpoint(
    State(state): State<ApiState>,
    Path(serial): Path<String>,
) -> Result<Json<EndpointView>, StatusCode> {
    Ok(Json(state.lock()?.endpoint_view(&serial)?))
}

#[utoipa::path(
    post,
    path = "/api/endpoints/{serial}/poll",
    params(
        ("serial" = String, Path, description = "Endpoint serial number"),
    ),
    responses(
        (status = 200, description = "Poll outcome", body = PollResponse),
        (status = 404, description = "Unknown endpoint")
    ),
    tag = "endpoints"
)]
async fn poll_endpoint(
    State(state): State<ApiState>,
    Path(serial): Path<String>,
) -> Result<Json<PollResponse>, StatusCode> {
    let mut fleet = state.lock()?;
    let updated = fleet.poll_endpoint(&serial)?;
    let view = fleet.endpoint_view(&serial)?;
    Ok(Json(PollResponse {
        updated,
        version: view.version,
        last_error: view.last_error,
    }))
}

#[utoipa::path(
    put,
    path = "/api/endpoints/{serial}/battery",
    params(
        ("serial" = String, Path, description = "Endpoint serial number"),
    ),
    request_body = BatteryRequest,
    responses(
        (status = 200, description = "Battery updated", body = EndpointView),
        (status = 404, description = "Unknown endpoint")
    ),
    tag = "endpoints"
)]
async fn set_battery(
    State(state): State<ApiState>,
    Path(serial): Path<String>,
    Json(body): Json<BatteryRequest>,
) -> Result<Json<EndpointView>, StatusCode> {
    let mut fleet = state.lock()?;
    fleet.set_endpoint_battery(&serial, body.battery)?;
    Ok(Json(fleet.endpoint_view(&serial)?))
}

#[utoipa::path(
    put,
    path = "/api/endpoints/{serial}/backlog",
    params(
        ("serial" = String, Path, description = "Endpoint serial number"),
    ),
    request_body = BacklogRequest,
    responses(
        (status = 200, description = "Backlog updated", body = EndpointView),
        (status = 404, description = "Unknown endpoint")
    ),
    tag = "endpoints"
)]
async fn set_backlog(
    State(state): State<ApiState>,
    Path(serial): Path<String>,
    Json(body): Json<BacklogRequest>,
) -> Result<Json<EndpointView>, StatusCode> {
    let mut fleet = state.lock()?;
    fleet.set_endpoint_backlog(&serial, body.backlog)?;
    Ok(Json(fleet.endpoint_view(&serial)?))
}

// ========== Channels ==========

fn channel_contents(fleet: &FleetEngine, kind: ChannelKind, channel: String) -> ChannelResponse {
    ChannelResponse {
        artifacts: fleet.artifacts(kind, &channel).to_vec(),
        channel,
    }
}

fn post_artifact(
    state: &ApiState,
    kind: ChannelKind,
    channel: String,
    body: ArtifactRequest,
) -> Result<Json<ChannelResponse>, StatusCode> {
    let mut fleet = state.lock()?;
    fleet.post(kind, &channel, &body.artifact);
    Ok(Json(channel_contents(&fleet, kind, channel)))
}

fn clear_artifact(
    state: &ApiState,
    kind: ChannelKind,
    channel: String,
    body: ArtifactRequest,
) -> Result<Json<ChannelResponse>, StatusCode> {
    let mut fleet = state.lock()?;
    fleet.clear(kind, &channel, &body.artifact)?;
    Ok(Json(channel_contents(&fleet, kind, channel)))
}

#[utoipa::path(
    get,
    path = "/api/ota",
    responses(
        (status = 200, description = "Known OTA channels, sorted", body = ChannelIndexResponse)
    ),
    tag = "channels"
)]
async fn list_ota_channels(
    State(state): State<ApiState>,
) -> Result<Json<ChannelIndexResponse>, StatusCode> {
    let channels = state.lock()?.channel_names(ChannelKind::Ota);
    Ok(Json(ChannelIndexResponse { channels }))
}

#[utoipa::path(
    get,
    path = "/api/ota/{channel}",
    params(
        ("channel" = String, Path, description = "OTA channel name, e.g. OTA_<uuid>"),
    ),
    responses(
        (status = 200, description = "Queued artifacts", body = ChannelResponse)
    ),
    tag = "channels"
)]
async fn list_ota_channel(
    State(state): State<ApiState>,
    Path(channel): Path<String>,
) -> Result<Json<ChannelResponse>, StatusCode> {
    let fleet = state.lock()?;
    Ok(Json(channel_contents(&fleet, ChannelKind::Ota, channel)))
}

#[utoipa::path(
    post,
    path = "/api/ota/{channel}",
    params(
        ("channel" = String, Path, description = "OTA channel name, e.g. OTA_<uuid>"),
    ),
    request_body = ArtifactRequest,
    responses(
        (status = 200, description = "Artifact queued", body = ChannelResponse)
    ),
    tag = "channels"
)]
async fn post_ota_artifact(
    State(state): State<ApiState>,
    Path(channel): Path<String>,
    Json(body): Json<ArtifactRequest>,
) -> Result<Json<ChannelResponse>, StatusCode> {
    post_artifact(&state, ChannelKind::Ota, channel, body)
}

#[utoipa::path(
    post,
    path = "/api/ota/{channel}/clear",
    params(
        ("channel" = String, Path, description = "OTA channel name"),
    ),
    request_body = ArtifactRequest,
    responses(
        (status = 200, description = "Artifact removed", body = ChannelResponse),
        (status = 400, description = "Unknown channel or artifact not queued")
    ),
    tag = "channels"
)]
async fn clear_ota_artifact(
    State(state): State<ApiState>,
    Path(channel): Path<String>,
    Json(body): Json<ArtifactRequest>,
) -> Result<Json<ChannelResponse>, StatusCode> {
    clear_artifact(&state, ChannelKind::Ota, channel, body)
}

#[utoipa::path(
    get,
    path = "/api/dfu",
    responses(
        (status = 200, description = "Known DFU channels, sorted", body = ChannelIndexResponse)
    ),
    tag = "channels"
)]
async fn list_dfu_channels(
    State(state): State<ApiState>,
) -> Result<Json<ChannelIndexResponse>, StatusCode> {
    let channels = state.lock()?.channel_names(ChannelKind::Dfu);
    Ok(Json(ChannelIndexResponse { channels }))
}

#[utoipa::path(
    get,
    path = "/api/dfu/{channel}",
    params(
        ("channel" = String, Path, description = "DFU channel name, e.g. DFU_<serial>"),
    ),
    responses(
        (status = 200, description = "Queued artifacts", body = ChannelResponse)
    ),
    tag = "channels"
)]
async fn list_dfu_channel(
    State(state): State<ApiState>,
    Path(channel): Path<String>,
) -> Result<Json<ChannelResponse>, StatusCode> {
    let fleet = state.lock()?;
    Ok(Json(channel_contents(&fleet, ChannelKind::Dfu, channel)))
}

#[utoipa::path(
    post,
    path = "/api/dfu/{channel}",
    params(
        ("channel" = String, Path, description = "DFU channel name, e.g. DFU_<serial>"),
    ),
    request_body = ArtifactRequest,
    responses(
        (status = 200, description = "Artifact queued", body = ChannelResponse)
    ),
    tag = "channels"
)]
async fn post_dfu_artifact(
    State(state): State<ApiState>,
    Path(channel): Path<String>,
    Json(body): Json<ArtifactRequest>,
) -> Result<Json<ChannelResponse>, StatusCode> {
    post_artifact(&state, ChannelKind::Dfu, channel, body)
}

#[utoipa::path(
    post,
    path = "/api/dfu/{channel}/clear",
    params(
        ("channel" = String, Path, description = "DFU channel name"),
    ),
    request_body = ArtifactRequest,
    responses(
        (status = 200, description = "Artifact removed", body = ChannelResponse),
        (status = 400, description = "Unknown channel or artifact not queued")
    ),
    tag = "channels"
)]
async fn clear_dfu_artifact(
    State(state): State<ApiState>,
    Path(channel): Path<String>,
    Json(body): Json<ArtifactRequest>,
) -> Result<Json<ChannelResponse>, StatusCode> {
    clear_artifact(&state, ChannelKind::Dfu, channel, body)
}

// ========== Metrics ==========

#[utoipa::path(
    get,
    path = "/api/metrics",
    responses(
        (status = 200, description = "Update counters and recent history", body = serde_json::Value)
    ),
    tag = "metrics"
)]
async fn get_metrics(State(state): State<ApiState>) -> Result<Json<UpdateMetrics>, StatusCode> {
    Ok(Json(state.lock()?.metrics().clone()))
}
