use crate::error::RelayError;
use crate::signaling::{SignalingService, ws_handler};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tandem_core::RoomSummary;

pub fn router(service: SignalingService) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/rooms", get(list_rooms))
        .route("/ws", get(ws_handler))
        .with_state(service)
}

async fn index() -> &'static str {
    "tandem relay is running"
}

async fn list_rooms(
    State(service): State<SignalingService>,
) -> Result<Json<Vec<RoomSummary>>, RelayError> {
    service.list_rooms().await.map(Json)
}
