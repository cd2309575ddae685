//! Inference handlers.
//!
//! Model inference is CPU-bound, so each request hops to the blocking
//! pool instead of stalling the async workers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::Json;
use fsight_models::{FacePresenceResponse, HeadPoseResponse};

use crate::error::{ApiError, ApiResult};
use crate::extract::DecodedFrame;
use crate::metrics;
use crate::state::AppState;

/// `POST /infer/face-presence`
pub async fn face_presence(
    State(state): State<AppState>,
    DecodedFrame(raster): DecodedFrame,
) -> ApiResult<Json<FacePresenceResponse>> {
    let classifier = Arc::clone(&state.presence);
    let start = Instant::now();

    let result = tokio::task::spawn_blocking(move || classifier.count_faces(&raster))
        .await
        .map_err(|e| ApiError::internal(format!("inference task failed: {e}")))?;

    let faces_detected = match result {
        Ok(count) => count,
        Err(e) => {
            metrics::record_inference_failure("face_presence");
            return Err(e.into());
        }
    };
    metrics::record_inference("face_presence", start.elapsed().as_secs_f64());

    Ok(Json(FacePresenceResponse { faces_detected }))
}

/// `POST /infer/head-pose`
pub async fn head_pose(
    State(state): State<AppState>,
    DecodedFrame(raster): DecodedFrame,
) -> ApiResult<Json<HeadPoseResponse>> {
    let estimator = Arc::clone(&state.pose);
    let start = Instant::now();

    let result = tokio::task::spawn_blocking(move || estimator.estimate(&raster))
        .await
        .map_err(|e| ApiError::internal(format!("inference task failed: {e}")))?;

    let angles = match result {
        Ok(angles) => angles,
        Err(e) => {
            metrics::record_inference_failure("head_pose");
            return Err(e.into());
        }
    };
    metrics::record_inference("head_pose", start.elapsed().as_secs_f64());

    Ok(Json(HeadPoseResponse::from(angles)))
}
