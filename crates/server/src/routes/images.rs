use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use compare::ComparisonRequest;
use perceptual::{compare_fingerprints, HashAlgorithm, ImageFingerprint, Similarity};
use serde::Deserialize;
use std::sync::Arc;

/// Compare competitor images with each other and, optionally, with a
/// campaign's generated creatives.
///
/// Per-image failures come back inside the 200 response with
/// `status: "failed"`; only malformed or invalid requests are errors.
pub async fn compare_images(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<ComparisonRequest>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(request) = payload?;

    tracing::info!(
        images = request.image_urls.len(),
        reference_id = request.reference_id().unwrap_or("-"),
        "comparison requested"
    );

    let result = state.comparator.compare_images(request).await?;
    Ok(Json(result))
}

/// Distance request between two hex fingerprints
#[derive(Debug, Deserialize)]
pub struct DistanceRequest {
    pub a: String,
    pub b: String,
    /// Defaults to the server's configured algorithm
    #[serde(default)]
    pub algorithm: Option<HashAlgorithm>,
}

/// Hamming distance and similarity between two previously computed
/// fingerprints.
pub async fn fingerprint_distance(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<DistanceRequest>, JsonRejection>,
) -> ServerResult<Json<Similarity>> {
    let Json(request) = payload?;
    let perceptual = state.comparator.perceptual_config();
    let algorithm = request.algorithm.unwrap_or(perceptual.algorithm);

    let a = ImageFingerprint::from_hex(algorithm, &request.a)?;
    let b = ImageFingerprint::from_hex(algorithm, &request.b)?;
    let similarity = compare_fingerprints(&a, &b, perceptual.similarity_threshold)?;
    Ok(Json(similarity))
}
