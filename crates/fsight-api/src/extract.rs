//! Request-body extraction for the inference endpoints.
//!
//! Both endpoints accept the same two shapes: a JSON body with an
//! `image_base64` string, or a multipart form carrying either a binary
//! `image` field or an `image_base64` text field. When a form carries
//! both, the binary upload wins. The extractor decodes all of them
//! into a validated raster, so handlers never see raw bytes.

use axum::async_trait;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use fsight_models::ImageBase64Request;
use fsight_vision::{normalize_base64, normalize_bytes, RgbRaster};

use crate::error::ApiError;
use crate::state::AppState;

/// A decoded, shape-validated RGB frame extracted from the request.
pub struct DecodedFrame(pub RgbRaster);

#[async_trait]
impl FromRequest<AppState> for DecodedFrame {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        let raster = if content_type.starts_with("multipart/form-data") {
            from_multipart(req, state).await?
        } else if content_type.starts_with("application/json") {
            let Json(body) = Json::<ImageBase64Request>::from_request(req, state)
                .await
                .map_err(|e| ApiError::invalid_image(format!("malformed JSON body: {e}")))?;
            normalize_base64(&body.image_base64)?
        } else {
            return Err(ApiError::invalid_image(format!(
                "unsupported content type: {content_type:?}"
            )));
        };

        Ok(Self(raster))
    }
}

async fn from_multipart(req: Request, state: &AppState) -> Result<RgbRaster, ApiError> {
    let mut multipart = Multipart::from_request(req, state)
        .await
        .map_err(|e| ApiError::invalid_image(format!("malformed multipart body: {e}")))?;

    let mut image_bytes: Option<Vec<u8>> = None;
    let mut image_base64: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid_image(format!("multipart read failed: {e}")))?
    {
        match field.name() {
            Some("image") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::invalid_image(format!("image field read: {e}")))?;
                image_bytes = Some(bytes.to_vec());
            }
            Some("image_base64") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::invalid_image(format!("base64 field read: {e}")))?;
                image_base64 = Some(text);
            }
            _ => {}
        }
    }

    // Binary upload takes precedence over the base64 field.
    if let Some(bytes) = image_bytes {
        return Ok(normalize_bytes(&bytes)?);
    }
    if let Some(encoded) = image_base64 {
        return Ok(normalize_base64(&encoded)?);
    }
    Err(ApiError::invalid_image(
        "multipart form carries neither image nor image_base64",
    ))
}
