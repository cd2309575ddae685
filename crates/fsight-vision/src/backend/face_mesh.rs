//! MediaPipe Face Mesh landmarker backend.
//!
//! Runs the 468-point Face Mesh model on the full frame and reports at
//! most one landmark set, normalized to `[0, 1]` image coordinates.
//! When the model exposes a face-presence logit as a second output, a
//! sub-threshold score maps to "no face" instead of garbage landmarks.

#[cfg(feature = "ort")]
use std::path::Path;
#[cfg(feature = "ort")]
use std::sync::Mutex;

#[cfg(feature = "ort")]
use ort::session::builder::GraphOptimizationLevel;
#[cfg(feature = "ort")]
use ort::session::Session;
#[cfg(feature = "ort")]
use tracing::debug;

#[cfg(feature = "ort")]
use fsight_models::NormalizedPoint;

use crate::landmark::FaceLandmarks;

/// Face Mesh model input resolution.
#[cfg(feature = "ort")]
const INPUT_SIZE: usize = 192;

/// Face-presence score threshold (post-sigmoid).
#[cfg(feature = "ort")]
const PRESENCE_THRESHOLD: f32 = 0.5;

/// Face Mesh landmarker backed by an ONNX Runtime session.
#[cfg(feature = "ort")]
pub struct OnnxFaceMeshLandmarker {
    session: Mutex<Session>,
}

#[cfg(feature = "ort")]
impl OnnxFaceMeshLandmarker {
    pub fn load(model_path: &Path) -> crate::error::VisionResult<Self> {
        use crate::error::VisionError;

        if !model_path.exists() {
            return Err(VisionError::model_not_found(model_path.display().to_string()));
        }

        let model_bytes = std::fs::read(model_path)
            .map_err(|e| VisionError::model_not_found(format!("read model file: {e}")))?;
        let session = Session::builder()
            .map_err(|e| VisionError::detection_failed(format!("ORT session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| VisionError::detection_failed(format!("ORT opt level: {e}")))?
            .commit_from_memory(model_bytes.as_slice())
            .map_err(|e| VisionError::detection_failed(format!("ORT load model: {e}")))?;

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

#[cfg(feature = "ort")]
impl crate::capability::FaceLandmarker for OnnxFaceMeshLandmarker {
    fn detect(
        &self,
        raster: &crate::raster::RgbRaster,
    ) -> crate::error::VisionResult<Vec<FaceLandmarks>> {
        use crate::error::VisionError;

        let tensor = super::resize_to_nchw_signed(raster, INPUT_SIZE);
        let shape = vec![1usize, 3, INPUT_SIZE, INPUT_SIZE];
        let input = ort::value::Tensor::from_array((shape, tensor.into_raw_vec().into_boxed_slice()))
            .map_err(|e| VisionError::detection_failed(format!("ORT tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| VisionError::detection_failed("ORT session poisoned"))?;
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| VisionError::detection_failed(format!("ORT run failed: {e}")))?;

        if outputs.is_empty() {
            return Err(VisionError::detection_failed("ORT returned no outputs"));
        }

        // Second output, when present, is the face-presence logit.
        if outputs.len() > 1 {
            if let Ok((_, flag)) = outputs[1].try_extract_tensor::<f32>() {
                if let Some(&logit) = flag.first() {
                    let score = 1.0 / (1.0 + (-logit).exp());
                    if score < PRESENCE_THRESHOLD {
                        debug!(score, "Face Mesh presence below threshold");
                        return Ok(Vec::new());
                    }
                }
            }
        }

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| VisionError::detection_failed(format!("ORT extract: {e}")))?;
        let dims: Vec<usize> = shape.iter().map(|d| *d as usize).collect();

        // Accept [1, 468, 3] or [468, 3].
        let (points, stride) = match dims.as_slice() {
            [1, p, s] => (*p, *s),
            [p, s] => (*p, *s),
            other => {
                return Err(VisionError::detection_failed(format!(
                    "unexpected Face Mesh output shape: {other:?}"
                )))
            }
        };
        if stride < 3 || data.len() < points * stride {
            return Err(VisionError::detection_failed(
                "Face Mesh output missing coordinate channels",
            ));
        }

        // Model coordinates are in input-pixel space; normalize.
        let scale = INPUT_SIZE as f64;
        let set = FaceLandmarks::new(
            (0..points)
                .map(|i| {
                    let base = i * stride;
                    NormalizedPoint::new(
                        f64::from(data[base]) / scale,
                        f64::from(data[base + 1]) / scale,
                    )
                })
                .collect(),
        );

        debug!(points, "Face Mesh landmarks extracted");
        Ok(vec![set])
    }

    fn name(&self) -> &'static str {
        "face-mesh-ort"
    }
}

/// Stub used when the crate is built without the `ort` feature.
#[cfg(not(feature = "ort"))]
pub struct OnnxFaceMeshLandmarker;

#[cfg(not(feature = "ort"))]
impl OnnxFaceMeshLandmarker {
    pub fn load(_model_path: &std::path::Path) -> crate::error::VisionResult<Self> {
        tracing::warn!("built without the `ort` feature; landmark detection is unavailable");
        Ok(Self)
    }
}

#[cfg(not(feature = "ort"))]
impl crate::capability::FaceLandmarker for OnnxFaceMeshLandmarker {
    fn detect(
        &self,
        _raster: &crate::raster::RgbRaster,
    ) -> crate::error::VisionResult<Vec<FaceLandmarks>> {
        Err(crate::error::VisionError::detection_failed(
            "landmark backend compiled out; rebuild with the `ort` feature",
        ))
    }

    fn name(&self) -> &'static str {
        "face-mesh-stub"
    }
}
