//! BlazeFace (short-range) face detector backend.
//!
//! Decodes the model's 896 anchor predictions into frame-space bounding
//! boxes with sigmoid scoring and greedy NMS. Only the surviving box
//! count matters to the presence classifier, but full boxes are
//! reported for logging and future cropping.

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

use fsight_models::BoundingBox;

#[cfg(feature = "ort")]
use crate::capability::FaceDetector;
#[cfg(feature = "ort")]
use crate::error::{VisionError, VisionResult};
#[cfg(feature = "ort")]
use crate::raster::RgbRaster;

/// BlazeFace model input resolution.
const INPUT_SIZE: usize = 128;

/// Anchors in the short-range model (16x16x2 + 8x8x6).
const NUM_ANCHORS: usize = 896;

/// Default confidence threshold.
pub const DEFAULT_CONFIDENCE: f32 = 0.5;

/// NMS IoU threshold.
const NMS_IOU_THRESHOLD: f64 = 0.3;

/// BlazeFace detector backed by an ONNX Runtime session.
///
/// `Session::run` takes `&mut self`, so the session sits behind a
/// mutex; inference calls on the same detector serialize.
#[cfg(feature = "ort")]
pub struct OnnxBlazeFaceDetector {
    session: Mutex<Session>,
    confidence: f32,
    anchors: Vec<[f32; 2]>,
}

#[cfg(feature = "ort")]
impl OnnxBlazeFaceDetector {
    /// Load the model from disk with the default confidence threshold.
    pub fn load(model_path: &Path) -> VisionResult<Self> {
        Self::load_with_confidence(model_path, DEFAULT_CONFIDENCE)
    }

    pub fn load_with_confidence(model_path: &Path, confidence: f32) -> VisionResult<Self> {
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
            confidence,
            anchors: generate_anchors(),
        })
    }
}

#[cfg(feature = "ort")]
impl FaceDetector for OnnxBlazeFaceDetector {
    fn detect(&self, raster: &RgbRaster) -> VisionResult<Option<Vec<BoundingBox>>> {
        let tensor = super::resize_to_nchw(raster, INPUT_SIZE);
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

        // regressors [1, 896, 16], classificators [1, 896, 1]
        if outputs.len() < 2 {
            return Err(VisionError::detection_failed(format!(
                "BlazeFace expected 2 outputs, got {}",
                outputs.len()
            )));
        }
        let (_, reg_data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| VisionError::detection_failed(format!("ORT extract: {e}")))?;
        let (_, score_data) = outputs[1]
            .try_extract_tensor::<f32>()
            .map_err(|e| VisionError::detection_failed(format!("ORT extract: {e}")))?;

        let boxes = decode_detections(
            reg_data,
            score_data,
            &self.anchors,
            self.confidence,
            raster.width(),
            raster.height(),
        );
        debug!(count = boxes.len(), "BlazeFace detections");

        if boxes.is_empty() {
            Ok(None)
        } else {
            Ok(Some(boxes))
        }
    }

    fn name(&self) -> &'static str {
        "blazeface-ort"
    }
}

/// Stub used when the crate is built without the `ort` feature. It
/// accepts any model path so process startup succeeds, then fails each
/// detection with a typed error.
#[cfg(not(feature = "ort"))]
pub struct OnnxBlazeFaceDetector;

#[cfg(not(feature = "ort"))]
impl OnnxBlazeFaceDetector {
    pub fn load(_model_path: &std::path::Path) -> crate::error::VisionResult<Self> {
        tracing::warn!("built without the `ort` feature; face detection is unavailable");
        Ok(Self)
    }
}

#[cfg(not(feature = "ort"))]
impl crate::capability::FaceDetector for OnnxBlazeFaceDetector {
    fn detect(
        &self,
        _raster: &crate::raster::RgbRaster,
    ) -> crate::error::VisionResult<Option<Vec<BoundingBox>>> {
        Err(crate::error::VisionError::detection_failed(
            "face detection backend compiled out; rebuild with the `ort` feature",
        ))
    }

    fn name(&self) -> &'static str {
        "blazeface-stub"
    }
}

/// Decode anchor-relative regressions into frame-space boxes and run
/// greedy NMS.
fn decode_detections(
    reg_data: &[f32],
    score_data: &[f32],
    anchors: &[[f32; 2]],
    confidence: f32,
    frame_width: u32,
    frame_height: u32,
) -> Vec<BoundingBox> {
    let fw = frame_width as f32;
    let fh = frame_height as f32;
    let mut raw = Vec::new();

    for (i, &raw_score) in score_data.iter().enumerate().take(anchors.len()) {
        let score = sigmoid(raw_score);
        if score < confidence {
            continue;
        }
        let offset = i * 16;
        if offset + 4 > reg_data.len() {
            break;
        }
        let anchor = anchors[i];

        let cx = anchor[0] + reg_data[offset] / INPUT_SIZE as f32;
        let cy = anchor[1] + reg_data[offset + 1] / INPUT_SIZE as f32;
        let w = reg_data[offset + 2] / INPUT_SIZE as f32;
        let h = reg_data[offset + 3] / INPUT_SIZE as f32;

        let x1 = ((cx - w / 2.0) * fw).max(0.0);
        let y1 = ((cy - h / 2.0) * fh).max(0.0);
        let x2 = ((cx + w / 2.0) * fw).min(fw);
        let y2 = ((cy + h / 2.0) * fh).min(fh);

        raw.push(RawDetection {
            x1: f64::from(x1),
            y1: f64::from(y1),
            x2: f64::from(x2),
            y2: f64::from(y2),
            score: f64::from(score),
        });
    }

    nms(&mut raw, NMS_IOU_THRESHOLD)
        .into_iter()
        .map(|d| BoundingBox::new(d.x1, d.y1, d.x2 - d.x1, d.y2 - d.y1, d.score))
        .collect()
}

/// Anchor centers for the short-range model: 16x16 grid with 2 anchors
/// per cell, then 8x8 with 6.
fn generate_anchors() -> Vec<[f32; 2]> {
    let strides = [(8usize, 2usize), (16, 6)];
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);

    for (stride, per_cell) in strides {
        let grid = INPUT_SIZE / stride;
        for y in 0..grid {
            for x in 0..grid {
                let cx = (x as f32 + 0.5) / grid as f32;
                let cy = (y as f32 + 0.5) / grid as f32;
                for _ in 0..per_cell {
                    anchors.push([cx, cy]);
                }
            }
        }
    }
    anchors
}

#[derive(Clone, Debug)]
struct RawDetection {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    score: f64,
}

fn nms(detections: &mut [RawDetection], iou_threshold: f64) -> Vec<RawDetection> {
    detections.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(detections[i].clone());
        for j in (i + 1)..detections.len() {
            if !suppressed[j] && iou(&detections[i], &detections[j]) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }
    keep
}

fn iou(a: &RawDetection, b: &RawDetection) -> f64 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    inter / (area_a + area_b - inter)
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
