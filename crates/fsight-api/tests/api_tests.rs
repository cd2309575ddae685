//! API integration tests.
//!
//! The router runs against synthetic detector/landmarker capabilities,
//! so every request exercises the full HTTP path (extraction, decode,
//! inference dispatch, error mapping) without real model files.

use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb};
use serde_json::Value;
use tower::ServiceExt;

use fsight_api::{create_router, ApiConfig, AppState};
use fsight_models::BoundingBox;
use fsight_vision::pose::{head_model_points, CameraIntrinsics};
use fsight_vision::{
    FaceDetector, FaceLandmarker, FaceLandmarks, RgbRaster, VisionError, VisionResult,
    REFERENCE_LANDMARKS,
};

const BOUNDARY: &str = "X-FSIGHT-TEST-BOUNDARY";

struct FixedDetector(Option<usize>);

impl FaceDetector for FixedDetector {
    fn detect(&self, _raster: &RgbRaster) -> VisionResult<Option<Vec<BoundingBox>>> {
        Ok(self.0.map(|n| {
            (0..n)
                .map(|i| BoundingBox::new(i as f64 * 20.0, 0.0, 16.0, 16.0, 0.9))
                .collect()
        }))
    }

    fn name(&self) -> &'static str {
        "fixed-test"
    }
}

struct FailingDetector;

impl FaceDetector for FailingDetector {
    fn detect(&self, _raster: &RgbRaster) -> VisionResult<Option<Vec<BoundingBox>>> {
        Err(VisionError::detection_failed("synthetic backend failure"))
    }

    fn name(&self) -> &'static str {
        "failing-test"
    }
}

/// Landmarker reporting a frontal face: the reference landmarks are the
/// 3D head model projected through the frame's own synthetic camera.
struct FrontalLandmarker;

impl FaceLandmarker for FrontalLandmarker {
    fn detect(&self, raster: &RgbRaster) -> VisionResult<Vec<FaceLandmarks>> {
        let width = raster.width();
        let height = raster.height();
        let intrinsics = CameraIntrinsics::for_frame(width, height);

        let mut points = vec![fsight_models::NormalizedPoint::new(0.5, 0.5); 468];
        for (id, model) in REFERENCE_LANDMARKS.iter().zip(head_model_points()) {
            let (u, v) = intrinsics.project(model.x, model.y, model.z + 1000.0);
            points[id.index()] = fsight_models::NormalizedPoint::new(
                u / f64::from(width),
                v / f64::from(height),
            );
        }
        Ok(vec![FaceLandmarks::new(points)])
    }

    fn name(&self) -> &'static str {
        "frontal-test"
    }
}

struct EmptyLandmarker;

impl FaceLandmarker for EmptyLandmarker {
    fn detect(&self, _raster: &RgbRaster) -> VisionResult<Vec<FaceLandmarks>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "empty-test"
    }
}

fn test_app(
    detector: Arc<dyn FaceDetector>,
    landmarker: Arc<dyn FaceLandmarker>,
) -> axum::Router {
    let state = AppState::with_capabilities(ApiConfig::default(), detector, landmarker);
    create_router(state, None)
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let buf = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 127u8])
    });
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(buf)
        .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
        .unwrap();
    out
}

fn json_request(uri: &str, image_base64: &str) -> Request<Body> {
    let body = serde_json::json!({ "image_base64": image_base64 }).to_string();
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(f) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(Arc::new(FixedDetector(None)), Arc::new(EmptyLandmarker));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ready_reports_backend_names() {
    let app = test_app(Arc::new(FixedDetector(None)), Arc::new(EmptyLandmarker));

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["checks"]["detector"], "fixed-test");
    assert_eq!(body["checks"]["landmarker"], "empty-test");
}

#[tokio::test]
async fn test_face_presence_json_counts_two() {
    let app = test_app(Arc::new(FixedDetector(Some(2))), Arc::new(EmptyLandmarker));
    let encoded = BASE64.encode(png_bytes(32, 24));

    let response = app
        .oneshot(json_request("/infer/face-presence", &encoded))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["faces_detected"], 2);
}

#[tokio::test]
async fn test_face_presence_buckets_many_faces_to_two() {
    let app = test_app(Arc::new(FixedDetector(Some(7))), Arc::new(EmptyLandmarker));
    let encoded = BASE64.encode(png_bytes(32, 24));

    let response = app
        .oneshot(json_request("/infer/face-presence", &encoded))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["faces_detected"], 2);
}

#[tokio::test]
async fn test_face_presence_no_detections_counts_zero() {
    let app = test_app(Arc::new(FixedDetector(None)), Arc::new(EmptyLandmarker));
    let encoded = BASE64.encode(png_bytes(32, 24));

    let response = app
        .oneshot(json_request("/infer/face-presence", &encoded))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["faces_detected"], 0);
}

#[tokio::test]
async fn test_face_presence_multipart_binary_upload() {
    let app = test_app(Arc::new(FixedDetector(Some(1))), Arc::new(EmptyLandmarker));
    let png = png_bytes(32, 24);

    let response = app
        .oneshot(multipart_request(
            "/infer/face-presence",
            &[("image", Some("frame.png"), &png)],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["faces_detected"], 1);
}

#[tokio::test]
async fn test_face_presence_multipart_base64_field() {
    let app = test_app(Arc::new(FixedDetector(Some(1))), Arc::new(EmptyLandmarker));
    let encoded = BASE64.encode(png_bytes(32, 24));

    let response = app
        .oneshot(multipart_request(
            "/infer/face-presence",
            &[("image_base64", None, encoded.as_bytes())],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_multipart_binary_wins_over_base64_field() {
    let app = test_app(Arc::new(FixedDetector(Some(1))), Arc::new(EmptyLandmarker));
    let png = png_bytes(32, 24);

    // The base64 field is garbage; the request must still succeed
    // because the binary upload takes precedence.
    let response = app
        .oneshot(multipart_request(
            "/infer/face-presence",
            &[
                ("image", Some("frame.png"), &png),
                ("image_base64", None, b"!!!not-base64!!!"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_base64_returns_400() {
    let app = test_app(Arc::new(FixedDetector(Some(1))), Arc::new(EmptyLandmarker));

    let response = app
        .oneshot(json_request("/infer/face-presence", "!!!not-base64!!!"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Invalid image");
}

#[tokio::test]
async fn test_non_image_upload_returns_400() {
    let app = test_app(Arc::new(FixedDetector(Some(1))), Arc::new(EmptyLandmarker));

    let response = app
        .oneshot(multipart_request(
            "/infer/face-presence",
            &[("image", Some("note.txt"), b"not-an-image")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Invalid image");
}

#[tokio::test]
async fn test_multipart_without_image_fields_returns_400() {
    let app = test_app(Arc::new(FixedDetector(Some(1))), Arc::new(EmptyLandmarker));

    let response = app
        .oneshot(multipart_request(
            "/infer/face-presence",
            &[("comment", None, b"no image here")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsupported_content_type_returns_400() {
    let app = test_app(Arc::new(FixedDetector(Some(1))), Arc::new(EmptyLandmarker));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/infer/face-presence")
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from("hello"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Invalid image");
}

#[tokio::test]
async fn test_detector_failure_returns_500_server_error() {
    let app = test_app(Arc::new(FailingDetector), Arc::new(EmptyLandmarker));
    let encoded = BASE64.encode(png_bytes(32, 24));

    let response = app
        .oneshot(json_request("/infer/face-presence", &encoded))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Server Error");
}

#[tokio::test]
async fn test_head_pose_frontal_face_near_zero() {
    let app = test_app(Arc::new(FixedDetector(Some(1))), Arc::new(FrontalLandmarker));
    let encoded = BASE64.encode(png_bytes(640, 480));

    let response = app
        .oneshot(json_request("/infer/head-pose", &encoded))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    for key in ["yaw", "pitch", "roll"] {
        let angle = body[key].as_f64().expect("angle should be a number");
        assert!(angle.abs() < 2.0, "{key} = {angle}");
    }
}

#[tokio::test]
async fn test_head_pose_without_face_returns_null_triple() {
    let app = test_app(Arc::new(FixedDetector(None)), Arc::new(EmptyLandmarker));
    let encoded = BASE64.encode(png_bytes(64, 48));

    let response = app
        .oneshot(json_request("/infer/head-pose", &encoded))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["yaw"].is_null());
    assert!(body["pitch"].is_null());
    assert!(body["roll"].is_null());
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = test_app(Arc::new(FixedDetector(None)), Arc::new(EmptyLandmarker));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert!(headers.get("X-Request-ID").is_some());
}
