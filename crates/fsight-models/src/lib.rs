//! Shared data models for the FaceSight inference service.
//!
//! This crate provides Serde-serializable types for:
//! - The face-presence category returned by the classifier
//! - Bounding boxes and normalized landmark points
//! - Head pose angles
//! - HTTP request/response schemas

pub mod api;
pub mod face_count;
pub mod point;
pub mod pose;
pub mod rect;

// Re-export common types
pub use api::{FacePresenceResponse, HeadPoseResponse, ImageBase64Request};
pub use face_count::FaceCount;
pub use point::NormalizedPoint;
pub use pose::PoseAngles;
pub use rect::BoundingBox;
