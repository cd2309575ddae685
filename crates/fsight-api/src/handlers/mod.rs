//! Request handlers.

pub mod health;
pub mod infer;

pub use health::{health, ready};
pub use infer::{face_presence, head_pose};
