//! ONNX Runtime model backends.
//!
//! Real inference lives behind the `ort` cargo feature; without it each
//! backend is replaced by a stub that constructs fine but fails every
//! detection call with a typed error, so the service and the test suite
//! stay buildable on machines without the ONNX runtime.

pub mod blazeface;
pub mod face_mesh;

use ndarray::Array4;

use crate::raster::RgbRaster;

pub use blazeface::OnnxBlazeFaceDetector;
pub use face_mesh::OnnxFaceMeshLandmarker;

/// Resize a frame to `size x size` with nearest-neighbor center
/// sampling and emit a `[1, 3, size, size]` tensor of `[0, 1]` floats.
pub(crate) fn resize_to_nchw(raster: &RgbRaster, size: usize) -> Array4<f32> {
    let src = raster.data();
    let src_h = raster.height() as usize;
    let src_w = raster.width() as usize;

    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
    for y in 0..size {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / size as f64) as usize).min(src_h - 1);
        for x in 0..size {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / size as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = f32::from(src[[src_y, src_x, c]]) / 255.0;
            }
        }
    }
    tensor
}

/// Same resize, rescaled to the `[-1, 1]` range the Face Mesh model
/// expects.
pub(crate) fn resize_to_nchw_signed(raster: &RgbRaster, size: usize) -> Array4<f32> {
    let mut tensor = resize_to_nchw(raster, size);
    tensor.mapv_inplace(|v| v * 2.0 - 1.0);
    tensor
}
