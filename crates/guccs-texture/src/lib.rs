pub mod compositor;
pub mod sink;

pub use compositor::{compose, Raster};
pub use sink::{ImageSink, PngSink};
