pub mod buffer;

pub use buffer::{NodeTransform, TransformBuffer};
