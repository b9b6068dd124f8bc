pub mod labels;
pub mod motion;
