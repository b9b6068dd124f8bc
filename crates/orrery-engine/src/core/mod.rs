pub mod hierarchy;
pub mod registry;
pub mod scene;
pub mod time;
