pub mod gate;
pub mod loader;

pub use gate::{AssetLoadGate, GateState};
pub use loader::{PendingTextures, QueuedLoader, TextureLoader, TextureRequest, TrackingLoader};
