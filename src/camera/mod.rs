pub mod controller;
pub mod projection;
pub mod state;

pub use controller::{CameraController, FRAME_STEP};
pub use projection::perspective;
pub use state::Camera;
