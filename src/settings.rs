use crate::CONFY_APP_NAME;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Compute Raytracer".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

/// Fixed camera pose used by headless capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub width: u32,
    pub height: u32,
    pub default_output: String,
    pub camera_position: [f32; 3],
    pub camera_yaw: f32,
    pub camera_pitch: f32,
    pub camera_roll: f32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            width: 6000,
            height: 6000,
            default_output: "output.png".to_string(),
            camera_position: [0.0, 1.5, 1.5],
            // Looking along (0, 1, -1).
            camera_yaw: -90.0,
            camera_pitch: 45.0,
            camera_roll: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub sphere_center: [f32; 3],
    pub sphere_radius: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            sphere_center: [0.0, 0.0, 0.0],
            sphere_radius: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderSettings {
    pub compute: String,
    pub present_vertex: String,
    pub present_fragment: String,
}

impl Default for ShaderSettings {
    fn default() -> Self {
        Self {
            compute: "resources/compute.glsl".to_string(),
            present_vertex: "resources/present.vert".to_string(),
            present_fragment: "resources/present.frag".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    /// Degrees of yaw/pitch per pixel of cursor travel.
    pub mouse_sensitivity: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub capture: CaptureSettings,
    pub projection: ProjectionSettings,
    pub scene: SceneSettings,
    pub shaders: ShaderSettings,
    pub controls: ControlSettings,
}

impl Settings {
    pub fn load() -> Self {
        match confy::load(CONFY_APP_NAME, "settings") {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to load settings, using defaults: {e}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_resolutions_are_whole_tiles() {
        let s = Settings::default();
        assert_eq!(s.window.width % 16, 0);
        assert_eq!(s.window.height % 16, 0);
        assert_eq!(s.capture.width % 16, 0);
        assert_eq!(s.capture.height % 16, 0);
    }

    #[test]
    fn default_capture_output_is_output_png() {
        assert_eq!(Settings::default().capture.default_output, "output.png");
    }
}
