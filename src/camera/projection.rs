use nalgebra_glm as glm;

use crate::settings::ProjectionSettings;

/// Perspective projection for a `width` x `height` target.
pub fn perspective(settings: &ProjectionSettings, width: u32, height: u32) -> glm::Mat4 {
    let aspect = width as f32 / height.max(1) as f32;
    glm::perspective(
        aspect,
        settings.fov_degrees.to_radians(),
        settings.near,
        settings.far,
    )
}
