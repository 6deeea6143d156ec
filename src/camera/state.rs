use nalgebra_glm as glm;

const WORLD_UP: [f32; 3] = [0.0, 1.0, 0.0];

const DEFAULT_POSITION: [f32; 3] = [0.0, 0.0, 3.0];
const DEFAULT_YAW: f32 = -90.0;
const DEFAULT_PITCH: f32 = 0.0;
const DEFAULT_ROLL: f32 = 0.0;

/// First-person camera with yaw/pitch/roll in degrees.
///
/// The view matrix is cached and recomputed by every mutator before it
/// returns, so `view_matrix()` never reflects a stale pose. Roll is stored
/// but does not enter the front vector or the view matrix.
///
/// Pitch is not clamped. Driving it past +/-90 degrees flips the strafe
/// direction because `cross(front, up)` changes sign at the poles.
#[derive(Debug, Clone)]
pub struct Camera {
    position: glm::Vec3,
    yaw: f32,
    pitch: f32,
    roll: f32,
    view: glm::Mat4,
}

impl Camera {
    pub fn new() -> Self {
        let mut camera = Self {
            position: glm::Vec3::from(DEFAULT_POSITION),
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            roll: DEFAULT_ROLL,
            view: glm::Mat4::identity(),
        };
        camera.update_view_matrix();
        camera
    }

    pub fn set_position(&mut self, position: glm::Vec3) {
        self.position = position;
        self.update_view_matrix();
    }

    pub fn set_rotation(&mut self, yaw: f32, pitch: f32, roll: f32) {
        self.yaw = yaw;
        self.pitch = pitch;
        self.roll = roll;
        self.update_view_matrix();
    }

    #[allow(dead_code)]
    pub fn translate(&mut self, offset: glm::Vec3) {
        self.position += offset;
        self.update_view_matrix();
    }

    pub fn rotate(&mut self, yaw: f32, pitch: f32, roll: f32) {
        self.yaw += yaw;
        self.pitch += pitch;
        self.roll += roll;
        self.update_view_matrix();
    }

    pub fn move_forward(&mut self, dt: f32) {
        self.position += self.front() * dt;
        self.update_view_matrix();
    }

    pub fn move_backward(&mut self, dt: f32) {
        self.position -= self.front() * dt;
        self.update_view_matrix();
    }

    pub fn move_left(&mut self, dt: f32) {
        self.position -= self.right() * dt;
        self.update_view_matrix();
    }

    pub fn move_right(&mut self, dt: f32) {
        self.position += self.right() * dt;
        self.update_view_matrix();
    }

    /// Restore the startup pose.
    pub fn reset(&mut self) {
        self.position = glm::Vec3::from(DEFAULT_POSITION);
        self.yaw = DEFAULT_YAW;
        self.pitch = DEFAULT_PITCH;
        self.roll = DEFAULT_ROLL;
        self.update_view_matrix();
    }

    pub fn view_matrix(&self) -> glm::Mat4 {
        self.view
    }

    pub fn position(&self) -> glm::Vec3 {
        self.position
    }

    /// (yaw, pitch, roll) in degrees.
    #[allow(dead_code)]
    pub fn rotation(&self) -> (f32, f32, f32) {
        (self.yaw, self.pitch, self.roll)
    }

    /// Unit view direction derived from yaw and pitch only.
    pub fn front(&self) -> glm::Vec3 {
        front_vector(self.yaw, self.pitch)
    }

    fn right(&self) -> glm::Vec3 {
        glm::normalize(&glm::cross(&self.front(), &glm::Vec3::from(WORLD_UP)))
    }

    fn update_view_matrix(&mut self) {
        self.view = look_at_pose(&self.position, self.yaw, self.pitch);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

pub fn front_vector(yaw: f32, pitch: f32) -> glm::Vec3 {
    let (yaw, pitch) = (yaw.to_radians(), pitch.to_radians());
    glm::normalize(&glm::vec3(
        yaw.cos() * pitch.cos(),
        pitch.sin(),
        yaw.sin() * pitch.cos(),
    ))
}

/// View matrix for a camera at `position` facing along `front_vector(yaw, pitch)`.
pub fn look_at_pose(position: &glm::Vec3, yaw: f32, pitch: f32) -> glm::Mat4 {
    let target = position + front_vector(yaw, pitch);
    glm::look_at(position, &target, &glm::Vec3::from(WORLD_UP))
}
