use glam::{Mat4, Vec2, Vec3};

use scanview::ScanConfig;

const MAX_PITCH_DEGREES: f32 = 89.0;

/// Free-look camera. Starts looking down +X from inside the scanned ring.
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,

    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub move_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Camera {
    pub fn from_config(config: &ScanConfig) -> Self {
        let (width, height) = config.window_size;
        Self {
            position: config.camera_position,
            yaw: 0.0,
            pitch: 0.0,

            fov: config.fov_degrees.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            near: config.near,
            far: config.far,

            move_speed: config.move_speed,
            mouse_sensitivity: config.mouse_sensitivity,
        }
    }

    pub fn front(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.front().cross(Vec3::Y).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn process_keyboard(&mut self, forward: f32, right: f32, up: f32, dt: f32) {
        let speed = self.move_speed * dt;

        self.position += self.front() * forward * speed;
        self.position += self.right() * right * speed;
        self.position.y += up * speed;
    }

    pub fn process_mouse_movement(&mut self, delta: Vec2) {
        self.yaw += delta.x * self.mouse_sensitivity;
        self.pitch -= delta.y * self.mouse_sensitivity;

        let max_pitch = MAX_PITCH_DEGREES.to_radians();
        self.pitch = self.pitch.clamp(-max_pitch, max_pitch);
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.aspect = width / height.max(1.0);
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _padding: f32,
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position.to_array(),
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn starts_looking_down_x() {
        let camera = Camera::from_config(&ScanConfig::default());
        let front = camera.front();
        assert_abs_diff_eq!(front.x, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(front.y, 0.0, epsilon = 1e-6);
        assert_eq!(camera.position, Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::from_config(&ScanConfig::default());
        camera.process_mouse_movement(Vec2::new(0.0, -1.0e6));
        assert_abs_diff_eq!(camera.pitch, 89.0_f32.to_radians(), epsilon = 1e-6);
        camera.process_mouse_movement(Vec2::new(0.0, 1.0e6));
        assert_abs_diff_eq!(camera.pitch, -89.0_f32.to_radians(), epsilon = 1e-6);
    }

    #[test]
    fn moves_along_front_scaled_by_dt() {
        let mut camera = Camera::from_config(&ScanConfig::default());
        camera.process_keyboard(1.0, 0.0, 0.0, 0.5);
        assert_abs_diff_eq!(camera.position.x, 1.5, epsilon = 1e-5);
        assert_abs_diff_eq!(camera.position.y, 3.0, epsilon = 1e-5);
    }
}
