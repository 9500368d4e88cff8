use maths_rs::prelude::*;

use crate::os::Key;

/// Angular speed in radians per second applied while a direction is held
pub const ROTATION_SPEED: f32 = 1.5;

/// Pitch limit in radians, kept below pi/2 so the look-at basis never degenerates
pub const MAX_PITCH: f32 = 1.4;

/// Default orbit radius
pub const CAMERA_DISTANCE: f32 = 4.5;

/// Default elevation in radians
pub const DEFAULT_PITCH: f32 = 0.2;

bitflags! {
    /// Directions currently held down
    pub struct DirectionFlags: u8 {
        const NONE = 0;
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const UP = 1 << 2;
        const DOWN = 1 << 3;
    }
}

/// A single direction an orbit camera can be driven in
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl From<Direction> for DirectionFlags {
    fn from(direction: Direction) -> DirectionFlags {
        match direction {
            Direction::Left => DirectionFlags::LEFT,
            Direction::Right => DirectionFlags::RIGHT,
            Direction::Up => DirectionFlags::UP,
            Direction::Down => DirectionFlags::DOWN,
        }
    }
}

impl Direction {
    /// Arrow keys map onto directions, other keys have none
    pub fn from_key(key: Key) -> Option<Direction> {
        match key {
            Key::Left => Some(Direction::Left),
            Key::Right => Some(Direction::Right),
            Key::Up => Some(Direction::Up),
            Key::Down => Some(Direction::Down),
            _ => None,
        }
    }
}

/// Camera orbiting the origin on a sphere, yaw around +Y and pitch above the xz plane
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    yaw: f32,
    pitch: f32,
    distance: f32,
    input: DirectionFlags,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        OrbitCamera {
            yaw: 0.0,
            pitch: DEFAULT_PITCH,
            distance: CAMERA_DISTANCE,
            input: DirectionFlags::NONE,
        }
    }
}

impl OrbitCamera {
    /// Create a camera at `yaw`, `pitch` (clamped) and `distance` from the origin
    pub fn new(yaw: f32, pitch: f32, distance: f32) -> Self {
        assert!(distance > 0.0, "orbit distance must be positive");
        OrbitCamera {
            yaw,
            pitch: pitch.clamp(-MAX_PITCH, MAX_PITCH),
            distance,
            input: DirectionFlags::NONE,
        }
    }

    /// Integrate held directions over `delta_time` seconds. Opposite directions cancel
    /// and pitch is clamped to `[-MAX_PITCH, MAX_PITCH]` afterwards.
    pub fn update(&mut self, delta_time: f32) {
        let amount = ROTATION_SPEED * delta_time;
        let yaw_dir = self.axis(DirectionFlags::RIGHT, DirectionFlags::LEFT);
        let pitch_dir = self.axis(DirectionFlags::UP, DirectionFlags::DOWN);
        if yaw_dir != 0 {
            self.yaw += yaw_dir as f32 * amount;
        }
        if pitch_dir != 0 {
            self.pitch += pitch_dir as f32 * amount;
        }
        self.pitch = self.pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }

    fn axis(&self, positive: DirectionFlags, negative: DirectionFlags) -> i8 {
        self.input.contains(positive) as i8 - self.input.contains(negative) as i8
    }

    /// Set or clear a held direction, repeated calls with the same state have no further effect
    pub fn set_input_flag(&mut self, direction: Direction, pressed: bool) {
        self.input.set(DirectionFlags::from(direction), pressed);
    }

    pub fn get_yaw(&self) -> f32 {
        self.yaw
    }

    /// Always within `[-MAX_PITCH, MAX_PITCH]`
    pub fn get_pitch(&self) -> f32 {
        self.pitch
    }

    pub fn get_distance(&self) -> f32 {
        self.distance
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        self.input.contains(DirectionFlags::from(direction))
    }

    pub fn get_input_flags(&self) -> DirectionFlags {
        self.input
    }

    /// Returns true if `key` drives this camera
    pub fn handle_key(&mut self, key: Key, pressed: bool) -> bool {
        match Direction::from_key(key) {
            Some(direction) => {
                self.set_input_flag(direction, pressed);
                true
            }
            None => false,
        }
    }

    /// World space position on the orbit sphere
    pub fn eye_position(&self) -> Vec3f {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3f::new(
            self.distance * sin_yaw * cos_pitch,
            self.distance * sin_pitch,
            self.distance * cos_yaw * cos_pitch,
        )
    }
}

// matrices below use the row vector convention, a point is transformed as `v * M`
// and translation lives in the last row

/// Rotation of `angle` radians about +Y
pub fn rotation_y(angle: f32) -> Mat4f {
    let (s, c) = angle.sin_cos();
    Mat4f::from((
        Vec4f::new(c, 0.0, -s, 0.0),
        Vec4f::new(0.0, 1.0, 0.0, 0.0),
        Vec4f::new(s, 0.0, c, 0.0),
        Vec4f::new(0.0, 0.0, 0.0, 1.0),
    ))
}

/// Left handed view matrix looking from `eye` towards `focus`
pub fn look_at_lh(eye: Vec3f, focus: Vec3f, up: Vec3f) -> Mat4f {
    let r2 = normalize(focus - eye);
    let r0 = normalize(cross(up, r2));
    let r1 = cross(r2, r0);
    let d0 = -dot(r0, eye);
    let d1 = -dot(r1, eye);
    let d2 = -dot(r2, eye);
    Mat4f::from((
        Vec4f::new(r0.x, r1.x, r2.x, 0.0),
        Vec4f::new(r0.y, r1.y, r2.y, 0.0),
        Vec4f::new(r0.z, r1.z, r2.z, 0.0),
        Vec4f::new(d0, d1, d2, 1.0),
    ))
}

/// Left handed perspective projection mapping view depth `near..far` to `0..1`
pub fn perspective_fov_lh(fov: f32, aspect: f32, near: f32, far: f32) -> Mat4f {
    let (sin_fov, cos_fov) = (0.5 * fov).sin_cos();
    let h = cos_fov / sin_fov;
    let w = h / aspect;
    let range = far / (far - near);
    Mat4f::from((
        Vec4f::new(w, 0.0, 0.0, 0.0),
        Vec4f::new(0.0, h, 0.0, 0.0),
        Vec4f::new(0.0, 0.0, range, 1.0),
        Vec4f::new(0.0, 0.0, -range * near, 0.0),
    ))
}

/// Transforms a point by `m` using the row vector convention
pub fn transform_point(p: Vec3f, m: &Mat4f) -> Vec4f {
    let r0 = m.get_row(0);
    let r1 = m.get_row(1);
    let r2 = m.get_row(2);
    let r3 = m.get_row(3);
    Vec4f::new(
        p.x * r0.x + p.y * r1.x + p.z * r2.x + r3.x,
        p.x * r0.y + p.y * r1.y + p.z * r2.y + r3.y,
        p.x * r0.z + p.y * r1.z + p.z * r2.z + r3.z,
        p.x * r0.w + p.y * r1.w + p.z * r2.w + r3.w,
    )
}
