use hotline_labs::prelude::*;

use camera::Direction;
use camera::OrbitCamera;

use maths_rs::prelude::*;

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Left,
    Direction::Right,
    Direction::Up,
    Direction::Down,
];

#[test]
fn default_camera() {
    let cam = OrbitCamera::default();
    assert_eq!(cam.get_yaw(), 0.0);
    assert_eq!(cam.get_pitch(), 0.2);
    assert_eq!(cam.get_distance(), 4.5);
    assert_eq!(cam.get_input_flags(), camera::DirectionFlags::NONE);
}

#[test]
fn set_input_flag_is_idempotent() {
    let mut cam = OrbitCamera::default();
    cam.set_input_flag(Direction::Left, true);
    cam.set_input_flag(Direction::Left, true);
    assert!(cam.is_held(Direction::Left));
    assert!(!cam.is_held(Direction::Right));
    cam.set_input_flag(Direction::Left, false);
    assert!(!cam.is_held(Direction::Left));
    cam.set_input_flag(Direction::Left, false);
    assert!(!cam.is_held(Direction::Left));
}

#[test]
fn update_without_input_does_nothing() {
    let mut cam = OrbitCamera::default();
    cam.update(1.0);
    assert_eq!(cam.get_yaw(), 0.0);
    assert_eq!(cam.get_pitch(), 0.2);
}

#[test]
fn left_and_right_move_yaw() {
    let mut cam = OrbitCamera::new(0.0, 0.0, 4.5);
    cam.set_input_flag(Direction::Left, true);
    cam.update(0.5);
    assert_eq!(cam.get_yaw(), -0.75);
    cam.set_input_flag(Direction::Left, false);
    cam.set_input_flag(Direction::Right, true);
    cam.update(1.0);
    assert_eq!(cam.get_yaw(), 0.75);
    assert_eq!(cam.get_pitch(), 0.0);
}

#[test]
fn up_and_down_move_pitch() {
    let mut cam = OrbitCamera::new(0.0, 0.0, 4.5);
    cam.set_input_flag(Direction::Up, true);
    cam.update(0.5);
    assert_eq!(cam.get_pitch(), 0.75);
    cam.set_input_flag(Direction::Up, false);
    cam.set_input_flag(Direction::Down, true);
    cam.update(0.5);
    assert_eq!(cam.get_pitch(), 0.0);
    assert_eq!(cam.get_yaw(), 0.0);
}

#[test]
fn opposite_directions_cancel() {
    let mut cam = OrbitCamera::new(0.3, 0.1, 4.5);
    cam.set_input_flag(Direction::Left, true);
    cam.set_input_flag(Direction::Right, true);
    cam.set_input_flag(Direction::Up, true);
    cam.set_input_flag(Direction::Down, true);
    for _ in 0..10 {
        cam.update(0.37);
    }
    assert_eq!(cam.get_yaw(), 0.3);
    assert_eq!(cam.get_pitch(), 0.1);
}

#[test]
fn holding_up_clamps_pitch_exactly() {
    let mut cam = OrbitCamera::default();
    cam.set_input_flag(Direction::Up, true);
    for _ in 0..100 {
        cam.update(0.1);
    }
    assert_eq!(cam.get_pitch(), camera::MAX_PITCH);
    cam.update(10.0);
    assert_eq!(cam.get_pitch(), 1.4);
}

#[test]
fn holding_down_clamps_pitch_exactly() {
    let mut cam = OrbitCamera::default();
    cam.set_input_flag(Direction::Down, true);
    cam.update(1000.0);
    assert_eq!(cam.get_pitch(), -camera::MAX_PITCH);
}

#[test]
fn pitch_stays_in_range_for_all_flag_combinations() {
    let deltas = [0.0, 0.001, 0.016, 0.1, 0.5, 2.0, 100.0];
    for mask in 0..16u32 {
        let mut cam = OrbitCamera::default();
        for (i, dir) in ALL_DIRECTIONS.iter().enumerate() {
            cam.set_input_flag(*dir, mask & (1 << i) != 0);
        }
        for dt in deltas {
            cam.update(dt);
            assert!(cam.get_pitch() >= -camera::MAX_PITCH && cam.get_pitch() <= camera::MAX_PITCH,
                "pitch {} out of range with mask {:#b}", cam.get_pitch(), mask);
        }
    }
}

#[test]
fn max_pitch_keeps_view_non_degenerate() {
    assert!(f32::cos(camera::MAX_PITCH) > 0.0);
    assert!(camera::MAX_PITCH < std::f32::consts::FRAC_PI_2);
}

#[test]
fn new_clamps_pitch() {
    let cam = OrbitCamera::new(0.0, 3.0, 1.0);
    assert_eq!(cam.get_pitch(), camera::MAX_PITCH);
    assert_eq!(cam.get_distance(), 1.0);

    // the eye never reaches the pole, so the look-at basis stays valid
    let eye = cam.eye_position();
    assert!(eye.y < cam.get_distance());
    assert!(eye.x * eye.x + eye.z * eye.z > 0.0);

    let cam = OrbitCamera::new(0.0, -3.0, 1.0);
    assert_eq!(cam.get_pitch(), -camera::MAX_PITCH);
}

#[test]
#[should_panic]
fn new_rejects_zero_distance() {
    let _ = OrbitCamera::new(0.0, 0.0, 0.0);
}

#[test]
fn handle_key_maps_arrows() {
    let mut cam = OrbitCamera::default();
    assert!(cam.handle_key(os::Key::Up, true));
    assert!(cam.is_held(Direction::Up));
    assert!(cam.handle_key(os::Key::Up, false));
    assert!(!cam.is_held(Direction::Up));
    assert!(!cam.handle_key(os::Key::Escape, true));
    assert_eq!(cam.get_input_flags(), camera::DirectionFlags::NONE);
}

#[test]
fn eye_position_on_orbit() {
    let cam = OrbitCamera::new(0.0, 0.0, 4.5);
    let eye = cam.eye_position();
    assert_eq!(eye.x, 0.0);
    assert_eq!(eye.y, 0.0);
    assert_eq!(eye.z, 4.5);

    let cam = OrbitCamera::new(std::f32::consts::FRAC_PI_2, 0.0, 2.0);
    let eye = cam.eye_position();
    assert!(approx(eye.x, 2.0, 1e-5));
    assert!(approx(eye.z, 0.0, 1e-5));

    let cam = OrbitCamera::new(1.1, 0.7, 3.0);
    assert!(approx(length(cam.eye_position()), 3.0, 1e-5));
}

#[test]
fn rotation_y_matches_row_vector_convention() {
    let identity = camera::rotation_y(0.0);
    let p = camera::transform_point(Vec3f::new(1.0, 2.0, 3.0), &identity);
    assert_eq!((p.x, p.y, p.z, p.w), (1.0, 2.0, 3.0, 1.0));

    // a quarter turn takes +x to -z
    let m = camera::rotation_y(std::f32::consts::FRAC_PI_2);
    let p = camera::transform_point(Vec3f::unit_x(), &m);
    assert!(approx(p.x, 0.0, 1e-6));
    assert!(approx(p.y, 0.0, 1e-6));
    assert!(approx(p.z, -1.0, 1e-6));
}

#[test]
fn look_at_moves_eye_to_origin() {
    let eye = Vec3f::new(0.0, 0.0, -5.0);
    let view = camera::look_at_lh(eye, Vec3f::zero(), Vec3f::unit_y());

    let p = camera::transform_point(eye, &view);
    assert!(approx(p.x, 0.0, 1e-6) && approx(p.y, 0.0, 1e-6) && approx(p.z, 0.0, 1e-6));

    // focus lies straight ahead along +z in view space
    let p = camera::transform_point(Vec3f::zero(), &view);
    assert!(approx(p.x, 0.0, 1e-6));
    assert!(approx(p.y, 0.0, 1e-6));
    assert!(approx(p.z, 5.0, 1e-6));

    // +x stays to the right
    let p = camera::transform_point(Vec3f::unit_x(), &view);
    assert!(approx(p.x, 1.0, 1e-6));
}

#[test]
fn perspective_maps_near_and_far_to_unit_depth() {
    let proj = camera::perspective_fov_lh(std::f32::consts::FRAC_PI_4, 16.0 / 9.0, 0.1, 100.0);

    let near = camera::transform_point(Vec3f::new(0.0, 0.0, 0.1), &proj);
    assert!(approx(near.z / near.w, 0.0, 1e-6));

    let far = camera::transform_point(Vec3f::new(0.0, 0.0, 100.0), &proj);
    assert!(approx(far.z / far.w, 1.0, 1e-5));

    // w carries view depth
    let mid = camera::transform_point(Vec3f::new(0.0, 0.0, 7.0), &proj);
    assert!(approx(mid.w, 7.0, 1e-6));

    // the top of the frustum at fov / 2 lands on the clip edge
    let half = (std::f32::consts::FRAC_PI_4 * 0.5).tan();
    let top = camera::transform_point(Vec3f::new(0.0, half * 10.0, 10.0), &proj);
    assert!(approx(top.y / top.w, 1.0, 1e-5));
}
