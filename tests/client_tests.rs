use hotline_labs::prelude::*;

use client::LoopState;
use client::UserConfig;
use gfx::null::Command;
use scene::Upload;

use std::time::Duration;
use std::time::Instant;

type NullClient = client::Client<gfx::null::Device, os::null::App>;
type NullCubeDemo = demos::CubeDemo<gfx::null::Device>;
type NullTriangleDemo = demos::TriangleDemo<gfx::null::Device>;

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn test_config() -> UserConfig {
    UserConfig {
        debug_layer: false,
        ..Default::default()
    }
}

fn create_client(config: UserConfig) -> NullClient {
    client::Client::create(client::ClientInfo {
        name: "client_tests".to_string(),
        title: "client tests".to_string(),
        window_rect: os::Rect {
            x: 0,
            y: 0,
            width: 1280,
            height: 720,
        },
        num_buffers: 2,
        user_config: Some(config),
    }).unwrap()
}

fn create_cube_demo(client: &mut NullClient) -> NullCubeDemo {
    demos::CubeDemo::create(&mut client.device, &client.user_config).unwrap()
}

fn count_presents(commands: &[Command]) -> usize {
    commands.iter().filter(|c| matches!(c, Command::Present { .. })).count()
}

#[test]
fn create_client_sizes_swap_chain_from_window() {
    let client = create_client(test_config());
    assert_eq!(client.window_size, (1280, 720));
    assert_eq!(client.swap_chain.get_size(), (1280, 720));
    assert_eq!(client.state, LoopState::Running);
    assert_eq!(client.main_window.get_viewport_rect().width, 1280);
}

#[test]
fn config_window_rect_overrides_info() {
    let client = create_client(UserConfig {
        main_window_rect: Some(os::Rect {
            x: 10,
            y: 10,
            width: 640,
            height: 480,
        }),
        ..test_config()
    });
    assert_eq!(client.window_size, (640, 480));
}

#[test]
fn user_config_defaults() {
    let config = UserConfig::default();
    assert_eq!(config.sync_interval, 1);
    assert_eq!(config.clear_colour, None);
    assert_eq!(config.main_window_rect, None);
    assert!(!config.use_warp);
    assert_eq!(config.debug_layer, cfg!(debug_assertions));
}

#[test]
fn user_config_missing_fields_use_defaults() {
    let config = UserConfig::from_json(r#"{ "sync_interval": 0, "use_warp": true }"#).unwrap();
    assert_eq!(config.sync_interval, 0);
    assert!(config.use_warp);
    assert_eq!(config.clear_colour, None);

    let config = UserConfig::from_json(r#"{
        "clear_colour": { "r": 1.0, "g": 0.0, "b": 0.5, "a": 1.0 },
        "main_window_rect": { "x": 0, "y": 0, "width": 800, "height": 600 }
    }"#).unwrap();
    assert_eq!(config.clear_colour, Some(gfx::ClearColour::rgba(1.0, 0.0, 0.5, 1.0)));
    assert_eq!(config.main_window_rect.map(|r| r.width), Some(800));
    assert_eq!(config.sync_interval, 1);
}

#[test]
fn user_config_parse_error() {
    let err = UserConfig::from_json("{ \"sync_interval\": \"fast\" }").unwrap_err();
    assert!(err.msg.starts_with("user config"));
}

#[test]
fn user_config_missing_file_is_default() {
    let config = UserConfig::load_or_default("this/path/does/not/exist/user_config.json").unwrap();
    assert_eq!(config, UserConfig::default());
}

#[test]
fn frame_timing_measures_elapsed_seconds() {
    let start = Instant::now();
    let mut timing = client::FrameTiming::new(start);
    let dt = timing.advance(start + Duration::from_millis(250));
    assert!(approx(dt, 0.25, 1e-6));
    // time going backwards gives zero rather than a negative delta
    assert_eq!(timing.advance(start), 0.0);
}

#[test]
fn frame_timing_reset_restarts_clock() {
    let start = Instant::now();
    let mut timing = client::FrameTiming::new(start);
    timing.reset(start + Duration::from_secs(2));
    let dt = timing.advance(start + Duration::from_millis(2100));
    assert!(approx(dt, 0.1, 1e-5));
}

#[test]
fn first_frame_excludes_setup_time() {
    let mut client = create_client(test_config());
    let mut demo = create_cube_demo(&mut client);

    // time spent between creating the client and running it must not reach the camera
    std::thread::sleep(Duration::from_millis(400));

    client.app.push_frame(vec![os::Event::KeyDown(os::Key::Left)]);
    client.run(&mut demo).unwrap();

    assert!(demo.camera.get_yaw() > -0.3, "yaw {}", demo.camera.get_yaw());
}

#[test]
fn seconds_since_epoch_is_wall_clock() {
    // 2020-01-01
    assert!(client::seconds_since_epoch() > 1_577_836_800.0);
}

#[test]
fn arrow_keys_drive_camera() {
    let mut client = create_client(test_config());
    let mut demo = create_cube_demo(&mut client);

    let state = client.dispatch(&mut demo, &os::Event::KeyDown(os::Key::Left)).unwrap();
    assert_eq!(state, LoopState::Running);
    assert!(demo.camera.is_held(camera::Direction::Left));

    let now = Instant::now() + Duration::from_millis(500);
    client.tick(&mut demo, now, 0.0).unwrap();
    let yaw = demo.camera.get_yaw();
    assert!(yaw <= -0.75 + 1e-6, "yaw {}", yaw);

    client.dispatch(&mut demo, &os::Event::KeyUp(os::Key::Left)).unwrap();
    assert!(!demo.camera.is_held(camera::Direction::Left));
    client.tick(&mut demo, now + Duration::from_millis(500), 0.0).unwrap();
    assert_eq!(demo.camera.get_yaw(), yaw);
}

#[test]
fn tick_renders_cube_frame() {
    let mut client = create_client(test_config());
    let mut demo = create_cube_demo(&mut client);
    client.device.clear_commands();

    client.tick(&mut demo, Instant::now(), 0.0).unwrap();

    let commands = client.device.commands();
    assert_eq!(commands.first(), Some(&Command::ClearRenderTarget(demos::CUBE_CLEAR_COLOUR)));
    assert_eq!(commands[1], Command::SetViewport(gfx::Viewport::from_size(1280, 720)));
    assert!(commands.contains(&Command::DrawIndexed { index_count: 36, start_index: 0, base_vertex: 0 }));
    assert_eq!(commands.last(), Some(&Command::Present { sync_interval: 1 }));

    let report = demo.last_report.unwrap();
    assert_eq!(report.camera_upload, Upload::Written);
    assert_eq!(report.transform.aspect_ratio, 1280.0 / 720.0);
}

#[test]
fn resize_changes_swap_chain_and_viewport() {
    let mut client = create_client(test_config());
    let mut demo = create_cube_demo(&mut client);

    client.dispatch(&mut demo, &os::Event::Resize { width: 800, height: 600 }).unwrap();
    assert_eq!(client.window_size, (800, 600));
    assert_eq!(client.swap_chain.get_size(), (800, 600));

    client.device.clear_commands();
    client.tick(&mut demo, Instant::now(), 0.0).unwrap();
    let commands = client.device.commands();
    assert!(commands.contains(&Command::SetViewport(gfx::Viewport::from_size(800, 600))));
    assert_eq!(demo.last_report.unwrap().transform.aspect_ratio, 800.0 / 600.0);
}

#[test]
fn zero_area_resize_is_ignored() {
    let mut client = create_client(test_config());
    let mut demo = create_cube_demo(&mut client);
    client.device.clear_commands();

    client.dispatch(&mut demo, &os::Event::Resize { width: 0, height: 600 }).unwrap();
    client.dispatch(&mut demo, &os::Event::Resize { width: 800, height: 0 }).unwrap();

    assert_eq!(client.window_size, (1280, 720));
    assert_eq!(client.swap_chain.get_size(), (1280, 720));
    assert!(!client.device.commands().iter().any(|c| matches!(c, Command::ResizeSwapChain { .. })));
}

#[test]
fn close_ends_run_loop() {
    let mut client = create_client(test_config());
    let mut demo = create_cube_demo(&mut client);
    client.device.clear_commands();

    client.app.push_idle_frames(2);
    client.app.push_frame(vec![os::Event::Close]);
    client.app.push_idle_frames(5);

    client.run(&mut demo).unwrap();
    assert_eq!(client.state, LoopState::Quitting);
    assert_eq!(count_presents(&client.device.commands()), 2);
}

#[test]
fn run_ends_when_app_stops() {
    let mut client = create_client(test_config());
    let mut demo = create_cube_demo(&mut client);
    client.device.clear_commands();

    client.app.push_frame(vec![os::Event::KeyDown(os::Key::Up)]);
    client.app.push_idle_frames(3);

    client.run(&mut demo).unwrap();
    assert_eq!(client.state, LoopState::Running);
    assert_eq!(count_presents(&client.device.commands()), 4);
    assert!(demo.camera.is_held(camera::Direction::Up));
    assert!(demo.camera.get_pitch() >= camera::DEFAULT_PITCH);
}

#[test]
fn failed_camera_map_still_draws() {
    let mut client = create_client(test_config());
    let mut demo = create_cube_demo(&mut client);
    client.device.set_map_failure(true);
    client.device.clear_commands();

    client.tick(&mut demo, Instant::now(), 0.0).unwrap();

    assert_eq!(demo.last_report.unwrap().camera_upload, Upload::Skipped);
    let commands = client.device.commands();
    assert!(!commands.iter().any(|c| matches!(c, Command::WriteBuffer { .. })));
    assert!(commands.contains(&Command::DrawIndexed { index_count: 36, start_index: 0, base_vertex: 0 }));
    assert_eq!(count_presents(&commands), 1);
}

#[test]
fn sync_interval_and_clear_colour_from_config() {
    let colour = gfx::ClearColour::rgba(1.0, 0.0, 1.0, 1.0);
    let mut client = create_client(UserConfig {
        sync_interval: 0,
        clear_colour: Some(colour),
        ..test_config()
    });
    let mut demo = demos::ClearDemo::create(&mut client.device, &client.user_config).unwrap();
    client.device.clear_commands();

    client.tick(&mut demo, Instant::now(), 0.0).unwrap();

    assert_eq!(client.device.commands(), vec![
        Command::ClearRenderTarget(colour),
        Command::SetViewport(gfx::Viewport::from_size(1280, 720)),
        Command::Present { sync_interval: 0 },
    ]);
}

#[test]
fn clear_demo_uses_blue() {
    let mut client = create_client(test_config());
    let mut demo = demos::ClearDemo::create(&mut client.device, &client.user_config).unwrap();
    client.device.clear_commands();

    client.tick(&mut demo, Instant::now(), 0.0).unwrap();
    assert_eq!(client.device.commands().first(), Some(&Command::ClearRenderTarget(demos::CLEAR_COLOUR)));
}

#[test]
fn triangle_demo_draws_three_indices() {
    let mut client = create_client(test_config());
    let mut demo: NullTriangleDemo = demos::TriangleDemo::create(&mut client.device, &client.user_config).unwrap();
    client.device.clear_commands();

    client.tick(&mut demo, Instant::now(), 0.0).unwrap();

    let commands = client.device.commands();
    assert_eq!(commands.first(), Some(&Command::ClearRenderTarget(demos::TRIANGLE_CLEAR_COLOUR)));
    assert!(commands.contains(&Command::DrawIndexed { index_count: 3, start_index: 0, base_vertex: 0 }));
    assert!(!commands.iter().any(|c| matches!(c, Command::SetConstantBuffers { .. })));
}

#[test]
fn escape_quits_triangle_only() {
    let mut client = create_client(test_config());
    let mut triangle: NullTriangleDemo = demos::TriangleDemo::create(&mut client.device, &client.user_config).unwrap();
    let state = client.dispatch(&mut triangle, &os::Event::KeyDown(os::Key::Escape)).unwrap();
    assert_eq!(state, LoopState::Quitting);

    let mut client = create_client(test_config());
    let mut cube = create_cube_demo(&mut client);
    let state = client.dispatch(&mut cube, &os::Event::KeyDown(os::Key::Escape)).unwrap();
    assert_eq!(state, LoopState::Running);
}
