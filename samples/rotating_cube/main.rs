#[cfg(target_os = "windows")]
use hotline_labs::prelude::*;

#[cfg(target_os = "windows")]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = client::run_demo::<gfx_platform::Device, os_platform::App, demos::CubeDemo<gfx_platform::Device>>(client::ClientInfo {
        name: "rotating_cube".to_string(),
        title: "D3D11 - Rotating Cube".to_string(),
        window_rect: os::Rect {
            x: 100,
            y: 100,
            width: 1280,
            height: 720,
        },
        ..Default::default()
    });

    if let Err(err) = result {
        log::error!("rotating_cube: {}", err);
        os_platform::show_error_message("D3D11 - Rotating Cube", &err.msg);
        std::process::exit(1);
    }
}

#[cfg(not(target_os = "windows"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::error!("rotating_cube: Direct3D 11 requires a windows host");
    std::process::exit(1);
}
