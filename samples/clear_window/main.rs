#[cfg(target_os = "windows")]
use hotline_labs::prelude::*;

#[cfg(target_os = "windows")]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = client::run_demo::<gfx_platform::Device, os_platform::App, demos::ClearDemo>(client::ClientInfo {
        name: "clear_window".to_string(),
        title: "DirectX 11 - Window".to_string(),
        window_rect: os::Rect {
            x: 100,
            y: 100,
            width: 1024,
            height: 768,
        },
        ..Default::default()
    });

    if let Err(err) = result {
        log::error!("clear_window: {}", err);
        os_platform::show_error_message("DirectX 11 - Window", &err.msg);
        std::process::exit(1);
    }
}

#[cfg(not(target_os = "windows"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::error!("clear_window: Direct3D 11 requires a windows host");
    std::process::exit(1);
}
