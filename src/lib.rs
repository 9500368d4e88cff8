/// Operating system module.
pub mod os;

/// Graphics device module with an immediate-context d3d11 backend and a recording null backend.
pub mod gfx;

/// Orbit camera controller and transform matrix helpers
pub mod camera;

/// Per-frame transform composition and constant buffer upload for the rotating cube
pub mod scene;

/// Geometry primitives for the lab scenes
pub mod primitives;

/// HLSL sources compiled at start-up
pub mod shaders;

/// Client owning the app, device and swap chain, it pumps events and drives the render loop
pub mod client;

/// The three lab programs implemented as `client::Demo`
pub mod demos;

/// Use bitmask for flags
#[macro_use]
extern crate bitflags;

/// Generic errors for modules to define their own
pub struct Error {
    pub msg: String,
}

/// Generic debug for errors
impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::error::Error for Error {}

impl From<&str> for Error {
    fn from(msg: &str) -> Error {
        Error {
            msg: msg.to_string()
        }
    }
}

// conversion for windows-rs win32 errors
#[cfg(target_os = "windows")]
impl From<windows::core::Error> for Error {
    fn from(err: windows::core::Error) -> Error {
        Error {
            msg: err.message().to_string(),
        }
    }
}

// std errors
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error {
            msg: err.to_string()
        }
    }
}

// config parse errors
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error {
            msg: format!("user config: {}", err)
        }
    }
}

/// Returns the path of `filename` located next to the running executable,
/// falls back to the working directory if the executable path cannot be resolved
pub fn get_config_path(filename: &str) -> String {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.to_path_buf()));
    match exe_dir {
        Some(dir) => dir.join(filename).to_string_lossy().to_string(),
        None => filename.to_string()
    }
}

#[cfg(target_os = "windows")]
pub use os::win32 as os_platform;

#[cfg(target_os = "windows")]
pub use gfx::d3d11 as gfx_platform;

/// Commonly used traits and modules in one place
pub mod prelude {
    pub use crate::{
        os,
        gfx,
        camera,
        scene,
        primitives,
        shaders,
        client,
        demos,
        Error,
    };

    pub use os::App;
    pub use os::Window;
    pub use gfx::Device;
    pub use gfx::SwapChain;
    pub use gfx::CmdBuf;
    pub use gfx::Buffer;
    pub use gfx::Shader;
    pub use gfx::RenderPipeline;
    pub use client::Demo;

    #[cfg(target_os = "windows")]
    pub use crate::os_platform;

    #[cfg(target_os = "windows")]
    pub use crate::gfx_platform;
}
