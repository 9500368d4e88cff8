use crate::gfx;
use crate::os;
use crate::Error;

use gfx::SwapChain;
use os::Window;

use serde::{Deserialize, Serialize};

use std::time::Instant;
use std::time::SystemTime;

/// Information to create a client which will create an app, window, device and swap chain.
pub struct ClientInfo {
    /// Name for the app, used to register the window class
    pub name: String,
    /// Text displayed in the window title bar
    pub title: String,
    /// Window rect {pos_x pos_y, width, height}, `UserConfig::main_window_rect` takes precedence
    pub window_rect: os::Rect<i32>,
    /// Number of buffers in the swap chain (2 for double buffered, 3 for tripple etc)
    pub num_buffers: u32,
    /// Optional user config, the default will be located next to the executable,
    /// this allows to override the launch configuration
    pub user_config: Option<UserConfig>,
}

/// Useful defaults for quick ClientInfo initialisation
impl Default for ClientInfo {
    fn default() -> Self {
        ClientInfo {
            name: "hotline_labs".to_string(),
            title: "hotline_labs".to_string(),
            window_rect: os::Rect {
                x: 100,
                y: 100,
                width: 1280,
                height: 720,
            },
            num_buffers: 2,
            user_config: None,
        }
    }
}

/// Serialisable user configuration, missing fields take their default values
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct UserConfig {
    // pos xy, size xy
    pub main_window_rect: Option<os::Rect<i32>>,
    /// Replaces the background colour of every lab
    pub clear_colour: Option<gfx::ClearColour>,
    /// Present interval, 1 waits for vertical blank and 0 presents immediately
    pub sync_interval: u32,
    pub debug_layer: bool,
    /// Create the software rasteriser device instead of trying hardware first
    pub use_warp: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            main_window_rect: None,
            clear_colour: None,
            sync_interval: 1,
            debug_layer: cfg!(debug_assertions),
            use_warp: false,
        }
    }
}

impl UserConfig {
    pub fn from_json(text: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads the config at `path`, returning defaults if the file does not exist
    pub fn load_or_default(path: &str) -> Result<Self, Error> {
        if std::path::Path::new(path).exists() {
            let user_data = std::fs::read(path)?;
            let config = serde_json::from_slice(&user_data)?;
            log::info!("hotline_labs::client: loaded {}", path);
            Ok(config)
        }
        else {
            Ok(UserConfig::default())
        }
    }
}

/// Measures wall clock time between frames
pub struct FrameTiming {
    last_frame: Instant,
}

impl FrameTiming {
    pub fn new(now: Instant) -> Self {
        FrameTiming {
            last_frame: now,
        }
    }

    /// Restart the clock so the next `advance` measures from `now`
    pub fn reset(&mut self, now: Instant) {
        self.last_frame = now;
    }

    /// Seconds elapsed since the previous call (or creation), never negative
    pub fn advance(&mut self, now: Instant) -> f32 {
        let delta = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        delta
    }
}

/// Seconds since the unix epoch, 0 if the system clock is set before it
pub fn seconds_since_epoch() -> f64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Quitting,
}

/// Everything a demo needs to record one frame
pub struct Frame<'a, D: gfx::Device> {
    pub device: &'a mut D,
    pub swap_chain: &'a D::SwapChain,
    pub cmd: &'a mut D::CmdBuf,
    /// Covers the whole back buffer
    pub viewport: gfx::Viewport,
    pub width: u32,
    pub height: u32,
    /// Seconds since the unix epoch sampled at the start of the frame
    pub absolute_time: f64,
    clear_colour: Option<gfx::ClearColour>,
}

impl<'a, D: gfx::Device> Frame<'a, D> {
    /// The configured clear colour if there is one, otherwise `default`
    pub fn clear_colour(&self, default: gfx::ClearColour) -> gfx::ClearColour {
        self.clear_colour.unwrap_or(default)
    }

    /// Clears the back buffer and sets the full viewport
    pub fn begin(&mut self, default_colour: gfx::ClearColour) {
        use gfx::CmdBuf;
        let colour = self.clear_colour(default_colour);
        self.cmd.clear_render_target(self.swap_chain, colour);
        self.cmd.set_viewport(&self.viewport);
    }
}

/// A lab program driven by `Client::run`
pub trait Demo<D: gfx::Device>: Sized {
    fn create(device: &mut D, config: &UserConfig) -> Result<Self, Error>;
    /// Called for every event after the client has handled it
    fn handle_event(&mut self, _event: &os::Event) -> LoopState {
        LoopState::Running
    }
    /// Called once per frame with the seconds elapsed since the previous frame
    fn update(&mut self, _delta_time: f32) {
    }
    fn render(&mut self, frame: &mut Frame<D>) -> Result<(), Error>;
}

/// Client data members
pub struct Client<D: gfx::Device, A: os::App> {
    pub app: A,
    pub device: D,
    pub main_window: A::Window,
    pub swap_chain: D::SwapChain,
    pub cmd_buf: D::CmdBuf,
    pub user_config: UserConfig,
    /// Current back buffer size used for the viewport and aspect ratio
    pub window_size: (u32, u32),
    pub state: LoopState,
    timing: FrameTiming,
}

impl<D, A> Client<D, A> where D: gfx::Device, A: os::App {
    /// Create a client with an app, a shown main window, a device and a swap chain
    pub fn create(info: ClientInfo) -> Result<Self, Error> {
        let user_config = match info.user_config {
            Some(config) => config,
            None => UserConfig::load_or_default(&super::get_config_path("user_config.json"))?,
        };

        let mut app = A::create(os::AppInfo {
            name: info.name.to_string(),
        })?;

        let main_window = app.create_window(os::WindowInfo {
            title: info.title.to_string(),
            rect: user_config.main_window_rect.unwrap_or(info.window_rect),
        })?;

        let mut device = D::create(&gfx::DeviceInfo {
            debug_layer: user_config.debug_layer,
            use_warp: user_config.use_warp,
        })?;

        let swap_chain = device.create_swap_chain::<A>(&gfx::SwapChainInfo {
            num_buffers: info.num_buffers,
            format: gfx::Format::RGBA8n,
        }, &main_window)?;

        let cmd_buf = device.create_cmd_buf();
        let window_size = swap_chain.get_size();

        main_window.show();

        Ok(Client {
            app,
            device,
            main_window,
            swap_chain,
            cmd_buf,
            user_config,
            window_size,
            state: LoopState::Running,
            timing: FrameTiming::new(Instant::now()),
        })
    }

    /// Handle a single event: resizes the swap chain, tracks quit requests and forwards it to `demo`
    pub fn dispatch<T: Demo<D>>(&mut self, demo: &mut T, event: &os::Event) -> Result<LoopState, Error> {
        log::debug!("hotline_labs::client: {:?}", event);
        match *event {
            os::Event::Resize { width, height } => {
                if os::is_valid_size(width, height) {
                    self.swap_chain.resize(&mut self.device, width, height)?;
                    self.window_size = (width, height);
                }
            }
            os::Event::Close => {
                self.state = LoopState::Quitting;
            }
            _ => ()
        }
        if demo.handle_event(event) == LoopState::Quitting {
            self.state = LoopState::Quitting;
        }
        Ok(self.state)
    }

    /// Advance timing, update and render `demo` then present
    pub fn tick<T: Demo<D>>(&mut self, demo: &mut T, now: Instant, absolute_time: f64) -> Result<(), Error> {
        let delta_time = self.timing.advance(now);
        demo.update(delta_time);

        let (width, height) = self.window_size;
        let mut frame = Frame {
            device: &mut self.device,
            swap_chain: &self.swap_chain,
            cmd: &mut self.cmd_buf,
            viewport: gfx::Viewport::from_size(width, height),
            width,
            height,
            absolute_time,
            clear_colour: self.user_config.clear_colour,
        };
        demo.render(&mut frame)?;

        self.swap_chain.present(self.user_config.sync_interval)
    }

    /// Very simple run loop, pumps events then renders a frame each time the queue is empty
    pub fn run<T: Demo<D>>(&mut self, demo: &mut T) -> Result<(), Error> {
        // demo resources are created after the client, keep their setup out of the first delta
        self.timing.reset(Instant::now());
        while self.app.run() {
            for event in self.app.take_events() {
                self.dispatch(demo, &event)?;
            }
            if self.state == LoopState::Quitting {
                break;
            }
            self.tick(demo, Instant::now(), seconds_since_epoch())?;
        }
        log::info!("hotline_labs::client: exiting");
        Ok(())
    }
}

/// Creates a client and a `T`, then runs until the window closes or the demo asks to quit
pub fn run_demo<D, A, T>(info: ClientInfo) -> Result<(), Error> where D: gfx::Device, A: os::App, T: Demo<D> {
    let mut client = Client::<D, A>::create(info)?;
    log::info!("hotline_labs::client: adapter {}", gfx::Device::get_adapter_info(&client.device));
    let mut demo = T::create(&mut client.device, &client.user_config)?;
    client.run(&mut demo)
}
