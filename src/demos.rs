use crate::camera::OrbitCamera;
use crate::client::Demo;
use crate::client::Frame;
use crate::client::LoopState;
use crate::client::UserConfig;
use crate::gfx;
use crate::gfx::CmdBuf;
use crate::os;
use crate::primitives;
use crate::scene;
use crate::shaders;
use crate::Error;

/// Clears a resizable window to blue
pub struct ClearDemo;

pub const CLEAR_COLOUR: gfx::ClearColour = gfx::ClearColour::rgba(0.2, 0.4, 0.8, 1.0);

impl<D: gfx::Device> Demo<D> for ClearDemo {
    fn create(_device: &mut D, _config: &UserConfig) -> Result<Self, Error> {
        Ok(ClearDemo)
    }

    fn render(&mut self, frame: &mut Frame<D>) -> Result<(), Error> {
        frame.begin(CLEAR_COLOUR);
        Ok(())
    }
}

/// A single indexed triangle with a colour per corner, escape quits
pub struct TriangleDemo<D: gfx::Device> {
    mesh: primitives::Mesh<D>,
    pipeline: D::RenderPipeline,
}

pub const TRIANGLE_CLEAR_COLOUR: gfx::ClearColour = gfx::ClearColour::rgba(0.12, 0.12, 0.16, 1.0);

impl<D: gfx::Device> Demo<D> for TriangleDemo<D> {
    fn create(device: &mut D, config: &UserConfig) -> Result<Self, Error> {
        let mesh = primitives::create_triangle_mesh(device)?;
        let pipeline = shaders::create_pipeline(device, shaders::TRIANGLE_VS, shaders::COLOUR_PS, config.debug_layer)?;
        Ok(TriangleDemo {
            mesh,
            pipeline,
        })
    }

    fn handle_event(&mut self, event: &os::Event) -> LoopState {
        match event {
            os::Event::KeyDown(os::Key::Escape) => LoopState::Quitting,
            _ => LoopState::Running,
        }
    }

    fn render(&mut self, frame: &mut Frame<D>) -> Result<(), Error> {
        frame.begin(TRIANGLE_CLEAR_COLOUR);
        frame.cmd.set_vertex_buffer(&self.mesh.vb, 0);
        frame.cmd.set_index_buffer(&self.mesh.ib);
        frame.cmd.set_render_pipeline(&self.pipeline);
        frame.cmd.draw_indexed(self.mesh.num_indices, 0, 0);
        Ok(())
    }
}

/// A spinning cube viewed from an orbit camera driven by the arrow keys
pub struct CubeDemo<D: gfx::Device> {
    pub camera: OrbitCamera,
    pub scene: scene::CubeScene<D>,
    pub last_report: Option<scene::FrameReport>,
}

pub const CUBE_CLEAR_COLOUR: gfx::ClearColour = gfx::ClearColour::rgba(0.25, 0.25, 0.3, 1.0);

impl<D: gfx::Device> Demo<D> for CubeDemo<D> {
    fn create(device: &mut D, config: &UserConfig) -> Result<Self, Error> {
        Ok(CubeDemo {
            camera: OrbitCamera::default(),
            scene: scene::CubeScene::create(device, config.debug_layer)?,
            last_report: None,
        })
    }

    fn handle_event(&mut self, event: &os::Event) -> LoopState {
        match *event {
            os::Event::KeyDown(key) => {
                self.camera.handle_key(key, true);
            }
            os::Event::KeyUp(key) => {
                self.camera.handle_key(key, false);
            }
            _ => ()
        }
        LoopState::Running
    }

    fn update(&mut self, delta_time: f32) {
        self.camera.update(delta_time);
    }

    fn render(&mut self, frame: &mut Frame<D>) -> Result<(), Error> {
        frame.begin(CUBE_CLEAR_COLOUR);
        let report = self.scene.render(frame.cmd, &self.camera, frame.width, frame.height, frame.absolute_time)?;
        self.last_report = Some(report);
        Ok(())
    }
}
