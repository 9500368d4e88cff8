use maths_rs::prelude::*;

use crate::camera;
use crate::camera::OrbitCamera;
use crate::gfx;
use crate::gfx::CmdBuf;
use crate::primitives;
use crate::shaders;
use crate::Error;

/// Vertical field of view in radians
pub const FOV: f32 = std::f32::consts::FRAC_PI_4;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// Radians per second the cube spins about +Y
pub const WORLD_ROTATION_SPEED: f64 = 0.8;

pub const CUBE_INDEX_COUNT: u32 = 36;

/// Matrices for one frame, all in the row vector convention
#[derive(Clone, Copy)]
pub struct SceneTransform {
    pub world: Mat4f,
    pub view: Mat4f,
    pub projection: Mat4f,
    /// `view * projection`
    pub view_projection: Mat4f,
    pub eye: Vec3f,
    pub aspect_ratio: f32,
    pub fov: f32,
}

/// Layout of the b0 constant buffer
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldConstants {
    pub world: [f32; 16],
}

/// Layout of the b1 constant buffer
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraConstants {
    pub view_projection: [f32; 16],
}

/// Outcome of the best effort camera buffer write
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Upload {
    Written,
    /// The map failed, the buffer keeps the previous frame's matrix
    Skipped,
}

/// What happened while rendering a frame
#[derive(Clone, Copy)]
pub struct FrameReport {
    pub transform: SceneTransform,
    pub camera_upload: Upload,
}

/// Cube spin angle for an absolute time in seconds. The product is reduced to `[0, 2pi)` in double precision,
/// large clock values lose no precision and the resulting rotation is the same.
pub fn world_rotation_angle(absolute_seconds: f64) -> f32 {
    (absolute_seconds * WORLD_ROTATION_SPEED).rem_euclid(std::f64::consts::TAU) as f32
}

/// Builds world, view and projection for a `width` x `height` target. Pure, both sizes must be non-zero.
pub fn compose_frame(camera: &OrbitCamera, width: u32, height: u32, absolute_seconds: f64) -> SceneTransform {
    debug_assert!(width > 0 && height > 0, "compose_frame requires a non-zero target size");
    let aspect_ratio = width as f32 / height as f32;
    let eye = camera.eye_position();
    let world = camera::rotation_y(world_rotation_angle(absolute_seconds));
    let view = camera::look_at_lh(eye, Vec3f::zero(), Vec3f::unit_y());
    let projection = camera::perspective_fov_lh(FOV, aspect_ratio, NEAR_PLANE, FAR_PLANE);
    SceneTransform {
        world,
        view,
        projection,
        view_projection: view * projection,
        eye,
        aspect_ratio,
        fov: FOV,
    }
}

/// Transposes `m` and flattens it row by row, the layout shaders read with default packing
pub fn to_gpu_matrix(m: &Mat4f) -> [f32; 16] {
    let t = m.transpose();
    let mut out = [0.0; 16];
    for i in 0..4 {
        let row = t.get_row(i as _);
        out[i * 4] = row.x;
        out[i * 4 + 1] = row.y;
        out[i * 4 + 2] = row.z;
        out[i * 4 + 3] = row.w;
    }
    out
}

/// Gpu resources for the spinning cube
pub struct CubeScene<D: gfx::Device> {
    pub mesh: primitives::Mesh<D>,
    pub pipeline: D::RenderPipeline,
    pub world_buffer: D::Buffer,
    pub camera_buffer: D::Buffer,
}

impl<D: gfx::Device> CubeScene<D> {
    pub fn create(dev: &mut D, debug_shaders: bool) -> Result<Self, Error> {
        let mesh = primitives::create_cube_mesh(dev)?;
        let pipeline = shaders::create_pipeline(dev, shaders::CUBE_VS, shaders::COLOUR_PS, debug_shaders)?;

        let identity = WorldConstants {
            world: to_gpu_matrix(&Mat4f::identity()),
        };
        let world_buffer = dev.create_buffer(&gfx::BufferInfo {
                usage: gfx::BufferUsage::ConstantBuffer,
                resource_usage: gfx::ResourceUsage::Default,
                cpu_access: gfx::CpuAccessFlags::NONE,
                format: gfx::Format::Unknown,
                stride: std::mem::size_of::<WorldConstants>(),
                num_elements: 1,
            },
            Some(std::slice::from_ref(&identity))
        )?;

        let camera_buffer = dev.create_buffer::<CameraConstants>(&gfx::BufferInfo {
                usage: gfx::BufferUsage::ConstantBuffer,
                resource_usage: gfx::ResourceUsage::Dynamic,
                cpu_access: gfx::CpuAccessFlags::WRITE,
                format: gfx::Format::Unknown,
                stride: std::mem::size_of::<CameraConstants>(),
                num_elements: 1,
            },
            None
        )?;

        Ok(CubeScene {
            mesh,
            pipeline,
            world_buffer,
            camera_buffer,
        })
    }

    /// Writes the world matrix with a full update and the view projection through a discard map.
    /// A failed map leaves the camera buffer untouched and is reported as `Upload::Skipped`.
    pub fn upload(&self, cmd: &mut D::CmdBuf, transform: &SceneTransform) -> Result<Upload, Error> {
        let world = WorldConstants {
            world: to_gpu_matrix(&transform.world),
        };
        cmd.update_buffer(&self.world_buffer, &[world])?;

        let camera = CameraConstants {
            view_projection: to_gpu_matrix(&transform.view_projection),
        };
        match cmd.write_buffer(&self.camera_buffer, &[camera]) {
            Ok(()) => Ok(Upload::Written),
            Err(err) => {
                log::warn!("hotline_labs::scene: skipped camera upload: {}", err);
                Ok(Upload::Skipped)
            }
        }
    }

    /// Binds geometry, pipeline and constant buffers (world b0, camera b1) then draws the cube
    pub fn draw(&self, cmd: &mut D::CmdBuf) {
        cmd.set_vertex_buffer(&self.mesh.vb, 0);
        cmd.set_index_buffer(&self.mesh.ib);
        cmd.set_render_pipeline(&self.pipeline);
        cmd.set_constant_buffers(0, &[&self.world_buffer, &self.camera_buffer]);
        cmd.draw_indexed(self.mesh.num_indices, 0, 0);
    }

    pub fn render(
        &self,
        cmd: &mut D::CmdBuf,
        camera: &OrbitCamera,
        width: u32,
        height: u32,
        absolute_seconds: f64,
    ) -> Result<FrameReport, Error> {
        let transform = compose_frame(camera, width, height, absolute_seconds);
        let camera_upload = self.upload(cmd, &transform)?;
        self.draw(cmd);
        Ok(FrameReport {
            transform,
            camera_upload,
        })
    }
}
