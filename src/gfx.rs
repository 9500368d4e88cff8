use crate::os;
use crate::Error;

use serde::{Deserialize, Serialize};

use std::any::Any;

/// Implemets this interface with a Direct3D11 backend using an immediate context.
#[cfg(target_os = "windows")]
pub mod d3d11;

/// Records the commands it is given so they can be inspected, used for testing without a gpu
pub mod null;

/// Structure to specify viewport coordinates on a `CmdBuf`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Top left x coordinate.
    pub x: f32,
    /// Top left y coordinate.
    pub y: f32,
    /// Width of the viewport rectangle.
    pub width: f32,
    /// Height of the viewport rectangle (Y is down).
    pub height: f32,
    /// Minimum depth of the viewport. Ranges between 0 and 1.
    pub min_depth: f32,
    /// Maximum depth of the viewport. Ranges between 0 and 1.
    pub max_depth: f32,
}

impl Viewport {
    /// Full target viewport at the origin with a 0-1 depth range
    pub fn from_size(width: u32, height: u32) -> Viewport {
        Viewport {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Linear rgba colour used to clear the back buffer
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClearColour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ClearColour {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> ClearColour {
        ClearColour { r, g, b, a }
    }

    pub fn as_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Information to create a device, it contains default preferences which may be ignored
/// if a hardware device is unavailable.
#[derive(Clone, Debug)]
pub struct DeviceInfo {
    /// Enables the runtime debug layer and debug shader compilation
    pub debug_layer: bool,
    /// Skip hardware and create a software rasteriser device straight away
    pub use_warp: bool,
}

/// Information returned from `Device::get_adapter_info`
#[derive(Clone, Debug)]
pub struct AdapterInfo {
    pub name: String,
    pub description: String,
    pub dedicated_video_memory: usize,
    /// True if the device fell back to (or was asked for) the software rasteriser
    pub software: bool,
}

impl std::fmt::Display for AdapterInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({}) vram: {}mb software: {}",
            self.name,
            self.description,
            self.dedicated_video_memory / 1024 / 1024,
            self.software
        )
    }
}

/// Information to create a swap chain
#[derive(Clone, Debug)]
pub struct SwapChainInfo {
    pub num_buffers: u32,
    pub format: Format,
}

/// Data formats used by buffers, vertex attributes and swap chains
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    Unknown,
    R16u,
    R32u,
    RGB32f,
    RGBA8n,
}

impl Format {
    /// Size of one element of the format in bytes
    pub fn size_bytes(&self) -> usize {
        match self {
            Format::Unknown => 0,
            Format::R16u => 2,
            Format::R32u => 4,
            Format::RGB32f => 12,
            Format::RGBA8n => 4,
        }
    }
}

/// Describes what the buffer is bound as
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferUsage {
    Vertex,
    Index,
    ConstantBuffer,
}

/// How the gpu and cpu share the memory of a resource
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResourceUsage {
    /// Written once at creation, initial data is required
    Immutable,
    /// Gpu owned, updated from the cpu through `CmdBuf::update_buffer`
    Default,
    /// Cpu writeable each frame through `CmdBuf::write_buffer`, requires `CpuAccessFlags::WRITE`
    Dynamic,
}

bitflags! {
    /// Cpu access to a resource's memory
    pub struct CpuAccessFlags: u8 {
        const NONE = 0;
        const WRITE = 1 << 0;
    }
}

/// Information to create a buffer
#[derive(Clone, Debug)]
pub struct BufferInfo {
    /// Indicates how the buffer will be used on the GPU.
    pub usage: BufferUsage,
    pub resource_usage: ResourceUsage,
    pub cpu_access: CpuAccessFlags,
    /// Used to indicate index type for index buffers.
    pub format: Format,
    /// The size of an individual element, vertex stride or constant buffer struct size
    pub stride: usize,
    /// Number of elements of `stride` size in the buffer
    pub num_elements: usize,
}

impl BufferInfo {
    /// Total size of the buffer in bytes
    pub fn size_bytes(&self) -> usize {
        self.stride * self.num_elements
    }
}

/// Checks a `BufferInfo` and optional initial data against the rules every backend shares
pub fn validate_buffer_info(info: &BufferInfo, data_size: Option<usize>) -> Result<(), Error> {
    let size = info.size_bytes();
    if size == 0 {
        return Err(Error {
            msg: "hotline_labs::gfx: buffer size must be non-zero".to_string()
        });
    }
    if info.usage == BufferUsage::ConstantBuffer && size % 16 != 0 {
        return Err(Error {
            msg: format!("hotline_labs::gfx: constant buffer size {} is not a multiple of 16 bytes", size)
        });
    }
    if info.usage == BufferUsage::Index && !matches!(info.format, Format::R16u | Format::R32u) {
        return Err(Error {
            msg: format!("hotline_labs::gfx: invalid index buffer format {:?}", info.format)
        });
    }
    match info.resource_usage {
        ResourceUsage::Immutable if data_size.is_none() => {
            return Err(Error {
                msg: "hotline_labs::gfx: immutable buffers require initial data".to_string()
            });
        }
        ResourceUsage::Dynamic if !info.cpu_access.contains(CpuAccessFlags::WRITE) => {
            return Err(Error {
                msg: "hotline_labs::gfx: dynamic buffers require CpuAccessFlags::WRITE".to_string()
            });
        }
        _ => ()
    }
    if let Some(data_size) = data_size {
        if data_size != size {
            return Err(Error {
                msg: format!("hotline_labs::gfx: buffer data is {} bytes, expected {}", data_size, size)
            });
        }
    }
    Ok(())
}

/// Checks a full buffer update: the buffer must be `ResourceUsage::Default` and `data_size` must match its size
pub fn validate_buffer_update<D: Device>(buffer: &D::Buffer, data_size: usize) -> Result<(), Error> {
    let info = buffer.get_info();
    if info.resource_usage != ResourceUsage::Default {
        return Err(Error {
            msg: format!("hotline_labs::gfx: update_buffer requires a default usage buffer, got {:?}", info.resource_usage)
        });
    }
    if data_size != info.size_bytes() {
        return Err(Error {
            msg: format!("hotline_labs::gfx: update data is {} bytes, buffer is {}", data_size, info.size_bytes())
        });
    }
    Ok(())
}

/// The stage a shader is bound to
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShaderType {
    Vertex,
    Fragment,
}

bitflags! {
    /// Flags passed to the runtime shader compiler
    pub struct ShaderCompileFlags: u8 {
        const NONE = 0;
        /// Disable deprecated syntax
        const STRICTNESS = 1 << 0;
        /// Embed debug information
        const DEBUG = 1 << 1;
        /// Skip optimisation, pairs with DEBUG
        const SKIP_OPTIMIZATION = 1 << 2;
    }
}

/// Information required to compile a shader from source at runtime
#[derive(Clone, Debug)]
pub struct ShaderCompileInfo {
    pub entry_point: String,
    /// Shader model target, ie. "vs_5_0"
    pub target: String,
    pub flags: ShaderCompileFlags,
}

/// Information to create a shader. When `compile_info` is `None` the data is pre-compiled bytecode.
#[derive(Clone, Debug)]
pub struct ShaderInfo {
    pub shader_type: ShaderType,
    pub compile_info: Option<ShaderCompileInfo>,
}

/// Describes one vertex attribute of an input layout
#[derive(Clone, Debug)]
pub struct InputElementInfo {
    pub semantic: String,
    pub index: u32,
    pub format: Format,
    pub input_slot: u32,
    /// Byte offset of the attribute inside the vertex
    pub aligned_byte_offset: u32,
}

/// Primitive assembly mode
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Topology {
    TriangleList,
}

/// Information to create a render pipeline, the input layout is validated against the vertex shader
pub struct RenderPipelineInfo<'stack, D: Device> {
    pub vs: &'stack D::Shader,
    pub fs: &'stack D::Shader,
    pub input_layout: Vec<InputElementInfo>,
    pub topology: Topology,
}

/// Checks shader stages and the input layout before a backend creates a pipeline
pub fn validate_render_pipeline_info<D: Device>(info: &RenderPipelineInfo<D>) -> Result<(), Error> {
    if info.vs.get_type() != ShaderType::Vertex || info.fs.get_type() != ShaderType::Fragment {
        return Err(Error {
            msg: "hotline_labs::gfx: pipeline shader stages are mismatched".to_string()
        });
    }
    if info.input_layout.is_empty() {
        return Err(Error {
            msg: "hotline_labs::gfx: pipeline requires an input layout".to_string()
        });
    }
    Ok(())
}

/// A gpu device is used primarily to create resources
pub trait Device: 'static + Sized + Any {
    type SwapChain: SwapChain<Self>;
    type CmdBuf: CmdBuf<Self>;
    type Buffer: Buffer<Self>;
    type Shader: Shader<Self>;
    type RenderPipeline: RenderPipeline<Self>;
    /// Create a new device with a hardware driver, falling back to software rasterisation
    fn create(info: &DeviceInfo) -> Result<Self, Error>;
    /// Create a swap chain presenting into `win`, sized to its client area
    fn create_swap_chain<A: os::App>(
        &mut self,
        info: &SwapChainInfo,
        win: &A::Window,
    ) -> Result<Self::SwapChain, Error>;
    /// Create a command buffer recording onto the device's immediate context
    fn create_cmd_buf(&self) -> Self::CmdBuf;
    /// Create a buffer, `data` may be `None` for buffers which are written later
    fn create_buffer<T: Sized>(
        &mut self,
        info: &BufferInfo,
        data: Option<&[T]>,
    ) -> Result<Self::Buffer, Error>;
    /// Create a shader from source (compiled at runtime) or from bytecode
    fn create_shader(&self, info: &ShaderInfo, src: &[u8]) -> Result<Self::Shader, Error>;
    /// Create a render pipeline with shaders, input layout and topology
    fn create_render_pipeline(
        &self,
        info: &RenderPipelineInfo<Self>,
    ) -> Result<Self::RenderPipeline, Error>;
    /// Information about the adapter the device was created on
    fn get_adapter_info(&self) -> &AdapterInfo;
}

/// A swap chain is connected to a window and owns the back buffers
pub trait SwapChain<D: Device>: 'static + Sized + Any {
    /// Resize the back buffers, the render target view is released and recreated
    fn resize(&mut self, device: &mut D, width: u32, height: u32) -> Result<(), Error>;
    /// Returns the current back buffer size
    fn get_size(&self) -> (u32, u32);
    /// Present the back buffer, `sync_interval` 1 waits for vertical blank
    fn present(&mut self, sync_interval: u32) -> Result<(), Error>;
}

/// Records state changes and draws. Functions here mirror the context calls they map to,
/// the immediate context executes them as they are made.
pub trait CmdBuf<D: Device>: 'static + Sized + Any {
    /// Bind the back buffer as render target and clear it
    fn clear_render_target(&mut self, swap_chain: &D::SwapChain, colour: ClearColour);
    fn set_viewport(&mut self, viewport: &Viewport);
    fn set_vertex_buffer(&mut self, buffer: &D::Buffer, slot: u32);
    fn set_index_buffer(&mut self, buffer: &D::Buffer);
    /// Bind shaders, input layout and topology
    fn set_render_pipeline(&mut self, pipeline: &D::RenderPipeline);
    /// Bind constant buffers to the vertex stage starting at `start_slot`
    fn set_constant_buffers(&mut self, start_slot: u32, buffers: &[&D::Buffer]);
    /// Replace the whole contents of a default usage buffer, `data` must cover the buffer exactly
    fn update_buffer<T: Sized>(&mut self, buffer: &D::Buffer, data: &[T]) -> Result<(), Error>;
    /// Map a dynamic buffer with discard, copy `data` and unmap. Returns an error if the map failed
    /// in which case the buffer contents are unchanged.
    fn write_buffer<T: Sized>(&mut self, buffer: &D::Buffer, data: &[T]) -> Result<(), Error>;
    fn draw_indexed(&mut self, index_count: u32, start_index: u32, base_vertex: i32);
}

pub trait Buffer<D: Device>: 'static + Sized + Any {
    fn get_info(&self) -> &BufferInfo;
}

pub trait Shader<D: Device>: 'static + Sized + Any {
    fn get_type(&self) -> ShaderType;
}

pub trait RenderPipeline<D: Device>: 'static + Sized + Any {
    fn get_topology(&self) -> Topology;
}

/// Take a slice of any sized type and return a u8 slice covering all of its elements.
pub fn slice_as_u8_slice<T: Sized>(p: &[T]) -> &[u8] {
    unsafe {
        ::std::slice::from_raw_parts(
            p.as_ptr() as *const u8,
            std::mem::size_of_val(p),
        )
    }
}
