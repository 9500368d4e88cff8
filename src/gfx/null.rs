use super::AdapterInfo;
use super::BufferInfo;
use super::ClearColour;
use super::DeviceInfo;
use super::RenderPipelineInfo;
use super::ShaderInfo;
use super::ShaderType;
use super::SwapChainInfo;
use super::Topology;
use super::Viewport;

use crate::os;
use crate::os::Window;
use crate::Error;

use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;

/// Every call made on a null `CmdBuf` or `SwapChain`, in the order it was made
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    ClearRenderTarget(ClearColour),
    SetViewport(Viewport),
    SetVertexBuffer { buffer: u32, slot: u32 },
    SetIndexBuffer(u32),
    SetRenderPipeline(u32),
    SetConstantBuffers { start_slot: u32, buffers: Vec<u32> },
    UpdateBuffer { buffer: u32, data: Vec<u8> },
    WriteBuffer { buffer: u32, data: Vec<u8> },
    DrawIndexed { index_count: u32, start_index: u32, base_vertex: i32 },
    Present { sync_interval: u32 },
    ResizeSwapChain { width: u32, height: u32 },
}

type CommandLog = Rc<RefCell<Vec<Command>>>;

/// A device without a gpu, resources keep their contents in memory and commands are logged
pub struct Device {
    adapter_info: AdapterInfo,
    commands: CommandLog,
    fail_map: Rc<Cell<bool>>,
    next_id: Cell<u32>,
}

pub struct SwapChain {
    width: u32,
    height: u32,
    commands: CommandLog,
}

pub struct CmdBuf {
    commands: CommandLog,
    fail_map: Rc<Cell<bool>>,
}

pub struct Buffer {
    id: u32,
    info: BufferInfo,
    data: Rc<RefCell<Vec<u8>>>,
}

pub struct Shader {
    shader_type: ShaderType,
}

pub struct RenderPipeline {
    id: u32,
    topology: Topology,
}

impl Device {
    fn next_id(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    /// Makes `CmdBuf::write_buffer` fail as if the map of a dynamic buffer was rejected
    pub fn set_map_failure(&self, fail: bool) {
        self.fail_map.set(fail);
    }

    /// A copy of all commands recorded so far
    pub fn commands(&self) -> Vec<Command> {
        self.commands.borrow().clone()
    }

    pub fn clear_commands(&self) {
        self.commands.borrow_mut().clear();
    }
}

impl Buffer {
    pub fn get_id(&self) -> u32 {
        self.id
    }

    /// Current contents of the buffer reinterpreted as f32
    pub fn read_f32(&self) -> Vec<f32> {
        self.data
            .borrow()
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }
}

impl RenderPipeline {
    pub fn get_id(&self) -> u32 {
        self.id
    }
}

impl super::Device for Device {
    type SwapChain = SwapChain;
    type CmdBuf = CmdBuf;
    type Buffer = Buffer;
    type Shader = Shader;
    type RenderPipeline = RenderPipeline;

    fn create(_info: &DeviceInfo) -> Result<Device, Error> {
        Ok(Device {
            adapter_info: AdapterInfo {
                name: "null".to_string(),
                description: "null device".to_string(),
                dedicated_video_memory: 0,
                software: true,
            },
            commands: Rc::new(RefCell::new(Vec::new())),
            fail_map: Rc::new(Cell::new(false)),
            next_id: Cell::new(0),
        })
    }

    fn create_swap_chain<A: os::App>(
        &mut self,
        _info: &SwapChainInfo,
        win: &A::Window,
    ) -> Result<SwapChain, Error> {
        let rect = win.get_viewport_rect();
        Ok(SwapChain {
            width: rect.width.max(0) as u32,
            height: rect.height.max(0) as u32,
            commands: self.commands.clone(),
        })
    }

    fn create_cmd_buf(&self) -> CmdBuf {
        CmdBuf {
            commands: self.commands.clone(),
            fail_map: self.fail_map.clone(),
        }
    }

    fn create_buffer<T: Sized>(
        &mut self,
        info: &BufferInfo,
        data: Option<&[T]>,
    ) -> Result<Buffer, Error> {
        let bytes = data.map(super::slice_as_u8_slice);
        super::validate_buffer_info(info, bytes.map(|b| b.len()))?;
        let contents = match bytes {
            Some(bytes) => bytes.to_vec(),
            None => vec![0; info.size_bytes()],
        };
        Ok(Buffer {
            id: self.next_id(),
            info: info.clone(),
            data: Rc::new(RefCell::new(contents)),
        })
    }

    fn create_shader(&self, info: &ShaderInfo, src: &[u8]) -> Result<Shader, Error> {
        if src.is_empty() {
            return Err(Error {
                msg: "hotline_labs::gfx::null: shader source is empty".to_string()
            });
        }
        if let Some(compile_info) = &info.compile_info {
            let text = String::from_utf8_lossy(src);
            if !text.contains(compile_info.entry_point.as_str()) {
                return Err(Error {
                    msg: format!("hotline_labs::gfx::null: entry point {} not found", compile_info.entry_point)
                });
            }
        }
        Ok(Shader {
            shader_type: info.shader_type,
        })
    }

    fn create_render_pipeline(&self, info: &RenderPipelineInfo<Device>) -> Result<RenderPipeline, Error> {
        super::validate_render_pipeline_info(info)?;
        Ok(RenderPipeline {
            id: self.next_id(),
            topology: info.topology,
        })
    }

    fn get_adapter_info(&self) -> &AdapterInfo {
        &self.adapter_info
    }
}

impl super::SwapChain<Device> for SwapChain {
    fn resize(&mut self, _device: &mut Device, width: u32, height: u32) -> Result<(), Error> {
        if !os::is_valid_size(width, height) {
            return Err(Error {
                msg: format!("hotline_labs::gfx::null: invalid swap chain size {}x{}", width, height)
            });
        }
        self.width = width;
        self.height = height;
        self.commands.borrow_mut().push(Command::ResizeSwapChain { width, height });
        Ok(())
    }

    fn get_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn present(&mut self, sync_interval: u32) -> Result<(), Error> {
        self.commands.borrow_mut().push(Command::Present { sync_interval });
        Ok(())
    }
}

impl CmdBuf {
    fn push(&self, command: Command) {
        self.commands.borrow_mut().push(command);
    }
}

impl super::CmdBuf<Device> for CmdBuf {
    fn clear_render_target(&mut self, _swap_chain: &SwapChain, colour: ClearColour) {
        self.push(Command::ClearRenderTarget(colour));
    }

    fn set_viewport(&mut self, viewport: &Viewport) {
        self.push(Command::SetViewport(*viewport));
    }

    fn set_vertex_buffer(&mut self, buffer: &Buffer, slot: u32) {
        self.push(Command::SetVertexBuffer { buffer: buffer.id, slot });
    }

    fn set_index_buffer(&mut self, buffer: &Buffer) {
        self.push(Command::SetIndexBuffer(buffer.id));
    }

    fn set_render_pipeline(&mut self, pipeline: &RenderPipeline) {
        self.push(Command::SetRenderPipeline(pipeline.id));
    }

    fn set_constant_buffers(&mut self, start_slot: u32, buffers: &[&Buffer]) {
        self.push(Command::SetConstantBuffers {
            start_slot,
            buffers: buffers.iter().map(|b| b.id).collect(),
        });
    }

    fn update_buffer<T: Sized>(&mut self, buffer: &Buffer, data: &[T]) -> Result<(), Error> {
        let bytes = super::slice_as_u8_slice(data);
        super::validate_buffer_update::<Device>(buffer, bytes.len())?;
        buffer.data.borrow_mut().copy_from_slice(bytes);
        self.push(Command::UpdateBuffer { buffer: buffer.id, data: bytes.to_vec() });
        Ok(())
    }

    fn write_buffer<T: Sized>(&mut self, buffer: &Buffer, data: &[T]) -> Result<(), Error> {
        if self.fail_map.get() {
            return Err(Error {
                msg: format!("hotline_labs::gfx::null: failed to map buffer {}", buffer.id)
            });
        }
        let bytes = super::slice_as_u8_slice(data);
        {
            // discard semantics, previous contents are not preserved
            let mut contents = buffer.data.borrow_mut();
            contents.iter_mut().for_each(|b| *b = 0);
            let len = bytes.len().min(contents.len());
            contents[..len].copy_from_slice(&bytes[..len]);
        }
        self.push(Command::WriteBuffer { buffer: buffer.id, data: bytes.to_vec() });
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, start_index: u32, base_vertex: i32) {
        self.push(Command::DrawIndexed { index_count, start_index, base_vertex });
    }
}

impl super::Buffer<Device> for Buffer {
    fn get_info(&self) -> &BufferInfo {
        &self.info
    }
}

impl super::Shader<Device> for Shader {
    fn get_type(&self) -> ShaderType {
        self.shader_type
    }
}

impl super::RenderPipeline<Device> for RenderPipeline {
    fn get_topology(&self) -> Topology {
        self.topology
    }
}
