use super::AdapterInfo;
use super::BufferInfo;
use super::BufferUsage;
use super::ClearColour;
use super::CpuAccessFlags;
use super::DeviceInfo;
use super::Format;
use super::RenderPipelineInfo;
use super::ResourceUsage;
use super::ShaderCompileFlags;
use super::ShaderInfo;
use super::ShaderType;
use super::SwapChainInfo;
use super::Topology;
use super::Viewport;

use crate::os;
use crate::os::NativeHandle;
use crate::os::Window;
use crate::Error;

use windows::{
    core::*,
    Win32::Foundation::*,
    Win32::Graphics::Direct3D::Fxc::*,
    Win32::Graphics::Direct3D::*,
    Win32::Graphics::Direct3D11::*,
    Win32::Graphics::Dxgi::Common::*,
    Win32::Graphics::Dxgi::*,
};

use std::ffi::c_void;
use std::ffi::CString;

pub struct Device {
    device: ID3D11Device,
    context: ID3D11DeviceContext,
    adapter_info: AdapterInfo,
}

pub struct SwapChain {
    swap_chain: IDXGISwapChain,
    rtv: Option<ID3D11RenderTargetView>,
    width: u32,
    height: u32,
}

pub struct CmdBuf {
    context: ID3D11DeviceContext,
}

pub struct Buffer {
    buffer: ID3D11Buffer,
    info: BufferInfo,
}

pub struct Shader {
    shader_type: ShaderType,
    vs: Option<ID3D11VertexShader>,
    ps: Option<ID3D11PixelShader>,
    // bytecode is kept to validate input layouts against the vertex shader signature
    byte_code: Vec<u8>,
}

pub struct RenderPipeline {
    vs: ID3D11VertexShader,
    ps: ID3D11PixelShader,
    input_layout: ID3D11InputLayout,
    topology: Topology,
}

fn to_dxgi_format(format: Format) -> DXGI_FORMAT {
    match format {
        Format::Unknown => DXGI_FORMAT_UNKNOWN,
        Format::R16u => DXGI_FORMAT_R16_UINT,
        Format::R32u => DXGI_FORMAT_R32_UINT,
        Format::RGB32f => DXGI_FORMAT_R32G32B32_FLOAT,
        Format::RGBA8n => DXGI_FORMAT_R8G8B8A8_UNORM,
    }
}

fn to_d3d11_usage(usage: ResourceUsage) -> D3D11_USAGE {
    match usage {
        ResourceUsage::Immutable => D3D11_USAGE_IMMUTABLE,
        ResourceUsage::Default => D3D11_USAGE_DEFAULT,
        ResourceUsage::Dynamic => D3D11_USAGE_DYNAMIC,
    }
}

fn to_d3d11_bind_flags(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::Vertex => D3D11_BIND_VERTEX_BUFFER.0 as u32,
        BufferUsage::Index => D3D11_BIND_INDEX_BUFFER.0 as u32,
        BufferUsage::ConstantBuffer => D3D11_BIND_CONSTANT_BUFFER.0 as u32,
    }
}

fn to_d3d11_cpu_access(flags: CpuAccessFlags) -> u32 {
    let mut access = 0;
    if flags.contains(CpuAccessFlags::WRITE) {
        access |= D3D11_CPU_ACCESS_WRITE.0 as u32;
    }
    access
}

fn to_d3d_compile_flags(flags: ShaderCompileFlags) -> u32 {
    let mut d3d_flags = 0;
    if flags.contains(ShaderCompileFlags::STRICTNESS) {
        d3d_flags |= D3DCOMPILE_ENABLE_STRICTNESS;
    }
    if flags.contains(ShaderCompileFlags::DEBUG) {
        d3d_flags |= D3DCOMPILE_DEBUG;
    }
    if flags.contains(ShaderCompileFlags::SKIP_OPTIMIZATION) {
        d3d_flags |= D3DCOMPILE_SKIP_OPTIMIZATION;
    }
    d3d_flags
}

fn to_d3d_topology(topology: Topology) -> D3D_PRIMITIVE_TOPOLOGY {
    match topology {
        Topology::TriangleList => D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST,
    }
}

fn blob_as_slice(blob: &ID3DBlob) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize())
    }
}

fn utf16_to_string(wide: &[u16]) -> String {
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    String::from_utf16_lossy(&wide[..len])
}

fn create_device(
    driver_type: D3D_DRIVER_TYPE,
    flags: D3D11_CREATE_DEVICE_FLAG,
) -> std::result::Result<(ID3D11Device, ID3D11DeviceContext), Error> {
    let feature_levels = [D3D_FEATURE_LEVEL_11_0];
    let mut device = None;
    let mut context = None;
    unsafe {
        D3D11CreateDevice(
            None,
            driver_type,
            HMODULE::default(),
            flags,
            Some(&feature_levels),
            D3D11_SDK_VERSION,
            Some(&mut device),
            None,
            Some(&mut context),
        )?;
    }
    match (device, context) {
        (Some(device), Some(context)) => Ok((device, context)),
        _ => Err(Error {
            msg: "hotline_labs::gfx::d3d11: D3D11CreateDevice returned no device".to_string()
        })
    }
}

fn get_adapter_info(device: &ID3D11Device, software: bool) -> std::result::Result<AdapterInfo, Error> {
    unsafe {
        let dxgi_device: IDXGIDevice = device.cast()?;
        let adapter = dxgi_device.GetAdapter()?;
        let desc = adapter.GetDesc()?;
        let description = utf16_to_string(&desc.Description);
        Ok(AdapterInfo {
            name: description.clone(),
            description: format!("vendor: {:#06x} device: {:#06x}", desc.VendorId, desc.DeviceId),
            dedicated_video_memory: desc.DedicatedVideoMemory,
            software,
        })
    }
}

fn create_render_target_view(
    device: &ID3D11Device,
    swap_chain: &IDXGISwapChain,
) -> std::result::Result<ID3D11RenderTargetView, Error> {
    unsafe {
        let back_buffer: ID3D11Texture2D = swap_chain.GetBuffer(0)?;
        let mut rtv = None;
        device.CreateRenderTargetView(&back_buffer, None, Some(&mut rtv))?;
        rtv.ok_or_else(|| Error {
            msg: "hotline_labs::gfx::d3d11: failed to create back buffer render target view".to_string()
        })
    }
}

impl super::Device for Device {
    type SwapChain = SwapChain;
    type CmdBuf = CmdBuf;
    type Buffer = Buffer;
    type Shader = Shader;
    type RenderPipeline = RenderPipeline;

    fn create(info: &DeviceInfo) -> std::result::Result<Device, Error> {
        let mut flags = D3D11_CREATE_DEVICE_SINGLETHREADED;
        if info.debug_layer {
            flags |= D3D11_CREATE_DEVICE_DEBUG;
        }

        let (device, context, software) = if info.use_warp {
            let (device, context) = create_device(D3D_DRIVER_TYPE_WARP, flags)?;
            (device, context, true)
        }
        else {
            match create_device(D3D_DRIVER_TYPE_HARDWARE, flags) {
                Ok((device, context)) => (device, context, false),
                Err(err) => {
                    log::warn!("hotline_labs::gfx::d3d11: hardware device unavailable ({}), falling back to warp", err);
                    let (device, context) = create_device(D3D_DRIVER_TYPE_WARP, flags)?;
                    (device, context, true)
                }
            }
        };

        let adapter_info = get_adapter_info(&device, software)?;
        log::info!("hotline_labs::gfx::d3d11: created device on {}", adapter_info);

        Ok(Device {
            device,
            context,
            adapter_info,
        })
    }

    fn create_swap_chain<A: os::App>(
        &mut self,
        info: &SwapChainInfo,
        win: &A::Window,
    ) -> std::result::Result<SwapChain, Error> {
        let rect = win.get_viewport_rect();
        let width = rect.width.max(1) as u32;
        let height = rect.height.max(1) as u32;
        let hwnd = HWND(win.get_native_handle().get_isize() as *mut c_void);

        unsafe {
            // the factory which created the device's adapter must create the swap chain
            let dxgi_device: IDXGIDevice = self.device.cast()?;
            let adapter = dxgi_device.GetAdapter()?;
            let factory: IDXGIFactory = adapter.GetParent()?;

            let desc = DXGI_SWAP_CHAIN_DESC {
                BufferDesc: DXGI_MODE_DESC {
                    Width: width,
                    Height: height,
                    Format: to_dxgi_format(info.format),
                    ..Default::default()
                },
                SampleDesc: DXGI_SAMPLE_DESC {
                    Count: 1,
                    Quality: 0,
                },
                BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
                BufferCount: info.num_buffers,
                OutputWindow: hwnd,
                Windowed: TRUE,
                SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
                Flags: 0,
            };

            let mut swap_chain = None;
            factory.CreateSwapChain(&self.device, &desc, &mut swap_chain).ok()?;
            let swap_chain = swap_chain.ok_or_else(|| Error {
                msg: "hotline_labs::gfx::d3d11: CreateSwapChain returned no swap chain".to_string()
            })?;

            let rtv = create_render_target_view(&self.device, &swap_chain)?;

            Ok(SwapChain {
                swap_chain,
                rtv: Some(rtv),
                width,
                height,
            })
        }
    }

    fn create_cmd_buf(&self) -> CmdBuf {
        CmdBuf {
            context: self.context.clone(),
        }
    }

    fn create_buffer<T: Sized>(
        &mut self,
        info: &BufferInfo,
        data: Option<&[T]>,
    ) -> std::result::Result<Buffer, Error> {
        let bytes = data.map(super::slice_as_u8_slice);
        super::validate_buffer_info(info, bytes.map(|b| b.len()))?;

        let desc = D3D11_BUFFER_DESC {
            ByteWidth: info.size_bytes() as u32,
            Usage: to_d3d11_usage(info.resource_usage),
            BindFlags: to_d3d11_bind_flags(info.usage),
            CPUAccessFlags: to_d3d11_cpu_access(info.cpu_access),
            MiscFlags: 0,
            StructureByteStride: 0,
        };

        let mut buffer = None;
        unsafe {
            match bytes {
                Some(bytes) => {
                    let init = D3D11_SUBRESOURCE_DATA {
                        pSysMem: bytes.as_ptr() as *const c_void,
                        SysMemPitch: 0,
                        SysMemSlicePitch: 0,
                    };
                    self.device.CreateBuffer(&desc, Some(&init), Some(&mut buffer))?;
                }
                None => {
                    self.device.CreateBuffer(&desc, None, Some(&mut buffer))?;
                }
            }
        }

        let buffer = buffer.ok_or_else(|| Error {
            msg: "hotline_labs::gfx::d3d11: CreateBuffer returned no buffer".to_string()
        })?;

        Ok(Buffer {
            buffer,
            info: info.clone(),
        })
    }

    fn create_shader(&self, info: &ShaderInfo, src: &[u8]) -> std::result::Result<Shader, Error> {
        let byte_code = if let Some(compile_info) = &info.compile_info {
            let entry_point = CString::new(compile_info.entry_point.as_str())
                .map_err(|_| Error::from("hotline_labs::gfx::d3d11: entry point contains a nul byte"))?;
            let target = CString::new(compile_info.target.as_str())
                .map_err(|_| Error::from("hotline_labs::gfx::d3d11: target contains a nul byte"))?;

            let mut blob = None;
            let mut errors = None;
            let result = unsafe {
                D3DCompile(
                    src.as_ptr() as *const c_void,
                    src.len(),
                    None,
                    None,
                    None,
                    PCSTR(entry_point.as_ptr() as _),
                    PCSTR(target.as_ptr() as _),
                    to_d3d_compile_flags(compile_info.flags),
                    0,
                    &mut blob,
                    Some(&mut errors),
                )
            };

            if let Err(err) = result {
                let msg = match &errors {
                    Some(errors) => String::from_utf8_lossy(blob_as_slice(errors)).to_string(),
                    None => err.message().to_string(),
                };
                return Err(Error {
                    msg: format!("hotline_labs::gfx::d3d11: failed to compile {}: {}", compile_info.entry_point, msg)
                });
            }

            let blob = blob.ok_or_else(|| Error {
                msg: "hotline_labs::gfx::d3d11: D3DCompile returned no bytecode".to_string()
            })?;
            blob_as_slice(&blob).to_vec()
        }
        else {
            src.to_vec()
        };

        let mut vs = None;
        let mut ps = None;
        unsafe {
            match info.shader_type {
                ShaderType::Vertex => self.device.CreateVertexShader(&byte_code, None, Some(&mut vs))?,
                ShaderType::Fragment => self.device.CreatePixelShader(&byte_code, None, Some(&mut ps))?,
            }
        }

        Ok(Shader {
            shader_type: info.shader_type,
            vs,
            ps,
            byte_code,
        })
    }

    fn create_render_pipeline(
        &self,
        info: &RenderPipelineInfo<Device>,
    ) -> std::result::Result<RenderPipeline, Error> {
        super::validate_render_pipeline_info(info)?;
        let vs = info.vs.vs.clone().ok_or_else(|| Error::from(
            "hotline_labs::gfx::d3d11: render pipeline vs is not a vertex shader"
        ))?;
        let ps = info.fs.ps.clone().ok_or_else(|| Error::from(
            "hotline_labs::gfx::d3d11: render pipeline fs is not a pixel shader"
        ))?;

        // semantic names must outlive the CreateInputLayout call
        let mut semantics = Vec::new();
        for element in &info.input_layout {
            semantics.push(CString::new(element.semantic.as_str())
                .map_err(|_| Error::from("hotline_labs::gfx::d3d11: semantic contains a nul byte"))?);
        }

        let descs: Vec<D3D11_INPUT_ELEMENT_DESC> = info.input_layout.iter()
            .zip(&semantics)
            .map(|(element, semantic)| D3D11_INPUT_ELEMENT_DESC {
                SemanticName: PCSTR(semantic.as_ptr() as _),
                SemanticIndex: element.index,
                Format: to_dxgi_format(element.format),
                InputSlot: element.input_slot,
                AlignedByteOffset: element.aligned_byte_offset,
                InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                InstanceDataStepRate: 0,
            })
            .collect();

        let mut input_layout = None;
        unsafe {
            self.device.CreateInputLayout(&descs, &info.vs.byte_code, Some(&mut input_layout))?;
        }
        let input_layout = input_layout.ok_or_else(|| Error::from(
            "hotline_labs::gfx::d3d11: CreateInputLayout returned no layout"
        ))?;

        Ok(RenderPipeline {
            vs,
            ps,
            input_layout,
            topology: info.topology,
        })
    }

    fn get_adapter_info(&self) -> &AdapterInfo {
        &self.adapter_info
    }
}

impl super::SwapChain<Device> for SwapChain {
    fn resize(&mut self, device: &mut Device, width: u32, height: u32) -> std::result::Result<(), Error> {
        if !os::is_valid_size(width, height) || (width == self.width && height == self.height) {
            return Ok(());
        }
        unsafe {
            // all references to the back buffers must be released before ResizeBuffers
            device.context.OMSetRenderTargets(None, None);
            self.rtv = None;
            self.swap_chain.ResizeBuffers(0, width, height, DXGI_FORMAT_UNKNOWN, DXGI_SWAP_CHAIN_FLAG(0))?;
        }
        self.rtv = Some(create_render_target_view(&device.device, &self.swap_chain)?);
        self.width = width;
        self.height = height;
        log::debug!("hotline_labs::gfx::d3d11: resized swap chain {}x{}", width, height);
        Ok(())
    }

    fn get_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn present(&mut self, sync_interval: u32) -> std::result::Result<(), Error> {
        unsafe {
            self.swap_chain.Present(sync_interval, DXGI_PRESENT(0)).ok()?;
        }
        Ok(())
    }
}

impl super::CmdBuf<Device> for CmdBuf {
    fn clear_render_target(&mut self, swap_chain: &SwapChain, colour: ClearColour) {
        if let Some(rtv) = &swap_chain.rtv {
            unsafe {
                self.context.OMSetRenderTargets(Some(&[Some(rtv.clone())]), None);
                self.context.ClearRenderTargetView(rtv, &colour.as_array());
            }
        }
    }

    fn set_viewport(&mut self, viewport: &Viewport) {
        let vp = D3D11_VIEWPORT {
            TopLeftX: viewport.x,
            TopLeftY: viewport.y,
            Width: viewport.width,
            Height: viewport.height,
            MinDepth: viewport.min_depth,
            MaxDepth: viewport.max_depth,
        };
        unsafe {
            self.context.RSSetViewports(Some(&[vp]));
        }
    }

    fn set_vertex_buffer(&mut self, buffer: &Buffer, slot: u32) {
        let stride = buffer.info.stride as u32;
        let offset = 0;
        unsafe {
            self.context.IASetVertexBuffers(
                slot,
                1,
                Some(&Some(buffer.buffer.clone())),
                Some(&stride),
                Some(&offset),
            );
        }
    }

    fn set_index_buffer(&mut self, buffer: &Buffer) {
        unsafe {
            self.context.IASetIndexBuffer(&buffer.buffer, to_dxgi_format(buffer.info.format), 0);
        }
    }

    fn set_render_pipeline(&mut self, pipeline: &RenderPipeline) {
        unsafe {
            self.context.IASetInputLayout(&pipeline.input_layout);
            self.context.IASetPrimitiveTopology(to_d3d_topology(pipeline.topology));
            self.context.VSSetShader(&pipeline.vs, None);
            self.context.PSSetShader(&pipeline.ps, None);
        }
    }

    fn set_constant_buffers(&mut self, start_slot: u32, buffers: &[&Buffer]) {
        let buffers: Vec<Option<ID3D11Buffer>> = buffers.iter()
            .map(|b| Some(b.buffer.clone()))
            .collect();
        unsafe {
            self.context.VSSetConstantBuffers(start_slot, Some(&buffers));
        }
    }

    fn update_buffer<T: Sized>(&mut self, buffer: &Buffer, data: &[T]) -> std::result::Result<(), Error> {
        // UpdateSubresource reads the full buffer width from the source pointer
        super::validate_buffer_update::<Device>(buffer, std::mem::size_of_val(data))?;
        unsafe {
            self.context.UpdateSubresource(&buffer.buffer, 0, None, data.as_ptr() as *const c_void, 0, 0);
        }
        Ok(())
    }

    fn write_buffer<T: Sized>(&mut self, buffer: &Buffer, data: &[T]) -> std::result::Result<(), Error> {
        let bytes = super::slice_as_u8_slice(data);
        let len = bytes.len().min(buffer.info.size_bytes());
        unsafe {
            let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
            self.context.Map(&buffer.buffer, 0, D3D11_MAP_WRITE_DISCARD, 0, Some(&mut mapped))?;
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), mapped.pData as *mut u8, len);
            self.context.Unmap(&buffer.buffer, 0);
        }
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, start_index: u32, base_vertex: i32) {
        unsafe {
            self.context.DrawIndexed(index_count, start_index, base_vertex);
        }
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
