use crate::gfx;
use crate::primitives;

/// Passes clip space positions straight through
pub const TRIANGLE_VS: &str = r#"
struct vs_input {
    float3 position : POSITION;
    float4 colour : COLOR;
};

struct vs_output {
    float4 position : SV_POSITION;
    float4 colour : COLOR;
};

vs_output main(vs_input input) {
    vs_output output;
    output.position = float4(input.position, 1.0);
    output.colour = input.colour;
    return output;
}
"#;

/// Transforms by the world matrix in b0 then the view projection in b1.
/// Both are uploaded transposed so the default column major packing reads them as row vector matrices.
pub const CUBE_VS: &str = r#"
cbuffer world_constants : register(b0) {
    float4x4 world;
};

cbuffer camera_constants : register(b1) {
    float4x4 view_projection;
};

struct vs_input {
    float3 position : POSITION;
    float4 colour : COLOR;
};

struct vs_output {
    float4 position : SV_POSITION;
    float4 colour : COLOR;
};

vs_output main(vs_input input) {
    vs_output output;
    float4 world_pos = mul(float4(input.position, 1.0), world);
    output.position = mul(world_pos, view_projection);
    output.colour = input.colour;
    return output;
}
"#;

/// Outputs the interpolated vertex colour, shared by the triangle and cube
pub const COLOUR_PS: &str = r#"
struct ps_input {
    float4 position : SV_POSITION;
    float4 colour : COLOR;
};

float4 main(ps_input input) : SV_TARGET {
    return input.colour;
}
"#;

pub const ENTRY_POINT: &str = "main";

/// Strict compilation, debug info and no optimisation when `debug` is set
pub fn compile_flags(debug: bool) -> gfx::ShaderCompileFlags {
    if debug {
        gfx::ShaderCompileFlags::STRICTNESS
            | gfx::ShaderCompileFlags::DEBUG
            | gfx::ShaderCompileFlags::SKIP_OPTIMIZATION
    }
    else {
        gfx::ShaderCompileFlags::STRICTNESS
    }
}

fn shader_info(shader_type: gfx::ShaderType, debug: bool) -> gfx::ShaderInfo {
    let target = match shader_type {
        gfx::ShaderType::Vertex => "vs_5_0",
        gfx::ShaderType::Fragment => "ps_5_0",
    };
    gfx::ShaderInfo {
        shader_type,
        compile_info: Some(gfx::ShaderCompileInfo {
            entry_point: ENTRY_POINT.to_string(),
            target: target.to_string(),
            flags: compile_flags(debug),
        }),
    }
}

/// Compiles `vs_src` and `ps_src` and creates a triangle list pipeline with the `primitives::Vertex` layout
pub fn create_pipeline<D: gfx::Device>(
    dev: &D,
    vs_src: &str,
    ps_src: &str,
    debug: bool,
) -> Result<D::RenderPipeline, crate::Error> {
    let vs = dev.create_shader(&shader_info(gfx::ShaderType::Vertex, debug), vs_src.as_bytes())?;
    let fs = dev.create_shader(&shader_info(gfx::ShaderType::Fragment, debug), ps_src.as_bytes())?;
    dev.create_render_pipeline(&gfx::RenderPipelineInfo {
        vs: &vs,
        fs: &fs,
        input_layout: primitives::vertex_layout(),
        topology: gfx::Topology::TriangleList,
    })
}
