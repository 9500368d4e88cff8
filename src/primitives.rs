use crate::gfx;

/// Position and packed rgba8 colour, matches the `POSITION`/`COLOR` input layout
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub colour: [u8; 4],
}

impl Vertex {
    pub const fn new(position: [f32; 3], colour: [u8; 4]) -> Self {
        Vertex { position, colour }
    }

    /// Vertex with a colour packed as `0xAABBGGRR`, red in the lowest byte
    pub fn packed(position: [f32; 3], abgr: u32) -> Self {
        Vertex {
            position,
            colour: abgr.to_le_bytes(),
        }
    }
}

/// Vertex and index buffers of an indexed mesh
pub struct Mesh<D: gfx::Device> {
    pub vb: D::Buffer,
    pub ib: D::Buffer,
    pub num_indices: u32,
}

const fn rgb(r: u8, g: u8, b: u8) -> [u8; 4] {
    [r, g, b, 255]
}

/// Unit cube centred at the origin, one colour per corner. The front face sits at z = -0.5.
pub const CUBE_VERTICES: [Vertex; 8] = [
    Vertex::new([-0.5, -0.5, -0.5], rgb(255, 0, 0)),
    Vertex::new([0.5, -0.5, -0.5], rgb(0, 0, 255)),
    Vertex::new([0.5, 0.5, -0.5], rgb(0, 255, 0)),
    Vertex::new([-0.5, 0.5, -0.5], rgb(255, 255, 0)),
    Vertex::new([-0.5, -0.5, 0.5], rgb(255, 0, 255)),
    Vertex::new([0.5, -0.5, 0.5], rgb(0, 255, 255)),
    Vertex::new([0.5, 0.5, 0.5], rgb(255, 128, 0)),
    Vertex::new([-0.5, 0.5, 0.5], rgb(128, 128, 128)),
];

/// Two clockwise triangles per face
pub const CUBE_INDICES: [u16; 36] = [
    0, 1, 2, 0, 2, 3, // front
    4, 6, 5, 4, 7, 6, // back
    0, 4, 5, 0, 5, 1, // bottom
    3, 2, 6, 3, 6, 7, // top
    0, 3, 7, 0, 7, 4, // left
    1, 5, 6, 1, 6, 2, // right
];

pub const TRIANGLE_INDICES: [u16; 3] = [0, 2, 1];

/// Green, red and blue corners of a triangle in clip space
pub fn triangle_vertices() -> [Vertex; 3] {
    [
        Vertex::packed([-0.5, -0.5, 0.0], 0xff00ff00),
        Vertex::packed([0.5, -0.5, 0.0], 0xff0000ff),
        Vertex::packed([0.0, 0.5, 0.0], 0xffff0000),
    ]
}

/// Input layout matching `Vertex`
pub fn vertex_layout() -> Vec<gfx::InputElementInfo> {
    vec![
        gfx::InputElementInfo {
            semantic: "POSITION".to_string(),
            index: 0,
            format: gfx::Format::RGB32f,
            input_slot: 0,
            aligned_byte_offset: 0,
        },
        gfx::InputElementInfo {
            semantic: "COLOR".to_string(),
            index: 0,
            format: gfx::Format::RGBA8n,
            input_slot: 0,
            aligned_byte_offset: 12,
        },
    ]
}

/// Creates immutable vertex and 16 bit index buffers
pub fn create_mesh<D: gfx::Device>(dev: &mut D, vertices: &[Vertex], indices: &[u16]) -> Result<Mesh<D>, crate::Error> {
    let vb = dev.create_buffer(&gfx::BufferInfo {
            usage: gfx::BufferUsage::Vertex,
            resource_usage: gfx::ResourceUsage::Immutable,
            cpu_access: gfx::CpuAccessFlags::NONE,
            format: gfx::Format::Unknown,
            stride: std::mem::size_of::<Vertex>(),
            num_elements: vertices.len(),
        },
        Some(vertices)
    )?;

    let ib = dev.create_buffer(&gfx::BufferInfo {
            usage: gfx::BufferUsage::Index,
            resource_usage: gfx::ResourceUsage::Immutable,
            cpu_access: gfx::CpuAccessFlags::NONE,
            format: gfx::Format::R16u,
            stride: std::mem::size_of::<u16>(),
            num_elements: indices.len(),
        },
        Some(indices)
    )?;

    Ok(Mesh {
        vb,
        ib,
        num_indices: indices.len() as u32,
    })
}

pub fn create_cube_mesh<D: gfx::Device>(dev: &mut D) -> Result<Mesh<D>, crate::Error> {
    create_mesh(dev, &CUBE_VERTICES, &CUBE_INDICES)
}

pub fn create_triangle_mesh<D: gfx::Device>(dev: &mut D) -> Result<Mesh<D>, crate::Error> {
    create_mesh(dev, &triangle_vertices(), &TRIANGLE_INDICES)
}
