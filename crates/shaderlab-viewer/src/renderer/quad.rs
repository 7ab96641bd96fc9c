use anyhow::{anyhow, Result};
use glow::HasContext;
use log::debug;

/// Interleaved quad vertex: position then texture coordinate.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl QuadVertex {
    const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y, 0.0],
            tex_coord: [u, v],
        }
    }
}

/// Full-screen quad, top-left first, clockwise.
pub const VERTICES: [QuadVertex; 4] = [
    QuadVertex::new(-1.0, 1.0, 0.0, 1.0),
    QuadVertex::new(1.0, 1.0, 1.0, 1.0),
    QuadVertex::new(1.0, -1.0, 1.0, 0.0),
    QuadVertex::new(-1.0, -1.0, 0.0, 0.0),
];

pub const INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

const STRIDE: i32 = std::mem::size_of::<QuadVertex>() as i32;
const TEX_COORD_OFFSET: i32 = std::mem::offset_of!(QuadVertex, tex_coord) as i32;

/// The quad's GL buffers and the attribute slots its pointers are set on.
pub struct Quad {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    /// `(position, tex_coord)` currently enabled, if any.
    slots: Option<(u32, u32)>,
}

impl Quad {
    pub fn new(gl: &glow::Context) -> Result<Self> {
        unsafe {
            let vao = gl
                .create_vertex_array()
                .map_err(|e| anyhow!("create_vertex_array: {e}"))?;
            let vbo = gl.create_buffer().map_err(|e| anyhow!("create_buffer: {e}"))?;
            let ebo = gl.create_buffer().map_err(|e| anyhow!("create_buffer: {e}"))?;

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&VERTICES),
                glow::STATIC_DRAW,
            );
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(&INDICES),
                glow::STATIC_DRAW,
            );
            gl.bind_vertex_array(None);

            Ok(Self {
                vao,
                vbo,
                ebo,
                slots: None,
            })
        }
    }

    /// Points the vertex attributes at `position` and `tex_coord`.
    ///
    /// Needed after every relink: a new program may place its inputs in
    /// different slots.
    pub fn bind_attributes(&mut self, gl: &glow::Context, position: u32, tex_coord: u32) {
        if self.slots == Some((position, tex_coord)) {
            return;
        }
        debug!("Quad attributes at position={position}, tex_coord={tex_coord}");

        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            if let Some((old_position, old_tex_coord)) = self.slots {
                gl.disable_vertex_attrib_array(old_position);
                gl.disable_vertex_attrib_array(old_tex_coord);
            }
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            gl.vertex_attrib_pointer_f32(position, 3, glow::FLOAT, false, STRIDE, 0);
            gl.enable_vertex_attrib_array(position);
            gl.vertex_attrib_pointer_f32(
                tex_coord,
                2,
                glow::FLOAT,
                false,
                STRIDE,
                TEX_COORD_OFFSET,
            );
            gl.enable_vertex_attrib_array(tex_coord);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_vertex_array(None);
        }
        self.slots = Some((position, tex_coord));
    }

    pub fn draw(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_elements(glow::TRIANGLES, INDICES.len() as i32, glow::UNSIGNED_INT, 0);
            gl.bind_vertex_array(None);
        }
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
        }
        self.slots = None;
    }
}
