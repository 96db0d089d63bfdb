//! Programmatic document construction for integration tests.
//!
//! Packs typed data into a single buffer (4-byte aligned per view, as GLB
//! writers do) and records matching buffer views and accessors.

#![allow(dead_code)]

use nether_gltf::Buffers;
use nether_gltf::schema::{
    Accessor, Animation, Buffer, BufferView, Channel, ComponentType, Document, ElementType,
    Interpolation, Sampler, TargetPath,
};

/// Align buffer to 4-byte boundary
pub fn align_buffer(buffer: &mut Vec<u8>) {
    while buffer.len() % 4 != 0 {
        buffer.push(0);
    }
}

/// Builder for a one-buffer document
pub struct DocumentBuilder {
    pub document: Document,
    buffer: Vec<u8>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self {
            document: Document::default(),
            buffer: Vec::new(),
        }
    }

    /// Append raw bytes as a new buffer view; returns the view index
    pub fn push_view(&mut self, bytes: &[u8], byte_stride: Option<usize>) -> usize {
        align_buffer(&mut self.buffer);
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);

        let mut view = BufferView::new(0, offset, bytes.len());
        view.byte_stride = byte_stride;
        self.document.buffer_views.push(view);
        self.document.buffer_views.len() - 1
    }

    pub fn push_accessor(&mut self, accessor: Accessor) -> usize {
        self.document.accessors.push(accessor);
        self.document.accessors.len() - 1
    }

    /// Pack FLOAT data; `data.len()` must be a multiple of the element size
    pub fn pack_f32(&mut self, data: &[f32], element_type: ElementType) -> usize {
        let view = self.push_view(bytemuck::cast_slice(data), None);
        let count = data.len() / element_type.components();
        self.push_accessor(Accessor::new(ComponentType::F32, element_type, count).with_view(view, 0))
    }

    pub fn pack_u8(&mut self, data: &[u8], element_type: ElementType, normalized: bool) -> usize {
        let view = self.push_view(data, None);
        let count = data.len() / element_type.components();
        self.push_accessor(
            Accessor::new(ComponentType::U8, element_type, count)
                .with_view(view, 0)
                .with_normalized(normalized),
        )
    }

    pub fn pack_u16(&mut self, data: &[u16], element_type: ElementType) -> usize {
        let view = self.push_view(bytemuck::cast_slice(data), None);
        let count = data.len() / element_type.components();
        self.push_accessor(Accessor::new(ComponentType::U16, element_type, count).with_view(view, 0))
    }

    pub fn pack_i16(&mut self, data: &[i16], element_type: ElementType, normalized: bool) -> usize {
        let view = self.push_view(bytemuck::cast_slice(data), None);
        let count = data.len() / element_type.components();
        self.push_accessor(
            Accessor::new(ComponentType::I16, element_type, count)
                .with_view(view, 0)
                .with_normalized(normalized),
        )
    }

    /// Add a one-sampler channel; creates the animation on first use
    pub fn push_channel(
        &mut self,
        animation: usize,
        node: usize,
        path: TargetPath,
        interpolation: Interpolation,
        times: &[f32],
        values: &[f32],
    ) -> usize {
        let element_type = match path {
            TargetPath::Translation | TargetPath::Scale => ElementType::Vec3,
            TargetPath::Rotation => ElementType::Vec4,
            TargetPath::Weights => ElementType::Scalar,
        };
        let input = self.pack_f32(times, ElementType::Scalar);
        let output = self.pack_f32(values, element_type);

        while self.document.animations.len() <= animation {
            self.document.animations.push(Animation::default());
        }
        let anim = &mut self.document.animations[animation];
        anim.samplers.push(Sampler::new(input, output, interpolation));
        anim.channels
            .push(Channel::new(anim.samplers.len() - 1, node, path));
        anim.channels.len() - 1
    }

    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Document (with its buffer declared) and the matching resident bytes
    pub fn finish(mut self) -> (Document, Buffers) {
        align_buffer(&mut self.buffer);
        self.document.buffers = vec![Buffer::new(self.buffer.len())];
        (self.document, Buffers::new(vec![self.buffer]))
    }
}

/// Assemble GLB binary from a document and its single buffer
pub fn assemble_glb(document: &Document, buffer_data: &[u8]) -> Vec<u8> {
    let json_string = document.to_json_string().unwrap();
    let json_bytes = json_string.as_bytes();

    // Pad JSON to 4-byte alignment
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let json_chunk_length = json_bytes.len() + json_padding;

    // Pad buffer to 4-byte alignment
    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let buffer_chunk_length = buffer_data.len() + buffer_padding;

    let total_length = 12 + 8 + json_chunk_length + 8 + buffer_chunk_length;
    let mut glb = Vec::with_capacity(total_length);

    // GLB header
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_length as u32).to_le_bytes());

    // JSON chunk
    glb.extend_from_slice(&(json_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat_n(b' ', json_padding));

    // Binary chunk
    glb.extend_from_slice(&(buffer_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E4942u32.to_le_bytes());
    glb.extend_from_slice(buffer_data);
    glb.extend(std::iter::repeat_n(0u8, buffer_padding));

    glb
}

pub fn approx_eq(a: &[f32], b: &[f32], eps: f32) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= eps)
}
