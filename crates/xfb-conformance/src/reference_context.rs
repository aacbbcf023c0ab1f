//! A software stand-in for the graphics context.
//!
//! [`ReferenceContext`] emulates just enough of the capture pipeline to
//! exercise the whole engine without a GPU: it scans the generated vertex
//! source for attribute declarations and body assignments, replays draw
//! calls through the topology arithmetic, and writes captured records into
//! plain byte buffers. Rasterization is not emulated; `read_pixels`
//! returns a surface derived deterministically from the draw sequence
//! since the last clear, which is exactly the property the image
//! equivalence check relies on.

use std::collections::HashMap;

use xfb_shadergen::BufferMode;

use crate::context::{
    AttribKind, BufferId, GlContext, Limits, ProgramBuildError, ProgramId, ProgramSources,
    QueryId, Surface, TransformFeedbackId,
};
use crate::topology::{self, PrimitiveType};

const SURFACE_SIZE: u32 = 64;

/// GLES 3.0 minimum values.
const DEFAULT_LIMITS: Limits = Limits {
    max_vertex_attribs: 16,
    max_transform_feedback_interleaved_components: 64,
    max_transform_feedback_separate_components: 4,
    max_transform_feedback_separate_attribs: 4,
};

#[derive(Clone)]
struct ProgramRecord {
    attrib_locations: HashMap<String, u32>,
    /// Per captured varying: contributing attribute names, in record order.
    captures: Vec<Vec<String>>,
    buffer_mode: BufferMode,
}

#[derive(Clone, Copy)]
struct AttribBinding {
    components: u32,
    stride: usize,
    offset: usize,
    buffer: u32,
}

struct ActiveCapture {
    paused: bool,
    cursors: Vec<usize>,
}

/// Software [`GlContext`] double. See the module docs.
#[derive(Default)]
pub struct ReferenceContext {
    next_handle: u32,
    buffers: HashMap<u32, Vec<u8>>,
    programs: HashMap<u32, ProgramRecord>,
    queries: HashMap<u32, u64>,
    current_program: Option<u32>,
    attrib_bindings: HashMap<u32, AttribBinding>,
    indexed_bindings: Vec<Option<u32>>,
    capture: Option<ActiveCapture>,
    active_query: Option<u32>,
    draw_hash: u64,
    error: Option<u32>,
}

impl ReferenceContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn set_error(&mut self, code: u32) {
        if self.error.is_none() {
            self.error = Some(code);
        }
    }

    fn capture_draw(&mut self, mode: PrimitiveType, first: usize, count: usize) {
        let capturing = matches!(&self.capture, Some(c) if !c.paused);
        if !capturing {
            return;
        }
        let Some(program) = self.current_program.and_then(|p| self.programs.get(&p)).cloned()
        else {
            return;
        };
        if program.captures.is_empty() {
            return;
        }

        // Assemble the captured byte stream per binding point, then commit
        // at each binding's cursor.
        let binding_count = match program.buffer_mode {
            BufferMode::Interleaved => 1,
            BufferMode::Separate => program.captures.len(),
        };
        let mut streams: Vec<Vec<u8>> = vec![Vec::new(); binding_count];

        let emitted = topology::output_count(mode, count);
        for out in 0..emitted {
            let in_vertex = first + topology::input_index_for_output(mode, count, out);
            for (capture_index, attributes) in program.captures.iter().enumerate() {
                let stream = match program.buffer_mode {
                    BufferMode::Interleaved => &mut streams[0],
                    BufferMode::Separate => &mut streams[capture_index],
                };
                for name in attributes {
                    let Some(binding) = program
                        .attrib_locations
                        .get(name)
                        .and_then(|loc| self.attrib_bindings.get(loc))
                        .copied()
                    else {
                        self.set_error(0x0502); // INVALID_OPERATION
                        return;
                    };
                    let Some(source) = self.buffers.get(&binding.buffer) else {
                        self.set_error(0x0502);
                        return;
                    };
                    let start = in_vertex * binding.stride + binding.offset;
                    let len = binding.components as usize * 4;
                    stream.extend_from_slice(&source[start..start + len]);
                }
            }
        }

        for (index, stream) in streams.into_iter().enumerate() {
            let Some(Some(buffer_id)) = self.indexed_bindings.get(index).copied() else {
                self.set_error(0x0502);
                return;
            };
            let Some(capture) = self.capture.as_mut() else {
                return;
            };
            if capture.cursors.len() <= index {
                capture.cursors.resize(index + 1, 0);
            }
            let cursor = capture.cursors[index];
            let Some(dest) = self.buffers.get_mut(&buffer_id) else {
                self.set_error(0x0502);
                return;
            };
            let end = (cursor + stream.len()).min(dest.len());
            let len = end.saturating_sub(cursor);
            dest[cursor..cursor + len].copy_from_slice(&stream[..len]);
            if let Some(capture) = self.capture.as_mut() {
                capture.cursors[index] = cursor + len;
            }
        }

        if let Some(query) = self.active_query {
            let written = topology::primitive_count(mode, count) as u64;
            if let Some(slot) = self.queries.get_mut(&query) {
                *slot += written;
            }
        }
    }
}

/// Scans the vertex source for attribute declarations (location order is
/// declaration order) and body assignments, then maps each transform
/// feedback varying to the attributes whose assignment targets it or one
/// of its sub-paths.
fn parse_program(sources: &ProgramSources) -> Result<ProgramRecord, ProgramBuildError> {
    let mut attrib_locations = HashMap::new();
    let mut next_location = 0u32;
    let mut assignments: Vec<(String, String)> = Vec::new();

    for line in sources.vertex.lines() {
        if let Some(decl) = line.strip_prefix("in ") {
            if let Some(name) = decl.trim_end_matches(';').split_whitespace().last() {
                attrib_locations.insert(name.to_owned(), next_location);
                next_location += 1;
            }
        } else if let Some(body) = line.strip_prefix('\t') {
            let Some(statement) = body.strip_suffix(';') else {
                continue;
            };
            if let Some((lhs, rhs)) = statement.split_once(" = ") {
                assignments.push((lhs.to_owned(), rhs.to_owned()));
            }
        }
    }

    let mut captures = Vec::with_capacity(sources.tf_varyings.len());
    for varying in &sources.tf_varyings {
        let attributes: Vec<String> = assignments
            .iter()
            .filter(|(lhs, rhs)| path_covers(varying, lhs) && attrib_locations.contains_key(rhs))
            .map(|(_, rhs)| rhs.clone())
            .collect();
        if attributes.is_empty() {
            return Err(ProgramBuildError::Link {
                log: format!("transform feedback varying {varying:?} is not written by the vertex stage"),
            });
        }
        captures.push(attributes);
    }

    Ok(ProgramRecord {
        attrib_locations,
        captures,
        buffer_mode: sources.buffer_mode,
    })
}

/// True when `lhs` is the captured path itself or a sub-path of it.
fn path_covers(captured: &str, lhs: &str) -> bool {
    lhs == captured
        || (lhs.starts_with(captured)
            && matches!(lhs.as_bytes().get(captured.len()), Some(b'.') | Some(b'[')))
}

fn mix(hash: u64, value: u64) -> u64 {
    let mut z = hash ^ value.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

impl GlContext for ReferenceContext {
    fn limits(&self) -> Limits {
        DEFAULT_LIMITS
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        (SURFACE_SIZE, SURFACE_SIZE)
    }

    fn create_program(&mut self, sources: &ProgramSources) -> Result<ProgramId, ProgramBuildError> {
        let record = parse_program(sources)?;
        let id = self.alloc();
        self.programs.insert(id, record);
        Ok(ProgramId(id))
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(&program.0);
    }

    fn use_program(&mut self, program: ProgramId) {
        if self.programs.contains_key(&program.0) {
            self.current_program = Some(program.0);
        } else {
            self.set_error(0x0502);
        }
    }

    fn get_attrib_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        self.programs
            .get(&program.0)
            .and_then(|p| p.attrib_locations.get(name))
            .copied()
    }

    fn set_uniform_vec4(&mut self, program: ProgramId, _name: &str, _value: [f32; 4]) {
        if !self.programs.contains_key(&program.0) {
            self.set_error(0x0502);
        }
    }

    fn create_buffer(&mut self) -> BufferId {
        let id = self.alloc();
        self.buffers.insert(id, Vec::new());
        BufferId(id)
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer.0);
    }

    fn buffer_data(&mut self, buffer: BufferId, data: &[u8]) {
        match self.buffers.get_mut(&buffer.0) {
            Some(store) => *store = data.to_vec(),
            None => self.set_error(0x0502),
        }
    }

    fn read_buffer(&mut self, buffer: BufferId, offset: usize, len: usize) -> Vec<u8> {
        match self.buffers.get(&buffer.0) {
            Some(store) if offset + len <= store.len() => store[offset..offset + len].to_vec(),
            _ => {
                self.set_error(0x0502);
                Vec::new()
            }
        }
    }

    fn vertex_attrib_pointer(
        &mut self,
        location: u32,
        components: u32,
        _kind: AttribKind,
        stride: usize,
        offset: usize,
        buffer: BufferId,
    ) {
        self.attrib_bindings.insert(
            location,
            AttribBinding {
                components,
                stride,
                offset,
                buffer: buffer.0,
            },
        );
    }

    fn create_transform_feedback(&mut self) -> TransformFeedbackId {
        TransformFeedbackId(self.alloc())
    }

    fn delete_transform_feedback(&mut self, _tf: TransformFeedbackId) {}

    fn bind_transform_feedback(&mut self, _tf: TransformFeedbackId) {}

    fn bind_buffer_base(&mut self, index: u32, buffer: BufferId) {
        let index = index as usize;
        if self.indexed_bindings.len() <= index {
            self.indexed_bindings.resize(index + 1, None);
        }
        self.indexed_bindings[index] = Some(buffer.0);
    }

    fn begin_transform_feedback(&mut self, _mode: PrimitiveType) {
        if self.capture.is_some() {
            self.set_error(0x0502);
            return;
        }
        self.capture = Some(ActiveCapture {
            paused: false,
            cursors: vec![0; self.indexed_bindings.len()],
        });
    }

    fn pause_transform_feedback(&mut self) {
        match self.capture.as_mut() {
            Some(capture) if !capture.paused => capture.paused = true,
            _ => self.set_error(0x0502),
        }
    }

    fn resume_transform_feedback(&mut self) {
        match self.capture.as_mut() {
            Some(capture) if capture.paused => capture.paused = false,
            _ => self.set_error(0x0502),
        }
    }

    fn end_transform_feedback(&mut self) {
        if self.capture.take().is_none() {
            self.set_error(0x0502);
        }
    }

    fn create_query(&mut self) -> QueryId {
        let id = self.alloc();
        self.queries.insert(id, 0);
        QueryId(id)
    }

    fn delete_query(&mut self, query: QueryId) {
        self.queries.remove(&query.0);
    }

    fn begin_primitives_written_query(&mut self, query: QueryId) {
        if self.queries.insert(query.0, 0).is_none() {
            self.set_error(0x0502);
        }
        self.active_query = Some(query.0);
    }

    fn end_primitives_written_query(&mut self) {
        if self.active_query.take().is_none() {
            self.set_error(0x0502);
        }
    }

    fn query_result(&mut self, query: QueryId) -> u64 {
        self.queries.get(&query.0).copied().unwrap_or(0)
    }

    fn clear(&mut self, rgba: [f32; 4]) {
        let mut hash = 0u64;
        for channel in rgba {
            hash = mix(hash, u64::from(channel.to_bits()));
        }
        self.draw_hash = hash;
    }

    fn draw_arrays(&mut self, mode: PrimitiveType, first: usize, count: usize) {
        self.draw_hash = mix(
            self.draw_hash,
            (mode as u64) << 48 | (first as u64) << 24 | count as u64,
        );
        self.capture_draw(mode, first, count);
    }

    fn read_pixels(&mut self) -> Surface {
        let pixel_count = (SURFACE_SIZE * SURFACE_SIZE) as usize;
        let mut pixels = Vec::with_capacity(pixel_count * 4);
        for index in 0..pixel_count {
            let value = mix(self.draw_hash, index as u64);
            pixels.extend_from_slice(&(value as u32).to_ne_bytes());
        }
        Surface {
            width: SURFACE_SIZE,
            height: SURFACE_SIZE,
            pixels,
        }
    }

    fn get_error(&mut self) -> Option<u32> {
        self.error.take()
    }
}
