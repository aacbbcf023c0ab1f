use thiserror::Error;
use xfb_shadergen::BufferMode;

use crate::topology::PrimitiveType;

/// GPU buffer object handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Linked program object handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// Primitives-written query object handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryId(pub u32);

/// Transform-feedback object handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransformFeedbackId(pub u32);

/// Capability limits reported by the context, used by the static
/// supported-configuration predicate before any GPU work is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum vertex input attributes.
    pub max_vertex_attribs: u32,
    /// Maximum total captured components in interleaved mode.
    pub max_transform_feedback_interleaved_components: u32,
    /// Maximum captured components per varying in separate mode.
    pub max_transform_feedback_separate_components: u32,
    /// Maximum captured varyings in separate mode.
    pub max_transform_feedback_separate_attribs: u32,
}

/// How a vertex attribute pointer interprets its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttribKind {
    /// 32-bit float data (`vertexAttribPointer`).
    Float,
    /// 32-bit signed integer data (`vertexAttribIPointer`).
    Int,
    /// 32-bit unsigned integer data (`vertexAttribIPointer`).
    Uint,
}

/// Everything needed to build one program: the generated source pair plus
/// the transform-feedback varying list and buffer mode passed at link time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSources {
    /// GLSL ES 3.00 vertex shader source.
    pub vertex: String,
    /// GLSL ES 3.00 fragment shader source.
    pub fragment: String,
    /// Captured varying path strings, in capture order.
    pub tf_varyings: Vec<String>,
    /// Separate or interleaved capture.
    pub buffer_mode: BufferMode,
}

/// Program build failure, split by stage so init can classify outcomes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgramBuildError {
    /// A shader failed to compile.
    #[error("shader compilation failed: {log}")]
    Compile {
        /// Compiler info log.
        log: String,
    },
    /// The program failed to link.
    #[error("program link failed: {log}")]
    Link {
        /// Linker info log.
        log: String,
    },
}

/// An RGBA8 readback of the drawing buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 rows, bottom-up.
    pub pixels: Vec<u8>,
}

/// The opaque graphics-context capability interface.
///
/// The engine uses these operations strictly as given and never
/// reinterprets their semantics; any non-`None` [`GlContext::get_error`]
/// after a state-changing call is treated as fatal for the current case.
pub trait GlContext {
    /// Reported capability limits.
    fn limits(&self) -> Limits;

    /// Drawing buffer dimensions.
    fn drawing_buffer_size(&self) -> (u32, u32);

    /// Compiles and links a program, registering its transform-feedback
    /// varyings and buffer mode.
    fn create_program(&mut self, sources: &ProgramSources) -> Result<ProgramId, ProgramBuildError>;
    /// Deletes a program object.
    fn delete_program(&mut self, program: ProgramId);
    /// Makes a program current for subsequent draws.
    fn use_program(&mut self, program: ProgramId);
    /// Returns the location of a named vertex attribute, if active.
    fn get_attrib_location(&self, program: ProgramId, name: &str) -> Option<u32>;
    /// Sets a `vec4` uniform on a program.
    fn set_uniform_vec4(&mut self, program: ProgramId, name: &str, value: [f32; 4]);

    /// Creates a buffer object.
    fn create_buffer(&mut self) -> BufferId;
    /// Deletes a buffer object.
    fn delete_buffer(&mut self, buffer: BufferId);
    /// Allocates and fills a buffer's data store.
    fn buffer_data(&mut self, buffer: BufferId, data: &[u8]);
    /// Reads back a byte range of a buffer. May force host/device sync.
    fn read_buffer(&mut self, buffer: BufferId, offset: usize, len: usize) -> Vec<u8>;

    /// Binds and enables a vertex attribute pointer into `buffer`.
    #[allow(clippy::too_many_arguments)]
    fn vertex_attrib_pointer(
        &mut self,
        location: u32,
        components: u32,
        kind: AttribKind,
        stride: usize,
        offset: usize,
        buffer: BufferId,
    );

    /// Creates a transform-feedback object.
    fn create_transform_feedback(&mut self) -> TransformFeedbackId;
    /// Deletes a transform-feedback object.
    fn delete_transform_feedback(&mut self, tf: TransformFeedbackId);
    /// Binds a transform-feedback object.
    fn bind_transform_feedback(&mut self, tf: TransformFeedbackId);
    /// Binds `buffer` to indexed transform-feedback binding point `index`.
    fn bind_buffer_base(&mut self, index: u32, buffer: BufferId);
    /// Begins capture in the given base primitive mode.
    fn begin_transform_feedback(&mut self, mode: PrimitiveType);
    /// Pauses capture.
    fn pause_transform_feedback(&mut self);
    /// Resumes paused capture.
    fn resume_transform_feedback(&mut self);
    /// Ends capture.
    fn end_transform_feedback(&mut self);

    /// Creates a query object.
    fn create_query(&mut self) -> QueryId;
    /// Deletes a query object.
    fn delete_query(&mut self, query: QueryId);
    /// Begins a transform-feedback-primitives-written query.
    fn begin_primitives_written_query(&mut self, query: QueryId);
    /// Ends the active primitives-written query.
    fn end_primitives_written_query(&mut self);
    /// Blocks until the query result is available and returns it.
    fn query_result(&mut self, query: QueryId) -> u64;

    /// Clears the drawing buffer to a constant color.
    fn clear(&mut self, rgba: [f32; 4]);
    /// Issues a non-indexed draw.
    fn draw_arrays(&mut self, mode: PrimitiveType, first: usize, count: usize);
    /// Reads the drawing buffer back as RGBA8.
    fn read_pixels(&mut self) -> Surface;

    /// Returns and clears the pending error code; `None` means no error.
    fn get_error(&mut self) -> Option<u32>;
}

/// Whole-image comparison collaborator used for the final
/// capture-on/capture-off equivalence check.
pub trait PixelCompare {
    /// True when `result` matches `reference` within a per-channel
    /// absolute threshold.
    fn compare(&self, reference: &Surface, result: &Surface, threshold: [u8; 4]) -> bool;
}

/// Straightforward per-pixel threshold comparator.
///
/// The production harness supplies a fuzzier comparator; this one is
/// enough for the software reference context, whose two passes produce
/// identical surfaces.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThresholdPixelCompare;

impl PixelCompare for ThresholdPixelCompare {
    fn compare(&self, reference: &Surface, result: &Surface, threshold: [u8; 4]) -> bool {
        if reference.width != result.width
            || reference.height != result.height
            || reference.pixels.len() != result.pixels.len()
        {
            return false;
        }
        reference
            .pixels
            .chunks_exact(4)
            .zip(result.pixels.chunks_exact(4))
            .all(|(a, b)| {
                (0..4).all(|c| a[c].abs_diff(b[c]) <= threshold[c])
            })
    }
}
