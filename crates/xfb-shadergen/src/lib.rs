//! Program specification and deterministic shader/layout synthesis.
//!
//! Given a declarative [`ProgramSpec`] (struct types, varyings, captured
//! varying paths), this crate produces:
//!
//! - GLSL ES 3.00 vertex/fragment source pairs ([`generate_shader_sources`]),
//!   expanding composite varyings into per-component vertex attributes with
//!   deterministic names,
//! - the packed interleaved vertex input layout ([`compute_input_layout`]),
//! - the transform-feedback output plan ([`compute_outputs`]) mapping each
//!   captured path to a buffer index, byte offset, resolved type and the
//!   ordered input attributes that feed it,
//! - type- and precision-appropriate random vertex data
//!   ([`fill_input_buffer`]).
//!
//! Everything here is pure: the same spec always produces byte-identical
//! source strings and layouts, which is what makes captured-buffer
//! verification reproducible.

#![forbid(unsafe_code)]

mod layout;
mod outputs;
mod random;
mod shader;
mod spec;

pub use crate::layout::{
    compute_input_layout, Attribute, InputLayout, POINT_SIZE_ATTRIBUTE_NAME,
    POSITION_ATTRIBUTE_NAME,
};
pub use crate::outputs::{buffer_strides, compute_outputs, BufferMode, Output, OutputPlanError};
pub use crate::random::fill_input_buffer;
pub use crate::shader::{attribute_name, generate_shader_sources, ShaderGenError, ShaderSources};
pub use crate::spec::{Interpolation, ProgramSpec, Varying};

/// Builtin name for whole-position capture.
pub const POSITION_BUILTIN: &str = "gl_Position";
/// Builtin name for point-size capture.
pub const POINT_SIZE_BUILTIN: &str = "gl_PointSize";
