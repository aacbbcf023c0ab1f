//! Shader variable type model and type-path algebra.
//!
//! This crate is the pure, GPU-independent core of the transform-feedback
//! conformance engine:
//!
//! - [`DataType`] / [`Precision`]: the closed GLSL ES 3.00 basic-type algebra
//!   (scalars, vectors, matrices, samplers) with size/classification helpers.
//! - [`VarType`]: the recursive variable type model (basic type, fixed or
//!   unsized array, struct). Struct types are interned in a
//!   [`StructRegistry`] arena and referenced by copyable handles, so the
//!   recursive model has no cyclic ownership.
//! - [`path`]: the type-path algebra used to address sub-components of a
//!   composite variable (`v_var[2].member[1]`), including a textual
//!   parser, validation/resolution against a root type, and the canonical
//!   depth-first sub-path enumeration that the shader generator and layout
//!   planners rely on for deterministic output.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod data_type;
mod error;
mod var_type;

pub mod path;

pub use crate::data_type::{DataType, Precision};
pub use crate::error::{PathError, PathParseError};
pub use crate::path::{ComponentKind, PathComponent, TypePath};
pub use crate::var_type::{
    ArraySize, StructHandle, StructMember, StructRegistry, StructType, VarType,
};
