//! Umbrella crate for the transform-feedback conformance engine.
//!
//! Re-exports the three workspace crates so a test runner can depend on a
//! single package:
//!
//! - [`types`]: the recursive shader-variable type model and its
//!   path-addressing algebra.
//! - [`shadergen`]: deterministic shader source, input layout and
//!   transform-feedback output planning from a declarative program spec.
//! - [`conformance`]: the case state machine, topology arithmetic, test
//!   catalog and harness glue.

#![forbid(unsafe_code)]

pub use xfb_conformance as conformance;
pub use xfb_shadergen as shadergen;
pub use xfb_types as types;
