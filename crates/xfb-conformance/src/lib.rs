//! Transform-feedback conformance test engine.
//!
//! This crate drives a GPU (through the opaque [`GlContext`] capability
//! trait) to capture vertex-stage outputs into transform-feedback buffers
//! and verifies the captured data against the randomly generated inputs:
//!
//! - [`topology`]: pure integer arithmetic mapping input vertex counts to
//!   captured output counts, written-primitive counts and output→input
//!   vertex index correspondence, per primitive topology.
//! - [`TransformFeedbackCase`]: the test case state machine — program
//!   build and classification, buffer allocation with guard regions,
//!   scripted draw sequences with capture pause/resume, readback
//!   verification, primitives-written query validation and the
//!   capture-on/capture-off image equivalence check.
//! - [`catalog`]: builds the full named test tree (capture target ×
//!   buffer mode × topology × basic type × precision × interpolation,
//!   plus seeded random program specs).
//!
//! The `test-utils` feature adds [`reference_context::ReferenceContext`],
//! a software double that emulates capture semantics so the engine can be
//! exercised end to end without a GPU.

#![forbid(unsafe_code)]

pub mod catalog;
pub mod topology;

mod case;
mod context;
mod harness;
mod random_spec;
mod verify;

#[cfg(any(test, feature = "test-utils"))]
pub mod reference_context;

pub use crate::case::{
    CaseError, CaseStatus, DrawCall, DrawScript, InitOutcome, TransformFeedbackCase,
};
pub use crate::context::{
    AttribKind, BufferId, GlContext, Limits, PixelCompare, ProgramBuildError, ProgramId,
    ProgramSources, QueryId, Surface, ThresholdPixelCompare, TransformFeedbackId,
};
pub use crate::harness::{flatten_tree, run_case, IterateResult, TestCase, TestGroup, TestTree};
pub use crate::random_spec::generate_random_case;
pub use crate::topology::PrimitiveType;
