//! The transform-feedback test case state machine.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, warn};
use xfb_shadergen::{
    buffer_strides, compute_input_layout, compute_outputs, fill_input_buffer,
    generate_shader_sources, BufferMode, InputLayout, Output, OutputPlanError, ProgramSpec,
    ShaderGenError,
};
use xfb_types::{StructRegistry, VarType};

use crate::context::{
    AttribKind, BufferId, GlContext, Limits, PixelCompare, ProgramBuildError, ProgramId,
    ProgramSources, QueryId, TransformFeedbackId,
};
use crate::harness::IterateResult;
use crate::topology::{self, PrimitiveType};
use crate::verify::{self, DrawSegment, GUARD_BYTE};

/// Guard records appended past each output buffer's expected write extent.
const GUARD_RECORDS: usize = 2;

/// Per-channel threshold for the capture-on/capture-off image comparison.
const PIXEL_THRESHOLD: [u8; 4] = [1, 1, 1, 1];

/// Fragment accumulation uniforms, chosen so wildly ranged highp inputs
/// still land in a renderable color range.
const UNIFORM_SCALE: [f32; 4] = [0.01; 4];
const UNIFORM_BIAS: [f32; 4] = [0.5; 4];

/// One draw call of a scripted sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    /// Vertex count.
    pub count: usize,
    /// Whether transform feedback captures this draw.
    pub transform_feedback: bool,
}

impl DrawCall {
    /// Creates a draw call.
    pub fn new(count: usize, transform_feedback: bool) -> Self {
        Self {
            count,
            transform_feedback,
        }
    }
}

/// A named fixed sequence of draw calls; one iteration of a case runs one
/// script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawScript {
    /// Script name, used in logs and for seeding.
    pub name: String,
    /// Draw calls in execution order.
    pub calls: Vec<DrawCall>,
}

impl DrawScript {
    /// Creates a named script.
    pub fn new(name: impl Into<String>, calls: Vec<DrawCall>) -> Self {
        Self {
            name: name.into(),
            calls,
        }
    }
}

/// Classified outcome of [`TransformFeedbackCase::init`].
///
/// Everything except `Ready` is terminal for the case; the harness reports
/// the variant and never retries with reduced parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// The case is ready to iterate.
    Ready,
    /// The configuration exceeds reported limits or uses a capture shape
    /// the implementation rejects.
    NotSupported {
        /// Human-readable reason.
        reason: String,
    },
    /// A shader failed to compile.
    CompileFailed {
        /// Compiler info log.
        log: String,
    },
    /// The program failed to link for a reason other than a known
    /// unsupported configuration.
    LinkFailed {
        /// Linker info log.
        log: String,
    },
}

/// Final status of a completed case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseStatus {
    /// Every script passed all checks.
    Pass,
    /// At least one script failed a value, guard, query or image check.
    Fail,
    /// The configuration was not supported by the implementation.
    NotSupported {
        /// Human-readable reason.
        reason: String,
    },
    /// A shader failed to compile.
    CompileFailed {
        /// Compiler info log.
        log: String,
    },
    /// The program failed to link.
    LinkFailed {
        /// Linker info log.
        log: String,
    },
}

/// Unrecoverable case failure: generator invariant violations and
/// unexpected graphics API errors. These abort the case rather than being
/// reported as conformance failures.
#[derive(Debug, Error)]
pub enum CaseError {
    /// Shader source or input layout generation failed.
    #[error("shader generation failed: {0}")]
    ShaderGen(#[from] ShaderGenError),

    /// Transform-feedback output planning failed.
    #[error("output planning failed: {0}")]
    OutputPlan(#[from] OutputPlanError),

    /// The spec captures nothing, so there is nothing to verify.
    #[error("program spec captures no varyings")]
    EmptyOutputPlan,

    /// A generated attribute was not active in the linked program.
    #[error("generated attribute {name:?} has no location in the linked program")]
    MissingAttribLocation {
        /// Attribute name.
        name: String,
    },

    /// The context reported an error code after a state-changing call.
    #[error("graphics API error {code:#06x} after {operation}")]
    ApiError {
        /// Raw error code.
        code: u32,
        /// Operation batch that triggered it.
        operation: &'static str,
    },

    /// `iterate` was called before a successful `init`.
    #[error("case used before successful initialization")]
    NotInitialized,
}

struct BoundAttrib {
    location: u32,
    components: u32,
    kind: AttribKind,
    offset: usize,
}

struct CaseState {
    program: ProgramId,
    layout: InputLayout,
    outputs: Vec<Output>,
    strides: Vec<usize>,
    attribs: Vec<BoundAttrib>,
    input_buffer: BufferId,
    output_buffers: Vec<BufferId>,
    transform_feedback: TransformFeedbackId,
    query: QueryId,
}

/// One transform-feedback conformance case: a program spec, a topology, a
/// buffer mode and a list of scripted draw sequences.
///
/// Lifecycle is `init` → `iterate`* → `deinit`; `iterate` consumes one
/// script per call and stops after the last script or the first failure.
pub struct TransformFeedbackCase {
    name: String,
    description: String,
    primitive: PrimitiveType,
    buffer_mode: BufferMode,
    spec: ProgramSpec,
    scripts: Vec<DrawScript>,
    base_seed: u64,
    iter_index: usize,
    all_passed: bool,
    state: Option<CaseState>,
}

impl TransformFeedbackCase {
    /// Creates a case. Derived layout state is not computed until `init`.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        primitive: PrimitiveType,
        buffer_mode: BufferMode,
        spec: ProgramSpec,
        scripts: Vec<DrawScript>,
    ) -> Self {
        let name = name.into();
        let base_seed = name_seed(&name);
        Self {
            name,
            description: description.into(),
            primitive,
            buffer_mode,
            spec,
            scripts,
            base_seed,
            iter_index: 0,
            all_passed: true,
            state: None,
        }
    }

    /// Case name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// True while no script has failed.
    pub fn passed(&self) -> bool {
        self.all_passed
    }

    /// The program spec under test.
    pub fn spec(&self) -> &ProgramSpec {
        &self.spec
    }

    /// The scripted draw sequences, one per iteration.
    pub fn scripts(&self) -> &[DrawScript] {
        &self.scripts
    }

    /// The draw topology.
    pub fn primitive(&self) -> PrimitiveType {
        self.primitive
    }

    /// The capture buffer mode.
    pub fn buffer_mode(&self) -> BufferMode {
        self.buffer_mode
    }

    /// Builds the program, classifies build failures, computes the input
    /// layout and output plan and allocates all GPU objects.
    pub fn init<C: GlContext>(&mut self, ctx: &mut C) -> Result<InitOutcome, CaseError> {
        let point_size_required = self.primitive.is_points();
        let sources = generate_shader_sources(&self.spec, point_size_required)?;
        let layout = compute_input_layout(&self.spec, self.spec.uses_point_size())?;
        let outputs = compute_outputs(&self.spec, &layout, self.buffer_mode)?;
        if outputs.is_empty() {
            return Err(CaseError::EmptyOutputPlan);
        }
        let strides = buffer_strides(&self.spec, &outputs);

        if let Some(reason) = unsupported_reason(
            &ctx.limits(),
            &layout,
            &outputs,
            self.buffer_mode,
            self.spec.structs(),
        ) {
            info!(case = %self.name, reason, "configuration not supported");
            return Ok(InitOutcome::NotSupported { reason });
        }

        let program = match ctx.create_program(&ProgramSources {
            vertex: sources.vertex,
            fragment: sources.fragment,
            tf_varyings: self.spec.captured().to_vec(),
            buffer_mode: self.buffer_mode,
        }) {
            Ok(program) => program,
            Err(ProgramBuildError::Compile { log }) => {
                return Ok(InitOutcome::CompileFailed { log })
            }
            Err(ProgramBuildError::Link { log }) => {
                // Implementations may reject whole-array capture at link
                // time; that is an unsupported configuration, not a bug.
                if outputs.iter().any(|o| matches!(o.ty, VarType::Array { .. })) {
                    return Ok(InitOutcome::NotSupported {
                        reason: "whole-array capture rejected at link time".to_owned(),
                    });
                }
                return Ok(InitOutcome::LinkFailed { log });
            }
        };

        let mut attribs = Vec::with_capacity(layout.attributes.len());
        for attr in &layout.attributes {
            let Some(location) = ctx.get_attrib_location(program, &attr.name) else {
                // The program is the only object created so far.
                ctx.delete_program(program);
                return Err(CaseError::MissingAttribLocation {
                    name: attr.name.clone(),
                });
            };
            let ty = attr.data_type();
            let kind = if ty.is_float_or_matrix() {
                AttribKind::Float
            } else if ty.is_int_kind() {
                AttribKind::Int
            } else {
                AttribKind::Uint
            };
            attribs.push(BoundAttrib {
                location,
                components: ty.scalar_count() as u32,
                kind,
                offset: attr.offset,
            });
        }

        ctx.use_program(program);
        ctx.set_uniform_vec4(program, "u_scale", UNIFORM_SCALE);
        ctx.set_uniform_vec4(program, "u_bias", UNIFORM_BIAS);

        let input_buffer = ctx.create_buffer();
        let output_buffers = (0..strides.len()).map(|_| ctx.create_buffer()).collect();
        let transform_feedback = ctx.create_transform_feedback();
        let query = ctx.create_query();

        debug!(
            case = %self.name,
            attributes = layout.attributes.len(),
            outputs = outputs.len(),
            buffers = strides.len(),
            "case initialized"
        );

        self.state = Some(CaseState {
            program,
            layout,
            outputs,
            strides,
            attribs,
            input_buffer,
            output_buffers,
            transform_feedback,
            query,
        });
        self.iter_index = 0;
        self.all_passed = true;

        // State owns every object from here, so an API error raised during
        // creation still releases them all.
        if let Err(err) = check_gl(ctx, "object creation") {
            self.deinit(ctx);
            return Err(err);
        }
        Ok(InitOutcome::Ready)
    }

    /// Runs the next draw script. Stops after the last script or the first
    /// failing one.
    pub fn iterate<C: GlContext, P: PixelCompare>(
        &mut self,
        ctx: &mut C,
        compare: &P,
    ) -> Result<IterateResult, CaseError> {
        if self.state.is_none() {
            return Err(CaseError::NotInitialized);
        }
        let Some(script) = self.scripts.get(self.iter_index).cloned() else {
            return Ok(IterateResult::Stop);
        };

        let seed = splitmix64(self.base_seed ^ self.iter_index as u64);
        info!(case = %self.name, script = %script.name, seed, "running draw script");

        let passed = self.run_script(ctx, compare, &script, seed)?;
        if !passed {
            warn!(case = %self.name, script = %script.name, "script failed");
            self.all_passed = false;
        }
        self.iter_index += 1;

        if !passed || self.iter_index == self.scripts.len() {
            Ok(IterateResult::Stop)
        } else {
            Ok(IterateResult::Continue)
        }
    }

    /// Releases every GPU object the case owns.
    pub fn deinit<C: GlContext>(&mut self, ctx: &mut C) {
        if let Some(state) = self.state.take() {
            ctx.delete_query(state.query);
            ctx.delete_transform_feedback(state.transform_feedback);
            for buffer in state.output_buffers {
                ctx.delete_buffer(buffer);
            }
            ctx.delete_buffer(state.input_buffer);
            ctx.delete_program(state.program);
        }
    }

    fn run_script<C: GlContext, P: PixelCompare>(
        &self,
        ctx: &mut C,
        compare: &P,
        script: &DrawScript,
        seed: u64,
    ) -> Result<bool, CaseError> {
        let state = self.state.as_ref().ok_or(CaseError::NotInitialized)?;

        let total_vertices: usize = script.calls.iter().map(|c| c.count).sum();
        let captured_vertices: usize = script
            .calls
            .iter()
            .filter(|c| c.transform_feedback)
            .map(|c| topology::output_count(self.primitive, c.count))
            .sum();

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let input = fill_input_buffer(&state.layout, total_vertices, &mut rng);
        ctx.buffer_data(state.input_buffer, &input);
        for attrib in &state.attribs {
            ctx.vertex_attrib_pointer(
                attrib.location,
                attrib.components,
                attrib.kind,
                state.layout.stride,
                attrib.offset,
                state.input_buffer,
            );
        }
        check_gl(ctx, "input setup")?;

        ctx.bind_transform_feedback(state.transform_feedback);
        for (index, (&stride, &buffer)) in
            state.strides.iter().zip(&state.output_buffers).enumerate()
        {
            let size = stride * (captured_vertices + GUARD_RECORDS);
            ctx.buffer_data(buffer, &vec![GUARD_BYTE; size]);
            ctx.bind_buffer_base(index as u32, buffer);
        }
        check_gl(ctx, "output buffer setup")?;

        // First pass: captured draw sequence. Capture begins active, so a
        // pause/resume toggle is issued exactly when a call's flag differs
        // from the current state, immediately before its draw.
        ctx.clear([0.0, 0.0, 0.0, 1.0]);
        ctx.begin_primitives_written_query(state.query);
        ctx.begin_transform_feedback(self.primitive.transform_feedback_mode());

        let mut capture_active = true;
        let mut first = 0usize;
        let mut segments = Vec::new();
        for call in &script.calls {
            if call.transform_feedback != capture_active {
                if call.transform_feedback {
                    ctx.resume_transform_feedback();
                } else {
                    ctx.pause_transform_feedback();
                }
                capture_active = call.transform_feedback;
            }
            if call.transform_feedback {
                segments.push(DrawSegment {
                    in_base: first,
                    count: call.count,
                });
            }
            ctx.draw_arrays(self.primitive, first, call.count);
            first += call.count;
        }

        ctx.end_transform_feedback();
        ctx.end_primitives_written_query();
        check_gl(ctx, "captured draw sequence")?;

        let with_capture = ctx.read_pixels();
        let buffers: Vec<Vec<u8>> = state
            .strides
            .iter()
            .zip(&state.output_buffers)
            .map(|(&stride, &buffer)| {
                ctx.read_buffer(buffer, 0, stride * (captured_vertices + GUARD_RECORDS))
            })
            .collect();
        let written = ctx.query_result(state.query);
        check_gl(ctx, "readback")?;

        let values_ok = verify::verify_captured_data(
            &state.outputs,
            &state.layout,
            &input,
            &state.strides,
            &buffers,
            &segments,
            self.primitive,
        );
        let guards_ok = state
            .strides
            .iter()
            .zip(&buffers)
            .all(|(&stride, data)| verify::verify_guard_region(data, stride * captured_vertices));

        let expected_primitives: u64 = script
            .calls
            .iter()
            .filter(|c| c.transform_feedback)
            .map(|c| topology::primitive_count(self.primitive, c.count) as u64)
            .sum();
        let query_ok = written == expected_primitives;
        if !query_ok {
            warn!(
                expected = expected_primitives,
                actual = written,
                "written-primitives query mismatch"
            );
        }

        // Second pass: identical draws without capture. The rasterized
        // image must not depend on whether transform feedback was active.
        ctx.clear([0.0, 0.0, 0.0, 1.0]);
        let mut first = 0usize;
        for call in &script.calls {
            ctx.draw_arrays(self.primitive, first, call.count);
            first += call.count;
        }
        check_gl(ctx, "uncaptured draw sequence")?;
        let without_capture = ctx.read_pixels();

        let image_ok = compare.compare(&with_capture, &without_capture, PIXEL_THRESHOLD);
        if !image_ok {
            warn!("captured and uncaptured passes rendered different images");
        }

        Ok(values_ok && guards_ok && query_ok && image_ok)
    }
}

fn check_gl<C: GlContext>(ctx: &mut C, operation: &'static str) -> Result<(), CaseError> {
    match ctx.get_error() {
        None => Ok(()),
        Some(code) => Err(CaseError::ApiError { code, operation }),
    }
}

/// Static capability predicate; `Some(reason)` when the configuration
/// exceeds the reported limits.
fn unsupported_reason(
    limits: &Limits,
    layout: &InputLayout,
    outputs: &[Output],
    buffer_mode: BufferMode,
    structs: &StructRegistry,
) -> Option<String> {
    if layout.attributes.len() > limits.max_vertex_attribs as usize {
        return Some(format!(
            "requires {} vertex attributes, limit is {}",
            layout.attributes.len(),
            limits.max_vertex_attribs
        ));
    }
    match buffer_mode {
        BufferMode::Interleaved => {
            let components: usize = outputs.iter().map(|o| o.ty.scalar_size(structs)).sum();
            if components > limits.max_transform_feedback_interleaved_components as usize {
                return Some(format!(
                    "requires {components} interleaved components, limit is {}",
                    limits.max_transform_feedback_interleaved_components
                ));
            }
        }
        BufferMode::Separate => {
            if outputs.len() > limits.max_transform_feedback_separate_attribs as usize {
                return Some(format!(
                    "requires {} separate attributes, limit is {}",
                    outputs.len(),
                    limits.max_transform_feedback_separate_attribs
                ));
            }
            if let Some(output) = outputs
                .iter()
                .find(|o| o.ty.scalar_size(structs) > limits.max_transform_feedback_separate_components as usize)
            {
                return Some(format!(
                    "output {:?} requires {} components, separate-mode limit is {}",
                    output.name,
                    output.ty.scalar_size(structs),
                    limits.max_transform_feedback_separate_components
                ));
            }
        }
    }
    None
}

fn name_seed(name: &str) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for byte in name.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Surface;
    use crate::reference_context::ReferenceContext;
    use xfb_shadergen::Interpolation;
    use xfb_types::{DataType, Precision};

    fn roomy_limits() -> Limits {
        Limits {
            max_vertex_attribs: 16,
            max_transform_feedback_interleaved_components: 64,
            max_transform_feedback_separate_components: 4,
            max_transform_feedback_separate_attribs: 4,
        }
    }

    fn spec_with_vec4s(count: usize) -> ProgramSpec {
        let mut spec = ProgramSpec::new();
        for i in 0..count {
            let name = format!("v_a{i}");
            spec.add_varying(
                &name,
                VarType::basic(DataType::FloatVec4, Precision::Highp),
                Interpolation::Smooth,
            );
            spec.capture(name);
        }
        spec
    }

    fn plan(
        spec: &ProgramSpec,
        mode: BufferMode,
    ) -> (InputLayout, Vec<Output>) {
        let layout = compute_input_layout(spec, false).unwrap();
        let outputs = compute_outputs(spec, &layout, mode).unwrap();
        (layout, outputs)
    }

    #[test]
    fn within_limits_is_supported() {
        let spec = spec_with_vec4s(2);
        let (layout, outputs) = plan(&spec, BufferMode::Interleaved);
        assert_eq!(
            unsupported_reason(
                &roomy_limits(),
                &layout,
                &outputs,
                BufferMode::Interleaved,
                spec.structs(),
            ),
            None
        );
    }

    #[test]
    fn interleaved_component_budget_is_enforced() {
        let spec = spec_with_vec4s(3);
        let (layout, outputs) = plan(&spec, BufferMode::Interleaved);
        let mut limits = roomy_limits();
        limits.max_transform_feedback_interleaved_components = 8;
        let reason = unsupported_reason(
            &limits,
            &layout,
            &outputs,
            BufferMode::Interleaved,
            spec.structs(),
        );
        assert!(reason.is_some(), "12 components should exceed a limit of 8");
    }

    #[test]
    fn separate_attrib_budget_is_enforced() {
        let spec = spec_with_vec4s(5);
        let (layout, outputs) = plan(&spec, BufferMode::Separate);
        let reason = unsupported_reason(
            &roomy_limits(),
            &layout,
            &outputs,
            BufferMode::Separate,
            spec.structs(),
        );
        assert!(reason.is_some(), "5 separate outputs should exceed 4");
    }

    #[test]
    fn separate_component_budget_is_enforced() {
        let mut spec = ProgramSpec::new();
        spec.add_varying(
            "v_m",
            VarType::basic(DataType::FloatMat4, Precision::Highp),
            Interpolation::Smooth,
        );
        spec.capture("v_m");
        let (layout, outputs) = plan(&spec, BufferMode::Separate);
        let reason = unsupported_reason(
            &roomy_limits(),
            &layout,
            &outputs,
            BufferMode::Separate,
            spec.structs(),
        );
        assert!(reason.is_some(), "mat4 is 16 components, limit is 4");
    }

    #[test]
    fn attribute_budget_is_enforced() {
        let spec = spec_with_vec4s(2);
        let (layout, outputs) = plan(&spec, BufferMode::Interleaved);
        let mut limits = roomy_limits();
        limits.max_vertex_attribs = 2;
        let reason = unsupported_reason(
            &limits,
            &layout,
            &outputs,
            BufferMode::Interleaved,
            spec.structs(),
        );
        assert!(reason.is_some(), "position + 2 varyings exceed 2 attribs");
    }

    #[test]
    fn seeds_are_stable_and_distinct_per_iteration() {
        let base = name_seed("interleaved.points.highp_vec4");
        assert_eq!(base, name_seed("interleaved.points.highp_vec4"));
        assert_ne!(splitmix64(base ^ 0), splitmix64(base ^ 1));
    }

    /// Live object counts per kind; every counter must return to zero once
    /// a case has been torn down.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct LiveObjects {
        programs: i64,
        buffers: i64,
        transform_feedbacks: i64,
        queries: i64,
    }

    /// Delegates to the reference context while tracking object lifetimes,
    /// optionally hiding attribute locations or injecting an error code.
    #[derive(Default)]
    struct CountingContext {
        inner: ReferenceContext,
        live: LiveObjects,
        hide_attribs: bool,
        inject_error: Option<u32>,
    }

    impl GlContext for CountingContext {
        fn limits(&self) -> Limits {
            self.inner.limits()
        }

        fn drawing_buffer_size(&self) -> (u32, u32) {
            self.inner.drawing_buffer_size()
        }

        fn create_program(
            &mut self,
            sources: &ProgramSources,
        ) -> Result<ProgramId, ProgramBuildError> {
            let program = self.inner.create_program(sources)?;
            self.live.programs += 1;
            Ok(program)
        }

        fn delete_program(&mut self, program: ProgramId) {
            self.live.programs -= 1;
            self.inner.delete_program(program);
        }

        fn use_program(&mut self, program: ProgramId) {
            self.inner.use_program(program);
        }

        fn get_attrib_location(&self, program: ProgramId, name: &str) -> Option<u32> {
            if self.hide_attribs {
                return None;
            }
            self.inner.get_attrib_location(program, name)
        }

        fn set_uniform_vec4(&mut self, program: ProgramId, name: &str, value: [f32; 4]) {
            self.inner.set_uniform_vec4(program, name, value);
        }

        fn create_buffer(&mut self) -> BufferId {
            self.live.buffers += 1;
            self.inner.create_buffer()
        }

        fn delete_buffer(&mut self, buffer: BufferId) {
            self.live.buffers -= 1;
            self.inner.delete_buffer(buffer);
        }

        fn buffer_data(&mut self, buffer: BufferId, data: &[u8]) {
            self.inner.buffer_data(buffer, data);
        }

        fn read_buffer(&mut self, buffer: BufferId, offset: usize, len: usize) -> Vec<u8> {
            self.inner.read_buffer(buffer, offset, len)
        }

        fn vertex_attrib_pointer(
            &mut self,
            location: u32,
            components: u32,
            kind: AttribKind,
            stride: usize,
            offset: usize,
            buffer: BufferId,
        ) {
            self.inner
                .vertex_attrib_pointer(location, components, kind, stride, offset, buffer);
        }

        fn create_transform_feedback(&mut self) -> TransformFeedbackId {
            self.live.transform_feedbacks += 1;
            self.inner.create_transform_feedback()
        }

        fn delete_transform_feedback(&mut self, tf: TransformFeedbackId) {
            self.live.transform_feedbacks -= 1;
            self.inner.delete_transform_feedback(tf);
        }

        fn bind_transform_feedback(&mut self, tf: TransformFeedbackId) {
            self.inner.bind_transform_feedback(tf);
        }

        fn bind_buffer_base(&mut self, index: u32, buffer: BufferId) {
            self.inner.bind_buffer_base(index, buffer);
        }

        fn begin_transform_feedback(&mut self, mode: PrimitiveType) {
            self.inner.begin_transform_feedback(mode);
        }

        fn pause_transform_feedback(&mut self) {
            self.inner.pause_transform_feedback();
        }

        fn resume_transform_feedback(&mut self) {
            self.inner.resume_transform_feedback();
        }

        fn end_transform_feedback(&mut self) {
            self.inner.end_transform_feedback();
        }

        fn create_query(&mut self) -> QueryId {
            self.live.queries += 1;
            self.inner.create_query()
        }

        fn delete_query(&mut self, query: QueryId) {
            self.live.queries -= 1;
            self.inner.delete_query(query);
        }

        fn begin_primitives_written_query(&mut self, query: QueryId) {
            self.inner.begin_primitives_written_query(query);
        }

        fn end_primitives_written_query(&mut self) {
            self.inner.end_primitives_written_query();
        }

        fn query_result(&mut self, query: QueryId) -> u64 {
            self.inner.query_result(query)
        }

        fn clear(&mut self, rgba: [f32; 4]) {
            self.inner.clear(rgba);
        }

        fn draw_arrays(&mut self, mode: PrimitiveType, first: usize, count: usize) {
            self.inner.draw_arrays(mode, first, count);
        }

        fn read_pixels(&mut self) -> Surface {
            self.inner.read_pixels()
        }

        fn get_error(&mut self) -> Option<u32> {
            self.inject_error.take().or_else(|| self.inner.get_error())
        }
    }

    fn counted_case() -> TransformFeedbackCase {
        let mut spec = ProgramSpec::new();
        spec.add_varying(
            "v_a",
            VarType::basic(DataType::FloatVec4, Precision::Highp),
            Interpolation::Smooth,
        );
        spec.capture("v_a");
        TransformFeedbackCase::new(
            "leak_check",
            "",
            PrimitiveType::Points,
            BufferMode::Interleaved,
            spec,
            vec![DrawScript::new("n1", vec![DrawCall::new(1, true)])],
        )
    }

    #[test]
    fn init_releases_program_when_attribute_lookup_fails() {
        let mut ctx = CountingContext {
            hide_attribs: true,
            ..CountingContext::default()
        };
        let mut case = counted_case();

        assert!(matches!(
            case.init(&mut ctx),
            Err(CaseError::MissingAttribLocation { .. })
        ));
        case.deinit(&mut ctx);
        assert_eq!(ctx.live, LiveObjects::default());
    }

    #[test]
    fn init_releases_all_objects_on_api_error() {
        let mut ctx = CountingContext {
            inject_error: Some(0x0505),
            ..CountingContext::default()
        };
        let mut case = counted_case();

        assert!(matches!(case.init(&mut ctx), Err(CaseError::ApiError { .. })));
        assert_eq!(ctx.live, LiveObjects::default());
    }

    #[test]
    fn clean_init_and_deinit_leave_no_objects_behind() {
        let mut ctx = CountingContext::default();
        let mut case = counted_case();

        assert!(matches!(case.init(&mut ctx), Ok(InitOutcome::Ready)));
        case.deinit(&mut ctx);
        assert_eq!(ctx.live, LiveObjects::default());
    }
}
