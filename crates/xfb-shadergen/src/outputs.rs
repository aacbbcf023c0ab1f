use thiserror::Error;
use tracing::debug;
use xfb_types::{path, PathError, PathParseError, VarType};

use crate::layout::InputLayout;
use crate::shader::attribute_name;
use crate::spec::ProgramSpec;
use crate::{Attribute, POINT_SIZE_ATTRIBUTE_NAME, POINT_SIZE_BUILTIN, POSITION_ATTRIBUTE_NAME,
    POSITION_BUILTIN};

/// Transform-feedback buffer layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferMode {
    /// Each captured varying lands in its own buffer at offset 0.
    Separate,
    /// All captured varyings share buffer 0 as one packed per-vertex record.
    Interleaved,
}

/// One transform-feedback output: where a captured varying path lands and
/// which input attributes feed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// The captured varying path string, verbatim from the spec.
    pub name: String,
    /// Destination buffer index.
    pub buffer: usize,
    /// Byte offset within that buffer's per-vertex record.
    pub offset: usize,
    /// Resolved type of the captured sub-path.
    pub ty: VarType,
    /// Contributing input attributes, in capture component order.
    pub inputs: Vec<Attribute>,
}

impl Output {
    /// Captured size in bytes (4 bytes per scalar component).
    pub fn byte_size(&self, spec: &ProgramSpec) -> usize {
        self.ty.scalar_size(spec.structs()) * 4
    }
}

/// Output planning failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OutputPlanError {
    /// A captured path string failed to parse against its varying's type.
    #[error("captured path {path:?} is malformed: {source}")]
    MalformedPath {
        /// The captured path string.
        path: String,
        /// Parse failure detail.
        source: PathParseError,
    },

    /// A captured path's root identifier names no declared varying.
    #[error("captured path {path:?} references undeclared varying {root:?}")]
    UnknownVarying {
        /// The captured path string.
        path: String,
        /// The unresolved root identifier.
        root: String,
    },

    /// `gl_PointSize` was captured but the layout has no point-size
    /// attribute (planner invariant: the layout must be computed with
    /// `use_point_size` matching the spec).
    #[error("captured {0:?} but the input layout has no matching attribute")]
    MissingBuiltinAttribute(&'static str),

    /// An expanded terminal's attribute is absent from the input layout.
    /// The layout and output planner share the naming rule, so this is an
    /// invariant violation, not a configuration error.
    #[error("expanded attribute {attribute:?} for captured path {path:?} not found in layout")]
    MissingAttribute {
        /// The captured path string.
        path: String,
        /// The derived attribute name.
        attribute: String,
    },

    /// Type traversal failed while expanding a captured sub-type.
    #[error("type traversal failed for captured path {path:?}: {source}")]
    Traversal {
        /// The captured path string.
        path: String,
        /// Underlying path error.
        source: PathError,
    },
}

/// Computes the transform-feedback output plan for `spec`.
///
/// Outputs appear in captured-path list order. In separate mode each output
/// gets its own buffer index and offset 0; in interleaved mode all outputs
/// share buffer 0 and offsets accumulate across prior outputs, so the final
/// running total equals the interleaved record stride.
pub fn compute_outputs(
    spec: &ProgramSpec,
    layout: &InputLayout,
    buffer_mode: BufferMode,
) -> Result<Vec<Output>, OutputPlanError> {
    let registry = spec.structs();
    let mut outputs = Vec::new();
    let mut interleaved_offset = 0usize;

    for (index, captured) in spec.captured().iter().enumerate() {
        let (ty, inputs) = if captured == POSITION_BUILTIN {
            let attr = layout
                .attribute(POSITION_ATTRIBUTE_NAME)
                .ok_or(OutputPlanError::MissingBuiltinAttribute(POSITION_BUILTIN))?;
            (attr.ty.clone(), vec![attr.clone()])
        } else if captured == POINT_SIZE_BUILTIN {
            let attr = layout
                .attribute(POINT_SIZE_ATTRIBUTE_NAME)
                .ok_or(OutputPlanError::MissingBuiltinAttribute(POINT_SIZE_BUILTIN))?;
            (attr.ty.clone(), vec![attr.clone()])
        } else {
            let root = path::parse_root_identifier(captured).map_err(|source| {
                OutputPlanError::MalformedPath {
                    path: captured.clone(),
                    source,
                }
            })?;
            let varying =
                spec.varying(root)
                    .ok_or_else(|| OutputPlanError::UnknownVarying {
                        path: captured.clone(),
                        root: root.to_owned(),
                    })?;
            let captured_path =
                path::parse(registry, &varying.ty, captured).map_err(|source| {
                    OutputPlanError::MalformedPath {
                        path: captured.clone(),
                        source,
                    }
                })?;
            let sub_type = path::resolve(registry, &varying.ty, &captured_path).map_err(
                |source| OutputPlanError::Traversal {
                    path: captured.clone(),
                    source,
                },
            )?;

            // Expand the captured sub-type to vector-level terminals and
            // map each one back to its input attribute via the shared
            // naming rule applied to the full (captured ++ relative) path.
            let terminals =
                path::enumerate_sub_paths(registry, &sub_type, path::Granularity::Vector)
                    .map_err(|source| OutputPlanError::Traversal {
                        path: captured.clone(),
                        source,
                    })?;
            let mut inputs = Vec::with_capacity(terminals.len());
            for terminal in terminals {
                let mut full = captured_path.clone();
                full.extend_from_slice(&terminal);
                let name = attribute_name(&varying.name, &full);
                let attr = layout.attribute(&name).ok_or_else(|| {
                    OutputPlanError::MissingAttribute {
                        path: captured.clone(),
                        attribute: name.clone(),
                    }
                })?;
                inputs.push(attr.clone());
            }
            (sub_type, inputs)
        };

        let (buffer, offset) = match buffer_mode {
            BufferMode::Separate => (index, 0),
            BufferMode::Interleaved => (0, interleaved_offset),
        };
        let byte_size = ty.scalar_size(registry) * 4;
        interleaved_offset += byte_size;

        outputs.push(Output {
            name: captured.clone(),
            buffer,
            offset,
            ty,
            inputs,
        });
    }

    debug!(
        outputs = outputs.len(),
        mode = ?buffer_mode,
        interleaved_stride = interleaved_offset,
        "computed transform feedback output plan"
    );

    Ok(outputs)
}

/// Per-buffer record strides implied by an output plan: the sum of the
/// byte sizes of the outputs assigned to each buffer index.
pub fn buffer_strides(spec: &ProgramSpec, outputs: &[Output]) -> Vec<usize> {
    let buffer_count = outputs.iter().map(|o| o.buffer + 1).max().unwrap_or(0);
    let mut strides = vec![0usize; buffer_count];
    for output in outputs {
        strides[output.buffer] += output.byte_size(spec);
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_input_layout;
    use crate::spec::Interpolation;
    use xfb_types::{DataType, Precision, StructMember};

    fn highp(ty: DataType) -> VarType {
        VarType::basic(ty, Precision::Highp)
    }

    fn sample_spec() -> ProgramSpec {
        let mut spec = ProgramSpec::new();
        let s = spec.declare_struct(
            "S",
            vec![
                StructMember {
                    name: "a".to_owned(),
                    ty: highp(DataType::FloatVec3),
                },
                StructMember {
                    name: "b".to_owned(),
                    ty: VarType::array(highp(DataType::FloatMat2), 2),
                },
            ],
        );
        spec.add_varying("v_s", VarType::structure(s), Interpolation::Smooth);
        spec.add_varying("v_u", highp(DataType::UintVec2), Interpolation::Flat);
        spec
    }

    #[test]
    fn separate_mode_assigns_one_buffer_per_output() {
        let mut spec = sample_spec();
        spec.capture("v_u");
        spec.capture("v_s.a");
        spec.capture("gl_Position");

        let layout = compute_input_layout(&spec, false).unwrap();
        let outputs = compute_outputs(&spec, &layout, BufferMode::Separate).unwrap();

        assert_eq!(outputs.len(), 3);
        for (i, output) in outputs.iter().enumerate() {
            assert_eq!(output.buffer, i);
            assert_eq!(output.offset, 0);
        }
        assert_eq!(buffer_strides(&spec, &outputs), vec![8, 12, 16]);
    }

    #[test]
    fn interleaved_mode_packs_buffer_zero() {
        let mut spec = sample_spec();
        spec.capture("v_s.a");
        spec.capture("v_u");

        let layout = compute_input_layout(&spec, false).unwrap();
        let outputs = compute_outputs(&spec, &layout, BufferMode::Interleaved).unwrap();

        assert_eq!(outputs[0].buffer, 0);
        assert_eq!(outputs[0].offset, 0);
        assert_eq!(outputs[1].buffer, 0);
        assert_eq!(outputs[1].offset, 12);
        assert_eq!(buffer_strides(&spec, &outputs), vec![20]);
    }

    #[test]
    fn composite_capture_collects_expanded_attributes_in_order() {
        let mut spec = sample_spec();
        spec.capture("v_s");

        let layout = compute_input_layout(&spec, false).unwrap();
        let outputs = compute_outputs(&spec, &layout, BufferMode::Separate).unwrap();

        let names: Vec<&str> = outputs[0].inputs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "a_s_m0",
                "a_s_m1_e0_c0",
                "a_s_m1_e0_c1",
                "a_s_m1_e1_c0",
                "a_s_m1_e1_c1",
            ]
        );
    }

    #[test]
    fn contributing_attribute_sizes_cover_resolved_type() {
        let mut spec = sample_spec();
        spec.capture("v_s");
        spec.capture("v_s.b[1]");
        spec.capture("v_u");

        let layout = compute_input_layout(&spec, false).unwrap();
        for mode in [BufferMode::Separate, BufferMode::Interleaved] {
            let outputs = compute_outputs(&spec, &layout, mode).unwrap();
            for output in &outputs {
                let input_bytes: usize = output.inputs.iter().map(|a| a.byte_size()).sum();
                assert_eq!(input_bytes, output.byte_size(&spec), "{}", output.name);
            }
        }
    }

    #[test]
    fn matrix_column_capture_resolves_column_vector() {
        let mut spec = sample_spec();
        spec.capture("v_s.b[0][1]");

        let layout = compute_input_layout(&spec, false).unwrap();
        let outputs = compute_outputs(&spec, &layout, BufferMode::Separate).unwrap();
        assert_eq!(outputs[0].ty, highp(DataType::FloatVec2));
        assert_eq!(outputs[0].inputs[0].name, "a_s_m1_e0_c1");
    }

    #[test]
    fn unknown_varying_is_rejected() {
        let mut spec = sample_spec();
        spec.capture("v_nope");

        let layout = compute_input_layout(&spec, false).unwrap();
        assert!(matches!(
            compute_outputs(&spec, &layout, BufferMode::Separate),
            Err(OutputPlanError::UnknownVarying { .. })
        ));
    }

    #[test]
    fn point_size_capture_requires_matching_layout() {
        let mut spec = sample_spec();
        spec.capture("gl_PointSize");

        let without = compute_input_layout(&spec, false).unwrap();
        assert!(matches!(
            compute_outputs(&spec, &without, BufferMode::Separate),
            Err(OutputPlanError::MissingBuiltinAttribute(_))
        ));

        let with = compute_input_layout(&spec, true).unwrap();
        let outputs = compute_outputs(&spec, &with, BufferMode::Separate).unwrap();
        assert_eq!(outputs[0].ty, highp(DataType::Float));
    }
}
