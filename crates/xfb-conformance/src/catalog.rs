//! Construction of the full named test tree.
//!
//! Cases are organized by capture target first (position, point size,
//! basic types, arrays, array elements, interpolation), then buffer mode,
//! then topology, then type and precision. The scripted draw sequences are
//! fixed data tables shared by every case; seeded random cases round out
//! the catalog.

use xfb_shadergen::{BufferMode, Interpolation, ProgramSpec};
use xfb_types::{DataType, Precision, VarType};

use crate::case::{DrawCall, DrawScript, TransformFeedbackCase};
use crate::harness::{TestGroup, TestTree};
use crate::random_spec::generate_random_case;
use crate::topology::PrimitiveType;

/// Every non-matrix transferable basic type.
const SCALAR_AND_VECTOR_TYPES: [DataType; 12] = [
    DataType::Float,
    DataType::FloatVec2,
    DataType::FloatVec3,
    DataType::FloatVec4,
    DataType::Int,
    DataType::IntVec2,
    DataType::IntVec3,
    DataType::IntVec4,
    DataType::Uint,
    DataType::UintVec2,
    DataType::UintVec3,
    DataType::UintVec4,
];

const MATRIX_TYPES: [DataType; 9] = [
    DataType::FloatMat2,
    DataType::FloatMat2x3,
    DataType::FloatMat2x4,
    DataType::FloatMat3x2,
    DataType::FloatMat3,
    DataType::FloatMat3x4,
    DataType::FloatMat4x2,
    DataType::FloatMat4x3,
    DataType::FloatMat4,
];

/// Base topologies used by the type-product groups. Strips, fans and
/// loops are exercised by the position group; repeating the full type
/// product over them adds nothing the topology arithmetic tests do not
/// already cover.
const BASE_PRIMITIVES: [PrimitiveType; 3] = [
    PrimitiveType::Points,
    PrimitiveType::Lines,
    PrimitiveType::Triangles,
];

const BUFFER_MODES: [BufferMode; 2] = [BufferMode::Separate, BufferMode::Interleaved];

const RANDOM_CASES_PER_GROUP: u64 = 10;

fn mode_name(mode: BufferMode) -> &'static str {
    match mode {
        BufferMode::Separate => "separate",
        BufferMode::Interleaved => "interleaved",
    }
}

/// The fixed scripted draw sequences every non-random case runs, one per
/// iteration.
pub fn default_scripts() -> Vec<DrawScript> {
    vec![
        DrawScript::new("elem_count_1", vec![DrawCall::new(1, true)]),
        DrawScript::new("elem_count_2", vec![DrawCall::new(2, true)]),
        DrawScript::new("elem_count_3", vec![DrawCall::new(3, true)]),
        DrawScript::new("elem_count_4", vec![DrawCall::new(4, true)]),
        DrawScript::new("elem_count_123", vec![DrawCall::new(123, true)]),
        DrawScript::new(
            "basic_pause_1",
            vec![
                DrawCall::new(64, false),
                DrawCall::new(64, true),
                DrawCall::new(64, true),
            ],
        ),
        DrawScript::new(
            "basic_pause_2",
            vec![
                DrawCall::new(13, true),
                DrawCall::new(5, false),
                DrawCall::new(17, true),
                DrawCall::new(3, false),
                DrawCall::new(7, true),
            ],
        ),
        DrawScript::new(
            "start_paused",
            vec![DrawCall::new(123, false), DrawCall::new(123, true)],
        ),
    ]
}

fn type_case_name(precision: Precision, ty: DataType) -> String {
    format!("{}_{}", precision.glsl_name(), ty.glsl_name())
}

fn interpolation_for(ty: DataType) -> Interpolation {
    if ty.is_int_kind() || ty.is_uint_kind() {
        Interpolation::Flat
    } else {
        Interpolation::Smooth
    }
}

fn builtin_case(
    name: String,
    captured: &str,
    primitive: PrimitiveType,
    mode: BufferMode,
) -> TransformFeedbackCase {
    let mut spec = ProgramSpec::new();
    spec.capture(captured);
    TransformFeedbackCase::new(
        name,
        format!("capture {captured}"),
        primitive,
        mode,
        spec,
        default_scripts(),
    )
}

fn basic_type_case(
    primitive: PrimitiveType,
    mode: BufferMode,
    ty: DataType,
    precision: Precision,
) -> TransformFeedbackCase {
    let mut spec = ProgramSpec::new();
    spec.add_varying(
        "v_var",
        VarType::basic(ty, precision),
        interpolation_for(ty),
    );
    spec.capture("v_var");
    TransformFeedbackCase::new(
        type_case_name(precision, ty),
        "capture a single basic-typed varying",
        primitive,
        mode,
        spec,
        default_scripts(),
    )
}

fn array_case(
    primitive: PrimitiveType,
    mode: BufferMode,
    ty: DataType,
    precision: Precision,
    whole: bool,
) -> TransformFeedbackCase {
    let mut spec = ProgramSpec::new();
    spec.add_varying(
        "v_var",
        VarType::array(VarType::basic(ty, precision), 4),
        interpolation_for(ty),
    );
    let description = if whole {
        spec.capture("v_var");
        "capture a whole array varying"
    } else {
        spec.capture("v_var[0]");
        spec.capture("v_var[2]");
        "capture individual array elements"
    };
    TransformFeedbackCase::new(
        type_case_name(precision, ty),
        description,
        primitive,
        mode,
        spec,
        default_scripts(),
    )
}

fn interpolation_case(
    qualifier: Interpolation,
    primitive: PrimitiveType,
    mode: BufferMode,
) -> TransformFeedbackCase {
    let mut spec = ProgramSpec::new();
    spec.add_varying(
        "v_var",
        VarType::basic(DataType::FloatVec4, Precision::Highp),
        qualifier,
    );
    spec.capture("v_var");
    TransformFeedbackCase::new(
        format!("{}_vec4", qualifier.glsl_name()),
        "capture under an explicit interpolation qualifier",
        primitive,
        mode,
        spec,
        default_scripts(),
    )
}

fn position_group() -> TestGroup {
    let mut group = TestGroup::new("position", "capture gl_Position");
    for mode in BUFFER_MODES {
        for primitive in PrimitiveType::ALL {
            group.add_case(builtin_case(
                format!("{}_{}", primitive.name(), mode_name(mode)),
                xfb_shadergen::POSITION_BUILTIN,
                primitive,
                mode,
            ));
        }
    }
    group
}

fn point_size_group() -> TestGroup {
    let mut group = TestGroup::new("point_size", "capture gl_PointSize");
    for mode in BUFFER_MODES {
        group.add_case(builtin_case(
            format!("points_{}", mode_name(mode)),
            xfb_shadergen::POINT_SIZE_BUILTIN,
            PrimitiveType::Points,
            mode,
        ));
    }
    group
}

fn type_product_group(
    name: &str,
    description: &str,
    include_matrices: bool,
    make: impl Fn(PrimitiveType, BufferMode, DataType, Precision) -> TransformFeedbackCase,
) -> TestGroup {
    let mut group = TestGroup::new(name, description);
    for mode in BUFFER_MODES {
        let mut mode_group = TestGroup::new(mode_name(mode), "");
        for primitive in BASE_PRIMITIVES {
            let mut prim_group = TestGroup::new(primitive.name(), "");
            for precision in Precision::ALL {
                for ty in SCALAR_AND_VECTOR_TYPES {
                    prim_group.add_case(make(primitive, mode, ty, precision));
                }
                if include_matrices {
                    for ty in MATRIX_TYPES {
                        prim_group.add_case(make(primitive, mode, ty, precision));
                    }
                }
            }
            mode_group.add_group(prim_group);
        }
        group.add_group(mode_group);
    }
    group
}

fn interpolation_group() -> TestGroup {
    let mut group = TestGroup::new("interpolation", "interpolation qualifiers");
    for mode in BUFFER_MODES {
        let mut mode_group = TestGroup::new(mode_name(mode), "");
        for qualifier in Interpolation::ALL {
            mode_group.add_case(interpolation_case(
                qualifier,
                PrimitiveType::Triangles,
                mode,
            ));
        }
        group.add_group(mode_group);
    }
    group
}

fn random_group() -> TestGroup {
    let mut group = TestGroup::new("random", "seeded random program specs");
    for (mode_index, mode) in BUFFER_MODES.into_iter().enumerate() {
        let mut mode_group = TestGroup::new(mode_name(mode), "");
        for (prim_index, primitive) in BASE_PRIMITIVES.into_iter().enumerate() {
            let mut prim_group = TestGroup::new(primitive.name(), "");
            for index in 0..RANDOM_CASES_PER_GROUP {
                let seed =
                    ((mode_index as u64) << 16) | ((prim_index as u64) << 8) | index;
                prim_group.add_case(generate_random_case(
                    index.to_string(),
                    primitive,
                    mode,
                    seed,
                ));
            }
            mode_group.add_group(prim_group);
        }
        group.add_group(mode_group);
    }
    group
}

/// Builds the complete test tree.
///
/// Capability limits are deliberately not consulted here: every
/// combination is emitted, and cases exceeding the context's limits
/// report a not-supported outcome at init rather than vanishing from the
/// catalog.
pub fn build_catalog() -> TestTree {
    let mut root = TestGroup::new("transform_feedback", "transform feedback conformance");
    root.add_group(position_group());
    root.add_group(point_size_group());
    root.add_group(type_product_group(
        "basic_types",
        "capture basic-typed varyings",
        true,
        basic_type_case,
    ));
    root.add_group(type_product_group(
        "array",
        "capture whole array varyings",
        true,
        |primitive, mode, ty, precision| array_case(primitive, mode, ty, precision, true),
    ));
    root.add_group(type_product_group(
        "array_element",
        "capture individual array elements",
        true,
        |primitive, mode, ty, precision| array_case(primitive, mode, ty, precision, false),
    ));
    root.add_group(interpolation_group());
    root.add_group(random_group());
    TestTree::Group(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::flatten_tree;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn full_names_are_unique() {
        let cases = flatten_tree(build_catalog());
        let mut seen = HashSet::new();
        for case in &cases {
            assert!(seen.insert(case.full_name.clone()), "dup {}", case.full_name);
        }
        assert!(!cases.is_empty());
    }

    #[test]
    fn expected_group_sizes() {
        let cases = flatten_tree(build_catalog());
        let count_prefix = |prefix: &str| {
            cases
                .iter()
                .filter(|c| c.full_name.starts_with(prefix))
                .count()
        };

        // 7 topologies x 2 modes.
        assert_eq!(count_prefix("transform_feedback.position."), 14);
        assert_eq!(count_prefix("transform_feedback.point_size."), 2);
        // 2 modes x 3 primitives x 3 precisions x 21 types.
        assert_eq!(count_prefix("transform_feedback.basic_types."), 378);
        assert_eq!(count_prefix("transform_feedback.array."), 378);
        assert_eq!(count_prefix("transform_feedback.array_element."), 378);
        // 2 modes x 3 qualifiers.
        assert_eq!(count_prefix("transform_feedback.interpolation."), 6);
        // 2 modes x 3 primitives x 10 seeds.
        assert_eq!(count_prefix("transform_feedback.random."), 60);
    }

    #[test]
    fn every_case_captures_and_has_scripts() {
        for case in flatten_tree(build_catalog()) {
            assert!(
                !case.case.spec().captured().is_empty(),
                "{} captures nothing",
                case.full_name
            );
            assert!(
                !case.case.scripts().is_empty(),
                "{} has no scripts",
                case.full_name
            );
        }
    }

    #[test]
    fn sample_names_are_stable() {
        let cases = flatten_tree(build_catalog());
        let names: HashSet<&str> = cases.iter().map(|c| c.full_name.as_str()).collect();
        for expected in [
            "transform_feedback.position.triangle_strip_interleaved",
            "transform_feedback.point_size.points_separate",
            "transform_feedback.basic_types.separate.points.lowp_float",
            "transform_feedback.basic_types.interleaved.triangles.highp_mat3x4",
            "transform_feedback.array_element.interleaved.lines.mediump_uvec3",
            "transform_feedback.interpolation.separate.centroid_vec4",
            "transform_feedback.random.interleaved.triangles.9",
        ] {
            assert!(names.contains(expected), "missing {expected}");
        }
    }

    #[test]
    fn default_scripts_cover_pause_and_resume() {
        let scripts = default_scripts();
        let pause = scripts
            .iter()
            .find(|s| s.name == "basic_pause_1")
            .expect("basic_pause_1 script");
        assert_eq!(
            pause.calls,
            vec![
                DrawCall::new(64, false),
                DrawCall::new(64, true),
                DrawCall::new(64, true),
            ]
        );
        assert!(scripts.iter().any(|s| s.name == "start_paused"));
    }
}
