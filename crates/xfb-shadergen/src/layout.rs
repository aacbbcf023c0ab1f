use tracing::debug;
use xfb_types::{path, DataType, Precision, VarType};

use crate::shader::{attribute_name, ShaderGenError};
use crate::spec::ProgramSpec;

/// Name of the implicit position attribute (always present, always first).
pub const POSITION_ATTRIBUTE_NAME: &str = "a_position";
/// Name of the optional point-size attribute.
pub const POINT_SIZE_ATTRIBUTE_NAME: &str = "a_pointSize";

/// One vertex input attribute within the interleaved input record.
///
/// Attribute types are always scalar-or-vector basics: matrices, arrays and
/// structs are pre-expanded by the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Generated attribute name (see [`attribute_name`]).
    pub name: String,
    /// Scalar-or-vector basic type.
    pub ty: VarType,
    /// Byte offset within the interleaved per-vertex record.
    pub offset: usize,
}

impl Attribute {
    /// The basic data type of the attribute.
    pub fn data_type(&self) -> DataType {
        self.ty
            .as_basic()
            .expect("attributes are always basic types")
            .0
    }

    /// Size of the attribute in bytes (4 bytes per scalar component).
    pub fn byte_size(&self) -> usize {
        self.data_type().scalar_count() * 4
    }
}

/// The packed interleaved vertex input layout for a program spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLayout {
    /// Attributes in canonical order: position, optional point size, then
    /// one attribute per vector-level terminal sub-path of every varying.
    pub attributes: Vec<Attribute>,
    /// Total per-vertex record size in bytes.
    pub stride: usize,
}

impl InputLayout {
    /// Finds an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Computes the interleaved input layout for `spec`.
///
/// The position attribute (highp vec4) is always allocated first, then the
/// point-size attribute (highp float) when `use_point_size` is set, then one
/// attribute per vector-level terminal sub-path of every varying in the
/// canonical enumeration order. Every component is a 4-byte scalar, so
/// offsets advance by `scalar_count * 4` and stay 4-byte aligned.
pub fn compute_input_layout(
    spec: &ProgramSpec,
    use_point_size: bool,
) -> Result<InputLayout, ShaderGenError> {
    let registry = spec.structs();
    let mut attributes = Vec::new();
    let mut offset = 0usize;

    let mut push = |name: String, ty: VarType, offset: &mut usize| {
        let attr = Attribute {
            name,
            ty,
            offset: *offset,
        };
        *offset += attr.byte_size();
        attributes.push(attr);
    };

    push(
        POSITION_ATTRIBUTE_NAME.to_owned(),
        VarType::basic(DataType::FloatVec4, Precision::Highp),
        &mut offset,
    );
    if use_point_size {
        push(
            POINT_SIZE_ATTRIBUTE_NAME.to_owned(),
            VarType::basic(DataType::Float, Precision::Highp),
            &mut offset,
        );
    }

    for varying in spec.varyings() {
        let terminals =
            path::enumerate_sub_paths(registry, &varying.ty, path::Granularity::Vector)?;
        for terminal in terminals {
            let resolved = path::resolve(registry, &varying.ty, &terminal)?;
            let name = attribute_name(&varying.name, &terminal);
            push(name, resolved, &mut offset);
        }
    }

    debug!(
        attributes = attributes.len(),
        stride = offset,
        "computed input layout"
    );

    Ok(InputLayout {
        attributes,
        stride: offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Interpolation;
    use xfb_types::StructMember;

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
                    ty: highp(DataType::FloatMat2),
                },
            ],
        );
        spec.add_varying("v_s", VarType::structure(s), Interpolation::Smooth);
        spec.add_varying(
            "v_i",
            VarType::basic(DataType::IntVec2, Precision::Mediump),
            Interpolation::Flat,
        );
        spec
    }

    #[test]
    fn position_is_always_first() {
        let layout = compute_input_layout(&sample_spec(), false).unwrap();
        assert_eq!(layout.attributes[0].name, POSITION_ATTRIBUTE_NAME);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[0].byte_size(), 16);
    }

    #[test]
    fn point_size_follows_position() {
        let layout = compute_input_layout(&sample_spec(), true).unwrap();
        assert_eq!(layout.attributes[1].name, POINT_SIZE_ATTRIBUTE_NAME);
        assert_eq!(layout.attributes[1].offset, 16);
        assert_eq!(layout.attributes[1].byte_size(), 4);
    }

    #[test]
    fn offsets_are_increasing_aligned_and_sum_to_stride() {
        let layout = compute_input_layout(&sample_spec(), true).unwrap();

        let mut expected_offset = 0usize;
        for attr in &layout.attributes {
            assert_eq!(attr.offset, expected_offset, "attribute {}", attr.name);
            assert_eq!(attr.offset % 4, 0);
            expected_offset += attr.byte_size();
        }
        assert_eq!(layout.stride, expected_offset);

        // position(16) + pointSize(4) + vec3(12) + 2x mat2 column vec2(8) + ivec2(8)
        assert_eq!(layout.stride, 16 + 4 + 12 + 8 + 8 + 8);
    }

    #[test]
    fn expansion_order_matches_attribute_naming() {
        let layout = compute_input_layout(&sample_spec(), false).unwrap();
        let names: Vec<&str> = layout.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "a_position",
                "a_s_m0",
                "a_s_m1_c0",
                "a_s_m1_c1",
                "a_i",
            ]
        );
    }

    #[test]
    fn layout_is_deterministic() {
        let spec = sample_spec();
        let a = compute_input_layout(&spec, true).unwrap();
        let b = compute_input_layout(&spec, true).unwrap();
        assert_eq!(a, b);
    }
}
