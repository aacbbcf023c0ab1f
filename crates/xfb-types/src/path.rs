//! Type-path algebra: addressing sub-components of composite variables.
//!
//! A path is an ordered list of [`PathComponent`] steps applied to a root
//! [`VarType`]. The textual form mirrors GLSL accessor syntax: struct
//! members render as `.name`, while array elements, matrix columns and
//! vector components all render as `[index]` (the step kind is recovered
//! from the type being indexed, exactly as a GLSL compiler would).

use std::fmt::Write as _;

use crate::error::{PathError, PathParseError};
use crate::var_type::{ArraySize, StructRegistry, VarType};

/// The kind of a single path step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Selects a struct member by declaration index.
    StructMember,
    /// Selects an array element.
    ArrayElement,
    /// Selects a matrix column (narrows to the column's float vector).
    MatrixColumn,
    /// Selects a vector component (narrows to the vector's scalar type).
    VectorComponent,
}

/// One step of a type path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathComponent {
    /// Step kind.
    pub kind: ComponentKind,
    /// Step index (member index, element index, column or component).
    pub index: usize,
}

impl PathComponent {
    /// A struct-member step.
    pub fn member(index: usize) -> Self {
        Self {
            kind: ComponentKind::StructMember,
            index,
        }
    }

    /// An array-element step.
    pub fn element(index: usize) -> Self {
        Self {
            kind: ComponentKind::ArrayElement,
            index,
        }
    }

    /// A matrix-column step.
    pub fn column(index: usize) -> Self {
        Self {
            kind: ComponentKind::MatrixColumn,
            index,
        }
    }

    /// A vector-component step.
    pub fn component(index: usize) -> Self {
        Self {
            kind: ComponentKind::VectorComponent,
            index,
        }
    }
}

/// An ordered sequence of path steps.
pub type TypePath = Vec<PathComponent>;

/// Applies a single path step to `current`, returning the narrowed type.
///
/// This is the single source of truth for step semantics; validation,
/// resolution, parsing and rendering are all built on it so they can never
/// disagree.
fn apply_component(
    registry: &StructRegistry,
    current: &VarType,
    component: PathComponent,
) -> Result<VarType, PathError> {
    match (current, component.kind) {
        (VarType::Struct(handle), ComponentKind::StructMember) => {
            let st = registry
                .get(*handle)
                .ok_or(PathError::DanglingStructHandle)?;
            let member = st.members.get(component.index).ok_or({
                PathError::IndexOutOfBounds {
                    kind: component.kind,
                    index: component.index,
                    bound: st.members.len(),
                }
            })?;
            Ok(member.ty.clone())
        }
        (VarType::Array { element, size }, ComponentKind::ArrayElement) => {
            // Unsized arrays accept any index: only captured-varying syntax
            // is checked here, never runtime layout.
            if let ArraySize::Fixed(n) = size {
                if component.index >= *n {
                    return Err(PathError::IndexOutOfBounds {
                        kind: component.kind,
                        index: component.index,
                        bound: *n,
                    });
                }
            }
            Ok((**element).clone())
        }
        (VarType::Basic { ty, precision }, ComponentKind::MatrixColumn) if ty.is_matrix() => {
            let columns = ty.matrix_columns().expect("matrix has columns");
            if component.index >= columns {
                return Err(PathError::IndexOutOfBounds {
                    kind: component.kind,
                    index: component.index,
                    bound: columns,
                });
            }
            let column = ty.column_type().expect("matrix has a column type");
            Ok(VarType::basic(column, *precision))
        }
        (VarType::Basic { ty, precision }, ComponentKind::VectorComponent) if ty.is_vector() => {
            let components = ty.scalar_count();
            if component.index >= components {
                return Err(PathError::IndexOutOfBounds {
                    kind: component.kind,
                    index: component.index,
                    bound: components,
                });
            }
            let scalar = ty.scalar_type().expect("vector has a scalar type");
            Ok(VarType::basic(scalar, *precision))
        }
        (_, kind) => Err(PathError::ShapeMismatch { kind }),
    }
}

/// Resolves `path` against `root`, returning the addressed sub-type.
///
/// Matrix-column and vector-component steps construct a fresh basic type
/// (the column vector / component scalar at the source type's precision)
/// rather than referencing stored data.
pub fn resolve(
    registry: &StructRegistry,
    root: &VarType,
    path: &[PathComponent],
) -> Result<VarType, PathError> {
    let mut current = root.clone();
    for &component in path {
        current = apply_component(registry, &current, component)?;
    }
    Ok(current)
}

/// True when `path` is valid against `root`.
///
/// Equivalent to `resolve(..).is_ok()`: any shape mismatch or out-of-bounds
/// index fails closed.
pub fn is_valid(registry: &StructRegistry, root: &VarType, path: &[PathComponent]) -> bool {
    resolve(registry, root, path).is_ok()
}

/// Returns the leading identifier of a textual path (the root variable
/// name), without parsing the remainder.
pub fn parse_root_identifier(text: &str) -> Result<&str, PathParseError> {
    let end = text
        .char_indices()
        .find(|(_, c)| !is_identifier_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    if end == 0 {
        return Err(PathParseError::ExpectedIdentifier { offset: 0 });
    }
    Ok(&text[..end])
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parses the textual form of a type path against `root`.
///
/// Grammar: `identifier (('.' identifier) | ('[' number ']'))*`. The
/// leading identifier names the root variable; it is consumed but not part
/// of the returned path. Member names resolve by lookup against the
/// current resolved sub-type, and `[n]` steps classify as array-element,
/// matrix-column or vector-component depending on that sub-type's shape.
pub fn parse(
    registry: &StructRegistry,
    root: &VarType,
    text: &str,
) -> Result<TypePath, PathParseError> {
    let ident = parse_root_identifier(text)?;
    let mut rest = &text[ident.len()..];
    let mut offset = ident.len();

    let mut current = root.clone();
    let mut path = TypePath::new();

    while !rest.is_empty() {
        let c = rest.chars().next().expect("non-empty input");
        if c == '.' {
            let after = &rest[1..];
            let name = parse_root_identifier(after)
                .map_err(|_| PathParseError::ExpectedIdentifier { offset: offset + 1 })?;
            let component = match &current {
                VarType::Struct(handle) => {
                    let st = registry
                        .get(*handle)
                        .ok_or(PathError::DanglingStructHandle)?;
                    let index =
                        st.member_index(name)
                            .ok_or_else(|| PathParseError::NoSuchMember {
                                name: name.to_owned(),
                            })?;
                    PathComponent::member(index)
                }
                _ => {
                    return Err(PathParseError::MemberAccessOnNonStruct {
                        name: name.to_owned(),
                    })
                }
            };
            current = apply_component(registry, &current, component)?;
            path.push(component);
            offset += 1 + name.len();
            rest = &after[name.len()..];
        } else if c == '[' {
            let bracket_offset = offset;
            let after = &rest[1..];
            let digits_len = after.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits_len == 0 {
                return Err(PathParseError::ExpectedNumber { offset: offset + 1 });
            }
            let index: usize = after[..digits_len].parse().map_err(|_| {
                PathParseError::ExpectedNumber { offset: offset + 1 }
            })?;
            if !after[digits_len..].starts_with(']') {
                return Err(PathParseError::UnterminatedBracket {
                    offset: bracket_offset,
                });
            }
            let component = match &current {
                VarType::Array { .. } => PathComponent::element(index),
                VarType::Basic { ty, .. } if ty.is_matrix() => PathComponent::column(index),
                VarType::Basic { ty, .. } if ty.is_vector() => PathComponent::component(index),
                _ => {
                    return Err(PathError::ShapeMismatch {
                        kind: ComponentKind::ArrayElement,
                    }
                    .into())
                }
            };
            current = apply_component(registry, &current, component)?;
            path.push(component);
            offset += 1 + digits_len + 1;
            rest = &after[digits_len + 1..];
        } else {
            return Err(PathParseError::UnexpectedCharacter { found: c, offset });
        }
    }

    Ok(path)
}

/// Renders the accessor suffix of `path` (everything after the root
/// identifier), e.g. `"[1].member[0]"`.
///
/// Struct members render as `.name`; array elements, matrix columns and
/// vector components all render as `[index]`, which re-parses to the same
/// path because step kinds are recovered from the type shape.
pub fn format_suffix(
    registry: &StructRegistry,
    root: &VarType,
    path: &[PathComponent],
) -> Result<String, PathError> {
    let mut out = String::new();
    let mut current = root.clone();
    for &component in path {
        match component.kind {
            ComponentKind::StructMember => {
                let VarType::Struct(handle) = &current else {
                    return Err(PathError::ShapeMismatch {
                        kind: component.kind,
                    });
                };
                let st = registry
                    .get(*handle)
                    .ok_or(PathError::DanglingStructHandle)?;
                let member =
                    st.members
                        .get(component.index)
                        .ok_or(PathError::IndexOutOfBounds {
                            kind: component.kind,
                            index: component.index,
                            bound: st.members.len(),
                        })?;
                let _ = write!(out, ".{}", member.name);
            }
            _ => {
                let _ = write!(out, "[{}]", component.index);
            }
        }
        current = apply_component(registry, &current, component)?;
    }
    Ok(out)
}

/// Target granularity for sub-path enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Stop at basic types: structs and arrays are expanded, matrices are
    /// not split into columns.
    Basic,
    /// Stop at scalars and vectors: additionally splits matrices into
    /// column vectors.
    Vector,
}

/// Enumerates every terminal sub-path of `root` at the given granularity.
///
/// The order is canonical and load-bearing: struct members in declaration
/// order, array elements from 0 upward, matrix columns from 0 upward, depth
/// first. The shader generator names attributes and emits assignment
/// statements in exactly this order, so enumeration determinism is what
/// makes generated source reproducible byte for byte.
pub fn enumerate_sub_paths(
    registry: &StructRegistry,
    root: &VarType,
    granularity: Granularity,
) -> Result<Vec<TypePath>, PathError> {
    let mut out = Vec::new();
    let mut prefix = TypePath::new();
    visit(registry, root, granularity, &mut prefix, &mut out)?;
    Ok(out)
}

fn visit(
    registry: &StructRegistry,
    ty: &VarType,
    granularity: Granularity,
    prefix: &mut TypePath,
    out: &mut Vec<TypePath>,
) -> Result<(), PathError> {
    let terminal = match (granularity, ty) {
        (Granularity::Basic, VarType::Basic { .. }) => true,
        (Granularity::Vector, VarType::Basic { ty, .. }) => ty.is_scalar_or_vector(),
        _ => false,
    };
    if terminal {
        out.push(prefix.clone());
        return Ok(());
    }

    match ty {
        VarType::Basic { ty: basic, precision } => {
            // Only reachable at vector granularity; matrices expand into
            // columns, anything else (samplers) cannot be decomposed.
            let Some(columns) = basic.matrix_columns() else {
                return Err(PathError::NotDecomposable {
                    name: basic.glsl_name(),
                });
            };
            let column = VarType::basic(
                basic.column_type().expect("matrix has a column type"),
                *precision,
            );
            for i in 0..columns {
                prefix.push(PathComponent::column(i));
                visit(registry, &column, granularity, prefix, out)?;
                prefix.pop();
            }
        }
        VarType::Array { element, size } => {
            let count = match size {
                ArraySize::Fixed(n) => *n,
                ArraySize::Unsized => 0,
            };
            for i in 0..count {
                prefix.push(PathComponent::element(i));
                visit(registry, element, granularity, prefix, out)?;
                prefix.pop();
            }
        }
        VarType::Struct(handle) => {
            let st = registry
                .get(*handle)
                .ok_or(PathError::DanglingStructHandle)?;
            for (i, member) in st.members.iter().enumerate() {
                prefix.push(PathComponent::member(i));
                visit(registry, &member.ty, granularity, prefix, out)?;
                prefix.pop();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_type::{DataType, Precision};
    use crate::var_type::{StructMember, StructType};

    fn highp(ty: DataType) -> VarType {
        VarType::basic(ty, Precision::Highp)
    }

    /// struct S { vec3 a; mat2 b[2]; };  root: S[3]
    fn sample_type(reg: &mut StructRegistry) -> VarType {
        let s = reg.declare(StructType {
            name: Some("S".to_owned()),
            members: vec![
                StructMember {
                    name: "a".to_owned(),
                    ty: highp(DataType::FloatVec3),
                },
                StructMember {
                    name: "b".to_owned(),
                    ty: VarType::array(highp(DataType::FloatMat2), 2),
                },
            ],
        });
        VarType::array(VarType::structure(s), 3)
    }

    #[test]
    fn parse_resolves_member_and_index_steps() {
        let mut reg = StructRegistry::new();
        let root = sample_type(&mut reg);

        let path = parse(&reg, &root, "v_x[1].b[0][1]").unwrap();
        assert_eq!(
            path,
            vec![
                PathComponent::element(1),
                PathComponent::member(1),
                PathComponent::element(0),
                PathComponent::column(1),
            ]
        );
        assert!(is_valid(&reg, &root, &path));
        assert_eq!(
            resolve(&reg, &root, &path).unwrap(),
            highp(DataType::FloatVec2)
        );
    }

    #[test]
    fn parse_classifies_vector_component_indexing() {
        let mut reg = StructRegistry::new();
        let root = sample_type(&mut reg);

        let path = parse(&reg, &root, "v_x[0].a[2]").unwrap();
        assert_eq!(path.last().unwrap().kind, ComponentKind::VectorComponent);
        assert_eq!(
            resolve(&reg, &root, &path).unwrap(),
            highp(DataType::Float)
        );
    }

    #[test]
    fn parse_rejects_malformed_syntax() {
        let mut reg = StructRegistry::new();
        let root = sample_type(&mut reg);

        assert!(matches!(
            parse(&reg, &root, "[0]"),
            Err(PathParseError::ExpectedIdentifier { offset: 0 })
        ));
        assert!(matches!(
            parse(&reg, &root, "v_x[0"),
            Err(PathParseError::ExpectedNumber { .. })
                | Err(PathParseError::UnterminatedBracket { .. })
        ));
        assert!(matches!(
            parse(&reg, &root, "v_x[0].nope"),
            Err(PathParseError::NoSuchMember { .. })
        ));
        assert!(matches!(
            parse(&reg, &root, "v_x.a"),
            Err(PathParseError::MemberAccessOnNonStruct { .. })
        ));
        assert!(matches!(
            parse(&reg, &root, "v_x[3]"),
            Err(PathParseError::Path(PathError::IndexOutOfBounds { .. }))
        ));
    }

    #[test]
    fn unsized_arrays_accept_any_index() {
        let reg = StructRegistry::new();
        let root = VarType::unsized_array(highp(DataType::FloatVec4));
        let path = parse(&reg, &root, "v_x[17]").unwrap();
        assert!(is_valid(&reg, &root, &path));
    }

    #[test]
    fn validation_fails_closed_on_shape_mismatch() {
        let reg = StructRegistry::new();
        let root = highp(DataType::FloatVec4);

        // Matrix-column step on a vector.
        assert!(!is_valid(&reg, &root, &[PathComponent::column(0)]));
        // Member step on a basic type.
        assert!(!is_valid(&reg, &root, &[PathComponent::member(0)]));
        // Component step past the end.
        assert!(!is_valid(&reg, &root, &[PathComponent::component(4)]));
        assert!(is_valid(&reg, &root, &[PathComponent::component(3)]));
    }

    #[test]
    fn resolve_narrows_matrix_then_vector() {
        let reg = StructRegistry::new();
        let root = VarType::basic(DataType::FloatMat3x4, Precision::Mediump);

        let col = resolve(&reg, &root, &[PathComponent::column(2)]).unwrap();
        assert_eq!(col, VarType::basic(DataType::FloatVec4, Precision::Mediump));

        let scalar = resolve(
            &reg,
            &root,
            &[PathComponent::column(2), PathComponent::component(3)],
        )
        .unwrap();
        assert_eq!(scalar, VarType::basic(DataType::Float, Precision::Mediump));
    }

    #[test]
    fn enumeration_order_is_canonical_depth_first() {
        let mut reg = StructRegistry::new();
        let root = sample_type(&mut reg);

        let paths = enumerate_sub_paths(&reg, &root, Granularity::Vector).unwrap();
        // Per element: a (1 terminal) then b[0..2] as 2 columns each.
        assert_eq!(paths.len(), 3 * (1 + 2 * 2));

        // First element, declaration order.
        assert_eq!(
            paths[0],
            vec![PathComponent::element(0), PathComponent::member(0)]
        );
        assert_eq!(
            paths[1],
            vec![
                PathComponent::element(0),
                PathComponent::member(1),
                PathComponent::element(0),
                PathComponent::column(0),
            ]
        );
        assert_eq!(
            paths[2],
            vec![
                PathComponent::element(0),
                PathComponent::member(1),
                PathComponent::element(0),
                PathComponent::column(1),
            ]
        );

        // Basic granularity keeps matrices whole.
        let basic = enumerate_sub_paths(&reg, &root, Granularity::Basic).unwrap();
        assert_eq!(basic.len(), 3 * (1 + 2));
    }

    #[test]
    fn enumerated_paths_round_trip_through_text() {
        let mut reg = StructRegistry::new();
        let root = sample_type(&mut reg);

        for path in enumerate_sub_paths(&reg, &root, Granularity::Vector).unwrap() {
            assert!(is_valid(&reg, &root, &path));

            let text = format!("v_x{}", format_suffix(&reg, &root, &path).unwrap());
            let reparsed = parse(&reg, &root, &text).unwrap();
            assert_eq!(reparsed, path, "round trip failed for {text}");

            // Vector-level terminals resolve to scalars or vectors.
            let resolved = resolve(&reg, &root, &path).unwrap();
            let (ty, _) = resolved.as_basic().expect("terminal is basic");
            assert!(ty.is_scalar_or_vector());
        }
    }

    #[test]
    fn root_identifier_extraction() {
        assert_eq!(parse_root_identifier("v_var[2].m").unwrap(), "v_var");
        assert_eq!(parse_root_identifier("gl_Position").unwrap(), "gl_Position");
        assert!(parse_root_identifier("[2]").is_err());
    }

    #[test]
    fn samplers_are_not_decomposable_at_vector_granularity() {
        let reg = StructRegistry::new();
        let root = highp(DataType::Sampler2D);
        assert!(matches!(
            enumerate_sub_paths(&reg, &root, Granularity::Vector),
            Err(PathError::NotDecomposable { .. })
        ));
        // At basic granularity a sampler is a (degenerate) terminal.
        let basic = enumerate_sub_paths(&reg, &root, Granularity::Basic).unwrap();
        assert_eq!(basic, vec![TypePath::new()]);
    }
}
