use std::fmt::Write as _;

use thiserror::Error;
use tracing::debug;
use xfb_types::{
    path, ArraySize, ComponentKind, PathComponent, PathError, StructRegistry, StructType, VarType,
};

use crate::spec::ProgramSpec;

/// Generated vertex/fragment source pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    /// GLSL ES 3.00 vertex shader source.
    pub vertex: String,
    /// GLSL ES 3.00 fragment shader source.
    pub fragment: String,
}

/// Shader generation failure.
///
/// These indicate bugs in program-spec construction (bad types, bad paths),
/// never driver conformance failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShaderGenError {
    /// Type traversal failed (dangling struct handle, non-decomposable type).
    #[error("type traversal failed: {0}")]
    Path(#[from] PathError),

    /// A terminal sub-path did not resolve to a scalar or vector type.
    /// The vector-level iterator should make this impossible; hitting it is
    /// a generator invariant violation.
    #[error("terminal sub-path of varying {varying:?} is not a scalar or vector")]
    NonVectorTerminal {
        /// The offending varying name.
        varying: String,
    },
}

/// Derives the deterministic input attribute name for a varying sub-path.
///
/// A leading `v_` prefix is replaced by `a_`, then one suffix token is
/// appended per path step: `_m<i>` (struct member), `_e<i>` (array
/// element), `_c<i>` (matrix column), `_s<i>` (vector component).
pub fn attribute_name(varying_name: &str, path: &[PathComponent]) -> String {
    let stem = varying_name.strip_prefix("v_").unwrap_or(varying_name);
    let mut name = format!("a_{stem}");
    for component in path {
        let prefix = match component.kind {
            ComponentKind::StructMember => "_m",
            ComponentKind::ArrayElement => "_e",
            ComponentKind::MatrixColumn => "_c",
            ComponentKind::VectorComponent => "_s",
        };
        let _ = write!(name, "{prefix}{}", component.index);
    }
    name
}

/// Renders a GLSL declaration for `ty` named `name` (no trailing `;`).
///
/// Array sizes collect to the right of the name, outermost first. Bool
/// types carry no precision qualifier (GLSL defines none for them).
fn declare(registry: &StructRegistry, ty: &VarType, name: &str) -> Result<String, ShaderGenError> {
    let mut sizes = Vec::new();
    let mut base = ty;
    while let VarType::Array { element, size } = base {
        sizes.push(*size);
        base = element;
    }

    let base_text = match base {
        VarType::Basic { ty, precision } => {
            if ty.is_bool_kind() {
                ty.glsl_name().to_owned()
            } else {
                format!("{} {}", precision.glsl_name(), ty.glsl_name())
            }
        }
        VarType::Struct(handle) => {
            let st = registry
                .get(*handle)
                .ok_or(PathError::DanglingStructHandle)?;
            match &st.name {
                Some(name) => name.clone(),
                // Anonymous structs are declared inline at the use site.
                None => struct_declaration(registry, st, "struct")?,
            }
        }
        VarType::Array { .. } => unreachable!("arrays unwrapped above"),
    };

    let mut out = format!("{base_text} {name}");
    for size in sizes {
        match size {
            ArraySize::Fixed(n) => {
                let _ = write!(out, "[{n}]");
            }
            ArraySize::Unsized => out.push_str("[]"),
        }
    }
    Ok(out)
}

fn struct_declaration(
    registry: &StructRegistry,
    st: &StructType,
    keyword_and_name: &str,
) -> Result<String, ShaderGenError> {
    let mut out = format!("{keyword_and_name} {{\n");
    for member in &st.members {
        let _ = writeln!(out, "\t{};", declare(registry, &member.ty, &member.name)?);
    }
    out.push('}');
    Ok(out)
}

/// Emits `struct Name { ... };` declarations for every named struct, in
/// declaration order. Identical text is emitted into both stages.
fn write_struct_declarations(
    out: &mut String,
    registry: &StructRegistry,
) -> Result<(), ShaderGenError> {
    for (_, st) in registry.iter() {
        if let Some(name) = &st.name {
            let decl = struct_declaration(registry, st, &format!("struct {name}"))?;
            let _ = writeln!(out, "{decl};");
        }
    }
    Ok(())
}

/// Generates the vertex/fragment source pair for `spec`.
///
/// `point_size_required` forces a constant `gl_PointSize = 1.0` assignment
/// when the spec does not itself capture `gl_PointSize` (point-topology
/// draws need a defined point size either way).
///
/// The expansion is fully deterministic: attributes and assignment
/// statements follow the canonical vector-level sub-path order, so equal
/// specs produce byte-identical sources.
pub fn generate_shader_sources(
    spec: &ProgramSpec,
    point_size_required: bool,
) -> Result<ShaderSources, ShaderGenError> {
    let registry = spec.structs();
    let mut vtx = String::new();
    let mut frag = String::new();

    vtx.push_str("#version 300 es\n");
    vtx.push_str("in highp vec4 a_position;\n");
    if spec.uses_point_size() {
        vtx.push_str("in highp float a_pointSize;\n");
    }

    frag.push_str("#version 300 es\n");
    frag.push_str("layout(location = 0) out mediump vec4 o_color;\n");
    frag.push_str("uniform highp vec4 u_scale;\n");
    frag.push_str("uniform highp vec4 u_bias;\n");

    // Expand every varying into vector-level terminals once; the same list
    // drives attribute declarations, vertex assignments and fragment
    // accumulation so the three never disagree on order.
    let mut expanded = Vec::new();
    for varying in spec.varyings() {
        let terminals = path::enumerate_sub_paths(registry, &varying.ty, path::Granularity::Vector)?;
        for terminal in terminals {
            let resolved = path::resolve(registry, &varying.ty, &terminal)?;
            let Some((basic, _)) = resolved.as_basic() else {
                return Err(ShaderGenError::NonVectorTerminal {
                    varying: varying.name.clone(),
                });
            };
            if !basic.is_scalar_or_vector() {
                return Err(ShaderGenError::NonVectorTerminal {
                    varying: varying.name.clone(),
                });
            }
            expanded.push((varying, terminal, resolved, basic));
        }
    }

    for (varying, terminal, resolved, _) in &expanded {
        let name = attribute_name(&varying.name, terminal);
        let _ = writeln!(vtx, "in {};", declare(registry, resolved, &name)?);
    }

    write_struct_declarations(&mut vtx, registry)?;
    write_struct_declarations(&mut frag, registry)?;

    for varying in spec.varyings() {
        let decl = declare(registry, &varying.ty, &varying.name)?;
        let _ = writeln!(vtx, "{} out {decl};", varying.interpolation.glsl_name());
        let _ = writeln!(frag, "{} in {decl};", varying.interpolation.glsl_name());
    }

    vtx.push_str("void main (void)\n{\n");
    vtx.push_str("\tgl_Position = a_position;\n");
    if spec.uses_point_size() {
        vtx.push_str("\tgl_PointSize = a_pointSize;\n");
    } else if point_size_required {
        vtx.push_str("\tgl_PointSize = 1.0;\n");
    }
    for (varying, terminal, _, _) in &expanded {
        let suffix = path::format_suffix(registry, &varying.ty, terminal)?;
        let attr = attribute_name(&varying.name, terminal);
        let _ = writeln!(vtx, "\t{}{suffix} = {attr};", varying.name);
    }
    vtx.push_str("}\n");

    frag.push_str("void main (void)\n{\n");
    frag.push_str("\thighp vec4 res = vec4(0.0);\n");
    for (varying, terminal, _, basic) in &expanded {
        let suffix = path::format_suffix(registry, &varying.ty, terminal)?;
        let name = format!("{}{suffix}", varying.name);
        // Broadcast to all four channels so every component contributes to
        // the rasterized output.
        let expr = match basic.scalar_count() {
            1 => format!("vec4({name})"),
            2 => format!("vec4({name}.xxyy)"),
            3 => format!("vec4({name}.xyzx)"),
            _ => format!("vec4({name})"),
        };
        let _ = writeln!(frag, "\tres += {expr};");
    }
    frag.push_str("\to_color = res * u_scale + u_bias;\n}\n");

    debug!(
        varyings = spec.varyings().len(),
        attributes = expanded.len(),
        vertex_len = vtx.len(),
        fragment_len = frag.len(),
        "generated shader sources"
    );

    Ok(ShaderSources {
        vertex: vtx,
        fragment: frag,
    })
}
