use xfb_types::{StructHandle, StructMember, StructRegistry, StructType, VarType};

use crate::POINT_SIZE_BUILTIN;

/// Interpolation qualifier of a varying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// Default perspective-correct interpolation.
    Smooth,
    /// No interpolation; mandatory for integer varyings.
    Flat,
    /// Centroid-sampled interpolation.
    Centroid,
}

impl Interpolation {
    /// The GLSL qualifier keyword.
    pub fn glsl_name(self) -> &'static str {
        match self {
            Interpolation::Smooth => "smooth",
            Interpolation::Flat => "flat",
            Interpolation::Centroid => "centroid",
        }
    }

    /// All qualifiers, in catalog enumeration order.
    pub const ALL: [Interpolation; 3] = [
        Interpolation::Smooth,
        Interpolation::Flat,
        Interpolation::Centroid,
    ];
}

/// A vertex-stage output declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Varying {
    /// Varying name (by convention `v_`-prefixed).
    pub name: String,
    /// Declared type.
    pub ty: VarType,
    /// Interpolation qualifier.
    pub interpolation: Interpolation,
}

/// Declarative description of a generated program.
///
/// Owns the struct arena, the varying list and the list of captured
/// varying-path strings. Built once when a test case is configured and
/// read-only afterwards; all shader source, layout and output-plan
/// computation derives deterministically from this value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramSpec {
    structs: StructRegistry,
    varyings: Vec<Varying>,
    captured: Vec<String>,
}

impl ProgramSpec {
    /// Creates an empty spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a named struct type and returns its handle.
    pub fn declare_struct(
        &mut self,
        name: impl Into<String>,
        members: Vec<StructMember>,
    ) -> StructHandle {
        self.structs.declare(StructType {
            name: Some(name.into()),
            members,
        })
    }

    /// Interns an anonymous struct type and returns its handle.
    pub fn declare_anonymous_struct(&mut self, members: Vec<StructMember>) -> StructHandle {
        self.structs.declare(StructType {
            name: None,
            members,
        })
    }

    /// Appends a varying declaration.
    pub fn add_varying(
        &mut self,
        name: impl Into<String>,
        ty: VarType,
        interpolation: Interpolation,
    ) {
        self.varyings.push(Varying {
            name: name.into(),
            ty,
            interpolation,
        });
    }

    /// Appends a transform-feedback captured varying path
    /// (e.g. `"v_var[1].member"` or `"gl_Position"`).
    pub fn capture(&mut self, path: impl Into<String>) {
        self.captured.push(path.into());
    }

    /// The struct arena.
    pub fn structs(&self) -> &StructRegistry {
        &self.structs
    }

    /// Varyings in declaration order.
    pub fn varyings(&self) -> &[Varying] {
        &self.varyings
    }

    /// Captured varying path strings, in capture order.
    pub fn captured(&self) -> &[String] {
        &self.captured
    }

    /// Finds a varying by name.
    pub fn varying(&self, name: &str) -> Option<&Varying> {
        self.varyings.iter().find(|v| v.name == name)
    }

    /// True when `gl_PointSize` is among the captured paths, which forces
    /// the generated vertex shader to source point size from an attribute.
    pub fn uses_point_size(&self) -> bool {
        self.captured.iter().any(|c| c == POINT_SIZE_BUILTIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xfb_types::{DataType, Precision};

    #[test]
    fn point_size_detection() {
        let mut spec = ProgramSpec::new();
        spec.add_varying(
            "v_a",
            VarType::basic(DataType::FloatVec4, Precision::Highp),
            Interpolation::Smooth,
        );
        spec.capture("v_a");
        assert!(!spec.uses_point_size());

        spec.capture("gl_PointSize");
        assert!(spec.uses_point_size());
    }

    #[test]
    fn varying_lookup_by_name() {
        let mut spec = ProgramSpec::new();
        spec.add_varying(
            "v_a",
            VarType::basic(DataType::Int, Precision::Mediump),
            Interpolation::Flat,
        );
        assert!(spec.varying("v_a").is_some());
        assert!(spec.varying("v_b").is_none());
    }
}
