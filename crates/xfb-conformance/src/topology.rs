//! Primitive topology arithmetic.
//!
//! Three related but deliberately distinct questions per topology:
//! how many vertices land in the transform-feedback buffer for N input
//! vertices ([`output_count`]), how many complete primitives the
//! written-primitives query should report ([`primitive_count`]), and which
//! input vertex produced a given output slot ([`input_index_for_output`]).
//! All of it is pure integer arithmetic with no GPU dependency.

/// A draw-call primitive topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// `POINTS`
    Points,
    /// `LINES`
    Lines,
    /// `LINE_STRIP`
    LineStrip,
    /// `LINE_LOOP`
    LineLoop,
    /// `TRIANGLES`
    Triangles,
    /// `TRIANGLE_STRIP`
    TriangleStrip,
    /// `TRIANGLE_FAN`
    TriangleFan,
}

impl PrimitiveType {
    /// All topologies, in catalog enumeration order.
    pub const ALL: [PrimitiveType; 7] = [
        PrimitiveType::Points,
        PrimitiveType::Lines,
        PrimitiveType::LineStrip,
        PrimitiveType::LineLoop,
        PrimitiveType::Triangles,
        PrimitiveType::TriangleStrip,
        PrimitiveType::TriangleFan,
    ];

    /// Case-name token for this topology.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Points => "points",
            PrimitiveType::Lines => "lines",
            PrimitiveType::LineStrip => "line_strip",
            PrimitiveType::LineLoop => "line_loop",
            PrimitiveType::Triangles => "triangles",
            PrimitiveType::TriangleStrip => "triangle_strip",
            PrimitiveType::TriangleFan => "triangle_fan",
        }
    }

    /// The base mode passed to `beginTransformFeedback`: strips, fans and
    /// loops capture as their list topology.
    pub fn transform_feedback_mode(self) -> PrimitiveType {
        match self {
            PrimitiveType::Points => PrimitiveType::Points,
            PrimitiveType::Lines | PrimitiveType::LineStrip | PrimitiveType::LineLoop => {
                PrimitiveType::Lines
            }
            PrimitiveType::Triangles
            | PrimitiveType::TriangleStrip
            | PrimitiveType::TriangleFan => PrimitiveType::Triangles,
        }
    }

    /// True for point topology (which needs a defined `gl_PointSize`).
    pub fn is_points(self) -> bool {
        self == PrimitiveType::Points
    }
}

/// Number of vertices written to the transform-feedback buffer for
/// `input_count` input vertices (incomplete trailing primitives drop).
pub fn output_count(ty: PrimitiveType, input_count: usize) -> usize {
    match ty {
        PrimitiveType::Points => input_count,
        PrimitiveType::Lines => input_count - input_count % 2,
        PrimitiveType::LineStrip => input_count.saturating_sub(1) * 2,
        PrimitiveType::LineLoop => {
            if input_count > 1 {
                input_count * 2
            } else {
                0
            }
        }
        PrimitiveType::Triangles => input_count - input_count % 3,
        PrimitiveType::TriangleStrip | PrimitiveType::TriangleFan => {
            input_count.saturating_sub(2) * 3
        }
    }
}

/// Number of complete primitives the written-primitives query should
/// report for `input_count` input vertices.
///
/// Uses integer floor division throughout (`n/3`, `n/2`): vertices of an
/// incomplete trailing primitive are consumed but complete nothing.
pub fn primitive_count(ty: PrimitiveType, input_count: usize) -> usize {
    match ty {
        PrimitiveType::Points => input_count,
        PrimitiveType::Lines => input_count / 2,
        PrimitiveType::LineStrip => input_count.saturating_sub(1),
        PrimitiveType::LineLoop => {
            if input_count > 1 {
                input_count
            } else {
                0
            }
        }
        PrimitiveType::Triangles => input_count / 3,
        PrimitiveType::TriangleStrip | PrimitiveType::TriangleFan => input_count.saturating_sub(2),
    }
}

/// The input vertex index that produced output slot `out_index` of a draw
/// of `input_count` vertices.
///
/// List topologies are the identity map. Strips alternate winding on odd
/// triangles, fans always re-emit vertex 0 first, and loops wrap the final
/// edge back to vertex 0.
pub fn input_index_for_output(ty: PrimitiveType, input_count: usize, out_index: usize) -> usize {
    match ty {
        PrimitiveType::Points | PrimitiveType::Lines | PrimitiveType::Triangles => out_index,
        PrimitiveType::LineStrip => out_index / 2 + out_index % 2,
        PrimitiveType::LineLoop => {
            let index = out_index / 2 + out_index % 2;
            if index < input_count {
                index
            } else {
                0
            }
        }
        PrimitiveType::TriangleStrip => {
            let tri = out_index / 3;
            let vtx = out_index % 3;
            if tri % 2 != 0 && vtx < 2 {
                tri + 1 - vtx
            } else {
                tri + vtx
            }
        }
        PrimitiveType::TriangleFan => {
            if out_index % 3 != 0 {
                out_index / 3 + out_index % 3
            } else {
                0
            }
        }
    }
}
