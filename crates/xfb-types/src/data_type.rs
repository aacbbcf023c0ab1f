/// A GLSL ES 3.00 basic data type.
///
/// Matrix variants are named column-major: `FloatMat2x3` is a matrix with 2
/// columns of 3 rows (GLSL `mat2x3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// `float`
    Float,
    /// `vec2`
    FloatVec2,
    /// `vec3`
    FloatVec3,
    /// `vec4`
    FloatVec4,
    /// `mat2`
    FloatMat2,
    /// `mat2x3`
    FloatMat2x3,
    /// `mat2x4`
    FloatMat2x4,
    /// `mat3x2`
    FloatMat3x2,
    /// `mat3`
    FloatMat3,
    /// `mat3x4`
    FloatMat3x4,
    /// `mat4x2`
    FloatMat4x2,
    /// `mat4x3`
    FloatMat4x3,
    /// `mat4`
    FloatMat4,
    /// `int`
    Int,
    /// `ivec2`
    IntVec2,
    /// `ivec3`
    IntVec3,
    /// `ivec4`
    IntVec4,
    /// `uint`
    Uint,
    /// `uvec2`
    UintVec2,
    /// `uvec3`
    UintVec3,
    /// `uvec4`
    UintVec4,
    /// `bool`
    Bool,
    /// `bvec2`
    BoolVec2,
    /// `bvec3`
    BoolVec3,
    /// `bvec4`
    BoolVec4,
    /// `sampler2D`
    Sampler2D,
    /// `samplerCube`
    SamplerCube,
    /// `sampler2DArray`
    Sampler2DArray,
    /// `sampler3D`
    Sampler3D,
    /// `sampler2DShadow`
    Sampler2DShadow,
}

impl DataType {
    /// The GLSL source name of the type.
    pub fn glsl_name(self) -> &'static str {
        match self {
            DataType::Float => "float",
            DataType::FloatVec2 => "vec2",
            DataType::FloatVec3 => "vec3",
            DataType::FloatVec4 => "vec4",
            DataType::FloatMat2 => "mat2",
            DataType::FloatMat2x3 => "mat2x3",
            DataType::FloatMat2x4 => "mat2x4",
            DataType::FloatMat3x2 => "mat3x2",
            DataType::FloatMat3 => "mat3",
            DataType::FloatMat3x4 => "mat3x4",
            DataType::FloatMat4x2 => "mat4x2",
            DataType::FloatMat4x3 => "mat4x3",
            DataType::FloatMat4 => "mat4",
            DataType::Int => "int",
            DataType::IntVec2 => "ivec2",
            DataType::IntVec3 => "ivec3",
            DataType::IntVec4 => "ivec4",
            DataType::Uint => "uint",
            DataType::UintVec2 => "uvec2",
            DataType::UintVec3 => "uvec3",
            DataType::UintVec4 => "uvec4",
            DataType::Bool => "bool",
            DataType::BoolVec2 => "bvec2",
            DataType::BoolVec3 => "bvec3",
            DataType::BoolVec4 => "bvec4",
            DataType::Sampler2D => "sampler2D",
            DataType::SamplerCube => "samplerCube",
            DataType::Sampler2DArray => "sampler2DArray",
            DataType::Sampler3D => "sampler3D",
            DataType::Sampler2DShadow => "sampler2DShadow",
        }
    }

    /// Number of scalar components (1..=16). Samplers count as 1.
    pub fn scalar_count(self) -> usize {
        match self {
            DataType::Float | DataType::Int | DataType::Uint | DataType::Bool => 1,
            DataType::FloatVec2 | DataType::IntVec2 | DataType::UintVec2 | DataType::BoolVec2 => 2,
            DataType::FloatVec3 | DataType::IntVec3 | DataType::UintVec3 | DataType::BoolVec3 => 3,
            DataType::FloatVec4 | DataType::IntVec4 | DataType::UintVec4 | DataType::BoolVec4 => 4,
            DataType::FloatMat2 => 4,
            DataType::FloatMat2x3 => 6,
            DataType::FloatMat2x4 => 8,
            DataType::FloatMat3x2 => 6,
            DataType::FloatMat3 => 9,
            DataType::FloatMat3x4 => 12,
            DataType::FloatMat4x2 => 8,
            DataType::FloatMat4x3 => 12,
            DataType::FloatMat4 => 16,
            DataType::Sampler2D
            | DataType::SamplerCube
            | DataType::Sampler2DArray
            | DataType::Sampler3D
            | DataType::Sampler2DShadow => 1,
        }
    }

    /// The scalar component type, or `None` for samplers.
    pub fn scalar_type(self) -> Option<DataType> {
        match self {
            t if t.is_sampler() => None,
            t if t.is_float_or_matrix() => Some(DataType::Float),
            t if t.is_int_kind() => Some(DataType::Int),
            t if t.is_uint_kind() => Some(DataType::Uint),
            _ => Some(DataType::Bool),
        }
    }

    /// True for `float`, `int`, `uint` and `bool`.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            DataType::Float | DataType::Int | DataType::Uint | DataType::Bool
        )
    }

    /// True for 2/3/4-component vector types (matrices excluded).
    pub fn is_vector(self) -> bool {
        !self.is_sampler() && !self.is_matrix() && !self.is_scalar()
    }

    /// True for scalar and vector types (the terminal shapes of the
    /// vector-level sub-path iteration).
    pub fn is_scalar_or_vector(self) -> bool {
        self.is_scalar() || self.is_vector()
    }

    /// True for all nine matrix shapes.
    pub fn is_matrix(self) -> bool {
        matches!(
            self,
            DataType::FloatMat2
                | DataType::FloatMat2x3
                | DataType::FloatMat2x4
                | DataType::FloatMat3x2
                | DataType::FloatMat3
                | DataType::FloatMat3x4
                | DataType::FloatMat4x2
                | DataType::FloatMat4x3
                | DataType::FloatMat4
        )
    }

    /// True for sampler types.
    pub fn is_sampler(self) -> bool {
        matches!(
            self,
            DataType::Sampler2D
                | DataType::SamplerCube
                | DataType::Sampler2DArray
                | DataType::Sampler3D
                | DataType::Sampler2DShadow
        )
    }

    /// True when the scalar component type is `float` (includes matrices).
    pub fn is_float_or_matrix(self) -> bool {
        matches!(
            self,
            DataType::Float | DataType::FloatVec2 | DataType::FloatVec3 | DataType::FloatVec4
        ) || self.is_matrix()
    }

    /// True when the scalar component type is `int`.
    pub fn is_int_kind(self) -> bool {
        matches!(
            self,
            DataType::Int | DataType::IntVec2 | DataType::IntVec3 | DataType::IntVec4
        )
    }

    /// True when the scalar component type is `uint`.
    pub fn is_uint_kind(self) -> bool {
        matches!(
            self,
            DataType::Uint | DataType::UintVec2 | DataType::UintVec3 | DataType::UintVec4
        )
    }

    /// True when the scalar component type is `bool`.
    pub fn is_bool_kind(self) -> bool {
        matches!(
            self,
            DataType::Bool | DataType::BoolVec2 | DataType::BoolVec3 | DataType::BoolVec4
        )
    }

    /// Number of matrix columns, or `None` for non-matrix types.
    pub fn matrix_columns(self) -> Option<usize> {
        match self {
            DataType::FloatMat2 | DataType::FloatMat2x3 | DataType::FloatMat2x4 => Some(2),
            DataType::FloatMat3x2 | DataType::FloatMat3 | DataType::FloatMat3x4 => Some(3),
            DataType::FloatMat4x2 | DataType::FloatMat4x3 | DataType::FloatMat4 => Some(4),
            _ => None,
        }
    }

    /// Number of matrix rows, or `None` for non-matrix types.
    pub fn matrix_rows(self) -> Option<usize> {
        match self {
            DataType::FloatMat2 | DataType::FloatMat3x2 | DataType::FloatMat4x2 => Some(2),
            DataType::FloatMat2x3 | DataType::FloatMat3 | DataType::FloatMat4x3 => Some(3),
            DataType::FloatMat2x4 | DataType::FloatMat3x4 | DataType::FloatMat4 => Some(4),
            _ => None,
        }
    }

    /// The float scalar/vector type with `components` components.
    pub fn float_vec(components: usize) -> Option<DataType> {
        match components {
            1 => Some(DataType::Float),
            2 => Some(DataType::FloatVec2),
            3 => Some(DataType::FloatVec3),
            4 => Some(DataType::FloatVec4),
            _ => None,
        }
    }

    /// The int scalar/vector type with `components` components.
    pub fn int_vec(components: usize) -> Option<DataType> {
        match components {
            1 => Some(DataType::Int),
            2 => Some(DataType::IntVec2),
            3 => Some(DataType::IntVec3),
            4 => Some(DataType::IntVec4),
            _ => None,
        }
    }

    /// The uint scalar/vector type with `components` components.
    pub fn uint_vec(components: usize) -> Option<DataType> {
        match components {
            1 => Some(DataType::Uint),
            2 => Some(DataType::UintVec2),
            3 => Some(DataType::UintVec3),
            4 => Some(DataType::UintVec4),
            _ => None,
        }
    }

    /// The matrix type with the given column/row counts (2..=4 each).
    pub fn matrix(columns: usize, rows: usize) -> Option<DataType> {
        match (columns, rows) {
            (2, 2) => Some(DataType::FloatMat2),
            (2, 3) => Some(DataType::FloatMat2x3),
            (2, 4) => Some(DataType::FloatMat2x4),
            (3, 2) => Some(DataType::FloatMat3x2),
            (3, 3) => Some(DataType::FloatMat3),
            (3, 4) => Some(DataType::FloatMat3x4),
            (4, 2) => Some(DataType::FloatMat4x2),
            (4, 3) => Some(DataType::FloatMat4x3),
            (4, 4) => Some(DataType::FloatMat4),
            _ => None,
        }
    }

    /// The type of a single column of this matrix (a float vector with one
    /// component per row), or `None` for non-matrix types.
    pub fn column_type(self) -> Option<DataType> {
        DataType::float_vec(self.matrix_rows()?)
    }
}

/// GLSL precision qualifier.
///
/// Drives the value ranges used by random input generation; the captured
/// value comparison uses a single flat tolerance regardless of tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    /// `lowp`
    Lowp,
    /// `mediump`
    Mediump,
    /// `highp`
    Highp,
}

impl Precision {
    /// The GLSL source name of the qualifier.
    pub fn glsl_name(self) -> &'static str {
        match self {
            Precision::Lowp => "lowp",
            Precision::Mediump => "mediump",
            Precision::Highp => "highp",
        }
    }

    /// All qualifiers, in catalog enumeration order.
    pub const ALL: [Precision; 3] = [Precision::Lowp, Precision::Mediump, Precision::Highp];
}
