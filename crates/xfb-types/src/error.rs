use thiserror::Error;

use crate::path::ComponentKind;

/// Error produced when walking a type path against a root type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A path step did not match the shape of the current sub-type (e.g. a
    /// matrix-column step applied to a non-matrix type).
    #[error("path step {kind:?} does not match the current sub-type's shape")]
    ShapeMismatch {
        /// The offending step kind.
        kind: ComponentKind,
    },

    /// A path step's index was out of bounds for the current sub-type.
    #[error("path index {index} out of bounds (limit {bound}) for step {kind:?}")]
    IndexOutOfBounds {
        /// The offending step kind.
        kind: ComponentKind,
        /// The requested index.
        index: usize,
        /// The exclusive bound.
        bound: usize,
    },

    /// A struct handle did not resolve in the registry. This indicates a
    /// construction bug (types built against the wrong registry), not a
    /// malformed path.
    #[error("struct handle does not resolve in the supplied registry")]
    DanglingStructHandle,

    /// Sub-path enumeration reached a type that cannot be decomposed to the
    /// requested granularity (e.g. a sampler at vector granularity).
    #[error("type {name} cannot be decomposed to the requested granularity")]
    NotDecomposable {
        /// GLSL name of the offending type.
        name: &'static str,
    },
}

/// Error produced when parsing the textual form of a type path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// The input did not start with an identifier, or a `.` was not followed
    /// by one.
    #[error("expected identifier at offset {offset}")]
    ExpectedIdentifier {
        /// Byte offset into the input.
        offset: usize,
    },

    /// A `[` was not followed by a decimal number.
    #[error("expected number at offset {offset}")]
    ExpectedNumber {
        /// Byte offset into the input.
        offset: usize,
    },

    /// A bracketed index was not terminated by `]`.
    #[error("unterminated '[' at offset {offset}")]
    UnterminatedBracket {
        /// Byte offset of the opening bracket.
        offset: usize,
    },

    /// An unexpected character was encountered.
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedCharacter {
        /// The offending character.
        found: char,
        /// Byte offset into the input.
        offset: usize,
    },

    /// A `.name` step was applied to a sub-type that is not a struct.
    #[error("member access {name:?} on a non-struct sub-type")]
    MemberAccessOnNonStruct {
        /// The member name from the input.
        name: String,
    },

    /// A `.name` step named a member the current struct does not have.
    #[error("struct has no member named {name:?}")]
    NoSuchMember {
        /// The member name from the input.
        name: String,
    },

    /// A parsed step failed type-level validation.
    #[error(transparent)]
    Path(#[from] PathError),
}
