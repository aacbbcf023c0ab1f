use crate::data_type::{DataType, Precision};

/// Size of an array type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArraySize {
    /// A fixed-size array with the given element count.
    Fixed(usize),
    /// An array declared without a size.
    ///
    /// Unsized arrays only occur while checking captured-varying path
    /// *syntax*; every type that reaches layout planning is fully sized.
    Unsized,
}

/// Handle into a [`StructRegistry`].
///
/// Handles are plain indices; they are only meaningful together with the
/// registry that produced them, which outlives every [`VarType`] referencing
/// it for the duration of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructHandle(pub(crate) usize);

/// A single named struct member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructMember {
    /// Member name, unique within the struct.
    pub name: String,
    /// Member type.
    pub ty: VarType,
}

/// An interned struct type: optional name plus ordered members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructType {
    /// Declared type name; `None` for structs declared inline.
    pub name: Option<String>,
    /// Members in declaration order.
    pub members: Vec<StructMember>,
}

impl StructType {
    /// Finds the index of the member named `name`, in declaration order.
    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }
}

/// Arena of interned [`StructType`] values.
///
/// Structs are interned here (typically by the owning program specification)
/// so that the recursive [`VarType`] model stays acyclic: a `VarType`
/// referencing a struct stores a copyable handle rather than owning the
/// struct, while arrays own their element type recursively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructRegistry {
    structs: Vec<StructType>,
}

impl StructRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a struct and returns its handle.
    pub fn declare(&mut self, ty: StructType) -> StructHandle {
        let handle = StructHandle(self.structs.len());
        self.structs.push(ty);
        handle
    }

    /// Looks up an interned struct.
    ///
    /// Handles are never forged in practice; an out-of-range handle is a
    /// construction bug, so this returns `Option` rather than panicking and
    /// callers surface it as an invariant violation.
    pub fn get(&self, handle: StructHandle) -> Option<&StructType> {
        self.structs.get(handle.0)
    }

    /// All interned structs, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (StructHandle, &StructType)> {
        self.structs
            .iter()
            .enumerate()
            .map(|(i, s)| (StructHandle(i), s))
    }

    /// Number of interned structs.
    pub fn len(&self) -> usize {
        self.structs.len()
    }

    /// True when no structs have been interned.
    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }
}

/// A recursive shader variable type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarType {
    /// A basic type with a precision qualifier.
    Basic {
        /// The basic data type.
        ty: DataType,
        /// Declared precision.
        precision: Precision,
    },
    /// An array of some element type.
    Array {
        /// Element type, owned recursively.
        element: Box<VarType>,
        /// Fixed element count, or unsized.
        size: ArraySize,
    },
    /// A reference to an interned struct type.
    Struct(StructHandle),
}

impl VarType {
    /// A basic type with the given precision.
    pub fn basic(ty: DataType, precision: Precision) -> Self {
        VarType::Basic { ty, precision }
    }

    /// A fixed-size array of `element`.
    pub fn array(element: VarType, size: usize) -> Self {
        VarType::Array {
            element: Box::new(element),
            size: ArraySize::Fixed(size),
        }
    }

    /// An unsized array of `element`.
    pub fn unsized_array(element: VarType) -> Self {
        VarType::Array {
            element: Box::new(element),
            size: ArraySize::Unsized,
        }
    }

    /// A reference to an interned struct.
    pub fn structure(handle: StructHandle) -> Self {
        VarType::Struct(handle)
    }

    /// The basic data type and precision, if this is a basic type.
    pub fn as_basic(&self) -> Option<(DataType, Precision)> {
        match self {
            VarType::Basic { ty, precision } => Some((*ty, *precision)),
            _ => None,
        }
    }

    /// True if this is a basic type.
    pub fn is_basic(&self) -> bool {
        matches!(self, VarType::Basic { .. })
    }

    /// Total number of scalar components, computed bottom-up.
    ///
    /// Unsized arrays contribute zero: they never reach layout computation,
    /// which is the only consumer of scalar sizes.
    pub fn scalar_size(&self, registry: &StructRegistry) -> usize {
        match self {
            VarType::Basic { ty, .. } => ty.scalar_count(),
            VarType::Array { element, size } => match size {
                ArraySize::Fixed(n) => n * element.scalar_size(registry),
                ArraySize::Unsized => 0,
            },
            VarType::Struct(handle) => registry
                .get(*handle)
                .map(|s| {
                    s.members
                        .iter()
                        .map(|m| m.ty.scalar_size(registry))
                        .sum()
                })
                .unwrap_or(0),
        }
    }
}
