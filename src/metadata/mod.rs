//! Read-only slice of the mapping metadata consumed by the constraint
//! engine: nominal type tags, dotted member paths, extents, and
//! association ends. Loading and schema reflection happen upstream; this
//! module only models what the algebra needs to ask of them.

use crate::constants::ScalarValue;
use std::fmt;

/// A nominal type tag with its ancestor chain, outermost base last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeRef {
    pub name: String,
    pub ancestors: Vec<String>,
}

impl TypeRef {
    pub fn new<S: Into<String>>(name: S) -> Self {
        TypeRef {
            name: name.into(),
            ancestors: vec![],
        }
    }

    pub fn derived_from<S: Into<String>>(name: S, base: &TypeRef) -> Self {
        let mut ancestors = vec![base.name.clone()];
        ancestors.extend(base.ancestors.iter().cloned());
        TypeRef {
            name: name.into(),
            ancestors,
        }
    }

    /// Whether a value of type `other` can be treated as a value of `self`.
    pub fn is_assignable_from(&self, other: &TypeRef) -> bool {
        self.name == other.name || other.ancestors.contains(&self.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberKind {
    Scalar,
    Boolean,
    TypeDiscriminator,
}

/// A dotted path from an extent down to one leaf member, the unit of
/// projection and constraint for the whole engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberPath {
    pub extent: String,
    pub members: Vec<String>,
    pub kind: MemberKind,
    pub nullable: bool,
    pub default_value: Option<ScalarValue>,
}

impl MemberPath {
    pub fn scalar<S: Into<String>>(extent: S, members: Vec<&str>, nullable: bool) -> Self {
        MemberPath {
            extent: extent.into(),
            members: members.into_iter().map(String::from).collect(),
            kind: MemberKind::Scalar,
            nullable,
            default_value: None,
        }
    }

    pub fn boolean<S: Into<String>>(extent: S, members: Vec<&str>) -> Self {
        MemberPath {
            extent: extent.into(),
            members: members.into_iter().map(String::from).collect(),
            kind: MemberKind::Boolean,
            nullable: false,
            default_value: None,
        }
    }

    pub fn type_discriminator<S: Into<String>>(extent: S) -> Self {
        MemberPath {
            extent: extent.into(),
            members: vec![],
            kind: MemberKind::TypeDiscriminator,
            nullable: false,
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: ScalarValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// The path relative to its extent, e.g. `Address.City`.
    pub fn accessor(&self) -> String {
        self.members.join(".")
    }

    /// The path qualified by a query-block alias, e.g. `T1.Address.City`.
    /// An empty member list denotes the extent row itself.
    pub fn qualified(&self, block_alias: &str) -> String {
        if self.members.is_empty() {
            block_alias.to_string()
        } else {
            format!("{}.{}", block_alias, self.accessor())
        }
    }
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.members.is_empty() {
            write!(f, "{}", self.extent)
        } else {
            write!(f, "{}.{}", self.extent, self.accessor())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataSpace {
    /// Conceptual model space.
    CSpace,
    /// Storage model space.
    SSpace,
}

/// An entity set (table or conceptual set) the mapping fragments target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extent {
    pub name: String,
    pub element_type: TypeRef,
    pub key_members: Vec<String>,
    pub space: DataSpace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    One,
    ZeroOrOne,
    Many,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationEnd {
    pub role: String,
    pub extent: String,
    pub owning_type: TypeRef,
    pub multiplicity: Multiplicity,
    pub key_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationSet {
    pub name: String,
    pub ends: Vec<AssociationEnd>,
}

/// Source tag of one mapping fragment, carried through every diagnostic
/// so errors can point back at the mapping document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CellLabel {
    pub source_location: String,
    pub start_line_number: u32,
    pub start_line_position: u32,
    pub cell_number: usize,
}

impl CellLabel {
    pub fn new<S: Into<String>>(source_location: S, line: u32, position: u32, cell_number: usize) -> Self {
        CellLabel {
            source_location: source_location.into(),
            start_line_number: line,
            start_line_position: position,
            cell_number,
        }
    }
}

impl fmt::Display for CellLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.source_location, self.start_line_number, self.start_line_position
        )
    }
}
