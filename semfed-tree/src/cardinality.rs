use serde::{Deserialize, Serialize};

/// Declared multiplicity of a field.
///
/// Schema generation, merge and coverage checks all read multiplicity through
/// the helpers below so the three stay consistent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    #[default]
    Unknown,
    ZeroToOne,
    One,
    ZeroToMany,
    OneToMany,
}

impl Cardinality {
    /// `ZeroToMany` or `OneToMany`: rendered as a JSON array.
    pub const fn is_many(self) -> bool {
        matches!(self, Cardinality::ZeroToMany | Cardinality::OneToMany)
    }

    /// `One` or `OneToMany`: listed under `required` in the parent schema.
    pub const fn is_required(self) -> bool {
        matches!(self, Cardinality::One | Cardinality::OneToMany)
    }

    /// `ZeroToOne` or `One`: merge collapses candidates to one.
    pub const fn is_single(self) -> bool {
        matches!(self, Cardinality::ZeroToOne | Cardinality::One)
    }

    /// Whether a merge over `candidates` matches keeps them all as siblings.
    ///
    /// `Unknown` is inferred from the candidate count: more than one present
    /// means many, otherwise one.
    pub const fn keeps_all(self, candidates: usize) -> bool {
        match self {
            Cardinality::ZeroToMany | Cardinality::OneToMany => true,
            Cardinality::ZeroToOne | Cardinality::One => false,
            Cardinality::Unknown => candidates > 1,
        }
    }
}

/// Primitive type of a leaf value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    String,
    Integer,
    Number,
    Boolean,
    StringArray,
    #[default]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn many_and_required_are_independent() {
        assert!(Cardinality::OneToMany.is_many());
        assert!(Cardinality::OneToMany.is_required());
        assert!(Cardinality::ZeroToMany.is_many());
        assert!(!Cardinality::ZeroToMany.is_required());
        assert!(Cardinality::One.is_required());
        assert!(!Cardinality::One.is_many());
        assert!(!Cardinality::Unknown.is_many());
        assert!(!Cardinality::Unknown.is_required());
    }

    #[test]
    fn unknown_is_inferred_from_candidate_count() {
        assert!(!Cardinality::Unknown.keeps_all(0));
        assert!(!Cardinality::Unknown.keeps_all(1));
        assert!(Cardinality::Unknown.keeps_all(2));
        assert!(Cardinality::ZeroToMany.keeps_all(1));
        assert!(!Cardinality::One.keeps_all(5));
    }
}
