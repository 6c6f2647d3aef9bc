//! Finite value domains for condition members: the set of values a member
//! currently asserts against the set of all values it could take. The
//! per-member universes are only fully known once every mapping fragment
//! has been seen, so domains start out incomplete and are completed
//! against a `MemberDomainMap` later.

use crate::constants::{CellConstant, NegatedConstant, ScalarValue};
use crate::metadata::{MemberKind, MemberPath};
use std::collections::{BTreeMap, BTreeSet};


#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Domain {
    values: BTreeSet<CellConstant>,
    all_possible_values: BTreeSet<CellConstant>,
}

impl Domain {
    /// A domain with an independently known universe. An empty value set is
    /// not a domain; callers must use the False expression instead.
    pub fn new(values: BTreeSet<CellConstant>, all_possible_values: BTreeSet<CellConstant>) -> Self {
        assert!(
            !values.is_empty(),
            "empty domain must be expressed as the False boolean expression"
        );
        debug_assert!(
            values
                .iter()
                .filter(|v| !matches!(v, CellConstant::Negated(_)))
                .all(|v| all_possible_values.contains(v)),
            "domain values must be drawn from the possible-value universe"
        );
        Domain {
            values,
            all_possible_values,
        }
    }

    /// A domain built before the member's universe is known; the asserted
    /// values stand in for all possible values until completion.
    pub fn incomplete(values: BTreeSet<CellConstant>) -> Self {
        assert!(
            !values.is_empty(),
            "empty domain must be expressed as the False boolean expression"
        );
        Domain {
            all_possible_values: values.clone(),
            values,
        }
    }

    pub fn values(&self) -> &BTreeSet<CellConstant> {
        &self.values
    }

    pub fn all_possible_values(&self) -> &BTreeSet<CellConstant> {
        &self.all_possible_values
    }

    pub fn contains(&self, constant: &CellConstant) -> bool {
        self.values.contains(constant)
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Rebuilds this domain against a globally known universe.
    pub fn make_complete(&self, universe: &BTreeSet<CellConstant>) -> Domain {
        Domain::new(self.values.clone(), universe.clone())
    }

    /// The complement of `values` within `universe`, represented as one
    /// negated set. Negated members of the universe do not participate;
    /// only positive occurrences can be excluded.
    pub fn negate_values(
        values: &BTreeSet<CellConstant>,
        universe: &BTreeSet<CellConstant>,
    ) -> CellConstant {
        let excluded: BTreeSet<CellConstant> = universe
            .iter()
            .filter(|c| !matches!(c, CellConstant::Negated(_)) && !values.contains(*c))
            .cloned()
            .collect();
        CellConstant::Negated(NegatedConstant::new(excluded))
    }
}

/// Per-member universes, assembled after all fragments have been seen and
/// consulted when completing restrictions and fixing term ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberDomainMap {
    map: BTreeMap<MemberPath, Domain>,
}

impl MemberDomainMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, member: MemberPath, domain: Domain) {
        self.map.insert(member, domain);
    }

    pub fn get(&self, member: &MemberPath) -> Option<&Domain> {
        self.map.get(member)
    }

    /// Records additional values observed for a member, widening both the
    /// asserted set and the universe.
    pub fn widen(&mut self, member: &MemberPath, constants: impl IntoIterator<Item = CellConstant>) {
        let constants: BTreeSet<CellConstant> = constants.into_iter().collect();
        match self.map.get(member) {
            Some(existing) => {
                let values: BTreeSet<_> =
                    existing.values.union(&constants).cloned().collect();
                let universe: BTreeSet<_> = existing
                    .all_possible_values
                    .union(&constants)
                    .cloned()
                    .collect();
                self.map.insert(member.clone(), Domain::new(values, universe));
            }
            None => {
                self.map
                    .insert(member.clone(), Domain::incomplete(constants));
            }
        }
    }
}

/// Derives the domain of a condition member from the values its fragments
/// enumerate. Boolean members always get the two-element domain; scalar
/// members get their enumerated values, `Null` when nullable, and the
/// all-other-values sentinel when the enumeration is open-ended.
pub fn condition_member_domain(
    member: &MemberPath,
    enumerated: &BTreeSet<CellConstant>,
    open_ended: bool,
) -> Domain {
    match member.kind {
        MemberKind::Boolean => {
            let both: BTreeSet<CellConstant> = [
                CellConstant::Scalar(ScalarValue::Bool(true)),
                CellConstant::Scalar(ScalarValue::Bool(false)),
            ]
            .into_iter()
            .collect();
            Domain::new(both.clone(), both)
        }
        MemberKind::Scalar => {
            let mut universe: BTreeSet<CellConstant> = enumerated
                .iter()
                .filter(|c| !matches!(c, CellConstant::Negated(_)))
                .cloned()
                .collect();
            if member.nullable {
                universe.insert(CellConstant::Null);
            }
            if open_ended {
                universe.insert(CellConstant::AllOtherConstants);
            }
            Domain::new(universe.clone(), universe)
        }
        MemberKind::TypeDiscriminator => {
            Domain::new(enumerated.clone(), enumerated.clone())
        }
    }
}
