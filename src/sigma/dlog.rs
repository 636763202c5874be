//! Knowledge of a discrete logarithm: the prover knows `w` such that `h = g^w`.

use alloc::vec;
use alloc::vec::Vec;

use derive_where::derive_where;

use super::SigmaRelation;
use crate::group::DlogGroup;

/// Public input: the element `h`, with `g` the group generator.
#[derive_where(Debug, Clone, PartialEq, Eq)]
pub struct DlogStatement<G: DlogGroup> {
    /// `h = g^w`
    pub h: G::Element,
}

/// First message `a = g^r`.
#[derive_where(Debug, Clone, PartialEq, Eq)]
pub struct DlogFirstMessage<G: DlogGroup> {
    /// `a = g^r`
    pub a: G::Element,
}

/// The discrete-log relation (Schnorr's protocol).
#[derive(Debug, Clone, Copy)]
pub struct DlogRelation;

impl<G: DlogGroup> SigmaRelation<G> for DlogRelation {
    type Statement = DlogStatement<G>;
    type FirstMessage = DlogFirstMessage<G>;

    const ARITY: usize = 1;

    fn holds(group: &G, statement: &Self::Statement, witness: &G::Scalar) -> bool {
        group.exponentiate_generator(witness) == statement.h
    }

    fn statement_is_valid(group: &G, statement: &Self::Statement) -> bool {
        group.is_member(&statement.h)
    }

    fn commit(group: &G, _statement: &Self::Statement, randomness: &G::Scalar) -> Self::FirstMessage {
        DlogFirstMessage {
            a: group.exponentiate_generator(randomness),
        }
    }

    fn check(group: &G, statement: &Self::Statement, a: &Self::FirstMessage, e: &G::Scalar, z: &G::Scalar) -> bool {
        // g^z == a * h^e
        group.exponentiate_generator(z) == group.multiply(&a.a, &group.exponentiate(&statement.h, e))
    }

    fn back_solve(group: &G, statement: &Self::Statement, e: &G::Scalar, z: &G::Scalar) -> Self::FirstMessage {
        // a = g^z * h^(-e)
        DlogFirstMessage {
            a: group.multiply(
                &group.exponentiate_generator(z),
                &group.exponentiate_inverse(&statement.h, e),
            ),
        }
    }

    fn first_message_elements(a: &Self::FirstMessage) -> Vec<G::Element> {
        vec![a.a.clone()]
    }

    fn first_message_from_elements(elements: Vec<G::Element>) -> Option<Self::FirstMessage> {
        let [a]: [G::Element; 1] = elements.try_into().ok()?;
        Some(DlogFirstMessage { a })
    }
}
