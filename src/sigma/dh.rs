//! Diffie-Hellman tuple membership: `(g, h, u, v)` with `u = g^w` and `v = h^w`.

use alloc::vec;
use alloc::vec::Vec;

use derive_where::derive_where;

use super::SigmaRelation;
use crate::group::DlogGroup;

/// Public input `(h, u, v)`; `g` is the group generator.
#[derive_where(Debug, Clone, PartialEq, Eq)]
pub struct DhStatement<G: DlogGroup> {
    /// The second base.
    pub h: G::Element,
    /// `u = g^w`
    pub u: G::Element,
    /// `v = h^w`
    pub v: G::Element,
}

/// First message `(a, b) = (g^r, h^r)`.
#[derive_where(Debug, Clone, PartialEq, Eq)]
pub struct DhFirstMessage<G: DlogGroup> {
    /// `a = g^r`
    pub a: G::Element,
    /// `b = h^r`
    pub b: G::Element,
}

/// The Diffie-Hellman tuple relation (Chaum-Pedersen protocol).
#[derive(Debug, Clone, Copy)]
pub struct DhRelation;

impl<G: DlogGroup> SigmaRelation<G> for DhRelation {
    type Statement = DhStatement<G>;
    type FirstMessage = DhFirstMessage<G>;

    const ARITY: usize = 2;

    fn holds(group: &G, statement: &Self::Statement, witness: &G::Scalar) -> bool {
        group.exponentiate_generator(witness) == statement.u && group.exponentiate(&statement.h, witness) == statement.v
    }

    fn statement_is_valid(group: &G, statement: &Self::Statement) -> bool {
        [&statement.h, &statement.u, &statement.v]
            .into_iter()
            .all(|element| group.is_member(element))
    }

    fn commit(group: &G, statement: &Self::Statement, randomness: &G::Scalar) -> Self::FirstMessage {
        DhFirstMessage {
            a: group.exponentiate_generator(randomness),
            b: group.exponentiate(&statement.h, randomness),
        }
    }

    fn check(group: &G, statement: &Self::Statement, a: &Self::FirstMessage, e: &G::Scalar, z: &G::Scalar) -> bool {
        // g^z == a * u^e
        let first = group.exponentiate_generator(z) == group.multiply(&a.a, &group.exponentiate(&statement.u, e));
        // h^z == b * v^e
        let second = group.exponentiate(&statement.h, z) == group.multiply(&a.b, &group.exponentiate(&statement.v, e));
        first && second
    }

    fn back_solve(group: &G, statement: &Self::Statement, e: &G::Scalar, z: &G::Scalar) -> Self::FirstMessage {
        // a = g^z * u^(-e), b = h^z * v^(-e)
        DhFirstMessage {
            a: group.multiply(
                &group.exponentiate_generator(z),
                &group.exponentiate_inverse(&statement.u, e),
            ),
            b: group.multiply(
                &group.exponentiate(&statement.h, z),
                &group.exponentiate_inverse(&statement.v, e),
            ),
        }
    }

    fn first_message_elements(a: &Self::FirstMessage) -> Vec<G::Element> {
        vec![a.a.clone(), a.b.clone()]
    }

    fn first_message_from_elements(elements: Vec<G::Element>) -> Option<Self::FirstMessage> {
        let [a, b]: [G::Element; 2] = elements.try_into().ok()?;
        Some(DhFirstMessage { a, b })
    }
}
