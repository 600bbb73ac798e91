// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use std::fmt::Debug;

use crypto_bigint::rand_core::CryptoRngCore;

use crate::Result;

pub mod zp_safe_prime;

/// A cyclic group of prime order in which the discrete-logarithm problem is assumed to be hard.
///
/// Elements are produced and consumed by the group that created them and are never mutated in
/// place. Every operation taking an element first checks that it was created by a group with
/// the same parameters, and fails with [`Error::TypeMismatch`](crate::Error::TypeMismatch)
/// otherwise.
///
/// Operations that need randomness take the random source as an argument, so that an instance
/// can be shared between threads without any internal locking.
pub trait DlogGroup {
    type GroupElement: Clone + PartialEq + Debug;
    /// The integer type of exponents and of the group order.
    type Exponent;
    /// The integer type from which elements are generated.
    type Value;
    type GroupParams;
    type SendableData;

    /// A short name of the group family, e.g. `"Zp*"`.
    fn group_type(&self) -> &'static str;

    fn group_params(&self) -> &Self::GroupParams;

    fn generator(&self) -> &Self::GroupElement;

    /// The order $q$ of the group.
    fn order(&self) -> &Self::Exponent;

    fn identity(&self) -> Self::GroupElement;

    /// Whether `element` is the identity or passes the full group-membership check.
    fn is_member(&self, element: &Self::GroupElement) -> Result<bool>;

    /// Re-validates the stored generator.
    fn is_generator(&self) -> bool;

    /// Full structural validation of the group parameters, generator included.
    /// Expensive; meant for one-off soundness checks rather than the per-element path.
    fn validate_group(&self, rng: &mut impl CryptoRngCore) -> bool;

    fn is_prime_order(&self) -> bool;

    /// Whether the order of the group is larger than $2^{bits}$.
    fn is_order_greater_than(&self, bits: usize) -> bool;

    fn inverse(&self, element: &Self::GroupElement) -> Result<Self::GroupElement>;

    fn exponentiate(
        &self,
        base: &Self::GroupElement,
        exponent: &Self::Exponent,
    ) -> Result<Self::GroupElement>;

    fn multiply(
        &self,
        lhs: &Self::GroupElement,
        rhs: &Self::GroupElement,
    ) -> Result<Self::GroupElement>;

    /// Computes $\prod_i bases_i^{exponents_i}$.
    fn simultaneous_multiple_exponentiations(
        &self,
        bases: &[Self::GroupElement],
        exponents: &[Self::Exponent],
    ) -> Result<Self::GroupElement>;

    /// Builds an element from its defining values; `check_membership` selects whether the
    /// result is validated or trusted.
    fn generate_element(
        &self,
        check_membership: bool,
        values: &[Self::Value],
    ) -> Result<Self::GroupElement>;

    fn create_random_element(&self, rng: &mut impl CryptoRngCore) -> Self::GroupElement;

    /// Samples a random generator. In a group of prime order every element but the identity
    /// generates the group.
    fn create_random_generator(&self, rng: &mut impl CryptoRngCore) -> Self::GroupElement {
        let identity = self.identity();

        loop {
            let candidate = self.create_random_element(rng);
            if candidate != identity {
                return candidate;
            }
        }
    }

    /// Recovers an element from its transport snapshot.
    fn reconstruct_element(
        &self,
        check_membership: bool,
        data: &Self::SendableData,
    ) -> Result<Self::GroupElement>;

    /// The maximal length `k` of a binary array that can be encoded to a group element, or
    /// `None` if the group is too small to encode any.
    fn max_length_of_byte_array_for_encoding(&self) -> Option<usize>;

    fn encode_byte_array_to_group_element(
        &self,
        binary_string: &[u8],
    ) -> Result<Self::GroupElement>;

    /// The inverse of [`Self::encode_byte_array_to_group_element`].
    fn decode_group_element_to_byte_array(&self, element: &Self::GroupElement)
        -> Result<Vec<u8>>;

    /// A deterministic, injective (but not invertible by this trait) byte representation of any
    /// element, e.g. for hashing.
    fn map_any_group_element_to_byte_array(
        &self,
        element: &Self::GroupElement,
    ) -> Result<Vec<u8>>;
}
