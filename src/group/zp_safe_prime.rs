// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear
use std::fmt;

use crypto_bigint::{
    modular::runtime_mod::{DynResidue, DynResidueParams},
    rand_core::CryptoRngCore,
    CheckedAdd, CheckedMul, Encoding, NonZero, RandomMod, Uint,
};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use subtle::{Choice, ConstantTimeEq};

use crate::{
    error::ParametersError,
    multiexp::multi_exponentiate,
    primality::{bit_length, is_probable_prime, DEFAULT_PRIMALITY_ROUNDS},
    DlogGroup, Error, GroupParams, Result, SendableData,
};

/// The smallest modulus size accepted by [`ZpSafePrimeGroup::generate`].
pub const MIN_GENERATED_MODULUS_BITS: usize = 16;

// The length of an encoded binary array must fit in a byte.
const MAX_ENCODABLE_LENGTH: usize = 255;

const ENCODING_PREFIX: u8 = 0x01;

/// An element of the subgroup of quadratic residues of $\mathbb{Z}_p^*$, for a safe prime
/// $p = 2q + 1$. This subgroup has prime order $q$.
///
/// The element carries the Montgomery parameters of its group, which is how a group recognizes
/// elements it did not create.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct GroupElement<const LIMBS: usize>(DynResidue<LIMBS>);

impl<const LIMBS: usize> GroupElement<LIMBS> {
    /// The residue in $[0, p-1]$.
    pub fn value(&self) -> Uint<LIMBS> {
        self.0.retrieve()
    }

    pub fn is_identity(&self) -> bool {
        self.0 == DynResidue::one(*self.0.params())
    }
}

impl<const LIMBS: usize> GroupElement<LIMBS>
where
    Uint<LIMBS>: Encoding,
{
    pub fn to_sendable_data(&self) -> SendableData<LIMBS> {
        SendableData::new(self.value())
    }
}

impl<const LIMBS: usize> ConstantTimeEq for GroupElement<LIMBS> {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.params().modulus().ct_eq(other.0.params().modulus())
            & self.value().ct_eq(&other.value())
    }
}

impl<const LIMBS: usize> fmt::Display for GroupElement<LIMBS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZpSafePrimeElement [element value={}]", self.value())
    }
}

impl<const LIMBS: usize> From<GroupElement<LIMBS>> for Uint<LIMBS> {
    fn from(value: GroupElement<LIMBS>) -> Self {
        value.value()
    }
}

impl<'r, const LIMBS: usize> From<&'r GroupElement<LIMBS>> for Uint<LIMBS> {
    fn from(value: &'r GroupElement<LIMBS>) -> Self {
        value.value()
    }
}

/// The discrete-log group of quadratic residues modulo a safe prime $p = 2q + 1$.
///
/// Once constructed the group is immutable, so it is `Send + Sync` and all operations can be
/// called concurrently; randomness is supplied by the caller on every call that needs it.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ZpSafePrimeGroup<const LIMBS: usize>
where
    Uint<LIMBS>: Encoding,
{
    group_params: GroupParams<LIMBS>,
    residue_params: DynResidueParams<LIMBS>,
    // The bound for sampling uniformly in $[1, p-1]$.
    p_minus_one: NonZero<Uint<LIMBS>>,
    generator: GroupElement<LIMBS>,
    // `None` when the modulus is too small to encode any binary array.
    max_encodable_length: Option<usize>,
    primality_rounds: usize,
}

impl<const LIMBS: usize> ZpSafePrimeGroup<LIMBS>
where
    Uint<LIMBS>: Encoding,
{
    /// Builds the group from explicit parameters, checking that $p = 2q + 1$, that both $p$ and
    /// $q$ are prime (with [`DEFAULT_PRIMALITY_ROUNDS`] Miller-Rabin rounds) and that $g$
    /// generates the order-$q$ subgroup.
    pub fn new(group_params: GroupParams<LIMBS>, rng: &mut impl CryptoRngCore) -> Result<Self> {
        Self::new_with_primality_rounds(group_params, DEFAULT_PRIMALITY_ROUNDS, rng)
    }

    /// Like [`Self::new`], with `primality_rounds` random-base Miller-Rabin rounds. The same
    /// count is used by [`DlogGroup::validate_group`].
    pub fn new_with_primality_rounds(
        group_params: GroupParams<LIMBS>,
        primality_rounds: usize,
        rng: &mut impl CryptoRngCore,
    ) -> Result<Self> {
        let p = group_params.p();
        let q = group_params.q();

        if !is_safe_prime_relation(p, q) {
            return Err(reject(ParametersError::NotSafePrimeRelation));
        }

        if !is_probable_prime(p, primality_rounds, rng) {
            return Err(reject(ParametersError::CompositeModulus));
        }

        if !is_probable_prime(q, primality_rounds, rng) {
            return Err(reject(ParametersError::CompositeOrder));
        }

        let residue_params = residue_params(p)?;

        if !is_valid_subgroup_element(group_params.g(), &group_params, residue_params) {
            return Err(reject(ParametersError::InvalidGenerator));
        }

        let group = Self::from_validated_parts(group_params, residue_params, primality_rounds)?;

        log::debug!(
            "initialized a {}-bit Zp* safe-prime group from explicit parameters, k = {:?}",
            bit_length(p),
            group.max_encodable_length
        );

        Ok(group)
    }

    /// Builds the group from the string representations of `q`, `g` and `p`, in decimal or
    /// `0x`-prefixed hexadecimal.
    pub fn from_strs(q: &str, g: &str, p: &str, rng: &mut impl CryptoRngCore) -> Result<Self> {
        Self::new(GroupParams::from_strs(q, g, p)?, rng)
    }

    /// Generates a fresh group whose modulus is a random safe prime of exactly `modulus_bits`
    /// bits. The generator is the canonical $g = 2^2 = 4$.
    pub fn generate(modulus_bits: usize, rng: &mut impl CryptoRngCore) -> Result<Self> {
        if !(MIN_GENERATED_MODULUS_BITS..=Uint::<LIMBS>::BITS).contains(&modulus_bits) {
            return Err(reject(ParametersError::UnsupportedBitLength));
        }

        log::trace!("generating a {}-bit safe prime", modulus_bits);

        let p: Uint<LIMBS> = crypto_primes::generate_safe_prime_with_rng(rng, Some(modulus_bits));
        let q = p.shr_vartime(1);
        let residue_params = residue_params(&p)?;

        // A square, hence in the subgroup, and different from 1 whenever $p > 3$.
        let generator = DynResidue::new(&Uint::<LIMBS>::from_u8(2), residue_params).square();

        let group_params = GroupParams::new(q, generator.retrieve(), p);
        let group =
            Self::from_validated_parts(group_params, residue_params, DEFAULT_PRIMALITY_ROUNDS)?;

        log::debug!(
            "generated a {}-bit Zp* safe-prime group, k = {:?}",
            modulus_bits,
            group.max_encodable_length
        );

        Ok(group)
    }

    fn from_validated_parts(
        group_params: GroupParams<LIMBS>,
        residue_params: DynResidueParams<LIMBS>,
        primality_rounds: usize,
    ) -> Result<Self> {
        let p_minus_one: Option<NonZero<Uint<LIMBS>>> =
            NonZero::new(group_params.p().wrapping_sub(&Uint::<LIMBS>::ONE)).into();
        let p_minus_one =
            p_minus_one.ok_or_else(|| reject(ParametersError::UnsupportedModulus))?;

        Ok(Self {
            generator: GroupElement(DynResidue::new(group_params.g(), residue_params)),
            max_encodable_length: max_encodable_length(group_params.p()),
            group_params,
            residue_params,
            p_minus_one,
            primality_rounds,
        })
    }

    /// Evaluates $\prod_i bases_i^{exponents_i}$ by exponentiating each base on its own and
    /// multiplying the results. Agrees with
    /// [`DlogGroup::simultaneous_multiple_exponentiations`].
    pub fn simultaneous_multiple_exponentiations_naive(
        &self,
        bases: &[GroupElement<LIMBS>],
        exponents: &[Uint<LIMBS>],
    ) -> Result<GroupElement<LIMBS>> {
        self.check_batch(bases, exponents)?;

        #[cfg(not(feature = "parallel"))]
        let iter = bases.iter().zip(exponents);
        #[cfg(feature = "parallel")]
        let iter = bases.par_iter().zip(exponents);

        let powers: Vec<DynResidue<LIMBS>> =
            iter.map(|(base, exponent)| base.0.pow(exponent)).collect();

        Ok(GroupElement(powers.into_iter().fold(
            DynResidue::one(self.residue_params),
            |product, power| product * power,
        )))
    }

    fn check_belongs(&self, element: &GroupElement<LIMBS>) -> Result<()> {
        if *element.0.params() == self.residue_params {
            Ok(())
        } else {
            Err(Error::TypeMismatch)
        }
    }

    fn check_batch(&self, bases: &[GroupElement<LIMBS>], exponents: &[Uint<LIMBS>]) -> Result<()> {
        if bases.len() != exponents.len() {
            return Err(Error::LengthMismatch {
                bases: bases.len(),
                exponents: exponents.len(),
            });
        }

        bases.iter().try_for_each(|base| self.check_belongs(base))
    }

    fn element_from_value(
        &self,
        value: &Uint<LIMBS>,
        check_membership: bool,
    ) -> Result<GroupElement<LIMBS>> {
        if check_membership
            && !(*value != Uint::<LIMBS>::ZERO
                && has_subgroup_order(value, &self.group_params, self.residue_params))
        {
            return Err(Error::InvalidElement);
        }

        // Unchecked values are taken modulo $p$.
        Ok(GroupElement(DynResidue::new(value, self.residue_params)))
    }
}

impl<const LIMBS: usize> DlogGroup for ZpSafePrimeGroup<LIMBS>
where
    Uint<LIMBS>: Encoding,
{
    type GroupElement = GroupElement<LIMBS>;
    type Exponent = Uint<LIMBS>;
    type Value = Uint<LIMBS>;
    type GroupParams = GroupParams<LIMBS>;
    type SendableData = SendableData<LIMBS>;

    fn group_type(&self) -> &'static str {
        "Zp*"
    }

    fn group_params(&self) -> &GroupParams<LIMBS> {
        &self.group_params
    }

    fn generator(&self) -> &GroupElement<LIMBS> {
        &self.generator
    }

    fn order(&self) -> &Uint<LIMBS> {
        self.group_params.q()
    }

    fn identity(&self) -> GroupElement<LIMBS> {
        GroupElement(DynResidue::one(self.residue_params))
    }

    fn is_member(&self, element: &GroupElement<LIMBS>) -> Result<bool> {
        self.check_belongs(element)?;

        // The full element validation rejects 1, which is nevertheless in the subgroup.
        Ok(element.is_identity()
            || is_valid_subgroup_element(
                &element.value(),
                &self.group_params,
                self.residue_params,
            ))
    }

    fn is_generator(&self) -> bool {
        is_valid_subgroup_element(
            &self.generator.value(),
            &self.group_params,
            self.residue_params,
        )
    }

    fn validate_group(&self, rng: &mut impl CryptoRngCore) -> bool {
        let p = self.group_params.p();
        let q = self.group_params.q();

        is_safe_prime_relation(p, q)
            && is_probable_prime(p, self.primality_rounds, rng)
            && is_probable_prime(q, self.primality_rounds, rng)
            && self.generator.value() == *self.group_params.g()
            && self.is_generator()
    }

    fn is_prime_order(&self) -> bool {
        true
    }

    fn is_order_greater_than(&self, bits: usize) -> bool {
        let q = self.group_params.q();
        let order_bits = bit_length(q);

        // $q > 2^{bits}$ iff $q$ has more than $bits + 1$ bits, or exactly $bits + 1$ bits without
        // being $2^{bits}$ itself.
        match bits.checked_add(1) {
            Some(bits_of_bound) => {
                order_bits > bits_of_bound
                    || (order_bits == bits_of_bound
                        && *q != Uint::<LIMBS>::ONE.shl_vartime(bits))
            }
            None => false,
        }
    }

    fn inverse(&self, element: &GroupElement<LIMBS>) -> Result<GroupElement<LIMBS>> {
        self.check_belongs(element)?;

        // $p$ is prime, so everything but zero (which only an unchecked construction can
        // produce) is invertible.
        if element.value() == Uint::<LIMBS>::ZERO {
            return Err(Error::InvalidElement);
        }

        Ok(GroupElement(element.0.invert().0))
    }

    fn exponentiate(
        &self,
        base: &GroupElement<LIMBS>,
        exponent: &Uint<LIMBS>,
    ) -> Result<GroupElement<LIMBS>> {
        self.check_belongs(base)?;

        Ok(GroupElement(base.0.pow(exponent)))
    }

    fn multiply(
        &self,
        lhs: &GroupElement<LIMBS>,
        rhs: &GroupElement<LIMBS>,
    ) -> Result<GroupElement<LIMBS>> {
        self.check_belongs(lhs)?;
        self.check_belongs(rhs)?;

        Ok(GroupElement(lhs.0 * rhs.0))
    }

    fn simultaneous_multiple_exponentiations(
        &self,
        bases: &[GroupElement<LIMBS>],
        exponents: &[Uint<LIMBS>],
    ) -> Result<GroupElement<LIMBS>> {
        self.check_batch(bases, exponents)?;

        let bases_and_exponents: Vec<(DynResidue<LIMBS>, Uint<LIMBS>)> = bases
            .iter()
            .map(|base| base.0)
            .zip(exponents.iter().copied())
            .collect();

        Ok(GroupElement(multi_exponentiate(
            &bases_and_exponents,
            Uint::<LIMBS>::BITS,
            self.residue_params,
        )))
    }

    fn generate_element(
        &self,
        check_membership: bool,
        values: &[Uint<LIMBS>],
    ) -> Result<GroupElement<LIMBS>> {
        match values {
            [x] => self.element_from_value(x, check_membership),
            _ => Err(Error::InvalidArgument(
                "to generate a Zp* element exactly one value, x, is required",
            )),
        }
    }

    fn create_random_element(&self, rng: &mut impl CryptoRngCore) -> GroupElement<LIMBS> {
        // Uniform in $[1, p-1]$, then squared into the subgroup of quadratic residues.
        let value =
            Uint::<LIMBS>::random_mod(rng, &self.p_minus_one).wrapping_add(&Uint::<LIMBS>::ONE);

        GroupElement(DynResidue::new(&value, self.residue_params).square())
    }

    fn reconstruct_element(
        &self,
        check_membership: bool,
        data: &SendableData<LIMBS>,
    ) -> Result<GroupElement<LIMBS>> {
        self.element_from_value(data.value(), check_membership)
    }

    fn max_length_of_byte_array_for_encoding(&self) -> Option<usize> {
        self.max_encodable_length
    }

    fn encode_byte_array_to_group_element(
        &self,
        binary_string: &[u8],
    ) -> Result<GroupElement<LIMBS>> {
        let max_length = self
            .max_encodable_length
            .ok_or(Error::EncodingUnsupported)?;

        if binary_string.len() > max_length {
            return Err(Error::InputTooLong {
                length: binary_string.len(),
                max: max_length,
            });
        }

        // $s = \mathtt{0x01} \Vert binary\_string$. The prefix keeps leading zero bytes and
        // marks where the binary string starts when decoding.
        let mut padded = vec![0u8; Uint::<LIMBS>::BYTES];
        let offset = Uint::<LIMBS>::BYTES - binary_string.len();
        padded[offset - 1] = ENCODING_PREFIX;
        padded[offset..].copy_from_slice(binary_string);

        let s = Uint::<LIMBS>::from_be_slice(&padded);

        // $y = (s+1)^2 \mod p$ is a non-zero square, hence a member; $s + 1 < (p-1)/2$ by the
        // choice of `k`, so it is the smaller of the two square roots of $y$.
        Ok(GroupElement(
            DynResidue::new(&s.wrapping_add(&Uint::<LIMBS>::ONE), self.residue_params).square(),
        ))
    }

    fn decode_group_element_to_byte_array(
        &self,
        element: &GroupElement<LIMBS>,
    ) -> Result<Vec<u8>> {
        self.check_belongs(element)?;

        let max_length = self
            .max_encodable_length
            .ok_or(Error::NotAnEncoding)?;

        // $p \equiv 3 \mod 4$, so $y^{(p+1)/4} = y^{(q+1)/2}$ is a square root of $y$ if it has one.
        let square_root_exponent = self
            .group_params
            .q()
            .wrapping_add(&Uint::<LIMBS>::ONE)
            .shr_vartime(1);
        let root = element.0.pow(&square_root_exponent);

        if root.square() != element.0 {
            return Err(Error::NotAnEncoding);
        }

        let root = root.retrieve();
        let s_plus_one = root.min(self.group_params.p().wrapping_sub(&root));
        if s_plus_one == Uint::<LIMBS>::ZERO {
            return Err(Error::NotAnEncoding);
        }

        let s = s_plus_one.wrapping_sub(&Uint::<LIMBS>::ONE).to_be_bytes();
        let s = s.as_ref();

        let prefix_position = s
            .iter()
            .position(|byte| *byte != 0)
            .ok_or(Error::NotAnEncoding)?;
        if s[prefix_position] != ENCODING_PREFIX {
            return Err(Error::NotAnEncoding);
        }

        let binary_string = &s[prefix_position + 1..];
        if binary_string.len() > max_length {
            return Err(Error::NotAnEncoding);
        }

        Ok(binary_string.to_vec())
    }

    fn map_any_group_element_to_byte_array(
        &self,
        element: &GroupElement<LIMBS>,
    ) -> Result<Vec<u8>> {
        self.check_belongs(element)?;

        let width = (bit_length(self.group_params.p()) + 7) / 8;
        let bytes = element.value().to_be_bytes();

        Ok(bytes.as_ref()[Uint::<LIMBS>::BYTES - width..].to_vec())
    }
}

fn reject(error: ParametersError) -> Error {
    log::debug!("rejecting group parameters: {}", error);

    error.into()
}

fn residue_params<const LIMBS: usize>(p: &Uint<LIMBS>) -> Result<DynResidueParams<LIMBS>> {
    // Montgomery form only works for an odd modulus.
    if p.as_limbs()[0].0 & 1 == 0 || *p == Uint::<LIMBS>::ONE {
        return Err(reject(ParametersError::UnsupportedModulus));
    }

    Ok(DynResidueParams::new(p))
}

fn is_safe_prime_relation<const LIMBS: usize>(p: &Uint<LIMBS>, q: &Uint<LIMBS>) -> bool {
    let two_q: Option<Uint<LIMBS>> = q.checked_mul(&Uint::<LIMBS>::from_u8(2)).into();
    let two_q_plus_one: Option<Uint<LIMBS>> =
        two_q.and_then(|two_q| two_q.checked_add(&Uint::<LIMBS>::ONE).into());

    two_q_plus_one == Some(*p)
}

// $value^q \equiv 1 \mod p$ for a value in $[0, p-1]$.
fn has_subgroup_order<const LIMBS: usize>(
    value: &Uint<LIMBS>,
    group_params: &GroupParams<LIMBS>,
    residue_params: DynResidueParams<LIMBS>,
) -> bool
where
    Uint<LIMBS>: Encoding,
{
    value < group_params.p()
        && DynResidue::new(value, residue_params).pow(group_params.q())
            == DynResidue::one(residue_params)
}

// The full element validation: $1 < value < p$ and $value^q \equiv 1 \mod p$.
fn is_valid_subgroup_element<const LIMBS: usize>(
    value: &Uint<LIMBS>,
    group_params: &GroupParams<LIMBS>,
    residue_params: DynResidueParams<LIMBS>,
) -> bool
where
    Uint<LIMBS>: Encoding,
{
    *value > Uint::<LIMBS>::ONE && has_subgroup_order(value, group_params, residue_params)
}

// $k = \lfloor(\lvert p \rvert - 3) / 8\rfloor - 1$: any $k+1$ bytes have a numeric value below
// $(p-1)/2 - 1$, and one of them is taken by the encoding prefix. Negative for moduli below 11
// bits, where nothing is encodable; this also rules out $p = 5$, the only safe prime with an
// even $q$, for which the square root taken when decoding does not apply.
fn max_encodable_length<const LIMBS: usize>(p: &Uint<LIMBS>) -> Option<usize> {
    (bit_length(p).saturating_sub(3) / 8)
        .checked_sub(1)
        .map(|k| k.min(MAX_ENCODABLE_LENGTH))
}
