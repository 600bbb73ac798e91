// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use crypto_bigint::{CheckedAdd, CheckedMul, Encoding, Uint};
use serde::{Deserialize, Serialize};

use crate::{error::ParametersError, Result};

/// The parameters $(p, q, g)$ of a discrete-log group over the quadratic residues of
/// $\mathbb{Z}_p^*$, where $p = 2q + 1$ is a safe prime and $g$ generates the order-$q$ subgroup.
///
/// Holding a `GroupParams` says nothing about its soundness: the relations are checked when
/// a [`ZpSafePrimeGroup`](crate::ZpSafePrimeGroup) is built from it.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GroupParams<const LIMBS: usize>
where
    Uint<LIMBS>: Encoding,
{
    q: Uint<LIMBS>,
    g: Uint<LIMBS>,
    p: Uint<LIMBS>,
}

impl<const LIMBS: usize> GroupParams<LIMBS>
where
    Uint<LIMBS>: Encoding,
{
    pub fn new(q: Uint<LIMBS>, g: Uint<LIMBS>, p: Uint<LIMBS>) -> Self {
        Self { q, g, p }
    }

    /// Parses `q`, `g` and `p` from decimal strings, or hexadecimal ones prefixed by `0x`.
    pub fn from_strs(q: &str, g: &str, p: &str) -> Result<Self> {
        Ok(Self::new(
            parse_natural_number(q)?,
            parse_natural_number(g)?,
            parse_natural_number(p)?,
        ))
    }

    /// The safe prime modulus $p$.
    pub fn p(&self) -> &Uint<LIMBS> {
        &self.p
    }

    /// The order $q = (p-1)/2$ of the quadratic-residue subgroup.
    pub fn q(&self) -> &Uint<LIMBS> {
        &self.q
    }

    /// The value of the generator $g$.
    pub fn g(&self) -> &Uint<LIMBS> {
        &self.g
    }
}

/// Parses a non-negative integer, written in decimal or in `0x`-prefixed hexadecimal.
/// Fails with [`ParametersError::Malformed`] on an empty string, a foreign digit, or a value
/// that does not fit in `Uint<LIMBS>`.
pub fn parse_natural_number<const LIMBS: usize>(value: &str) -> Result<Uint<LIMBS>> {
    let value = value.trim();
    let (digits, radix) = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex_digits) => (hex_digits, 16),
        None => (value, 10),
    };

    if digits.is_empty() {
        return Err(ParametersError::Malformed.into());
    }

    let radix_as_number = Uint::<LIMBS>::from_u32(radix);

    digits.chars().try_fold(Uint::<LIMBS>::ZERO, |acc, digit| -> Result<Uint<LIMBS>> {
        let digit = digit.to_digit(radix).ok_or(ParametersError::Malformed)?;

        let shifted: Option<Uint<LIMBS>> = acc.checked_mul(&radix_as_number).into();
        let accumulated: Option<Uint<LIMBS>> = shifted
            .and_then(|shifted| shifted.checked_add(&Uint::<LIMBS>::from_u32(digit)).into());

        accumulated.ok_or(ParametersError::Malformed.into())
    })
}
