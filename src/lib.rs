// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

//! A discrete-logarithm group over the quadratic residues of $\mathbb{Z}_p^*$, for a safe prime
//! $p = 2q + 1$.
//!
//! [`ZpSafePrimeGroup`] implements the [`DlogGroup`] abstraction: exponentiation, multiplication,
//! inversion, simultaneous multi-exponentiation, random sampling, and a reversible encoding of
//! short binary arrays into group elements.

use crypto_bigint::{U1024, U2048, U3072};

mod error;
pub mod group;
mod multiexp;
pub mod params;
pub mod primality;
mod sendable;

pub use error::{Error, ParametersError, Result};
pub use group::{
    zp_safe_prime::{GroupElement, ZpSafePrimeGroup, MIN_GENERATED_MODULUS_BITS},
    DlogGroup,
};
pub use params::GroupParams;
pub use primality::DEFAULT_PRIMALITY_ROUNDS;
pub use sendable::SendableData;

pub type Zp1024Group = ZpSafePrimeGroup<{ U1024::LIMBS }>;
pub type Zp2048Group = ZpSafePrimeGroup<{ U2048::LIMBS }>;
pub type Zp3072Group = ZpSafePrimeGroup<{ U3072::LIMBS }>;
