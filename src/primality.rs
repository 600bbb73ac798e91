// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use crypto_bigint::{rand_core::CryptoRngCore, NonZero, Uint};
use crypto_primes::hazmat::MillerRabin;

/// The number of random-base Miller-Rabin rounds used when validating group parameters.
/// Each round has a false-positive probability of at most $1/4$, so 40 rounds bound it by $2^{-80}$.
pub const DEFAULT_PRIMALITY_ROUNDS: usize = 40;

const SMALL_PRIMES: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Probabilistic primality test: trial division by the primes below 100, then a base-2
/// Miller-Rabin test followed by `rounds` Miller-Rabin tests with uniformly random bases.
pub fn is_probable_prime<const LIMBS: usize>(
    candidate: &Uint<LIMBS>,
    rounds: usize,
    rng: &mut impl CryptoRngCore,
) -> bool {
    if *candidate < Uint::<LIMBS>::from_u8(2) {
        return false;
    }

    for small_prime in SMALL_PRIMES {
        let small_prime = Uint::<LIMBS>::from_u32(small_prime);
        if *candidate == small_prime {
            return true;
        }

        let divisor: Option<NonZero<Uint<LIMBS>>> = NonZero::new(small_prime).into();
        if let Some(divisor) = divisor {
            if (*candidate % divisor) == Uint::<LIMBS>::ZERO {
                return false;
            }
        }
    }

    // `candidate` is odd and larger than 97 from here on, as `MillerRabin` requires.
    let miller_rabin = MillerRabin::new(candidate);
    if !miller_rabin.test_base_two().is_probably_prime() {
        return false;
    }

    (0..rounds).all(|_| miller_rabin.test_random_base(rng).is_probably_prime())
}

/// The number of significant bits of `value`, i.e. $\lfloor\log_2(value)\rfloor + 1$ (and 0 for 0).
pub fn bit_length<const LIMBS: usize>(value: &Uint<LIMBS>) -> usize {
    value.bits()
}
