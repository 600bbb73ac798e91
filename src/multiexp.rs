// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use crypto_bigint::modular::runtime_mod::{DynResidue, DynResidueParams};
use crypto_bigint::{Limb, Uint, Word};

const WINDOW: usize = 4;
const WINDOW_MASK: Word = (1 << WINDOW) - 1;

/// Computes $\prod_i b_i^{e_i}$ with Straus' simultaneous exponentiation over fixed 4-bit windows.
/// `exponent_bits` represents the number of bits to take into account for the exponents.
///
/// See: Straus, E. G. Problems and solutions: Addition chains of vectors. American Mathematical Monthly 71 (1964), 806–808.
///
/// All bases share one chain of squarings. `benches/benches.rs` compares this against
/// exponentiating each base and multiplying the results.
pub(crate) fn multi_exponentiate<const LIMBS: usize, const EXPONENT_LIMBS: usize>(
    bases_and_exponents: &[(DynResidue<LIMBS>, Uint<EXPONENT_LIMBS>)],
    exponent_bits: usize,
    residue_params: DynResidueParams<LIMBS>,
) -> DynResidue<LIMBS> {
    let one = DynResidue::one(residue_params);
    if exponent_bits == 0 || bases_and_exponents.is_empty() {
        return one;
    }

    // tables[j][i] holds base_j^i
    let tables: Vec<([DynResidue<LIMBS>; 1 << WINDOW], &Uint<EXPONENT_LIMBS>)> =
        bases_and_exponents
            .iter()
            .map(|(base, exponent)| {
                let mut powers = [one; 1 << WINDOW];
                powers[1] = *base;

                for i in 2..powers.len() {
                    powers[i] = powers[i - 1] * powers[1];
                }

                (powers, exponent)
            })
            .collect();

    let top_limb = (exponent_bits - 1) / Limb::BITS;
    let top_bit_in_limb = (exponent_bits - 1) % Limb::BITS;
    let top_window = top_bit_in_limb / WINDOW;
    let top_window_mask: Word = (1 << (top_bit_in_limb % WINDOW + 1)) - 1;

    let mut accumulator = one;

    for limb_index in (0..=top_limb).rev() {
        let windows_in_limb = if limb_index == top_limb {
            top_window + 1
        } else {
            Limb::BITS / WINDOW
        };

        for window_index in (0..windows_in_limb).rev() {
            let is_top_window = limb_index == top_limb && window_index == top_window;

            if !is_top_window {
                for _ in 0..WINDOW {
                    accumulator = accumulator.square();
                }
            }

            for (powers, exponent) in &tables {
                let limb = exponent.as_limbs()[limb_index].0;
                let mut digit = (limb >> (window_index * WINDOW)) & WINDOW_MASK;

                if is_top_window {
                    digit &= top_window_mask;
                }

                // Non-constant time: the table lookup depends on the exponent.
                accumulator *= powers[digit as usize];
            }
        }
    }

    accumulator
}

#[cfg(test)]
mod tests {
    use crypto_bigint::modular::runtime_mod::{DynResidue, DynResidueParams};
    use crypto_bigint::{NonZero, RandomMod, U256};
    use rand_core::OsRng;

    use super::*;

    #[test]
    fn test_multi_exp() {
        let params = DynResidueParams::new(&U256::from_be_hex(
            "9CC24C5DF431A864188AB905AC751B727C9447A8E99E6366E1AD78A21E8D882B",
        ));

        let base = DynResidue::new(&U256::from(2u8), params);
        let exponent = U256::from(33u8);

        let res = multi_exponentiate(&[(base, exponent)], U256::BITS, params);

        let base_to_exp =
            U256::from_be_hex("0000000000000000000000000000000000000000000000000000000200000000");

        assert_eq!(res.retrieve(), base_to_exp);

        let base2 = DynResidue::new(
            &U256::from_be_hex("3435D18AA8313EBBE4D20002922225B53F75DC4453BB3EEC0378646F79B524A4"),
            params,
        );
        let exponent2 =
            U256::from_be_hex("77117F1273373C26C700D076B3F780074D03339F56DD0EFB60E7F58441FD3685");

        let base2_to_exp2 =
            U256::from_be_hex("3681BC0FEA2E5D394EB178155A127B0FD2EF405486D354251C385BDD51B9D421");

        let res = multi_exponentiate(&[(base2, exponent2)], U256::BITS, params);

        assert_eq!(res.retrieve(), base2_to_exp2);

        let expected = (DynResidue::new(&base_to_exp, params)
            * DynResidue::new(&base2_to_exp2, params))
        .retrieve();

        let res = multi_exponentiate(
            &[(base, exponent), (base2, exponent2)],
            U256::BITS,
            params,
        );

        assert_eq!(res.retrieve(), expected);
    }

    #[test]
    fn agrees_with_sequential_exponentiation() {
        let modulus = U256::from_be_hex(
            "9CC24C5DF431A864188AB905AC751B727C9447A8E99E6366E1AD78A21E8D882B",
        );
        let params = DynResidueParams::new(&modulus);
        let modulus = NonZero::new(modulus).unwrap();

        let bases_and_exponents: Vec<_> = (0..5)
            .map(|_| {
                (
                    DynResidue::new(&U256::random_mod(&mut OsRng, &modulus), params),
                    U256::random_mod(&mut OsRng, &modulus),
                )
            })
            .collect();

        let expected = bases_and_exponents
            .iter()
            .fold(DynResidue::one(params), |acc, (base, exponent)| {
                acc * base.pow(exponent)
            });

        assert_eq!(
            multi_exponentiate(&bases_and_exponents, U256::BITS, params),
            expected
        );
    }

    #[test]
    fn respects_exponent_bits() {
        let params = DynResidueParams::new(&U256::from_u64(1_000_003));
        let base = DynResidue::new(&U256::from_u8(5), params);

        // Only the 7 low bits of 0b1100_1010 are in use, the 8th is masked off.
        let res = multi_exponentiate(&[(base, U256::from_u8(0b1100_1010))], 7, params);

        assert_eq!(res, base.pow(&U256::from_u8(0b0100_1010)));
    }

    #[test]
    fn empty_product_is_one() {
        let params = DynResidueParams::new(&U256::from_u64(1_000_003));

        assert_eq!(
            multi_exponentiate::<{ U256::LIMBS }, { U256::LIMBS }>(&[], U256::BITS, params),
            DynResidue::one(params)
        );
    }
}
