// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use crypto_bigint::{Encoding, Uint};
use serde::{Deserialize, Serialize};
use subtle::{Choice, ConstantTimeEq};

use crate::{Error, Result};

/// A transport snapshot of a group element: just its residue, detached from the group.
///
/// The byte layout produced by [`SendableData::to_bytes`] is the fixed-width big-endian encoding
/// of the residue, `Uint::<LIMBS>::BYTES` long. The receiving side recovers the element with
/// [`DlogGroup::reconstruct_element`](crate::DlogGroup::reconstruct_element).
#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SendableData<const LIMBS: usize>
where
    Uint<LIMBS>: Encoding,
{
    value: Uint<LIMBS>,
}

impl<const LIMBS: usize> SendableData<LIMBS>
where
    Uint<LIMBS>: Encoding,
{
    pub fn new(value: Uint<LIMBS>) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &Uint<LIMBS> {
        &self.value
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.value.to_be_bytes().as_ref().to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Uint::<LIMBS>::BYTES {
            return Err(Error::InvalidArgument(
                "sendable data must be exactly as wide as the group's integers",
            ));
        }

        Ok(Self::new(Uint::<LIMBS>::from_be_slice(bytes)))
    }
}

impl<const LIMBS: usize> ConstantTimeEq for SendableData<LIMBS>
where
    Uint<LIMBS>: Encoding,
{
    fn ct_eq(&self, other: &Self) -> Choice {
        self.value.ct_eq(&other.value)
    }
}
