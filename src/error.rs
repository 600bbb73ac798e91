// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid group parameters: {0}")]
    InvalidGroupParameters(ParametersError),
    #[error("the requested value is not an element of this group")]
    InvalidElement,
    #[error("the group element does not belong to this group")]
    TypeMismatch,
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("the binary array to encode is {length} bytes long, at most {max} are supported")]
    InputTooLong { length: usize, max: usize },
    #[error("got {bases} bases but {exponents} exponents")]
    LengthMismatch { bases: usize, exponents: usize },
    #[error("the group element is not the encoding of a binary array")]
    NotAnEncoding,
    #[error("the modulus is too small to encode binary arrays")]
    EncodingUnsupported,
}

#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParametersError {
    #[error("p must be equal to 2q+1")]
    NotSafePrimeRelation,
    #[error("p must be a prime")]
    CompositeModulus,
    #[error("q must be a prime")]
    CompositeOrder,
    #[error("generator value is not valid")]
    InvalidGenerator,
    #[error("the modulus must be odd")]
    UnsupportedModulus,
    #[error("malformed integer")]
    Malformed,
    #[error("unsupported bit length")]
    UnsupportedBitLength,
}

impl From<ParametersError> for Error {
    fn from(value: ParametersError) -> Self {
        Error::InvalidGroupParameters(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
