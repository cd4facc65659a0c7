use borsh::{BorshDeserialize, BorshSerialize};
use eyre::{Result as EyreResult, WrapErr};

use crate::key::AsKeyParts;

/// How an entry's value is laid out on disk.
pub trait Codec<T> {
    fn encode(value: &T) -> EyreResult<Vec<u8>>;
    fn decode(bytes: &[u8]) -> EyreResult<T>;
}

#[derive(Clone, Copy, Debug)]
pub struct Borsh;

impl<T: BorshSerialize + BorshDeserialize> Codec<T> for Borsh {
    fn encode(value: &T) -> EyreResult<Vec<u8>> {
        borsh::to_vec(value).wrap_err("failed to encode entry")
    }

    fn decode(bytes: &[u8]) -> EyreResult<T> {
        borsh::from_slice(bytes).wrap_err("failed to decode entry")
    }
}

/// Stores bytes and strings as-is.
#[derive(Clone, Copy, Debug)]
pub struct Identity;

impl Codec<Vec<u8>> for Identity {
    fn encode(value: &Vec<u8>) -> EyreResult<Vec<u8>> {
        Ok(value.clone())
    }

    fn decode(bytes: &[u8]) -> EyreResult<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}

impl Codec<String> for Identity {
    fn encode(value: &String) -> EyreResult<Vec<u8>> {
        Ok(value.as_bytes().to_vec())
    }

    fn decode(bytes: &[u8]) -> EyreResult<String> {
        String::from_utf8(bytes.to_vec()).wrap_err("entry is not valid utf-8")
    }
}

/// A key whose value type is fixed.
pub trait Entry: AsKeyParts {
    type DataType;
    type Codec: Codec<Self::DataType>;
}
