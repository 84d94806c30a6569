//! Envelope addresses and their extraction from a message header

#[cfg(feature = "serde")]
mod serde;

mod envelope;
mod extract;
mod types;

pub use self::{
    envelope::Envelope,
    extract::{extract_envelope, header_block, ExtractError, Field},
    types::{Address, AddressError, AT_POSITION, MAX_ADDRESS_LEN, MIN_ADDRESS_LEN},
};
