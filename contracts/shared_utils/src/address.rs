//! Address classification helpers.
//!
//! Soroban has no native zero address; the all-zero ed25519 account serves
//! as the zero/sentinel account for mint provenance and transfer-target
//! checks. Contract-vs-account classification reads the strkey prefix:
//! contract addresses render as `C...`, account addresses as `G...`.

use soroban_sdk::{Address, Env, String};

/// Strkey of the all-zero ed25519 account, used as the zero-account
/// sentinel.
pub const ZERO_ADDRESS: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

/// Length in characters of contract and ed25519 account strkeys.
const STRKEY_LEN: u32 = 56;

/// Returns the zero-account sentinel address.
pub fn zero_address(e: &Env) -> Address {
    Address::from_string(&String::from_str(e, ZERO_ADDRESS))
}

/// Returns `true` if `address` is the zero-account sentinel.
pub fn is_zero_address(e: &Env, address: &Address) -> bool {
    *address == zero_address(e)
}

/// Returns `true` if `address` is a contract address.
///
/// Muxed and other non-standard address forms are treated as accounts.
pub fn is_contract(_e: &Env, address: &Address) -> bool {
    let strkey = address.to_string();
    if strkey.len() != STRKEY_LEN {
        return false;
    }
    let mut buf = [0u8; STRKEY_LEN as usize];
    strkey.copy_into_slice(&mut buf);
    buf[0] == b'C'
}
