//! Error surfacing utilities.
//!
//! Contracts keep their own `contracterror` enums; this module carries the
//! companion pattern that makes the numeric codes legible off-chain. Before
//! returning an error, a contract emits an `Error` event holding the code
//! and the original human-readable reason string, so indexers and test
//! tooling can match on exact wording.

use soroban_sdk::{symbol_short, Env, String as SorobanString};

/// Emit a diagnostic error event for off-chain indexing.
///
/// # Arguments
/// * `e` - The environment
/// * `code` - The contract error code about to be returned
/// * `reason` - The human-readable reason string for the failure
pub fn emit_error_event(e: &Env, code: u32, reason: &str) {
    let reason_str = SorobanString::from_str(e, reason);
    e.events().publish(
        (symbol_short!("Error"), code),
        (reason_str, e.ledger().timestamp()),
    );
}
