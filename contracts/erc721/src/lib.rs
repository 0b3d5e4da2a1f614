#![no_std]
use soroban_sdk::{
    contract, contractclient, contracterror, contractimpl, contracttype, symbol_short, Address,
    Bytes, Env, String, Symbol,
};

use shared_utils::{
    address::{is_contract, is_zero_address, zero_address},
    errors::emit_error_event,
    interfaces::{ERC721_RECEIVED_MAGIC, REQUIRED_TOKEN_INTERFACES},
};

#[cfg(test)]
mod tests;

/// Upper bound on a composed token URI (base URI plus decimal token id).
const MAX_URI_LEN: usize = 256;

/// Decimal digits in u32::MAX, the longest possible token id suffix.
const MAX_ID_DIGITS: usize = 10;

// ============================================================================
// Error Types
// ============================================================================

/// Token contract errors for structured error handling
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    /// Contract has not been initialized
    NotInitialized = 1,
    /// Contract has already been initialized
    AlreadyInitialized = 2,
    /// Token with the given token_id was never minted
    TokenNotFound = 3,
    /// Caller is not the contract owner (minting is restricted)
    NotContractOwner = 4,
    /// Approve caller is neither the token owner nor an operator
    ApproveCallerNotAuthorized = 5,
    /// Transfer caller is neither owner, approved spender, nor operator
    TransferCallerNotAuthorized = 6,
    /// `from` is not the current owner of the token
    TransferFromIncorrectOwner = 7,
    /// Transfer target is the zero account
    TransferToZeroAddress = 8,
    /// Receiver contract did not acknowledge the safe transfer
    NonReceiverImplementer = 9,
    /// URI queried for a token that was never minted
    UriQueryForNonexistentToken = 10,
    /// Base URI does not fit the URI composition buffer
    BaseUriTooLong = 11,
}

impl ContractError {
    /// The original human-readable reason string for this failure.
    ///
    /// External tooling matches on the exact wording, so these strings are
    /// stable.
    pub fn reason(&self) -> &'static str {
        match self {
            ContractError::NotInitialized => "ERC721: contract is not initialized",
            ContractError::AlreadyInitialized => "ERC721: contract is already initialized",
            ContractError::TokenNotFound => "ERC721: Token with this id does not exist",
            ContractError::NotContractOwner => "ERC721: you are not owner",
            ContractError::ApproveCallerNotAuthorized => {
                "ERC721: approve caller is not owner or approved operator"
            }
            ContractError::TransferCallerNotAuthorized => {
                "ERC721: transfer caller is not owner or approved operator"
            }
            ContractError::TransferFromIncorrectOwner => "ERC721: transfer from incorrect owner",
            ContractError::TransferToZeroAddress => "ERC721: transfer to the zero address",
            ContractError::NonReceiverImplementer => {
                "ERC721: transfer to non ERC721Receiver implementer"
            }
            ContractError::UriQueryForNonexistentToken => {
                "ERC721: URI query for nonexistent token"
            }
            ContractError::BaseUriTooLong => "ERC721: base URI too long",
        }
    }
}

/// Emit the diagnostic error event and hand the error back for returning.
fn fail(e: &Env, err: ContractError) -> ContractError {
    emit_error_event(e, err as u32, err.reason());
    err
}

// ============================================================================
// External Interfaces
// ============================================================================

/// Receiver hook a contract must export to accept safe transfers.
///
/// The implementation must return [`ERC721_RECEIVED_MAGIC`]; any other value
/// (or a failed call) rejects the transfer.
#[contractclient(name = "Erc721ReceiverClient")]
pub trait Erc721Receiver {
    fn on_erc721_received(
        env: Env,
        operator: Address,
        from: Address,
        token_id: u32,
        data: Bytes,
    ) -> u32;
}

// ============================================================================
// Storage
// ============================================================================

/// Storage keys for the contract
#[contracttype]
pub enum DataKey {
    /// Contract owner, the only account allowed to mint
    Admin,
    /// Token collection name
    Name,
    /// Token collection symbol
    Symbol,
    /// Base URI prefix for token URIs
    BaseUri,
    /// Id of the most recently minted token (0 = none minted yet)
    TokenCounter,
    /// Owner of a token (token_id -> Address)
    Owner(u32),
    /// Approved spender of a token (token_id -> Address)
    Approved(u32),
    /// Operator approval relation ((owner, operator) -> bool)
    Operator(Address, Address),
    /// Token count per account (Address -> u32)
    Balance(Address),
}

mod storage {
    use super::*;

    // --- Contract metadata ---

    pub fn set_admin(e: &Env, admin: &Address) {
        e.storage().instance().set(&DataKey::Admin, admin);
    }

    pub fn get_admin(e: &Env) -> Option<Address> {
        e.storage().instance().get(&DataKey::Admin)
    }

    pub fn has_admin(e: &Env) -> bool {
        e.storage().instance().has(&DataKey::Admin)
    }

    pub fn set_metadata(e: &Env, name: &String, symbol: &String, base_uri: &String) {
        e.storage().instance().set(&DataKey::Name, name);
        e.storage().instance().set(&DataKey::Symbol, symbol);
        e.storage().instance().set(&DataKey::BaseUri, base_uri);
    }

    pub fn get_name(e: &Env) -> Option<String> {
        e.storage().instance().get(&DataKey::Name)
    }

    pub fn get_symbol(e: &Env) -> Option<String> {
        e.storage().instance().get(&DataKey::Symbol)
    }

    pub fn get_base_uri(e: &Env) -> Option<String> {
        e.storage().instance().get(&DataKey::BaseUri)
    }

    // --- Token Counter ---

    pub fn increment_token_counter(e: &Env) -> u32 {
        let count: u32 = e
            .storage()
            .instance()
            .get(&DataKey::TokenCounter)
            .unwrap_or(0);
        let new_count = count + 1;
        e.storage()
            .instance()
            .set(&DataKey::TokenCounter, &new_count);
        new_count
    }

    pub fn get_token_counter(e: &Env) -> u32 {
        e.storage()
            .instance()
            .get(&DataKey::TokenCounter)
            .unwrap_or(0)
    }

    // --- Ownership ---

    pub fn set_owner(e: &Env, token_id: u32, owner: &Address) {
        e.storage()
            .persistent()
            .set(&DataKey::Owner(token_id), owner);
    }

    pub fn get_owner(e: &Env, token_id: u32) -> Option<Address> {
        e.storage().persistent().get(&DataKey::Owner(token_id))
    }

    // --- Per-token approval ---

    pub fn set_approved(e: &Env, token_id: u32, spender: &Address) {
        e.storage()
            .persistent()
            .set(&DataKey::Approved(token_id), spender);
    }

    pub fn get_approved(e: &Env, token_id: u32) -> Option<Address> {
        e.storage().persistent().get(&DataKey::Approved(token_id))
    }

    pub fn clear_approved(e: &Env, token_id: u32) {
        e.storage().persistent().remove(&DataKey::Approved(token_id));
    }

    // --- Operator approval ---

    pub fn set_operator(e: &Env, owner: &Address, operator: &Address, approved: bool) {
        e.storage()
            .persistent()
            .set(&DataKey::Operator(owner.clone(), operator.clone()), &approved);
    }

    pub fn is_operator(e: &Env, owner: &Address, operator: &Address) -> bool {
        e.storage()
            .persistent()
            .get(&DataKey::Operator(owner.clone(), operator.clone()))
            .unwrap_or(false)
    }

    // --- Balances ---

    pub fn get_balance(e: &Env, owner: &Address) -> u32 {
        e.storage()
            .persistent()
            .get(&DataKey::Balance(owner.clone()))
            .unwrap_or(0)
    }

    pub fn add_balance(e: &Env, owner: &Address, amount: u32) {
        let balance = get_balance(e, owner);
        e.storage()
            .persistent()
            .set(&DataKey::Balance(owner.clone()), &(balance + amount));
    }

    pub fn sub_balance(e: &Env, owner: &Address, amount: u32) {
        let balance = get_balance(e, owner);
        e.storage()
            .persistent()
            .set(&DataKey::Balance(owner.clone()), &(balance - amount));
    }
}

// ============================================================================
// Contract Implementation
// ============================================================================

#[contract]
pub struct Erc721Contract;

#[contractimpl]
impl Erc721Contract {
    // ========================================================================
    // Initialization
    // ========================================================================

    /// Initialize the token contract.
    ///
    /// # Arguments
    /// * `admin` - Contract owner, the only account allowed to mint
    /// * `name` - Token collection name
    /// * `symbol` - Token collection symbol
    /// * `base_uri` - Prefix all token URIs are composed from
    ///
    /// # Errors
    /// * `AlreadyInitialized` - If the contract has already been initialized
    /// * `BaseUriTooLong` - If the base URI cannot hold a token id suffix
    pub fn initialize(
        e: Env,
        admin: Address,
        name: String,
        symbol: String,
        base_uri: String,
    ) -> Result<(), ContractError> {
        if storage::has_admin(&e) {
            return Err(fail(&e, ContractError::AlreadyInitialized));
        }
        if base_uri.len() as usize + MAX_ID_DIGITS > MAX_URI_LEN {
            return Err(fail(&e, ContractError::BaseUriTooLong));
        }

        storage::set_admin(&e, &admin);
        storage::set_metadata(&e, &name, &symbol, &base_uri);
        e.storage().instance().set(&DataKey::TokenCounter, &0u32);

        Ok(())
    }

    // ========================================================================
    // Minting
    // ========================================================================

    /// Mint a new token to `to`.
    ///
    /// Token ids are sequential starting at 1. Emits a `Transfer` event from
    /// the zero account.
    ///
    /// # Arguments
    /// * `caller` - Must be the contract owner
    /// * `to` - The account that will own the new token
    ///
    /// # Returns
    /// The token_id of the newly minted token
    ///
    /// # Errors
    /// * `NotInitialized` - If the contract has not been initialized
    /// * `NotContractOwner` - If the caller is not the contract owner
    pub fn mint(e: Env, caller: Address, to: Address) -> Result<u32, ContractError> {
        caller.require_auth();

        let admin = storage::get_admin(&e).ok_or_else(|| fail(&e, ContractError::NotInitialized))?;
        if caller != admin {
            return Err(fail(&e, ContractError::NotContractOwner));
        }

        let token_id = storage::increment_token_counter(&e);
        storage::set_owner(&e, token_id, &to);
        storage::add_balance(&e, &to, 1);

        e.events().publish(
            (symbol_short!("Transfer"), token_id),
            (zero_address(&e), to),
        );

        Ok(token_id)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Get the owner of a token.
    ///
    /// # Errors
    /// * `TokenNotFound` - If the token was never minted
    pub fn owner_of(e: Env, token_id: u32) -> Result<Address, ContractError> {
        storage::get_owner(&e, token_id).ok_or_else(|| fail(&e, ContractError::TokenNotFound))
    }

    /// Get the number of tokens held by an account.
    pub fn balance_of(e: Env, owner: Address) -> u32 {
        storage::get_balance(&e, &owner)
    }

    /// Get the approved spender of a token, if any.
    pub fn get_approved(e: Env, token_id: u32) -> Option<Address> {
        storage::get_approved(&e, token_id)
    }

    /// Check whether `operator` may manage all of `owner`'s tokens.
    pub fn is_approved_for_all(e: Env, owner: Address, operator: Address) -> bool {
        storage::is_operator(&e, &owner, &operator)
    }

    /// Get the token collection name.
    pub fn name(e: Env) -> Result<String, ContractError> {
        storage::get_name(&e).ok_or_else(|| fail(&e, ContractError::NotInitialized))
    }

    /// Get the token collection symbol.
    pub fn symbol(e: Env) -> Result<String, ContractError> {
        storage::get_symbol(&e).ok_or_else(|| fail(&e, ContractError::NotInitialized))
    }

    /// Get the base URI prefix.
    pub fn get_base_uri(e: Env) -> Result<String, ContractError> {
        storage::get_base_uri(&e).ok_or_else(|| fail(&e, ContractError::NotInitialized))
    }

    /// Get the id of the most recently minted token (0 if none).
    pub fn get_token_id(e: Env) -> u32 {
        storage::get_token_counter(&e)
    }

    /// Compose the URI of a token: base URI followed by the decimal token id.
    ///
    /// # Errors
    /// * `UriQueryForNonexistentToken` - If the token was never minted
    pub fn token_uri(e: Env, token_id: u32) -> Result<String, ContractError> {
        if storage::get_owner(&e, token_id).is_none() {
            return Err(fail(&e, ContractError::UriQueryForNonexistentToken));
        }
        let base_uri = storage::get_base_uri(&e)
            .ok_or_else(|| fail(&e, ContractError::NotInitialized))?;
        Ok(compose_uri(&e, &base_uri, token_id))
    }

    /// Capability introspection: true exactly for the introspection,
    /// ownership-transfer and metadata interface identifiers.
    pub fn supports_interface(_e: Env, interface_id: u32) -> bool {
        REQUIRED_TOKEN_INTERFACES.contains(&interface_id)
    }

    // ========================================================================
    // Approvals
    // ========================================================================

    /// Set the approved spender of a token.
    ///
    /// # Arguments
    /// * `caller` - Must be the token owner or an operator of the owner
    /// * `spender` - The account granted transfer rights over this token
    /// * `token_id` - The token to approve
    ///
    /// # Errors
    /// * `TokenNotFound` - If the token was never minted
    /// * `ApproveCallerNotAuthorized` - If the caller may not approve
    pub fn approve(
        e: Env,
        caller: Address,
        spender: Address,
        token_id: u32,
    ) -> Result<(), ContractError> {
        caller.require_auth();

        let owner =
            storage::get_owner(&e, token_id).ok_or_else(|| fail(&e, ContractError::TokenNotFound))?;
        if caller != owner && !storage::is_operator(&e, &owner, &caller) {
            return Err(fail(&e, ContractError::ApproveCallerNotAuthorized));
        }

        storage::set_approved(&e, token_id, &spender);

        e.events()
            .publish((symbol_short!("Approval"), token_id), (owner, spender));

        Ok(())
    }

    /// Grant or revoke `operator` the right to manage all of the caller's
    /// tokens. The relation persists across transfers.
    pub fn set_approval_for_all(
        e: Env,
        caller: Address,
        operator: Address,
        approved: bool,
    ) -> Result<(), ContractError> {
        caller.require_auth();

        storage::set_operator(&e, &caller, &operator, approved);

        e.events().publish(
            (Symbol::new(&e, "ApprovalForAll"),),
            (caller, operator, approved),
        );

        Ok(())
    }

    // ========================================================================
    // Transfers
    // ========================================================================

    /// Transfer a token from `from` to `to`.
    ///
    /// # Arguments
    /// * `spender` - The account performing the transfer; must be the token
    ///   owner, its approved spender, or an operator of the owner
    /// * `from` - Must be the current owner of the token
    /// * `to` - The new owner; must not be the zero account
    /// * `token_id` - The token to transfer
    ///
    /// # Errors
    /// * `TokenNotFound` - If the token was never minted
    /// * `TransferFromIncorrectOwner` - If `from` does not own the token
    /// * `TransferToZeroAddress` - If `to` is the zero account
    /// * `TransferCallerNotAuthorized` - If the spender may not transfer
    pub fn transfer_from(
        e: Env,
        spender: Address,
        from: Address,
        to: Address,
        token_id: u32,
    ) -> Result<(), ContractError> {
        spender.require_auth();
        Self::do_transfer(&e, &spender, &from, &to, token_id)
    }

    /// Transfer a token, requiring contract recipients to acknowledge
    /// receipt through the `on_erc721_received` hook.
    ///
    /// The ledger mutation is committed before the receiver callback runs;
    /// a missing or incorrect acknowledgment aborts the whole operation.
    ///
    /// # Errors
    /// Same as `transfer_from`, plus:
    /// * `NonReceiverImplementer` - If a contract recipient does not
    ///   acknowledge the transfer
    pub fn safe_transfer_from(
        e: Env,
        spender: Address,
        from: Address,
        to: Address,
        token_id: u32,
    ) -> Result<(), ContractError> {
        spender.require_auth();
        Self::do_transfer(&e, &spender, &from, &to, token_id)?;
        Self::check_receiver(&e, &spender, &from, &to, token_id, Bytes::new(&e))
    }

    /// Like `safe_transfer_from`, passing `data` through to the receiver
    /// hook unaltered.
    pub fn safe_transfer_from_with_data(
        e: Env,
        spender: Address,
        from: Address,
        to: Address,
        token_id: u32,
        data: Bytes,
    ) -> Result<(), ContractError> {
        spender.require_auth();
        Self::do_transfer(&e, &spender, &from, &to, token_id)?;
        Self::check_receiver(&e, &spender, &from, &to, token_id, data)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Check transfer preconditions, reassign ownership, clear the per-token
    /// approval and emit the `Transfer` event.
    fn do_transfer(
        e: &Env,
        spender: &Address,
        from: &Address,
        to: &Address,
        token_id: u32,
    ) -> Result<(), ContractError> {
        let owner =
            storage::get_owner(e, token_id).ok_or_else(|| fail(e, ContractError::TokenNotFound))?;
        if *from != owner {
            return Err(fail(e, ContractError::TransferFromIncorrectOwner));
        }
        if is_zero_address(e, to) {
            return Err(fail(e, ContractError::TransferToZeroAddress));
        }

        let approved = storage::get_approved(e, token_id);
        if *spender != owner
            && approved.as_ref() != Some(spender)
            && !storage::is_operator(e, &owner, spender)
        {
            return Err(fail(e, ContractError::TransferCallerNotAuthorized));
        }

        storage::set_owner(e, token_id, to);
        storage::clear_approved(e, token_id);
        storage::sub_balance(e, from, 1);
        storage::add_balance(e, to, 1);

        e.events().publish(
            (symbol_short!("Transfer"), token_id),
            (from.clone(), to.clone()),
        );

        Ok(())
    }

    /// Require a contract recipient to acknowledge the transfer. Account
    /// recipients receive without a callback.
    fn check_receiver(
        e: &Env,
        operator: &Address,
        from: &Address,
        to: &Address,
        token_id: u32,
        data: Bytes,
    ) -> Result<(), ContractError> {
        if !is_contract(e, to) {
            return Ok(());
        }

        let client = Erc721ReceiverClient::new(e, to);
        let acknowledged = matches!(
            client.try_on_erc721_received(operator, from, &token_id, &data),
            Ok(Ok(magic)) if magic == ERC721_RECEIVED_MAGIC
        );
        if !acknowledged {
            return Err(fail(e, ContractError::NonReceiverImplementer));
        }

        Ok(())
    }
}

/// Append the decimal rendering of `token_id` to `base_uri`.
fn compose_uri(e: &Env, base_uri: &String, token_id: u32) -> String {
    let base_len = base_uri.len() as usize;
    let mut buf = [0u8; MAX_URI_LEN];
    base_uri.copy_into_slice(&mut buf[..base_len]);

    let mut digits = [0u8; MAX_ID_DIGITS];
    let mut n = token_id;
    let mut start = MAX_ID_DIGITS;
    loop {
        start -= 1;
        digits[start] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    let digit_count = MAX_ID_DIGITS - start;
    buf[base_len..base_len + digit_count].copy_from_slice(&digits[start..]);

    String::from_bytes(e, &buf[..base_len + digit_count])
}
