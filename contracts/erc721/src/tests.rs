#![cfg(test)]

extern crate std;

use crate::*;
use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    vec, Address, Bytes, Env, IntoVal, String, Symbol,
};

use mocks::{Erc721ReceiverContract, Erc721ReceiverContractClient, NotErc165Contract, WrongAckReceiverContract};
use shared_utils::address::zero_address;
use shared_utils::interfaces::{
    INTERFACE_ID_ERC165, INTERFACE_ID_ERC721, INTERFACE_ID_ERC721_METADATA,
};

const NAME: &str = "TestToken";
const SYMBOL: &str = "TT";
const BASE_URI: &str = "https://baseUri/";

// ============================================================================
// Test Setup Helpers
// ============================================================================

fn register(e: &Env) -> Erc721ContractClient<'_> {
    let contract_id = e.register_contract(None, Erc721Contract);
    Erc721ContractClient::new(e, &contract_id)
}

fn setup(e: &Env) -> (Address, Erc721ContractClient<'_>) {
    let client = register(e);
    let admin = Address::generate(e);
    client.initialize(
        &admin,
        &String::from_str(e, NAME),
        &String::from_str(e, SYMBOL),
        &String::from_str(e, BASE_URI),
    );
    (admin, client)
}

// ============================================================================
// Initialization Tests
// ============================================================================

#[test]
fn test_initialize_sets_metadata() {
    let e = Env::default();
    let (_admin, client) = setup(&e);

    assert_eq!(client.name(), String::from_str(&e, NAME));
    assert_eq!(client.symbol(), String::from_str(&e, SYMBOL));
    assert_eq!(client.get_base_uri(), String::from_str(&e, BASE_URI));
    assert_eq!(client.get_token_id(), 0);
}

#[test]
#[should_panic(expected = "Error(Contract, #2)")] // AlreadyInitialized
fn test_initialize_twice_fails() {
    let e = Env::default();
    let (admin, client) = setup(&e);

    client.initialize(
        &admin,
        &String::from_str(&e, NAME),
        &String::from_str(&e, SYMBOL),
        &String::from_str(&e, BASE_URI),
    );
}

#[test]
#[should_panic(expected = "Error(Contract, #1)")] // NotInitialized
fn test_queries_before_initialize_fail() {
    let e = Env::default();
    let client = register(&e);

    client.name();
}

// ============================================================================
// Mint Tests
// ============================================================================

#[test]
#[should_panic(expected = "Error(Contract, #4)")] // NotContractOwner
fn test_mint_not_owner_fails() {
    let e = Env::default();
    e.mock_all_auths();

    let (_admin, client) = setup(&e);
    let hacker = Address::generate(&e);

    client.mint(&hacker, &hacker);
}

#[test]
fn test_mint_assigns_sequential_ids() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let account = Address::generate(&e);

    assert_eq!(client.mint(&admin, &account), 1);
    assert_eq!(client.get_token_id(), 1);
    assert_eq!(client.mint(&admin, &account), 2);
    assert_eq!(client.get_token_id(), 2);
}

#[test]
fn test_mint_sets_owner_and_balance() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let account = Address::generate(&e);

    let token_id = client.mint(&admin, &account);

    assert_eq!(client.owner_of(&token_id), account);
    assert_eq!(client.balance_of(&account), 1);
    assert_eq!(client.get_approved(&token_id), None);
}

#[test]
fn test_mint_emits_transfer_from_zero_account() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let account = Address::generate(&e);

    let token_id = client.mint(&admin, &account);

    let events = e.events().all();
    let last_event = events.last().unwrap();
    assert_eq!(last_event.0, client.address);
    assert_eq!(
        last_event.1,
        vec![
            &e,
            symbol_short!("Transfer").into_val(&e),
            token_id.into_val(&e)
        ]
    );
    let data: (Address, Address) = last_event.2.into_val(&e);
    assert_eq!(data, (zero_address(&e), account));
}

// ============================================================================
// setApprovalForAll Tests
// ============================================================================

#[test]
fn test_set_approval_for_all() {
    let e = Env::default();
    e.mock_all_auths();

    let (_admin, client) = setup(&e);
    let owner = Address::generate(&e);
    let operator = Address::generate(&e);

    assert!(!client.is_approved_for_all(&owner, &operator));

    client.set_approval_for_all(&owner, &operator, &true);
    assert!(client.is_approved_for_all(&owner, &operator));

    client.set_approval_for_all(&owner, &operator, &false);
    assert!(!client.is_approved_for_all(&owner, &operator));
}

#[test]
fn test_set_approval_for_all_emits_event() {
    let e = Env::default();
    e.mock_all_auths();

    let (_admin, client) = setup(&e);
    let owner = Address::generate(&e);
    let operator = Address::generate(&e);

    client.set_approval_for_all(&owner, &operator, &true);

    let events = e.events().all();
    let last_event = events.last().unwrap();
    assert_eq!(last_event.0, client.address);
    assert_eq!(
        last_event.1,
        vec![&e, Symbol::new(&e, "ApprovalForAll").into_val(&e)]
    );
    let data: (Address, Address, bool) = last_event.2.into_val(&e);
    assert_eq!(data, (owner, operator, true));
}

// ============================================================================
// Approve Tests
// ============================================================================

#[test]
#[should_panic(expected = "Error(Contract, #5)")] // ApproveCallerNotAuthorized
fn test_approve_not_owner_fails() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let account = Address::generate(&e);
    let hacker = Address::generate(&e);

    let token_id = client.mint(&admin, &account);

    client.approve(&hacker, &hacker, &token_id);
}

#[test]
#[should_panic(expected = "Error(Contract, #3)")] // TokenNotFound
fn test_approve_nonexistent_token_fails() {
    let e = Env::default();
    e.mock_all_auths();

    let (_admin, client) = setup(&e);
    let spender = Address::generate(&e);

    client.approve(&spender, &spender, &1);
}

#[test]
fn test_approve_by_owner() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let account = Address::generate(&e);
    let operator = Address::generate(&e);

    let token_id = client.mint(&admin, &account);
    client.approve(&account, &operator, &token_id);

    assert_eq!(client.get_approved(&token_id), Some(operator));
}

#[test]
fn test_approve_by_operator_for_all() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let account = Address::generate(&e);
    let operator = Address::generate(&e);
    let spender = Address::generate(&e);

    let token_id = client.mint(&admin, &account);
    client.set_approval_for_all(&account, &operator, &true);
    client.approve(&operator, &spender, &token_id);

    assert_eq!(client.get_approved(&token_id), Some(spender));
}

#[test]
fn test_approve_emits_event() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let account = Address::generate(&e);
    let operator = Address::generate(&e);

    let token_id = client.mint(&admin, &account);
    client.approve(&account, &operator, &token_id);

    let events = e.events().all();
    let last_event = events.last().unwrap();
    assert_eq!(last_event.0, client.address);
    assert_eq!(
        last_event.1,
        vec![
            &e,
            symbol_short!("Approval").into_val(&e),
            token_id.into_val(&e)
        ]
    );
    let data: (Address, Address) = last_event.2.into_val(&e);
    assert_eq!(data, (account, operator));
}

// ============================================================================
// TransferFrom Tests
// ============================================================================

#[test]
#[should_panic(expected = "Error(Contract, #3)")] // TokenNotFound
fn test_transfer_nonexistent_id_fails() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let account = Address::generate(&e);
    let hacker = Address::generate(&e);

    let token_id = client.mint(&admin, &account);

    client.transfer_from(&hacker, &account, &hacker, &(token_id + 1));
}

#[test]
#[should_panic(expected = "Error(Contract, #3)")] // TokenNotFound
fn test_transfer_id_zero_fails() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let account = Address::generate(&e);
    let hacker = Address::generate(&e);

    client.mint(&admin, &account);

    client.transfer_from(&hacker, &account, &hacker, &0);
}

#[test]
#[should_panic(expected = "Error(Contract, #7)")] // TransferFromIncorrectOwner
fn test_transfer_from_incorrect_owner_fails() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let account = Address::generate(&e);
    let hacker = Address::generate(&e);

    let token_id = client.mint(&admin, &admin);

    client.transfer_from(&admin, &hacker, &account, &token_id);
}

#[test]
#[should_panic(expected = "Error(Contract, #8)")] // TransferToZeroAddress
fn test_transfer_to_zero_address_fails() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let account = Address::generate(&e);

    let token_id = client.mint(&admin, &account);

    client.transfer_from(&account, &account, &zero_address(&e), &token_id);
}

#[test]
#[should_panic(expected = "Error(Contract, #6)")] // TransferCallerNotAuthorized
fn test_transfer_unauthorized_caller_fails() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let account = Address::generate(&e);
    let hacker = Address::generate(&e);

    let token_id = client.mint(&admin, &account);

    client.transfer_from(&hacker, &account, &hacker, &token_id);
}

#[test]
fn test_transfer_by_owner() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let owner = Address::generate(&e);
    let account = Address::generate(&e);

    let token_id = client.mint(&admin, &owner);
    client.transfer_from(&owner, &owner, &account, &token_id);

    assert_eq!(client.owner_of(&token_id), account);
    assert_eq!(client.balance_of(&owner), 0);
    assert_eq!(client.balance_of(&account), 1);
}

#[test]
fn test_transfer_by_approved_spender() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let owner = Address::generate(&e);
    let operator = Address::generate(&e);
    let account = Address::generate(&e);

    let token_id = client.mint(&admin, &owner);
    client.approve(&owner, &operator, &token_id);
    client.transfer_from(&operator, &owner, &account, &token_id);

    assert_eq!(client.owner_of(&token_id), account);
}

#[test]
fn test_transfer_by_operator_for_all() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let owner = Address::generate(&e);
    let operator = Address::generate(&e);
    let account = Address::generate(&e);

    let token_id = client.mint(&admin, &owner);
    client.set_approval_for_all(&owner, &operator, &true);
    client.transfer_from(&operator, &owner, &account, &token_id);

    assert_eq!(client.owner_of(&token_id), account);
}

#[test]
fn test_transfer_clears_approval() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let owner = Address::generate(&e);
    let operator = Address::generate(&e);
    let account = Address::generate(&e);

    let token_id = client.mint(&admin, &owner);
    client.approve(&owner, &operator, &token_id);
    assert_eq!(client.get_approved(&token_id), Some(operator));

    client.transfer_from(&owner, &owner, &account, &token_id);

    assert_eq!(client.get_approved(&token_id), None);
}

#[test]
fn test_transfer_emits_event() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let owner = Address::generate(&e);
    let account = Address::generate(&e);

    let token_id = client.mint(&admin, &owner);
    client.transfer_from(&owner, &owner, &account, &token_id);

    let events = e.events().all();
    let last_event = events.last().unwrap();
    assert_eq!(last_event.0, client.address);
    assert_eq!(
        last_event.1,
        vec![
            &e,
            symbol_short!("Transfer").into_val(&e),
            token_id.into_val(&e)
        ]
    );
    let data: (Address, Address) = last_event.2.into_val(&e);
    assert_eq!(data, (owner, account));
}

// ============================================================================
// SafeTransferFrom Tests
// ============================================================================

#[test]
fn test_safe_transfer_to_receiver_contract() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let owner = Address::generate(&e);

    let receiver_id = e.register_contract(None, Erc721ReceiverContract);
    let receiver = Erc721ReceiverContractClient::new(&e, &receiver_id);

    let token_id = client.mint(&admin, &owner);
    client.safe_transfer_from(&owner, &owner, &receiver_id, &token_id);

    assert_eq!(client.owner_of(&token_id), receiver_id);
    assert_eq!(client.balance_of(&receiver_id), 1);
    assert_eq!(receiver.last_received(), Some(token_id));
}

#[test]
#[should_panic(expected = "Error(Contract, #9)")] // NonReceiverImplementer
fn test_safe_transfer_to_non_receiver_contract_fails() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let owner = Address::generate(&e);

    let non_receiver = e.register_contract(None, NotErc165Contract);

    let token_id = client.mint(&admin, &owner);
    client.safe_transfer_from(&owner, &owner, &non_receiver, &token_id);
}

#[test]
#[should_panic(expected = "Error(Contract, #9)")] // NonReceiverImplementer
fn test_safe_transfer_wrong_acknowledgment_fails() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let owner = Address::generate(&e);

    let wrong_ack = e.register_contract(None, WrongAckReceiverContract);

    let token_id = client.mint(&admin, &owner);
    client.safe_transfer_from(&owner, &owner, &wrong_ack, &token_id);
}

#[test]
#[should_panic(expected = "Error(Contract, #3)")] // TokenNotFound
fn test_safe_transfer_nonexistent_id_fails() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let account = Address::generate(&e);
    let hacker = Address::generate(&e);

    let token_id = client.mint(&admin, &account);

    client.safe_transfer_from(&hacker, &account, &hacker, &(token_id + 1));
}

#[test]
#[should_panic(expected = "Error(Contract, #6)")] // TransferCallerNotAuthorized
fn test_safe_transfer_unauthorized_caller_fails() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let account = Address::generate(&e);
    let hacker = Address::generate(&e);

    let token_id = client.mint(&admin, &account);

    client.safe_transfer_from(&hacker, &account, &hacker, &token_id);
}

#[test]
fn test_safe_transfer_with_data() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let owner = Address::generate(&e);

    let receiver_id = e.register_contract(None, Erc721ReceiverContract);
    let receiver = Erc721ReceiverContractClient::new(&e, &receiver_id);

    let token_id = client.mint(&admin, &owner);
    let data = Bytes::from_array(&e, &[0x42]);
    client.safe_transfer_from_with_data(&owner, &owner, &receiver_id, &token_id, &data);

    assert_eq!(client.owner_of(&token_id), receiver_id);
    assert_eq!(receiver.last_received(), Some(token_id));
}

#[test]
#[should_panic(expected = "Error(Contract, #9)")] // NonReceiverImplementer
fn test_safe_transfer_with_data_wrong_acknowledgment_fails() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let owner = Address::generate(&e);

    let wrong_ack = e.register_contract(None, WrongAckReceiverContract);

    let token_id = client.mint(&admin, &owner);
    let data = Bytes::from_array(&e, &[0x42]);
    client.safe_transfer_from_with_data(&owner, &owner, &wrong_ack, &token_id, &data);
}

#[test]
fn test_safe_transfer_by_operator() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let owner = Address::generate(&e);
    let operator = Address::generate(&e);

    let receiver_id = e.register_contract(None, Erc721ReceiverContract);

    let token_id = client.mint(&admin, &owner);
    client.set_approval_for_all(&owner, &operator, &true);
    client.safe_transfer_from(&operator, &owner, &receiver_id, &token_id);

    assert_eq!(client.owner_of(&token_id), receiver_id);
}

// ============================================================================
// SupportsInterface Tests
// ============================================================================

#[test]
fn test_supports_required_interfaces() {
    let e = Env::default();
    let (_admin, client) = setup(&e);

    assert!(client.supports_interface(&INTERFACE_ID_ERC165));
    assert!(client.supports_interface(&INTERFACE_ID_ERC721));
    assert!(client.supports_interface(&INTERFACE_ID_ERC721_METADATA));
}

#[test]
fn test_rejects_unknown_interface() {
    let e = Env::default();
    let (_admin, client) = setup(&e);

    assert!(!client.supports_interface(&0xdeadbeef));
    assert!(!client.supports_interface(&0));
}

// ============================================================================
// tokenURI Tests
// ============================================================================

#[test]
#[should_panic(expected = "Error(Contract, #10)")] // UriQueryForNonexistentToken
fn test_token_uri_nonexistent_fails() {
    let e = Env::default();
    let (_admin, client) = setup(&e);

    client.token_uri(&1);
}

#[test]
fn test_token_uri_composition() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let account = Address::generate(&e);

    let token_id = client.mint(&admin, &account);
    assert_eq!(token_id, 1);
    assert_eq!(
        client.token_uri(&token_id),
        String::from_str(&e, "https://baseUri/1")
    );
}

#[test]
fn test_token_uri_multi_digit_id() {
    let e = Env::default();
    e.mock_all_auths();

    let (admin, client) = setup(&e);
    let account = Address::generate(&e);

    let mut token_id = 0;
    for _ in 0..12 {
        token_id = client.mint(&admin, &account);
    }

    assert_eq!(token_id, 12);
    assert_eq!(
        client.token_uri(&token_id),
        String::from_str(&e, "https://baseUri/12")
    );
}
