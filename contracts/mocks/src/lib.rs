#![no_std]

//! Mock contracts for testing the token and marketplace contracts.
//!
//! These fixtures deliberately misbehave in specific ways:
//! - [`Erc721ReceiverContract`] acknowledges safe transfers and records the
//!   last token it received
//! - [`WrongAckReceiverContract`] answers the receiver hook with a wrong
//!   acknowledgment value
//! - [`NotErc165Contract`] exports no introspection (and no receiver hook)
//! - [`NotErc721Contract`] lacks the ownership-transfer capability
//! - [`NotErc721MetadataContract`] lacks the metadata capability
//!
//! Each contract lives in its own module because `#[contractimpl]` generates
//! helper modules keyed only on the function name; two contracts exposing the
//! same-named function in one module would otherwise collide. The types are
//! re-exported at the crate root so callers can keep using `mocks::Foo`.

use soroban_sdk::{contract, contractimpl, contracttype, Address, Bytes, Env};

use shared_utils::interfaces::{
    ERC721_RECEIVED_MAGIC, INTERFACE_ID_ERC165, INTERFACE_ID_ERC721, INTERFACE_ID_ERC721_METADATA,
};

/// Storage keys for the receiver mock
#[contracttype]
pub enum ReceiverDataKey {
    /// Last token id received through the hook
    LastReceived,
}

mod receiver {
    use super::*;

    /// A receiver that correctly acknowledges safe transfers.
    #[contract]
    pub struct Erc721ReceiverContract;

    #[contractimpl]
    impl Erc721ReceiverContract {
        pub fn on_erc721_received(
            e: Env,
            _operator: Address,
            _from: Address,
            token_id: u32,
            _data: Bytes,
        ) -> u32 {
            e.storage()
                .instance()
                .set(&ReceiverDataKey::LastReceived, &token_id);
            ERC721_RECEIVED_MAGIC
        }

        /// Last token id received, if any.
        pub fn last_received(e: Env) -> Option<u32> {
            e.storage().instance().get(&ReceiverDataKey::LastReceived)
        }
    }
}

mod wrong_ack_receiver {
    use super::*;

    /// A receiver whose hook answers with a wrong acknowledgment value.
    #[contract]
    pub struct WrongAckReceiverContract;

    #[contractimpl]
    impl WrongAckReceiverContract {
        pub fn on_erc721_received(
            _e: Env,
            _operator: Address,
            _from: Address,
            _token_id: u32,
            _data: Bytes,
        ) -> u32 {
            0
        }
    }
}

mod not_erc165 {
    use super::*;

    /// A contract with no introspection support at all. Also serves as a
    /// contract without a receiver hook for safe-transfer tests.
    #[contract]
    pub struct NotErc165Contract;

    #[contractimpl]
    impl NotErc165Contract {
        pub fn ping(_e: Env) -> u32 {
            1
        }
    }
}

mod not_erc721 {
    use super::*;

    /// Introspection and metadata, but no ownership-transfer capability.
    #[contract]
    pub struct NotErc721Contract;

    #[contractimpl]
    impl NotErc721Contract {
        pub fn supports_interface(_e: Env, interface_id: u32) -> bool {
            interface_id == INTERFACE_ID_ERC165 || interface_id == INTERFACE_ID_ERC721_METADATA
        }
    }
}

mod not_erc721_metadata {
    use super::*;

    /// Introspection and ownership-transfer, but no metadata capability.
    #[contract]
    pub struct NotErc721MetadataContract;

    #[contractimpl]
    impl NotErc721MetadataContract {
        pub fn supports_interface(_e: Env, interface_id: u32) -> bool {
            interface_id == INTERFACE_ID_ERC165 || interface_id == INTERFACE_ID_ERC721
        }
    }
}

pub use not_erc165::NotErc165Contract;
pub use not_erc721::NotErc721Contract;
pub use not_erc721_metadata::NotErc721MetadataContract;
pub use receiver::Erc721ReceiverContract;
pub use wrong_ack_receiver::WrongAckReceiverContract;

// Generated clients, re-exported so tests can build them from the crate root.
pub use not_erc165::NotErc165ContractClient;
pub use not_erc721::NotErc721ContractClient;
pub use not_erc721_metadata::NotErc721MetadataContractClient;
pub use receiver::Erc721ReceiverContractClient;
pub use wrong_ack_receiver::WrongAckReceiverContractClient;
