//! ERC165-style interface identifiers shared by the token and marketplace
//! contracts.
//!
//! The marketplace refuses to list tokens from a contract unless it answers
//! `supports_interface` affirmatively for all three identifiers below. The
//! identifiers are the canonical 4-byte ERC165 values carried as `u32`.

/// Interface identifier for the introspection interface itself (ERC165).
pub const INTERFACE_ID_ERC165: u32 = 0x01ffc9a7;

/// Interface identifier for the ownership-transfer interface (ERC721).
pub const INTERFACE_ID_ERC721: u32 = 0x80ac58cd;

/// Interface identifier for the token metadata interface (ERC721Metadata).
pub const INTERFACE_ID_ERC721_METADATA: u32 = 0x5b5e139f;

/// Acknowledgment value a receiver contract must return from
/// `on_erc721_received` to accept a safe transfer.
pub const ERC721_RECEIVED_MAGIC: u32 = 0x150b7a02;

/// The full capability set a token contract must present before the
/// marketplace accepts a listing.
pub const REQUIRED_TOKEN_INTERFACES: [u32; 3] = [
    INTERFACE_ID_ERC165,
    INTERFACE_ID_ERC721,
    INTERFACE_ID_ERC721_METADATA,
];
