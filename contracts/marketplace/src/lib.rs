#![no_std]

use soroban_sdk::{
    contract, contractclient, contracterror, contractimpl, contracttype, symbol_short, token,
    Address, Env, Symbol,
};

use shared_utils::{
    errors::emit_error_event, interfaces::REQUIRED_TOKEN_INTERFACES, time::TimeUtils,
};


/// Fixed auction duration. Every auction runs this long from its start time.
pub const AUCTION_DURATION_DAYS: u32 = 3;

// ============================================================================
// Error Types
// ============================================================================

/// Marketplace errors
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum MarketplaceError {
    /// Marketplace not initialized
    NotInitialized = 1,
    /// Already initialized
    AlreadyInitialized = 2,
    /// Token contract does not present the required capability set
    UnsupportedToken = 3,
    /// Caller is neither owner nor operator of the token
    NotOwnerOrOperator = 4,
    /// Marketplace holds no allowance to transfer the token
    NoAllowance = 5,
    /// No listing at this id
    ListingNotFound = 6,
    /// Attached value below the listing price
    InsufficientValue = 7,
    /// No auction at this id
    AuctionNotFound = 8,
    /// Auction deadline has passed
    AuctionOver = 9,
    /// Auction deadline has not passed yet
    AuctionNotOver = 10,
    /// Bid does not exceed the current price
    BidTooLow = 11,
    /// Reentrancy detected
    ReentrancyDetected = 12,
}

impl MarketplaceError {
    /// The original human-readable reason string for this failure.
    ///
    /// External tooling matches on the exact wording, so these strings are
    /// stable.
    pub fn reason(&self) -> &'static str {
        match self {
            MarketplaceError::NotInitialized => "Marketplace: not initialized",
            MarketplaceError::AlreadyInitialized => "Marketplace: already initialized",
            MarketplaceError::UnsupportedToken => {
                "Marketplace: tokenAddress does not support the ERC721 interfaces"
            }
            MarketplaceError::NotOwnerOrOperator => {
                "Marketplace: caller is not are owner or operator of token"
            }
            MarketplaceError::NoAllowance => "Marketplace: no allowance to transfer a token",
            MarketplaceError::ListingNotFound => "Marketplace: no such token for sale",
            MarketplaceError::InsufficientValue => "Marketplace: not enough ETH",
            MarketplaceError::AuctionNotFound => "Marketplace: no such token for auction",
            MarketplaceError::AuctionOver => "Marketplace: auction is over",
            MarketplaceError::AuctionNotOver => "Marketplace: auction is not yet over",
            MarketplaceError::BidTooLow => {
                "Marketplace: the current price is higher than the bid"
            }
            MarketplaceError::ReentrancyDetected => "Marketplace: reentrant call",
        }
    }
}

/// Emit the diagnostic error event and hand the error back for returning.
fn fail(e: &Env, err: MarketplaceError) -> MarketplaceError {
    emit_error_event(e, err as u32, err.reason());
    err
}

// ============================================================================
// External Interfaces
// ============================================================================

/// The token-contract surface the marketplace depends on.
///
/// Any contract presenting the required capability set and exporting these
/// functions is listable; the marketplace knows nothing about the token
/// contract's internals.
#[contractclient(name = "Erc721Client")]
pub trait Erc721Interface {
    fn supports_interface(env: Env, interface_id: u32) -> bool;
    fn owner_of(env: Env, token_id: u32) -> Address;
    fn get_approved(env: Env, token_id: u32) -> Option<Address>;
    fn is_approved_for_all(env: Env, owner: Address, operator: Address) -> bool;
    fn transfer_from(env: Env, spender: Address, from: Address, to: Address, token_id: u32);
}

// ============================================================================
// Data Types
// ============================================================================

/// Fixed-price listing record
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Listing {
    pub token_id: u32,
    pub price: i128,
    pub token_contract: Address,
    pub seller: Address,
}

/// Timed-auction record
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Auction {
    pub token_id: u32,
    pub min_price: i128,
    pub start_time: u64,
    pub current_price: i128,
    pub bid_count: u32,
    pub token_contract: Address,
    pub token_owner: Address,
    pub last_customer: Option<Address>,
}

/// Storage keys
#[contracttype]
pub enum DataKey {
    /// Payment token used for all value transfers
    NativeToken,
    /// Id of the most recently created listing (0 = none yet)
    ListCounter,
    /// Id of the most recently created auction (0 = none yet)
    AuctionCounter,
    /// Listing data (list_id -> Listing)
    Listing(u32),
    /// Auction data (auction_id -> Auction)
    Auction(u32),
    /// Reentrancy guard
    ReentrancyGuard,
}

// ============================================================================
// Storage
// ============================================================================

mod storage {
    use super::*;

    pub fn set_native_token(e: &Env, token: &Address) {
        e.storage().instance().set(&DataKey::NativeToken, token);
    }

    pub fn get_native_token(e: &Env) -> Option<Address> {
        e.storage().instance().get(&DataKey::NativeToken)
    }

    pub fn has_native_token(e: &Env) -> bool {
        e.storage().instance().has(&DataKey::NativeToken)
    }

    // --- Counters ---

    pub fn increment_list_counter(e: &Env) -> u32 {
        let count: u32 = e
            .storage()
            .instance()
            .get(&DataKey::ListCounter)
            .unwrap_or(0);
        let new_count = count + 1;
        e.storage().instance().set(&DataKey::ListCounter, &new_count);
        new_count
    }

    pub fn get_list_counter(e: &Env) -> u32 {
        e.storage()
            .instance()
            .get(&DataKey::ListCounter)
            .unwrap_or(0)
    }

    pub fn increment_auction_counter(e: &Env) -> u32 {
        let count: u32 = e
            .storage()
            .instance()
            .get(&DataKey::AuctionCounter)
            .unwrap_or(0);
        let new_count = count + 1;
        e.storage()
            .instance()
            .set(&DataKey::AuctionCounter, &new_count);
        new_count
    }

    pub fn get_auction_counter(e: &Env) -> u32 {
        e.storage()
            .instance()
            .get(&DataKey::AuctionCounter)
            .unwrap_or(0)
    }

    // --- Listings ---

    pub fn set_listing(e: &Env, list_id: u32, listing: &Listing) {
        e.storage()
            .persistent()
            .set(&DataKey::Listing(list_id), listing);
    }

    pub fn get_listing(e: &Env, list_id: u32) -> Option<Listing> {
        e.storage().persistent().get(&DataKey::Listing(list_id))
    }

    pub fn remove_listing(e: &Env, list_id: u32) {
        e.storage().persistent().remove(&DataKey::Listing(list_id));
    }

    // --- Auctions ---

    pub fn set_auction(e: &Env, auction_id: u32, auction: &Auction) {
        e.storage()
            .persistent()
            .set(&DataKey::Auction(auction_id), auction);
    }

    pub fn get_auction(e: &Env, auction_id: u32) -> Option<Auction> {
        e.storage().persistent().get(&DataKey::Auction(auction_id))
    }

    pub fn remove_auction(e: &Env, auction_id: u32) {
        e.storage().persistent().remove(&DataKey::Auction(auction_id));
    }
}

// ============================================================================
// Reentrancy Guard
// ============================================================================

/// Run `f` under the reentrancy guard.
///
/// Every operation that performs external calls goes through here. The guard
/// is stored state, so a callee reentering the marketplace mid-operation
/// fails with `ReentrancyDetected`; a failed operation rolls the guard back
/// together with everything else.
fn with_guard<T>(
    e: &Env,
    f: impl FnOnce() -> Result<T, MarketplaceError>,
) -> Result<T, MarketplaceError> {
    let guard: bool = e
        .storage()
        .instance()
        .get(&DataKey::ReentrancyGuard)
        .unwrap_or(false);
    if guard {
        return Err(fail(e, MarketplaceError::ReentrancyDetected));
    }
    e.storage().instance().set(&DataKey::ReentrancyGuard, &true);

    let result = f();

    e.storage().instance().set(&DataKey::ReentrancyGuard, &false);
    result
}

// ============================================================================
// Contract Implementation
// ============================================================================

#[contract]
pub struct MarketplaceContract;

#[contractimpl]
impl MarketplaceContract {
    // ========================================================================
    // Initialization
    // ========================================================================

    /// Initialize the marketplace with the payment token used for all value
    /// transfers.
    ///
    /// # Errors
    /// * `AlreadyInitialized` - If the marketplace has already been
    ///   initialized
    pub fn initialize(e: Env, native_token: Address) -> Result<(), MarketplaceError> {
        if storage::has_native_token(&e) {
            return Err(fail(&e, MarketplaceError::AlreadyInitialized));
        }

        storage::set_native_token(&e, &native_token);
        e.storage().instance().set(&DataKey::ListCounter, &0u32);
        e.storage().instance().set(&DataKey::AuctionCounter, &0u32);

        Ok(())
    }

    // ========================================================================
    // Fixed-Price Listings
    // ========================================================================

    /// List a token for sale at a fixed price.
    ///
    /// The token contract must present the full ERC721 capability set, the
    /// seller must be the token's owner, approved spender or operator, and
    /// the marketplace itself must already hold an allowance. The token is
    /// escrowed into marketplace custody for the lifetime of the listing.
    ///
    /// # Arguments
    /// * `seller` - The caller creating the listing
    /// * `token_contract` - The token contract the token lives in
    /// * `token_id` - The token to sell
    /// * `price` - Sale price in the payment token's smallest unit
    ///
    /// # Returns
    /// The id of the new listing (sequential, starting at 1)
    pub fn list_item(
        e: Env,
        seller: Address,
        token_contract: Address,
        token_id: u32,
        price: i128,
    ) -> Result<u32, MarketplaceError> {
        with_guard(&e, || {
            seller.require_auth();
            Self::require_initialized(&e)?;

            let owner = Self::check_listable(&e, &seller, &token_contract, token_id)?;

            // EFFECTS - the record is committed before the escrow transfer
            let list_id = storage::increment_list_counter(&e);
            let listing = Listing {
                token_id,
                price,
                token_contract: token_contract.clone(),
                seller: seller.clone(),
            };
            storage::set_listing(&e, list_id, &listing);

            // INTERACTIONS
            let this = e.current_contract_address();
            Erc721Client::new(&e, &token_contract).transfer_from(&this, &owner, &this, &token_id);

            e.events().publish(
                (symbol_short!("ListItem"), list_id),
                (token_contract, token_id, price),
            );

            Ok(list_id)
        })
    }

    /// Buy a listed token.
    ///
    /// `value` is the attached payment; it must cover the price. The exact
    /// price goes to the seller and any excess is refunded to the buyer.
    ///
    /// # Errors
    /// * `ListingNotFound` - If no listing exists at this id
    /// * `InsufficientValue` - If `value` is below the listing price
    pub fn buy_item(
        e: Env,
        buyer: Address,
        list_id: u32,
        value: i128,
    ) -> Result<(), MarketplaceError> {
        with_guard(&e, || {
            buyer.require_auth();
            let native_token = Self::require_initialized(&e)?;

            let listing = storage::get_listing(&e, list_id)
                .ok_or_else(|| fail(&e, MarketplaceError::ListingNotFound))?;
            if value < listing.price {
                return Err(fail(&e, MarketplaceError::InsufficientValue));
            }

            // EFFECTS
            storage::remove_listing(&e, list_id);

            // INTERACTIONS
            let this = e.current_contract_address();
            let pay = token::Client::new(&e, &native_token);
            pay.transfer(&buyer, &this, &value);
            pay.transfer(&this, &listing.seller, &listing.price);
            if value > listing.price {
                pay.transfer(&this, &buyer, &(value - listing.price));
            }

            Erc721Client::new(&e, &listing.token_contract).transfer_from(
                &this,
                &this,
                &buyer,
                &listing.token_id,
            );

            e.events().publish((symbol_short!("BuyItem"),), list_id);

            Ok(())
        })
    }

    /// Cancel a listing and return the token to the seller.
    ///
    /// # Errors
    /// * `ListingNotFound` - If no listing exists at this id
    /// * `NotOwnerOrOperator` - If the caller is neither the seller nor an
    ///   operator of the seller
    pub fn cancel(e: Env, caller: Address, list_id: u32) -> Result<(), MarketplaceError> {
        with_guard(&e, || {
            caller.require_auth();

            let listing = storage::get_listing(&e, list_id)
                .ok_or_else(|| fail(&e, MarketplaceError::ListingNotFound))?;

            let client = Erc721Client::new(&e, &listing.token_contract);
            if caller != listing.seller && !client.is_approved_for_all(&listing.seller, &caller) {
                return Err(fail(&e, MarketplaceError::NotOwnerOrOperator));
            }

            // EFFECTS
            storage::remove_listing(&e, list_id);

            // INTERACTIONS
            let this = e.current_contract_address();
            client.transfer_from(&this, &this, &listing.seller, &listing.token_id);

            e.events().publish((symbol_short!("Cancel"),), list_id);

            Ok(())
        })
    }

    // ========================================================================
    // Auctions
    // ========================================================================

    /// Put a token up for a timed auction.
    ///
    /// Access rules are the same as `list_item`. The auction runs for
    /// [`AUCTION_DURATION_DAYS`] from its start time; bids open at
    /// `min_price` (exclusive).
    ///
    /// # Returns
    /// The id of the new auction (sequential, starting at 1)
    pub fn list_item_on_auction(
        e: Env,
        seller: Address,
        token_contract: Address,
        token_id: u32,
        min_price: i128,
    ) -> Result<u32, MarketplaceError> {
        with_guard(&e, || {
            seller.require_auth();
            Self::require_initialized(&e)?;

            let owner = Self::check_listable(&e, &seller, &token_contract, token_id)?;

            // EFFECTS
            let auction_id = storage::increment_auction_counter(&e);
            let auction = Auction {
                token_id,
                min_price,
                start_time: TimeUtils::now(&e),
                current_price: 0,
                bid_count: 0,
                token_contract: token_contract.clone(),
                token_owner: owner.clone(),
                last_customer: None,
            };
            storage::set_auction(&e, auction_id, &auction);

            // INTERACTIONS
            let this = e.current_contract_address();
            Erc721Client::new(&e, &token_contract).transfer_from(&this, &owner, &this, &token_id);

            e.events().publish(
                (Symbol::new(&e, "ListItemOnAuction"), auction_id),
                (token_contract, token_id, min_price),
            );

            Ok(auction_id)
        })
    }

    /// Place a bid on a running auction.
    ///
    /// `bid` is the attached payment and must strictly exceed the current
    /// price (and the minimum price while no bid has been placed). The new
    /// bid is escrowed and the previous highest bidder is refunded exactly
    /// their bid.
    ///
    /// # Errors
    /// * `AuctionNotFound` - If no auction exists at this id
    /// * `AuctionOver` - If the auction deadline has passed
    /// * `BidTooLow` - If the bid does not beat the current price
    pub fn make_bid(
        e: Env,
        bidder: Address,
        auction_id: u32,
        bid: i128,
    ) -> Result<(), MarketplaceError> {
        with_guard(&e, || {
            bidder.require_auth();
            let native_token = Self::require_initialized(&e)?;

            let mut auction = storage::get_auction(&e, auction_id)
                .ok_or_else(|| fail(&e, MarketplaceError::AuctionNotFound))?;

            if TimeUtils::is_expired(&e, auction.start_time + Self::auction_duration()) {
                return Err(fail(&e, MarketplaceError::AuctionOver));
            }

            let floor = if auction.bid_count == 0 {
                auction.min_price.max(auction.current_price)
            } else {
                auction.current_price
            };
            if bid <= floor {
                return Err(fail(&e, MarketplaceError::BidTooLow));
            }

            // EFFECTS
            let previous_bidder = auction.last_customer.clone();
            let previous_bid = auction.current_price;
            auction.current_price = bid;
            auction.last_customer = Some(bidder.clone());
            auction.bid_count += 1;
            storage::set_auction(&e, auction_id, &auction);

            // INTERACTIONS - escrow the new bid, then refund the outbid
            let this = e.current_contract_address();
            let pay = token::Client::new(&e, &native_token);
            pay.transfer(&bidder, &this, &bid);
            if let Some(prev_bidder) = previous_bidder {
                pay.transfer(&this, &prev_bidder, &previous_bid);
            }

            e.events()
                .publish((symbol_short!("MakeBid"), auction_id), bid);

            Ok(())
        })
    }

    /// Settle an auction after its deadline. Callable by anyone.
    ///
    /// With no bids the token returns to its original owner and no funds
    /// move; otherwise the token goes to the highest bidder and the escrowed
    /// price to the seller. The record is deleted either way and the id can
    /// never be settled again.
    ///
    /// # Errors
    /// * `AuctionNotFound` - If no auction exists at this id
    /// * `AuctionNotOver` - If the deadline has not passed yet
    pub fn finish_auction(e: Env, auction_id: u32) -> Result<(), MarketplaceError> {
        with_guard(&e, || {
            let native_token = Self::require_initialized(&e)?;

            let auction = storage::get_auction(&e, auction_id)
                .ok_or_else(|| fail(&e, MarketplaceError::AuctionNotFound))?;

            if !TimeUtils::is_expired(&e, auction.start_time + Self::auction_duration()) {
                return Err(fail(&e, MarketplaceError::AuctionNotOver));
            }

            // EFFECTS
            storage::remove_auction(&e, auction_id);

            // INTERACTIONS
            let this = e.current_contract_address();
            let nft = Erc721Client::new(&e, &auction.token_contract);
            match &auction.last_customer {
                None => {
                    nft.transfer_from(&this, &this, &auction.token_owner, &auction.token_id);
                }
                Some(winner) => {
                    nft.transfer_from(&this, &this, winner, &auction.token_id);
                    token::Client::new(&e, &native_token).transfer(
                        &this,
                        &auction.token_owner,
                        &auction.current_price,
                    );
                }
            }

            e.events().publish(
                (Symbol::new(&e, "FinishAuction"), auction_id),
                auction.current_price,
            );

            Ok(())
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Get a listing record.
    pub fn get_listing(e: Env, list_id: u32) -> Result<Listing, MarketplaceError> {
        storage::get_listing(&e, list_id)
            .ok_or_else(|| fail(&e, MarketplaceError::ListingNotFound))
    }

    /// Get an auction record.
    pub fn get_auction(e: Env, auction_id: u32) -> Result<Auction, MarketplaceError> {
        storage::get_auction(&e, auction_id)
            .ok_or_else(|| fail(&e, MarketplaceError::AuctionNotFound))
    }

    /// Id of the most recently created listing (0 if none).
    pub fn list_id(e: Env) -> u32 {
        storage::get_list_counter(&e)
    }

    /// Id of the most recently created auction (0 if none).
    pub fn list_auction_id(e: Env) -> u32 {
        storage::get_auction_counter(&e)
    }

    /// The payment token address.
    pub fn native_token(e: Env) -> Result<Address, MarketplaceError> {
        storage::get_native_token(&e).ok_or_else(|| fail(&e, MarketplaceError::NotInitialized))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn require_initialized(e: &Env) -> Result<Address, MarketplaceError> {
        storage::get_native_token(e).ok_or_else(|| fail(e, MarketplaceError::NotInitialized))
    }

    fn auction_duration() -> u64 {
        TimeUtils::days_to_seconds(AUCTION_DURATION_DAYS)
    }

    /// Common gate for both listing kinds: the token contract must present
    /// the full capability set, the seller must control the token, and the
    /// marketplace must already hold an allowance to pull it.
    ///
    /// Returns the token's current owner.
    fn check_listable(
        e: &Env,
        seller: &Address,
        token_contract: &Address,
        token_id: u32,
    ) -> Result<Address, MarketplaceError> {
        let client = Erc721Client::new(e, token_contract);

        for interface_id in REQUIRED_TOKEN_INTERFACES {
            let supported = matches!(
                client.try_supports_interface(&interface_id),
                Ok(Ok(true))
            );
            if !supported {
                return Err(fail(e, MarketplaceError::UnsupportedToken));
            }
        }

        let owner = client.owner_of(&token_id);
        let approved = client.get_approved(&token_id);

        if *seller != owner
            && approved.as_ref() != Some(seller)
            && !client.is_approved_for_all(&owner, seller)
        {
            return Err(fail(e, MarketplaceError::NotOwnerOrOperator));
        }

        let this = e.current_contract_address();
        if approved != Some(this.clone()) && !client.is_approved_for_all(&owner, &this) {
            return Err(fail(e, MarketplaceError::NoAllowance));
        }

        Ok(owner)
    }
}
