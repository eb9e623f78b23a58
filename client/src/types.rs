//! Domain types shared by the cart, session, wishlist and checkout slices.
//!
//! Everything here mirrors the JSON the marketplace backend speaks, so the
//! types derive `Serialize`/`Deserialize` with camelCase field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an event
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates an `EventId` from its backend representation
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a ticket type within an event
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketTypeId(String);

impl TicketTypeId {
    /// Creates a `TicketTypeId` from its backend representation
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a user
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a `UserId` from its backend representation
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for an order
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Creates an `OrderId` from its backend representation
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Money
// ============================================================================

/// A monetary amount in minor units (cents)
///
/// Arithmetic saturates instead of overflowing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero, the price of a free ticket
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from minor units
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from whole currency units
    #[must_use]
    pub const fn from_major(units: u64) -> Self {
        Self(units.saturating_mul(100))
    }

    /// Returns the amount in minor units
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Multiplies a unit price by a quantity
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as u64))
    }

    /// Returns `true` for a zero amount
    #[must_use]
    pub const fn is_free(self) -> bool {
        self.0 == 0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Events and ticket types
// ============================================================================

/// A kind of ticket sold for an event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketType {
    /// Unique identifier
    pub id: TicketTypeId,
    /// Display name ("General", "VIP", ...)
    pub name: String,
    /// Unit price; zero means free
    pub price: Money,
    /// Total quantity issued
    pub quantity: u32,
    /// Remaining available count (informational; the cart never decrements it)
    pub available: u32,
}

impl TicketType {
    /// Creates a ticket type with everything still available
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money, quantity: u32) -> Self {
        Self {
            id: TicketTypeId::new(id),
            name: name.into(),
            price,
            quantity,
            available: quantity,
        }
    }

    /// Clamps a requested quantity the way the ticket selector does before
    /// writing it into the cart: floor of zero, ceiling of `available`.
    ///
    /// ```
    /// use marquee_client::{Money, TicketType};
    ///
    /// let vip = TicketType::new("vip", "VIP", Money::from_major(350), 4);
    /// assert_eq!(vip.clamp_quantity(-3), 0);
    /// assert_eq!(vip.clamp_quantity(2), 2);
    /// assert_eq!(vip.clamp_quantity(10), 4);
    /// ```
    #[must_use]
    pub fn clamp_quantity(&self, requested: i64) -> u32 {
        let clamped = requested.clamp(0, i64::from(self.available));
        u32::try_from(clamped).unwrap_or(self.available)
    }

    /// Returns `true` when no tickets remain
    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        self.available == 0
    }
}

/// A sellable occasion as the marketplace presents it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique identifier
    pub id: EventId,
    /// URL slug
    pub slug: String,
    /// Display title
    pub title: String,
    /// Long description
    #[serde(default)]
    pub description: String,
    /// Venue name
    #[serde(default)]
    pub venue: String,
    /// When the event starts
    pub starts_at: DateTime<Utc>,
    /// Cover image
    #[serde(default)]
    pub image_url: Option<String>,
    /// Ticket types in display order
    #[serde(default)]
    pub ticket_types: Vec<TicketType>,
}

impl Event {
    /// Looks up one of this event's ticket types
    #[must_use]
    pub fn ticket_type(&self, id: &TicketTypeId) -> Option<&TicketType> {
        self.ticket_types.iter().find(|t| &t.id == id)
    }
}

// ============================================================================
// Users
// ============================================================================

/// Marketplace role
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Buys tickets
    Buyer,
    /// Publishes events
    Organizer,
    /// Operates the marketplace
    Admin,
    /// Promotes events for commission
    Affiliate,
}

/// State of an organizer's payout account
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StripeAccountStatus {
    /// Onboarding not finished
    Pending,
    /// Payouts enabled
    Active,
    /// More information required
    Restricted,
    /// Payouts disabled
    Disabled,
}

/// Outcome of identity verification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// Submitted, awaiting review
    Pending,
    /// Verified
    Approved,
    /// Refused
    Rejected,
}

/// An authenticated marketplace user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Marketplace role
    pub role: UserRole,
    /// Avatar URL
    #[serde(default)]
    pub avatar: Option<String>,
    /// Contact phone
    #[serde(default)]
    pub phone: Option<String>,
    /// Payout account state (organizers)
    #[serde(default)]
    pub stripe_account_status: Option<StripeAccountStatus>,
    /// Whether identity verification passed
    #[serde(default)]
    pub is_verified: bool,
    /// Identity verification state
    #[serde(default)]
    pub verification_status: Option<VerificationStatus>,
}

impl User {
    /// Creates an unverified user
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            id: UserId::new(id),
            name: name.into(),
            email: email.into(),
            role,
            avatar: None,
            phone: None,
            stripe_account_status: None,
            is_verified: false,
            verification_status: None,
        }
    }
}

/// Partial profile update; `None` fields are left untouched
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    /// New display name
    pub name: Option<String>,
    /// New email
    pub email: Option<String>,
    /// New avatar URL
    pub avatar: Option<String>,
    /// New phone
    pub phone: Option<String>,
}

impl UserPatch {
    /// Merges the present fields into `user`
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if self.avatar.is_some() {
            user.avatar = self.avatar;
        }
        if self.phone.is_some() {
            user.phone = self.phone;
        }
    }
}

// ============================================================================
// Auth payloads
// ============================================================================

/// Login form input
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login email
    pub email: String,
    /// Plain-text password, only ever sent to the auth collaborator
    pub password: String,
    /// Role the user is logging in as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

impl Credentials {
    /// Creates credentials without a role hint
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            role: None,
        }
    }

    /// Adds a role hint
    #[must_use]
    pub const fn with_role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Sign-up form input
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
    /// Requested role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Successful login or registration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The authenticated user
    pub user: User,
    /// Bearer token for later requests
    pub token: String,
}
