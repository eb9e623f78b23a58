//! End-to-end behavior of the `Marketplace` facade over mock collaborators.

#![allow(clippy::unwrap_used)] // Test code

use chrono::{TimeZone, Utc};
use marquee_client::mocks::{MockAuthClient, MockEventSource, MockOrderClient};
use marquee_client::{
    AppAction, BuyerInfo, CheckoutError, ClientError, Credentials, Event, EventId, FileStorage,
    KeyValueStore, Marketplace, MemoryStorage, Money, OrderStatus, PaymentMethod, Registration,
    SessionAction, SessionError, SessionStatus, StorageError, StoreError, StripeAccountStatus,
    TicketType, User, UserPatch, UserRole, VerificationStatus,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

type TestMarketplace = Marketplace<MockAuthClient, MockEventSource, MockOrderClient>;

const TOKEN_KEY: &str = "auth_token";

fn ana() -> User {
    User::new("u1", "Ana López", "ana@example.com", UserRole::Organizer)
}

fn ticket_a() -> TicketType {
    TicketType::new("a", "General", Money::from_major(120), 100)
}

fn ticket_b() -> TicketType {
    TicketType::new("b", "VIP", Money::from_major(350), 10)
}

fn event_e() -> Event {
    Event {
        id: EventId::new("evt-e"),
        slug: "event-e".to_string(),
        title: "Event E".to_string(),
        description: String::new(),
        venue: "Teatro Metropólitan".to_string(),
        starts_at: Utc.with_ymd_and_hms(2026, 12, 5, 20, 30, 0).unwrap(),
        image_url: None,
        ticket_types: vec![ticket_a(), ticket_b()],
    }
}

fn buyer() -> BuyerInfo {
    BuyerInfo {
        name: "Ana López".to_string(),
        email: "ana@example.com".to_string(),
        phone: None,
    }
}

struct Harness {
    marketplace: TestMarketplace,
    auth: MockAuthClient,
    orders: MockOrderClient,
    storage: Arc<MemoryStorage>,
}

fn harness_with(auth: MockAuthClient, orders: MockOrderClient, storage: MemoryStorage) -> Harness {
    marquee_testing::init_test_tracing();
    let storage = Arc::new(storage);
    let marketplace = Marketplace::new(
        auth.clone(),
        MockEventSource::new().with_event(event_e()),
        orders.clone(),
        storage.clone(),
    );
    Harness {
        marketplace,
        auth,
        orders,
        storage,
    }
}

fn harness() -> Harness {
    harness_with(
        MockAuthClient::new().with_account(ana(), "secret"),
        MockOrderClient::new(),
        MemoryStorage::new(),
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// Cart
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn cart_total_scenario() {
    let h = harness();
    let m = &h.marketplace;

    let event = m.load_event("event-e").await.unwrap();
    m.set_event(event).await.unwrap();
    m.add_item(ticket_a(), 2).await.unwrap();
    m.add_item(ticket_b(), 1).await.unwrap();
    assert_eq!(m.total().await, Money::from_major(590));

    m.remove_item(ticket_a().id).await.unwrap();
    assert_eq!(m.total().await, Money::from_major(350));

    m.clear_cart().await.unwrap();
    assert_eq!(m.total().await, Money::ZERO);
    assert!(m.cart().await.event.is_none());
}

#[tokio::test]
async fn zero_quantity_items_need_explicit_removal() {
    let h = harness();
    let m = &h.marketplace;

    m.set_event(event_e()).await.unwrap();
    m.add_item(ticket_a(), 0).await.unwrap();
    m.add_item(ticket_a(), 0).await.unwrap();

    let cart = m.cart().await;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 0);

    m.remove_item(ticket_a().id).await.unwrap();
    assert!(m.cart().await.items.is_empty());
}

#[tokio::test]
async fn reselecting_same_event_empties_cart() {
    let h = harness();
    let m = &h.marketplace;

    m.set_event(event_e()).await.unwrap();
    m.add_item(ticket_a(), 3).await.unwrap();
    m.set_event(event_e()).await.unwrap();

    assert!(m.cart().await.items.is_empty());
    assert_eq!(m.total().await, Money::ZERO);
}

#[tokio::test]
async fn unknown_slug_is_reported() {
    let h = harness();
    assert!(h.marketplace.load_event("missing").await.is_err());
}

// ═══════════════════════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn rejected_login_enters_error_state() {
    let h = harness();
    let m = &h.marketplace;

    let result = m
        .login(Credentials::new("ana@example.com", "wrong").with_role(UserRole::Buyer))
        .await;

    assert_eq!(
        result,
        Err(SessionError::Rejected {
            message: "Invalid credentials".to_string(),
            source: ClientError::Rejected {
                message: Some("Invalid credentials".to_string())
            },
        })
    );
    let session = m.session().await;
    assert_eq!(session.status(), SessionStatus::Error);
    assert!(!session.is_authenticated());
    assert_eq!(session.error.as_deref(), Some("Invalid credentials"));
    assert_eq!(h.storage.get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn successful_login_persists_token() {
    let h = harness();
    let m = &h.marketplace;

    let user = m
        .login(Credentials::new("ana@example.com", "secret"))
        .await
        .unwrap();

    assert_eq!(user, ana());
    assert_eq!(m.status().await, SessionStatus::Authenticated);
    assert!(h.storage.get(TOKEN_KEY).unwrap().is_some());
}

#[tokio::test]
async fn login_is_observable_while_in_flight() {
    let h = harness_with(
        MockAuthClient::new()
            .with_account(ana(), "secret")
            .with_latency(Duration::from_millis(100)),
        MockOrderClient::new(),
        MemoryStorage::new(),
    );
    let m = &h.marketplace;

    let (result, during) = tokio::join!(
        m.login(Credentials::new("ana@example.com", "secret")),
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            m.status().await
        }
    );

    assert_eq!(during, SessionStatus::Authenticating);
    assert_eq!(result.unwrap(), ana());
    assert_eq!(m.status().await, SessionStatus::Authenticated);
    assert_eq!(h.auth.login_calls(), 1);
}

#[tokio::test]
async fn register_signs_in_new_user() {
    let h = harness();
    let m = &h.marketplace;

    let user = m
        .register(Registration {
            name: "Luis".to_string(),
            email: "luis@example.com".to_string(),
            password: "pw".to_string(),
            role: Some(UserRole::Affiliate),
        })
        .await
        .unwrap();

    assert_eq!(user.role, UserRole::Affiliate);
    assert_eq!(m.user().await, Some(user));
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let h = harness();

    let result = h
        .marketplace
        .register(Registration {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "pw".to_string(),
            role: None,
        })
        .await;

    assert!(matches!(
        result,
        Err(SessionError::Rejected { ref message, source: ClientError::Rejected { .. } })
            if message == "Email already registered"
    ));
    assert_eq!(h.marketplace.status().await, SessionStatus::Error);
}

#[tokio::test]
async fn logout_survives_remote_failure() {
    let h = harness_with(
        MockAuthClient::new()
            .with_account(ana(), "secret")
            .with_failing_logout(),
        MockOrderClient::new(),
        MemoryStorage::new(),
    );
    let m = &h.marketplace;

    m.login(Credentials::new("ana@example.com", "secret"))
        .await
        .unwrap();
    m.logout().await.unwrap();

    assert_eq!(h.auth.logout_calls(), 1);
    assert!(!m.session().await.is_authenticated());
    assert_eq!(h.storage.get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn check_auth_without_token_stays_anonymous() {
    let h = harness();

    assert_eq!(h.marketplace.check_auth().await.unwrap(), None);
    assert_eq!(h.auth.current_user_calls(), 0);
    assert_eq!(h.marketplace.status().await, SessionStatus::Anonymous);
}

#[tokio::test]
async fn check_auth_restores_session() {
    let h = harness_with(
        MockAuthClient::new().with_session(ana()),
        MockOrderClient::new(),
        MemoryStorage::with_entries([(TOKEN_KEY, "mock-token-u1")]),
    );

    assert_eq!(h.marketplace.check_auth().await.unwrap(), Some(ana()));
    assert_eq!(h.marketplace.status().await, SessionStatus::Authenticated);
}

#[tokio::test]
async fn check_auth_discards_stale_token_without_error() {
    let h = harness_with(
        MockAuthClient::new(),
        MockOrderClient::new(),
        MemoryStorage::with_entries([(TOKEN_KEY, "stale")]),
    );

    assert_eq!(h.marketplace.check_auth().await.unwrap(), None);
    let session = h.marketplace.session().await;
    assert_eq!(session.status(), SessionStatus::Anonymous);
    assert!(session.error.is_none());
    assert_eq!(h.storage.get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn profile_updates_require_a_user() {
    let h = harness();
    let m = &h.marketplace;

    assert_eq!(
        m.update_stripe_status(StripeAccountStatus::Active)
            .await
            .unwrap(),
        None
    );

    m.login(Credentials::new("ana@example.com", "secret"))
        .await
        .unwrap();

    let updated = m
        .update_user(UserPatch {
            avatar: Some("https://cdn.marquee.test/ana.png".to_string()),
            ..UserPatch::default()
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.avatar.as_deref(), Some("https://cdn.marquee.test/ana.png"));

    let verified = m
        .verify_user(true, VerificationStatus::Approved)
        .await
        .unwrap()
        .unwrap();
    assert!(verified.is_verified);
    assert_eq!(verified.name, "Ana López");
}

#[tokio::test]
async fn subscribers_see_applied_results() {
    let h = harness();
    let mut actions = h.marketplace.subscribe();

    h.marketplace
        .login(Credentials::new("ana@example.com", "secret"))
        .await
        .unwrap();

    let action = actions.recv().await.unwrap();
    assert!(matches!(
        action,
        AppAction::Session(SessionAction::LoginSucceeded { .. })
    ));
}

// ═══════════════════════════════════════════════════════════════════════════
// Wishlist
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn double_toggle_restores_membership() {
    let h = harness();
    let m = &h.marketplace;
    let id = EventId::new("evt-e");

    assert!(m.toggle_favorite(id.clone()).await.unwrap());
    assert!(m.is_favorite(&id).await);
    assert!(!m.toggle_favorite(id.clone()).await.unwrap());
    assert!(!m.is_favorite(&id).await);
    assert_eq!(h.storage.get("favorites").unwrap().as_deref(), Some("[]"));
}

/// Storage whose first write stalls, so a second write could overtake it
#[derive(Debug, Default)]
struct StallingFirstWrite {
    inner: MemoryStorage,
    stalled: AtomicBool,
}

impl KeyValueStore for StallingFirstWrite {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.stalled.swap(true, Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(100));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_toggles_persist_latest_favorites() {
    let storage = Arc::new(StallingFirstWrite::default());
    let m = Marketplace::new(
        MockAuthClient::new(),
        MockEventSource::new(),
        MockOrderClient::new(),
        storage.clone(),
    );

    let (a, b) = tokio::join!(
        m.toggle_favorite(EventId::new("a")),
        m.toggle_favorite(EventId::new("b"))
    );
    assert!(a.unwrap());
    assert!(b.unwrap());

    let in_memory = m.favorites().await;
    let persisted: Vec<EventId> =
        serde_json::from_str(&storage.get("favorites").unwrap().unwrap()).unwrap();
    assert_eq!(in_memory.len(), 2);
    assert_eq!(persisted, in_memory);
}

#[tokio::test]
async fn favorites_reload_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("marquee.json");

    {
        let m = Marketplace::new(
            MockAuthClient::new(),
            MockEventSource::new(),
            MockOrderClient::new(),
            Arc::new(FileStorage::new(&path)),
        );
        m.toggle_favorite(EventId::new("evt-1")).await.unwrap();
        m.toggle_favorite(EventId::new("evt-2")).await.unwrap();
        m.shutdown().await.unwrap();
    }

    let reopened = Marketplace::new(
        MockAuthClient::new(),
        MockEventSource::new(),
        MockOrderClient::new(),
        Arc::new(FileStorage::new(&path)),
    );
    assert_eq!(
        reopened.favorites().await,
        vec![EventId::new("evt-1"), EventId::new("evt-2")]
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// Checkout
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn empty_cart_checkout_never_calls_backend() {
    let h = harness();
    let m = &h.marketplace;

    assert_eq!(
        m.checkout(buyer(), PaymentMethod::Card).await,
        Err(CheckoutError::EmptyCart)
    );

    m.set_event(event_e()).await.unwrap();
    m.add_item(ticket_a(), 0).await.unwrap();
    assert_eq!(
        m.checkout(buyer(), PaymentMethod::Card).await,
        Err(CheckoutError::EmptyCart)
    );

    assert!(h.orders.requests().is_empty());
}

#[tokio::test]
async fn successful_checkout_clears_cart() {
    let h = harness();
    let m = &h.marketplace;

    m.set_event(event_e()).await.unwrap();
    m.add_item(ticket_a(), 2).await.unwrap();
    m.add_item(ticket_b(), 0).await.unwrap();

    let confirmation = m.checkout(buyer(), PaymentMethod::Card).await.unwrap();

    assert_eq!(confirmation.status, OrderStatus::Paid);
    assert_eq!(confirmation.ticket_count, 2);
    assert_eq!(m.last_order().await, Some(confirmation));
    assert_eq!(m.total().await, Money::ZERO);
    assert!(m.cart().await.event.is_none());

    let requests = h.orders.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].items.len(), 1);
}

#[tokio::test]
async fn rejected_checkout_keeps_cart() {
    let h = harness_with(
        MockAuthClient::new(),
        MockOrderClient::new().rejecting("Sold out"),
        MemoryStorage::new(),
    );
    let m = &h.marketplace;

    m.set_event(event_e()).await.unwrap();
    m.add_item(ticket_b(), 2).await.unwrap();

    assert_eq!(
        m.checkout(buyer(), PaymentMethod::Transfer).await,
        Err(CheckoutError::Rejected("Sold out".to_string()))
    );
    assert_eq!(m.total().await, Money::from_major(700));
    assert_eq!(m.snapshot().await.checkout.error.as_deref(), Some("Sold out"));
}

// ═══════════════════════════════════════════════════════════════════════════
// Lifecycle
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn commands_fail_after_shutdown() {
    let h = harness();

    h.marketplace.shutdown().await.unwrap();

    assert_eq!(
        h.marketplace.clear_cart().await,
        Err(StoreError::ShutdownInProgress)
    );
    assert_eq!(
        h.marketplace
            .login(Credentials::new("ana@example.com", "secret"))
            .await,
        Err(SessionError::Runtime(StoreError::ShutdownInProgress))
    );
}
