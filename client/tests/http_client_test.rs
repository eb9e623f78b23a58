//! `ApiClient` against a mocked backend.

#![allow(clippy::unwrap_used)] // Test code

use marquee_client::{
    ApiClient, AuthClient, BuyerInfo, ClientError, Credentials, EventId, EventSource,
    KeyValueStore, Marketplace, MemoryStorage, Money, OrderClient, OrderLine, OrderRequest,
    OrderStatus, PaymentMethod, Registration, SessionError, SessionStatus, TicketTypeId, UserRole,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_KEY: &str = "auth_token";

fn user_json() -> serde_json::Value {
    json!({
        "id": "u1",
        "name": "Ana",
        "email": "ana@example.com",
        "role": "BUYER"
    })
}

async fn client_with_token(token: Option<&str>) -> (MockServer, ApiClient, Arc<MemoryStorage>) {
    marquee_testing::init_test_tracing();
    let server = MockServer::start().await;
    let storage = Arc::new(MemoryStorage::new());
    if let Some(token) = token {
        storage.set(TOKEN_KEY, token).unwrap();
    }
    let client = ApiClient::new(server.uri(), storage.clone(), TOKEN_KEY);
    (server, client, storage)
}

#[tokio::test]
async fn login_posts_credentials() {
    let (server, client, _) = client_with_token(None).await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({
            "email": "ana@example.com",
            "password": "secret",
            "role": "BUYER"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "user": user_json(), "token": "tok-1" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client
        .login(&Credentials::new("ana@example.com", "secret").with_role(UserRole::Buyer))
        .await
        .unwrap();

    assert_eq!(response.token, "tok-1");
    assert_eq!(response.user.name, "Ana");
}

#[tokio::test]
async fn rejection_carries_backend_message() {
    let (server, client, _) = client_with_token(None).await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let error = client
        .login(&Credentials::new("ana@example.com", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(
        error,
        ClientError::Rejected {
            message: Some("Invalid credentials".to_string())
        }
    );
    assert_eq!(error.user_message(), Some("Invalid credentials"));
}

#[tokio::test]
async fn rejection_without_body_has_no_message() {
    let (server, client, _) = client_with_token(None).await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&server)
        .await;

    let error = client
        .register(&Registration {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "secret".to_string(),
            role: None,
        })
        .await
        .unwrap_err();

    assert_eq!(error, ClientError::Rejected { message: None });
    assert_eq!(error.user_message(), None);
}

#[tokio::test]
async fn sends_bearer_token_when_stored() {
    let (server, client, _) = client_with_token(Some("tok-1")).await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let user = client.current_user().await.unwrap();
    assert_eq!(user.email, "ana@example.com");
}

#[tokio::test]
async fn unauthorized_removes_stored_token() {
    let (server, client, storage) = client_with_token(Some("stale")).await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expired" })))
        .mount(&server)
        .await;

    let error = client.current_user().await.unwrap_err();

    assert_eq!(
        error,
        ClientError::Unauthorized {
            message: Some("Token expired".to_string())
        }
    );
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn logout_accepts_empty_response() {
    let (server, client, _) = client_with_token(Some("tok-1")).await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.logout().await.unwrap();
}

#[tokio::test]
async fn unknown_event_maps_to_api_error() {
    let (server, client, _) = client_with_token(None).await;

    Mock::given(method("GET"))
        .and(path("/events/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Event not found" })))
        .mount(&server)
        .await;

    let error = client.event_by_slug("nope").await.unwrap_err();
    assert_eq!(
        error,
        ClientError::Api {
            status: 404,
            message: Some("Event not found".to_string())
        }
    );
}

#[tokio::test]
async fn event_by_slug_parses_ticket_types() {
    let (server, client, _) = client_with_token(None).await;

    Mock::given(method("GET"))
        .and(path("/events/summer-concert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "evt-1",
            "slug": "summer-concert",
            "title": "Summer Concert",
            "venue": "Foro Sol",
            "startsAt": "2026-07-01T20:00:00Z",
            "ticketTypes": [
                { "id": "gen", "name": "General", "price": 12000, "quantity": 100, "available": 40 }
            ]
        })))
        .mount(&server)
        .await;

    let event = client.event_by_slug("summer-concert").await.unwrap();
    assert_eq!(event.ticket_types.len(), 1);
    assert_eq!(event.ticket_types[0].price, Money::from_major(120));
    assert_eq!(event.ticket_types[0].available, 40);
}

#[tokio::test]
async fn create_order_posts_wire_format() {
    let (server, client, _) = client_with_token(Some("tok-1")).await;

    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_json(json!({
            "eventId": "evt-1",
            "items": [{ "ticketTypeId": "gen", "quantity": 2 }],
            "buyer": { "name": "Ana", "email": "ana@example.com", "phone": "+52 55 1234 5678" },
            "paymentMethod": "CASH"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "orderId": "order-9",
            "status": "PENDING",
            "ticketCount": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let confirmation = client
        .create_order(&OrderRequest {
            event_id: EventId::new("evt-1"),
            items: vec![OrderLine {
                ticket_type_id: TicketTypeId::new("gen"),
                quantity: 2,
            }],
            buyer: BuyerInfo {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                phone: Some("+52 55 1234 5678".to_string()),
            },
            payment_method: PaymentMethod::Cash,
        })
        .await
        .unwrap();

    assert_eq!(confirmation.status, OrderStatus::Pending);
    assert_eq!(confirmation.ticket_count, 2);
}

#[tokio::test]
async fn server_errors_keep_status() {
    let (server, client, storage) = client_with_token(Some("tok-1")).await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let error = client.current_user().await.unwrap_err();
    assert_eq!(
        error,
        ClientError::Api {
            status: 503,
            message: None
        }
    );
    assert_eq!(error.user_message(), None);
    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
}

fn marketplace_over(client: ApiClient, storage: Arc<MemoryStorage>) -> Marketplace<ApiClient, ApiClient, ApiClient> {
    Marketplace::new(client.clone(), client.clone(), client, storage)
}

#[tokio::test]
async fn login_401_message_reaches_session_state() {
    let (server, client, storage) = client_with_token(None).await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let marketplace = marketplace_over(client, storage);
    let error = marketplace
        .login(Credentials::new("ana@example.com", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(
        error,
        SessionError::Rejected {
            message: "Invalid credentials".to_string(),
            source: ClientError::Unauthorized {
                message: Some("Invalid credentials".to_string())
            },
        }
    );
    let session = marketplace.session().await;
    assert_eq!(session.status(), SessionStatus::Error);
    assert_eq!(session.error.as_deref(), Some("Invalid credentials"));
}

#[tokio::test]
async fn login_server_error_without_body_uses_fallback() {
    let (server, client, storage) = client_with_token(None).await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let marketplace = marketplace_over(client, storage);
    let error = marketplace
        .login(Credentials::new("ana@example.com", "secret"))
        .await
        .unwrap_err();

    assert_eq!(
        error,
        SessionError::Rejected {
            message: "Login failed".to_string(),
            source: ClientError::Api {
                status: 500,
                message: None
            },
        }
    );
    assert_eq!(
        marketplace.session().await.error.as_deref(),
        Some("Login failed")
    );
}
