//! Command-line walkthrough of the marketplace client.
//!
//! Runs against the in-memory mock collaborators, so no backend is needed.
//! Set `MARQUEE_STORAGE_PATH` (in the environment or a `.env` file) to keep
//! the token and favorites between runs.

use chrono::{TimeZone, Utc};
use marquee_client::mocks::{MockAuthClient, MockEventSource, MockOrderClient};
use marquee_client::{
    BuyerInfo, ClientConfig, Credentials, Event, EventId, FileStorage, KeyValueStore,
    Marketplace, MemoryStorage, Money, PaymentMethod, TicketType, User, UserRole,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn festival() -> Event {
    Event {
        id: EventId::new("evt-festival"),
        slug: "sonar-nights".to_string(),
        title: "Sonar Nights".to_string(),
        description: "Three stages, one night.".to_string(),
        venue: "Parque Fundidora".to_string(),
        starts_at: Utc
            .with_ymd_and_hms(2026, 11, 14, 21, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
        image_url: None,
        ticket_types: vec![
            TicketType::new("general", "General", Money::from_major(120), 500),
            TicketType::new("vip", "VIP", Money::from_major(350), 50),
            TicketType::new("community", "Community", Money::ZERO, 100),
        ],
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let config = ClientConfig::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("marquee_client={}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(api_url = %config.api.base_url, "Starting marketplace demo");

    let storage: Arc<dyn KeyValueStore> = match &config.storage.path {
        Some(path) => Arc::new(FileStorage::new(path.clone())),
        None => Arc::new(MemoryStorage::new()),
    };

    let auth = MockAuthClient::new().with_account(
        User::new("u-ana", "Ana López", "ana@example.com", UserRole::Buyer),
        "secret",
    );
    let events = MockEventSource::new().with_event(festival());
    let marketplace = Marketplace::with_config(
        auth,
        events,
        MockOrderClient::new(),
        storage,
        &config,
    );

    println!("=== Marquee Demo ===\n");

    match marketplace.check_auth().await? {
        Some(user) => println!("Welcome back, {}", user.name),
        None => println!("No saved session"),
    }

    // Browse
    let event = marketplace.load_event("sonar-nights").await?;
    println!("\n{} at {}", event.title, event.venue);
    for ticket_type in &event.ticket_types {
        println!(
            "  {:<10} {:>8}  ({} available)",
            ticket_type.name,
            ticket_type.price.to_string(),
            ticket_type.available
        );
    }

    // Fill the cart
    let general = event.ticket_types[0].clone();
    let vip = event.ticket_types[1].clone();
    let community = event.ticket_types[2].clone();
    marketplace.set_event(event.clone()).await?;
    marketplace.add_item(general, 2).await?;
    marketplace.add_item(vip.clone(), 1).await?;
    marketplace.add_item(community, 3).await?;
    println!(
        "\nCart: {} tickets, total {}",
        marketplace.item_count().await,
        marketplace.total().await
    );

    marketplace.remove_item(vip.id).await?;
    println!("Without VIP: total {}", marketplace.total().await);

    // Favorites
    let favorite = marketplace.toggle_favorite(event.id.clone()).await?;
    println!("\nFavorite {}: {favorite}", event.id);

    // Sign in, with one wrong attempt first
    if let Err(error) = marketplace
        .login(Credentials::new("ana@example.com", "wrong"))
        .await
    {
        println!("\nLogin failed: {error} (status: {:?})", marketplace.status().await);
    }
    let user = marketplace
        .login(Credentials::new("ana@example.com", "secret"))
        .await?;
    println!("Signed in as {} ({:?})", user.name, marketplace.status().await);

    // Checkout
    let confirmation = marketplace
        .checkout(
            BuyerInfo {
                name: user.name.clone(),
                email: user.email.clone(),
                phone: None,
            },
            PaymentMethod::Card,
        )
        .await?;
    println!(
        "\nOrder {} {:?}: {} tickets; cart now holds {}",
        confirmation.order_id,
        confirmation.status,
        confirmation.ticket_count,
        marketplace.item_count().await
    );

    marketplace.logout().await?;
    println!("\nSigned out ({:?})", marketplace.status().await);

    marketplace.shutdown().await?;
    Ok(())
}
