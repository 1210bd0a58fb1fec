use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use mockall::mock;

use bythewave_backend::{
    entities::{
        contact::ContactPayload,
        email::{DeliveryReceipt, MailRouting, OutboundEmail},
        reservation::ReservationPayload,
    },
    errors::{AppError, DeliveryError, RateLimitError},
    limiter::rate_limiter::InMemoryRateLimitStore,
    repositories::{mailer::Mailer, rate_limit::RateLimitStore},
    use_cases::{
        spam::{SpamGuard, SpamPolicy},
        submission::SubmissionHandler,
    },
};

mock! {
    pub Provider {}

    #[async_trait]
    impl Mailer for Provider {
        fn check_credentials(&self) -> Result<(), DeliveryError>;
        async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, DeliveryError>;
    }
}

mock! {
    pub Store {}

    #[async_trait]
    impl RateLimitStore for Store {
        async fn is_rate_limited(&self, key: &str, limit: u32, window: Duration) -> Result<bool, RateLimitError>;
        async fn purge_expired(&self, window: Duration) -> usize;
        fn backend(&self) -> &'static str;
    }
}

fn routing() -> MailRouting {
    MailRouting {
        from: "BY THE WAVE <web@rezervacie.btw.sk>".to_string(),
        to: "marketing@btw.sk".to_string(),
    }
}

fn handler_with_store(mailer: MockProvider, store: Arc<dyn RateLimitStore>) -> SubmissionHandler<MockProvider> {
    SubmissionHandler::new(mailer, SpamGuard::new(SpamPolicy::default(), store), routing())
}

fn handler(mailer: MockProvider) -> SubmissionHandler<MockProvider> {
    handler_with_store(mailer, Arc::new(InMemoryRateLimitStore::new()))
}

fn contact() -> ContactPayload {
    ContactPayload {
        first_name: "Ján".into(),
        last_name: "Novák".into(),
        email: "jan@example.sk".into(),
        message: "Mám záujem o transfer na letisko.".into(),
        gdpr_consent: "true".into(),
        started_at: (Utc::now().timestamp_millis() - 10_000).to_string(),
        ..ContactPayload::default()
    }
}

fn reservation() -> ReservationPayload {
    ReservationPayload {
        person_type: "individual".into(),
        first_name: "Eva".into(),
        last_name: "Malá".into(),
        email: "eva@example.sk".into(),
        phone: "0900123456".into(),
        pickup_address: "Obchodná 1, Bratislava".into(),
        destination_address: "Letisko Bratislava".into(),
        date: "2026-11-20".into(),
        time: "09:00".into(),
        passengers: "4".into(),
        vehicle_category: "Nezáleží".into(),
        payment_method: "Hotovosť na mieste".into(),
        gdpr_consent: "true".into(),
        started_at: (Utc::now().timestamp_millis() - 10_000).to_string(),
        ..ReservationPayload::default()
    }
}

#[tokio::test]
async fn valid_contact_is_sent_once() {
    let mut mailer = MockProvider::new();
    mailer.expect_check_credentials().returning(|| Ok(()));
    mailer
        .expect_send()
        .withf(|email| email.subject == "Kontakt - Ján Novák" && email.to == vec!["marketing@btw.sk".to_string()])
        .times(1)
        .returning(|_| Ok(DeliveryReceipt { id: Some("abc".into()) }));

    let response = handler(mailer).submit_contact("10.0.0.1", contact()).await.unwrap();

    assert!(response.success);
    assert!(response.errors.is_none());
}

#[tokio::test]
async fn spam_never_reaches_the_mailer() {
    let mut mailer = MockProvider::new();
    mailer.expect_check_credentials().never();
    mailer.expect_send().never();

    let payload = ContactPayload { website: "x".into(), ..contact() };
    let response = handler(mailer).submit_contact("10.0.0.1", payload).await.unwrap();

    assert!(response.success);
    assert!(response.message.is_none());
}

#[tokio::test]
async fn invalid_contact_never_reaches_the_mailer() {
    let mut mailer = MockProvider::new();
    mailer.expect_send().never();

    let payload = ContactPayload { first_name: " J ".into(), ..contact() };
    let result = handler(mailer).submit_contact("10.0.0.1", payload).await;

    match result {
        Err(AppError::ValidationError(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors.contains_key("firstName"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_credentials_short_circuit() {
    let mut mailer = MockProvider::new();
    mailer.expect_check_credentials().returning(|| Err(DeliveryError::MissingApiKey));
    mailer.expect_send().never();

    let result = handler(mailer).submit_reservation("10.0.0.1", reservation()).await;

    assert!(matches!(result, Err(AppError::ConfigurationError)));
}

#[tokio::test]
async fn provider_rejection_keeps_status() {
    let mut mailer = MockProvider::new();
    mailer.expect_check_credentials().returning(|| Ok(()));
    mailer.expect_send().returning(|_| {
        Err(DeliveryError::Rejected { status: 403, body: "domain not verified".into() })
    });

    let result = handler(mailer).submit_reservation("10.0.0.1", reservation()).await;

    match result {
        Err(AppError::ProviderError { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "Emailová služba je v testovacom režime. Kontaktujte administrátora.");
        }
        other => panic!("expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn transport_failure_is_distinct() {
    let mut mailer = MockProvider::new();
    mailer.expect_check_credentials().returning(|| Ok(()));
    mailer
        .expect_send()
        .returning(|_| Err(DeliveryError::Transport("connection refused".into())));

    let result = handler(mailer).submit_contact("10.0.0.1", contact()).await;

    assert!(matches!(result, Err(AppError::TransportError)));
}

#[tokio::test]
async fn rate_limit_store_failure_fails_open() {
    let mut store = MockStore::new();
    store
        .expect_is_rate_limited()
        .returning(|_, _, _| Err(RateLimitError::Unavailable("redis down".into())));
    store.expect_backend().return_const("redis");

    let mut mailer = MockProvider::new();
    mailer.expect_check_credentials().returning(|| Ok(()));
    mailer.expect_send().times(1).returning(|_| Ok(DeliveryReceipt { id: None }));

    let response = handler_with_store(mailer, Arc::new(store))
        .submit_contact("10.0.0.1", contact())
        .await
        .unwrap();

    assert!(response.success);
    assert!(response.message.is_some());
}

#[tokio::test]
async fn rate_limit_key_combines_address_and_lowercased_email() {
    let mut store = MockStore::new();
    store
        .expect_is_rate_limited()
        .withf(|key, limit, window| {
            key == "10.0.0.1:jan@example.sk" && *limit == 8 && *window == Duration::from_secs(600)
        })
        .times(1)
        .returning(|_, _, _| Ok(true));

    let mut mailer = MockProvider::new();
    mailer.expect_send().never();

    let payload = ContactPayload { email: " JAN@Example.SK ".into(), ..contact() };
    let response = handler_with_store(mailer, Arc::new(store))
        .submit_contact("10.0.0.1", payload)
        .await
        .unwrap();

    assert!(response.success);
    assert!(response.message.is_none());
}
