mod test_utils;

use reqwest::StatusCode;
use serde_json::{json, Value};
use test_forms::*;
use test_utils::*;

use bythewave_backend::errors::{CONFIGURATION_MESSAGE, TRANSPORT_MESSAGE, VALIDATION_SUMMARY};

#[actix_rt::test]
async fn valid_contact_form_is_delivered() {
    let app = TestApp::spawn().await;

    let response = app.post_form("/api/contact", &valid_contact_form()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap().starts_with("Ďakujeme za vašu správu!"));

    assert_eq!(app.emails.count(), 1);
    let sent = app.emails.last().unwrap();
    assert_eq!(sent.authorization.as_deref(), Some(format!("Bearer {}", TEST_API_KEY).as_str()));
    assert_eq!(sent.body["subject"], "Kontakt - Ján Novák (Prenájom)");
    assert_eq!(sent.body["to"], json!(["marketing@btw.sk"]));
    assert_eq!(sent.body["from"], "BY THE WAVE <web@rezervacie.btw.sk>");
    assert!(sent.body["text"].as_str().unwrap().contains("jan.novak@example.sk"));
}

#[actix_rt::test]
async fn multipart_contact_form_is_accepted() {
    let app = TestApp::spawn().await;

    let response = app.post_multipart("/api/contact", &valid_contact_form()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(app.emails.count(), 1);
}

#[actix_rt::test]
async fn invalid_fields_are_all_reported() {
    let app = TestApp::spawn().await;
    let fields = vec![
        ("firstName", "Jan".to_string()),
        ("lastName", "N".to_string()),
        ("email", "a@b.com".to_string()),
        ("message", "short".to_string()),
        ("gdprConsent", "true".to_string()),
        ("startedAt", started_ms_ago(5_000)),
    ];

    let response = app.post_form("/api/contact", &fields).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], VALIDATION_SUMMARY);

    let errors = body["errors"].as_object().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors["lastName"], "Priezvisko musí mať aspoň 2 znaky");
    assert_eq!(errors["message"], "Správa musí mať aspoň 10 znakov");
    assert_eq!(app.emails.count(), 0);
}

#[actix_rt::test]
async fn missing_consent_and_bad_email_are_rejected() {
    let app = TestApp::spawn().await;
    let fields = with_field(
        &with_field(&valid_contact_form(), "gdprConsent", "on"),
        "email",
        "jan.novak.example.sk",
    );

    let response = app.post_form("/api/contact", &fields).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errors"]["gdprConsent"], "Je potrebné súhlasiť so spracovaním údajov");
    assert_eq!(body["errors"]["email"], "Zadajte platný email");
}

#[actix_rt::test]
async fn short_phone_is_rejected_but_blank_phone_is_fine() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form("/api/contact", &with_field(&valid_contact_form(), "phone", "123"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errors"]["phone"], "Telefónne číslo musí mať aspoň 6 znakov");

    let response = app
        .post_form("/api/contact", &with_field(&valid_contact_form(), "phone", "   "))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn honeypot_gets_silent_success_without_delivery() {
    let app = TestApp::spawn().await;
    let fields = with_field(&valid_contact_form(), "website", "http://spam.example");

    let response = app.post_form("/api/contact", &fields).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(app.emails.count(), 0);
}

#[actix_rt::test]
async fn fast_or_missing_start_time_gets_silent_success() {
    let app = TestApp::spawn().await;

    for fields in [
        with_field(&valid_contact_form(), "startedAt", &started_ms_ago(200)),
        with_field(&valid_contact_form(), "startedAt", "not-a-number"),
        without_field(&valid_contact_form(), "startedAt"),
    ] {
        let response = app.post_form("/api/contact", &fields).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "success": true }));
    }

    assert_eq!(app.emails.count(), 0);
}

#[actix_rt::test]
async fn spam_check_runs_before_validation() {
    let app = TestApp::spawn().await;
    let fields = vec![
        ("firstName", "J".to_string()),
        ("website", "filled".to_string()),
    ];

    let response = app.post_form("/api/contact", &fields).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));
}

#[actix_rt::test]
async fn link_heavy_message_is_silently_dropped() {
    let app = TestApp::spawn().await;
    let message = "Check https://a.example and http://b.example and www.c.example now";
    let fields = with_field(&valid_contact_form(), "message", message);

    let response = app.post_form("/api/contact", &fields).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.emails.count(), 0);
}

#[actix_rt::test]
async fn ninth_submission_in_window_is_silently_dropped() {
    let app = TestApp::spawn().await;

    for _ in 0..8 {
        let response = app.post_form("/api/contact", &valid_contact_form()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(app.emails.count(), 8);

    let response = app.post_form("/api/contact", &valid_contact_form()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(app.emails.count(), 8);

    // A different sender from the same address has its own budget
    let other = with_field(&valid_contact_form(), "email", "iny@example.sk");
    app.post_form("/api/contact", &other).await;
    assert_eq!(app.emails.count(), 9);
}

#[actix_rt::test]
async fn missing_api_key_is_a_configuration_error() {
    let app = TestApp::spawn_with(TestSetup { api_key: None, ..TestSetup::default() }).await;

    let response = app.post_form("/api/contact", &valid_contact_form()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], CONFIGURATION_MESSAGE);
    assert_eq!(app.emails.count(), 0);
}

#[actix_rt::test]
async fn malformed_api_key_is_a_configuration_error() {
    let app = TestApp::spawn_with(TestSetup {
        api_key: Some("sk_live_not_a_resend_key".to_string()),
        ..TestSetup::default()
    })
    .await;

    let response = app.post_form("/api/contact", &valid_contact_form()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.emails.count(), 0);
}

#[actix_rt::test]
async fn provider_status_codes_are_propagated_with_specific_messages() {
    let cases = [
        (401, "Chyba autentifikácie emailovej služby. Kontaktujte administrátora."),
        (403, "Emailová služba je v testovacom režime. Kontaktujte administrátora."),
        (422, "Neplatné údaje v emaili. Skúste to prosím znovu."),
        (429, "Príliš veľa požiadaviek. Skúste to prosím za chvíľu."),
        (503, "Dočasná chyba emailovej služby. Skúste to prosím za chvíľu."),
        (409, "Nastala chyba pri odosielaní emailu."),
    ];

    for (status, message) in cases {
        let app = TestApp::spawn_with(TestSetup {
            provider_status: status,
            provider_body: json!({ "name": "error", "message": "provider says no" }),
            ..TestSetup::default()
        })
        .await;

        let response = app.post_form("/api/contact", &valid_contact_form()).await;

        assert_eq!(response.status().as_u16(), status);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], message);
        assert_eq!(app.emails.count(), 1);
    }
}

#[actix_rt::test]
async fn unreachable_provider_is_a_bad_gateway() {
    let app = TestApp::spawn_with(TestSetup { provider_reachable: false, ..TestSetup::default() }).await;

    let response = app.post_form("/api/contact", &valid_contact_form()).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], TRANSPORT_MESSAGE);
}

#[actix_rt::test]
async fn other_methods_get_json_405() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/contact").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Method Not Allowed. Use POST /api/contact.");

    let response = app.client.put(&app.url("/api/contact")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_rt::test]
async fn options_returns_no_content() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .request(reqwest::Method::OPTIONS, &app.url("/api/contact"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[actix_rt::test]
async fn browser_preflight_returns_no_content() {
    let app = TestApp::spawn().await;

    for path in ["/api/contact", "/api/reservation"] {
        let response = app
            .client
            .request(reqwest::Method::OPTIONS, &app.url(path))
            .header("Origin", "https://www.bythewave.sk")
            .header("Access-Control-Request-Method", "POST")
            .header("Access-Control-Request-Headers", "content-type")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT, "{}", path);
        assert!(response.headers().contains_key("access-control-allow-origin"), "{}", path);
        assert!(response.headers().contains_key("access-control-allow-methods"), "{}", path);
    }
}

#[actix_rt::test]
async fn json_body_is_not_accepted_by_the_contact_form() {
    let app = TestApp::spawn().await;
    let body: Value = valid_contact_form()
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::String(v)))
        .collect::<serde_json::Map<_, _>>()
        .into();

    let response = app.post_json("/api/contact", &body).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(app.emails.count(), 0);
}

#[actix_rt::test]
async fn oversized_body_is_silently_dropped() {
    let app = TestApp::spawn_with(TestSetup { max_payload_bytes: 1024, ..TestSetup::default() }).await;
    let fields = with_field(&valid_contact_form(), "message", &"a".repeat(4096));

    let response = app.post_form("/api/contact", &fields).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(app.emails.count(), 0);
}

#[actix_rt::test]
async fn long_accented_message_over_the_default_ceiling_is_silently_dropped() {
    let app = TestApp::spawn().await;
    let fields = with_field(&valid_contact_form(), "message", &"č".repeat(12_000));

    let response = app.post_form("/api/contact", &fields).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(app.emails.count(), 0);
}

#[actix_rt::test]
async fn oversized_multipart_body_is_silently_dropped() {
    let app = TestApp::spawn_with(TestSetup { max_payload_bytes: 1024, ..TestSetup::default() }).await;
    let fields = with_field(&valid_contact_form(), "message", &"a".repeat(4096));

    let response = app.post_multipart("/api/contact", &fields).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(app.emails.count(), 0);
}

#[actix_rt::test]
async fn user_text_is_escaped_in_the_html_body() {
    let app = TestApp::spawn().await;
    let fields = with_field(
        &valid_contact_form(),
        "message",
        "<script>alert('x')</script> prosím o ponuku",
    );

    app.post_form("/api/contact", &fields).await;

    let sent = app.emails.last().unwrap();
    let html = sent.body["html"].as_str().unwrap();
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}
