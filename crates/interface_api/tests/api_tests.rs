//! HTTP tests over the in-memory store
//!
//! Every test builds the full router with a fixed clock (2025-06-01 12:00
//! UTC) and a temporary backup root.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use chrono::NaiveDate;
use serde_json::{json, Value};
use tempfile::TempDir;

use core_kernel::FixedClock;
use domain_claims::{ImportReport, InMemoryClaimStore};
use interface_api::auth::create_token;
use interface_api::config::ApiConfig;
use interface_api::dto::claims::{ClaimResponse, CreatedClaimResponse};
use interface_api::dto::clients::{ClientDeletionResponse, ClientResponse};
use interface_api::dto::auth::TokenResponse;
use interface_api::{create_router, AppState};

const SECRET: &str = "test-secret";

struct TestApp {
    server: TestServer,
    token: String,
    _backups: TempDir,
}

fn june_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn spawn_app() -> TestApp {
    let backups = TempDir::new().unwrap();
    let config = ApiConfig {
        jwt_secret: SECRET.to_string(),
        backup_root: backups.path().to_string_lossy().into_owned(),
        weekly_backup_enabled: false,
        ..ApiConfig::default()
    };
    let store = Arc::new(InMemoryClaimStore::new());
    let state = AppState::new(config, store, Arc::new(FixedClock::on(june_first())));
    let server = TestServer::new(create_router(state)).unwrap();
    let token = create_token("user-1", "tester", SECRET, 3600).unwrap();

    TestApp {
        server,
        token,
        _backups: backups,
    }
}

fn claim_body(claim_no: &str, client: &str) -> Value {
    json!({
        "claim_no": claim_no,
        "client_name": client,
        "branch": "ATL",
        "brand": "Nike",
        "claimant": "Jane Doe",
        "intent_to_claim": true,
        "intent_date": "2025-05-20",
        "claimed_amount": "1000.00",
        "paid_by_carrier": "250.00",
        "status": "OPEN"
    })
}

impl TestApp {
    async fn create_claim(&self, claim_no: &str, client: &str) -> CreatedClaimResponse {
        let response = self
            .server
            .post("/api/v1/claims")
            .authorization_bearer(&self.token)
            .json(&claim_body(claim_no, client))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<CreatedClaimResponse>()
    }
}

// ============================================================================
// Health and authentication
// ============================================================================

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_is_public() {
        let app = spawn_app();
        app.server.get("/health").await.assert_status_ok();
        app.server.get("/health/ready").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_api_requires_token() {
        let app = spawn_app();
        let response = app.server.get("/api/v1/claims").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"], "unauthorized");

        let response = app
            .server
            .get("/api/v1/claims")
            .authorization_bearer("not-a-token")
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let app = spawn_app();
        let response = app
            .server
            .post("/auth/register")
            .json(&json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "s3cure-pass",
                "password_confirmation": "s3cure-pass"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = app
            .server
            .post("/auth/login")
            .json(&json!({ "username": "alice", "password": "s3cure-pass" }))
            .await;
        response.assert_status_ok();
        let token = response.json::<TokenResponse>();
        assert_eq!(token.token_type, "Bearer");

        app.server
            .get("/api/v1/clients")
            .authorization_bearer(&token.access_token)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let app = spawn_app();
        app.server
            .post("/auth/register")
            .json(&json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "s3cure-pass",
                "password_confirmation": "s3cure-pass"
            }))
            .await
            .assert_status(StatusCode::CREATED);

        app.server
            .post("/auth/login")
            .json(&json!({ "username": "bob", "password": "wrong-pass" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_registration_rules_are_reported() {
        let app = spawn_app();
        let response = app
            .server
            .post("/auth/register")
            .json(&json!({
                "username": "carol",
                "email": "not-an-email",
                "password": "short",
                "password_confirmation": "different"
            }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<Value>();
        let details = body["details"].as_array().unwrap();
        assert_eq!(details.len(), 3);
    }
}

// ============================================================================
// Clients
// ============================================================================

mod client_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_list_and_rename() {
        let app = spawn_app();
        let response = app
            .server
            .post("/api/v1/clients")
            .authorization_bearer(&app.token)
            .json(&json!({ "name": "Acme Corp" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let acme = response.json::<ClientResponse>();
        assert_eq!(acme.client_id.to_string(), "CL00001");
        assert_eq!(acme.label, "Acme Corp (CL00001)");

        let response = app
            .server
            .put(&format!("/api/v1/clients/{}", acme.id.as_uuid()))
            .authorization_bearer(&app.token)
            .json(&json!({ "name": "Acme Holdings" }))
            .await;
        response.assert_status_ok();
        let renamed = response.json::<ClientResponse>();
        assert_eq!(renamed.name, "Acme Holdings");
        assert_eq!(renamed.client_id, acme.client_id);

        let listed = app
            .server
            .get("/api/v1/clients")
            .authorization_bearer(&app.token)
            .await
            .json::<Vec<ClientResponse>>();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_autocomplete() {
        let app = spawn_app();
        for name in ["Acme Corp", "Beta LLC"] {
            app.server
                .post("/api/v1/clients")
                .authorization_bearer(&app.token)
                .json(&json!({ "name": name }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = app
            .server
            .get("/api/v1/clients/autocomplete")
            .authorization_bearer(&app.token)
            .add_query_param("term", "acm")
            .await;
        response.assert_status_ok();
        let suggestions = response.json::<Value>();
        let suggestions = suggestions.as_array().unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0]["text"], "Acme Corp (CL00001)");
    }

    #[tokio::test]
    async fn test_unknown_client_is_not_found() {
        let app = spawn_app();
        app.server
            .get("/api/v1/clients/0190a1b2-0000-7000-8000-000000000000")
            .authorization_bearer(&app.token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_with_claims_needs_confirmation() {
        let app = spawn_app();
        let created = app.create_claim("S100", "Acme Corp").await;
        let path = format!("/api/v1/clients/{}", created.claim.client.id.as_uuid());

        app.server
            .delete(&path)
            .authorization_bearer(&app.token)
            .await
            .assert_status(StatusCode::CONFLICT);

        let response = app
            .server
            .delete(&path)
            .authorization_bearer(&app.token)
            .add_query_param("confirm", "true")
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<ClientDeletionResponse>().claims_removed, 1);

        let remaining = app
            .server
            .get("/api/v1/claims")
            .authorization_bearer(&app.token)
            .await
            .json::<Vec<ClaimResponse>>();
        assert!(remaining.is_empty());
    }
}

// ============================================================================
// Claims
// ============================================================================

mod claim_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_generates_identifiers() {
        let app = spawn_app();
        let created = app.create_claim("S100", "Acme Corp").await;
        assert!(created.client_created);
        assert_eq!(created.claim.claim_id.unwrap().to_string(), "CLM000001");
        assert_eq!(
            created.claim.client_reference.as_deref(),
            Some("AcmeCorp-1-20250601")
        );
        assert_eq!(created.claim.client.client_id.to_string(), "CL00001");

        let second = app.create_claim("S101", "acme corp").await;
        assert!(!second.client_created);
        assert_eq!(second.claim.claim_id.unwrap().to_string(), "CLM000002");
    }

    #[tokio::test]
    async fn test_duplicate_claim_no_conflicts() {
        let app = spawn_app();
        app.create_claim("S100", "Acme Corp").await;
        let response = app
            .server
            .post("/api/v1/claims")
            .authorization_bearer(&app.token)
            .json(&claim_body("S100", "Beta LLC"))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["error"], "conflict");
    }

    #[tokio::test]
    async fn test_invalid_form_lists_field_errors() {
        let app = spawn_app();
        let response = app
            .server
            .post("/api/v1/claims")
            .authorization_bearer(&app.token)
            .json(&json!({ "claim_no": "X1", "client_name": "Acme" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<Value>();
        let details: Vec<String> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d.as_str().unwrap().to_string())
            .collect();
        assert!(details.iter().any(|d| d.starts_with("claim_no:")));
        assert!(details.iter().any(|d| d.starts_with("branch:")));
        assert!(details.iter().any(|d| d.starts_with("intent_date:")));
    }

    #[tokio::test]
    async fn test_amounts_past_column_range_are_field_errors() {
        let app = spawn_app();
        let response = app
            .server
            .post("/api/v1/claims")
            .authorization_bearer(&app.token)
            .json(&json!({
                "claim_no": "S1",
                "client_name": "Acme",
                "branch": "ATL",
                "intent_date": "2025-06-01",
                "paid_by_carrier": "79228162514264337593543950335",
                "paid_by_insurer": "79228162514264337593543950335"
            }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<Value>();
        let details = body["details"].as_array().unwrap();
        assert_eq!(details.len(), 2);
        assert!(details[0].as_str().unwrap().starts_with("paid_by_carrier:"));
    }

    #[tokio::test]
    async fn test_get_update_delete() {
        let app = spawn_app();
        let created = app.create_claim("S100", "Acme Corp").await;
        let path = format!("/api/v1/claims/{}", created.claim.id.as_uuid());

        let fetched = app
            .server
            .get(&path)
            .authorization_bearer(&app.token)
            .await
            .json::<ClaimResponse>();
        assert_eq!(fetched.claim_no, "S100");

        let mut body = claim_body("S100", "Acme Corp");
        body["brand"] = json!("Adidas");
        let response = app
            .server
            .put(&path)
            .authorization_bearer(&app.token)
            .json(&body)
            .await;
        response.assert_status_ok();
        let updated = response.json::<ClaimResponse>();
        assert_eq!(updated.brand.as_deref(), Some("Adidas"));
        assert_eq!(updated.claim_id, created.claim.claim_id);
        assert_eq!(updated.client_reference, created.claim.client_reference);

        app.server
            .delete(&path)
            .authorization_bearer(&app.token)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        app.server
            .get(&path)
            .authorization_bearer(&app.token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_filters_by_claim_no() {
        let app = spawn_app();
        app.create_claim("S100", "Acme Corp").await;
        app.create_claim("S200", "Beta LLC").await;

        let listed = app
            .server
            .get("/api/v1/claims")
            .authorization_bearer(&app.token)
            .add_query_param("claim_no", "s2")
            .await
            .json::<Vec<ClaimResponse>>();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].claim_no, "S200");
    }

    #[tokio::test]
    async fn test_clear_keeps_clients() {
        let app = spawn_app();
        app.create_claim("S100", "Acme Corp").await;
        app.create_claim("S101", "Acme Corp").await;

        let response = app
            .server
            .post("/api/v1/claims/clear")
            .authorization_bearer(&app.token)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["removed"], 2);

        let clients = app
            .server
            .get("/api/v1/clients")
            .authorization_bearer(&app.token)
            .await
            .json::<Vec<ClientResponse>>();
        assert_eq!(clients.len(), 1);
    }

    #[tokio::test]
    async fn test_analytics_totals() {
        let app = spawn_app();
        app.create_claim("S100", "Acme Corp").await;
        app.create_claim("S101", "Beta LLC").await;

        let response = app
            .server
            .get("/api/v1/analytics")
            .authorization_bearer(&app.token)
            .await;
        response.assert_status_ok();
        let report = response.json::<Value>();
        assert_eq!(report["total_claims"], 2);
        assert_eq!(report["total_clients"], 2);
        assert_eq!(report["intent_claims"], 2);
    }
}

// ============================================================================
// Export and import
// ============================================================================

mod transfer_tests {
    use super::*;

    const UPLOAD: &str = "\
Shipment No,Brand,Claimant,Intent,Intent Date,Formal,Formal Date,Value,ISCM Paid,Carrier Paid,Insurance,Branch,Savings,Settlement,Exposure,Status
S900,Nike,Globex,Yes,2025-05-01,No,,1000,0,200,0,ATL,,,,OPEN
S901,Puma,Globex,No,,No,,500,,,,LAX,,,,PENDING
";

    fn upload(name: &str, bytes: &[u8], mime: &str) -> MultipartForm {
        MultipartForm::new().add_part(
            "file",
            Part::bytes(bytes.to_vec()).file_name(name).mime_type(mime),
        )
    }

    #[tokio::test]
    async fn test_csv_export_is_an_attachment() {
        let app = spawn_app();
        app.create_claim("S100", "Acme Corp").await;

        let response = app
            .server
            .get("/api/v1/claims/export")
            .authorization_bearer(&app.token)
            .add_query_param("format", "csv")
            .await;
        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "text/csv");
        assert_eq!(
            response.header("content-disposition"),
            "attachment; filename=\"claims_all_clients_20250601_120000.csv\""
        );
        let text = response.text();
        assert!(text.starts_with("Shipment No,Brand,Claimant,Claim ID"));
        assert!(text.contains("S100"));
    }

    #[tokio::test]
    async fn test_unknown_export_format_is_bad_request() {
        let app = spawn_app();
        app.server
            .get("/api/v1/claims/export")
            .authorization_bearer(&app.token)
            .add_query_param("format", "docx")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_csv_upload_creates_then_skips() {
        let app = spawn_app();

        let response = app
            .server
            .post("/api/v1/claims/import")
            .authorization_bearer(&app.token)
            .multipart(upload("claims.csv", UPLOAD.as_bytes(), "text/csv"))
            .await;
        response.assert_status_ok();
        let report = response.json::<ImportReport>();
        assert_eq!(report.created, vec!["S900".to_string(), "S901".to_string()]);
        assert!(report.errors.is_empty());

        let response = app
            .server
            .post("/api/v1/claims/import")
            .authorization_bearer(&app.token)
            .multipart(upload("claims.csv", UPLOAD.as_bytes(), "text/csv"))
            .await;
        let report = response.json::<ImportReport>();
        assert_eq!(report.created_count(), 0);
        assert_eq!(report.skipped_count(), 2);
        assert_eq!(report.skipped[0].row, 2);

        let clients = app
            .server
            .get("/api/v1/clients")
            .authorization_bearer(&app.token)
            .await
            .json::<Vec<ClientResponse>>();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].name, "Globex");
    }

    #[tokio::test]
    async fn test_unsupported_upload_is_rejected() {
        let app = spawn_app();
        let response = app
            .server
            .post("/api/v1/claims/import")
            .authorization_bearer(&app.token)
            .multipart(upload("claims.txt", b"hello", "text/plain"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let message = response.json::<Value>()["message"].as_str().unwrap().to_string();
        assert!(message.contains("Please upload an Excel"));
    }
}

// ============================================================================
// Backups
// ============================================================================

mod backup_tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_backup_then_browse_and_download() {
        let app = spawn_app();
        app.create_claim("S100", "Acme Corp").await;

        let response = app
            .server
            .post("/api/v1/backups/manual")
            .authorization_bearer(&app.token)
            .await;
        response.assert_status(StatusCode::CREATED);
        let run = response.json::<Value>();
        assert_eq!(run["stem"], "manual_backup_20250601_120000");
        assert_eq!(run["files"].as_array().unwrap().len(), 3);

        let listing = app
            .server
            .get("/api/v1/backups")
            .authorization_bearer(&app.token)
            .await
            .json::<Value>();
        for format in ["excel", "csv", "pdf"] {
            assert_eq!(listing[format].as_array().unwrap().len(), 1, "{}", format);
        }

        let response = app
            .server
            .get("/api/v1/backups/csv/manual_backup_20250601_120000.csv")
            .authorization_bearer(&app.token)
            .await;
        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "text/csv");
        assert!(response.text().contains("S100"));
    }

    #[tokio::test]
    async fn test_download_guards() {
        let app = spawn_app();
        app.server
            .get("/api/v1/backups/csv/missing.csv")
            .authorization_bearer(&app.token)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        app.server
            .get("/api/v1/backups/csv/..%2F..%2Fsecret.csv")
            .authorization_bearer(&app.token)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        app.server
            .get("/api/v1/backups/docx/report.docx")
            .authorization_bearer(&app.token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_weekly_status_and_trigger() {
        let app = spawn_app();

        let status = app
            .server
            .get("/api/v1/backups/weekly-status")
            .authorization_bearer(&app.token)
            .await
            .json::<Value>();
        assert_eq!(status["overdue"], true);
        assert!(status["last_backup"].is_null());
        assert_eq!(status["scheduler_running"], false);

        let response = app
            .server
            .post("/api/v1/backups/weekly-status")
            .authorization_bearer(&app.token)
            .await;
        response.assert_status(StatusCode::CREATED);
        let run = response.json::<Value>();
        assert_eq!(run["files"].as_array().unwrap().len(), 1);

        let status = app
            .server
            .get("/api/v1/backups/weekly-status")
            .authorization_bearer(&app.token)
            .await
            .json::<Value>();
        assert_eq!(status["overdue"], false);
        assert_eq!(status["days_until"], 7);
    }
}
