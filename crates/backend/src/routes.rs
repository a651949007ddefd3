use axum::{
    routing::{get, post},
    Router,
};
use contracts::domain::a001_unit::Unit;
use contracts::domain::a002_property::Property;
use contracts::domain::a003_agent::Agent;
use contracts::domain::common::Record;
use contracts::shared::export::Exportable;

use crate::handlers::records;
use crate::shared::app_state::AppState;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // A001 Units
        .merge(record_routes::<Unit>())
        // A002 Properties
        .merge(record_routes::<Property>())
        // A003 Agents
        .merge(record_routes::<Agent>())
        .with_state(state)
}

/// CRUD, экспорт и тестовые данные для одной коллекции под `/api/<resource>`
pub fn record_routes<T: Record + Exportable>() -> Router<AppState> {
    let base = T::collection().api_path();
    Router::new()
        .route(
            &base,
            get(records::list_all::<T>).post(records::create::<T>),
        )
        .route(
            &format!("{}/export.csv", base),
            get(records::export_csv::<T>),
        )
        .route(
            &format!("{}/testdata", base),
            post(records::insert_test_data::<T>),
        )
        .route(
            &format!("{}/:id", base),
            get(records::get_by_id::<T>)
                .put(records::update::<T>)
                .delete(records::delete::<T>),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::initialize_database;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use contracts::shared::api_error::{ApiErrorBody, ApiErrorKind};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let path = std::env::temp_dir().join(format!(
            "estate-admin-test-{}.db",
            uuid::Uuid::new_v4()
        ));
        let conn = initialize_database(&path).await.unwrap();
        configure_routes(AppState::new(Some(conn)))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_health() {
        let app = configure_routes(AppState::default());
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn test_without_database_reports_unavailable() {
        let app = configure_routes(AppState::default());
        let (status, body) = send(&app, "GET", "/api/units", None).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let err: ApiErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.kind, Some(ApiErrorKind::Unavailable));
    }

    #[tokio::test]
    async fn test_crud_round() {
        let app = test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/properties",
            Some(json!({
                "title": "Sea view flat",
                "location": "Goa",
                "price": 4500000,
                "status": "for_sale"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let created: Property = serde_json::from_slice(&body).unwrap();
        assert!(!created.id.is_empty());

        let (status, body) = send(&app, "GET", "/api/properties", None).await;
        assert_eq!(status, StatusCode::OK);
        let list: Vec<Property> = serde_json::from_slice(&body).unwrap();
        assert_eq!(list, vec![created.clone()]);

        let uri = format!("/api/properties/{}", created.id);
        let (status, body) = send(
            &app,
            "PUT",
            &uri,
            Some(json!({
                "title": "Sea view flat (renovated)",
                "location": "Goa",
                "price": 4700000
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let updated: Property = serde_json::from_slice(&body).unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.metadata.created_at, created.metadata.created_at);
        assert!(updated.metadata.updated_at >= created.metadata.updated_at);

        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let err: ApiErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.kind, Some(ApiErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_invalid_payloads_are_bad_requests() {
        let app = test_app().await;

        // missing required unit number
        let (status, body) = send(&app, "POST", "/api/units", Some(json!({ "price": 10 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ApiErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.kind, Some(ApiErrorKind::BadRequest));

        let (status, _) = send(&app, "POST", "/api/units", Some(json!([1, 2]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let app = test_app().await;
        let unit = json!({ "id": "u-1", "unitNo": "A-1" });

        let (status, _) = send(&app, "POST", "/api/units", Some(unit.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&app, "POST", "/api/units", Some(unit)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let app = test_app().await;
        let (status, _) = send(&app, "POST", "/api/agents/testdata", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, "GET", "/api/agents", None).await;
        let agents: Vec<Agent> = serde_json::from_slice(&body).unwrap();
        assert_eq!(agents.len(), Agent::demo_records().len());

        let (_, body) = send(&app, "GET", "/api/units", None).await;
        let units: Vec<Unit> = serde_json::from_slice(&body).unwrap();
        assert!(units.is_empty());
    }

    #[tokio::test]
    async fn test_testdata_is_repeatable() {
        let app = test_app().await;
        send(&app, "POST", "/api/units/testdata", None).await;
        send(&app, "POST", "/api/units/testdata", None).await;

        let (_, body) = send(&app, "GET", "/api/units", None).await;
        let units: Vec<Unit> = serde_json::from_slice(&body).unwrap();
        assert_eq!(units.len(), Unit::demo_records().len());
    }

    #[tokio::test]
    async fn test_export_csv() {
        let app = test_app().await;
        send(&app, "POST", "/api/units", Some(json!({ "id": "u1", "unitNo": "A,1", "price": 100 }))).await;

        let (status, body) = send(&app, "GET", "/api/units/export.csv", None).await;
        assert_eq!(status, StatusCode::OK);
        let csv = String::from_utf8(body).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("id,"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("u1,\"A,1\","));
        assert!(row.contains(",100,"));
    }
}
