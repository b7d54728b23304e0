pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod pricing;
pub mod state;
pub mod validation;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::warn;

use crate::config::{AppConfig, Environment};
use crate::database::{Category, ContactInfo, ContentSection, ExampleWork, Product};
use crate::handlers::{admin, auth as auth_handlers, catalog, health};
use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let gate = Arc::new(state.access_gate());

    let mut router = Router::new()
        .route("/health", get(health::health))
        .merge(auth_routes())
        .merge(catalog_routes())
        .nest("/api/admin", admin_routes());

    if let Some(dir) = &state.config.server.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(axum::middleware::from_fn_with_state(gate, middleware::access_gate))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth_handlers::login))
        .route("/api/auth/logout", post(auth_handlers::logout))
        .route("/api/auth/verify", get(auth_handlers::verify))
}

fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(catalog::list_products))
        .route("/api/products/filters", get(catalog::product_filters))
        .route("/api/products/:id", get(catalog::show_product))
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/categories/:id", get(catalog::show_category))
        .route("/api/example-works", get(catalog::list_example_works))
        .route("/api/content", get(catalog::list_content))
        .route("/api/content/:key", get(catalog::show_content))
        .route("/api/contact", get(catalog::list_contact))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(admin::list_products).post(admin::create::<Product>))
        .route(
            "/products/:id",
            get(admin::show::<Product>)
                .put(admin::update::<Product>)
                .delete(admin::destroy::<Product>),
        )
        .route("/categories", get(admin::list::<Category>).post(admin::create::<Category>))
        .route(
            "/categories/:id",
            get(admin::show::<Category>)
                .put(admin::update::<Category>)
                .delete(admin::destroy::<Category>),
        )
        .route(
            "/example-works",
            get(admin::list::<ExampleWork>).post(admin::create::<ExampleWork>),
        )
        .route(
            "/example-works/:id",
            get(admin::show::<ExampleWork>)
                .put(admin::update::<ExampleWork>)
                .delete(admin::destroy::<ExampleWork>),
        )
        .route(
            "/content",
            get(admin::list::<ContentSection>).post(admin::create::<ContentSection>),
        )
        .route(
            "/content/:id",
            get(admin::show::<ContentSection>)
                .put(admin::update::<ContentSection>)
                .delete(admin::destroy::<ContentSection>),
        )
        .route("/contact", get(admin::list::<ContactInfo>).post(admin::create::<ContactInfo>))
        .route(
            "/contact/:id",
            get(admin::show::<ContactInfo>)
                .put(admin::update::<ContactInfo>)
                .delete(admin::destroy::<ContactInfo>),
        )
}

/// Permissive in development when no origins are configured; otherwise
/// only the listed origins, with credentials so the admin cookie travels.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.server.cors_origins;
    if origins.is_empty() {
        return match config.environment {
            Environment::Development => CorsLayer::permissive(),
            _ => CorsLayer::new(),
        };
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::database::{Fixture, MemoryStore};

    const PASSWORD: &str = "let-me-in";

    fn state_with_env(fixture: Fixture, extra: &[(&str, &str)]) -> AppState {
        let mut env: HashMap<&str, &str> = HashMap::from([
            ("ADMIN_PASSWORD", PASSWORD),
            ("JWT_SECRET", "router-test-secret-router-test-secret"),
        ]);
        env.extend(extra.iter().copied());
        let config = AppConfig::from_lookup(|key: &str| env.get(key).map(|v| v.to_string())).unwrap();
        AppState::new(config, Arc::new(MemoryStore::from_fixture(fixture).unwrap()))
    }

    fn state_with(fixture: Fixture) -> AppState {
        state_with_env(fixture, &[])
    }

    /// Exported site with one guarded page, the login page and a home page.
    fn static_site() -> tempfile::TempDir {
        let site = tempfile::tempdir().unwrap();
        for (path, body) in [
            ("index.html", "home page"),
            ("admin/products/index.html", "admin products page"),
            ("admin/login/index.html", "login page"),
        ] {
            let file = site.path().join(path);
            std::fs::create_dir_all(file.parent().unwrap()).unwrap();
            std::fs::write(file, body).unwrap();
        }
        site
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn fixture() -> Fixture {
        serde_json::from_value(json!({
            "categories": [
                { "id": 1, "name": "Monuments", "slug": "monuments", "description": null, "image_url": null },
                { "id": 2, "name": "Vases", "slug": "vases", "description": null, "image_url": null, "is_active": false }
            ],
            "products": [
                { "id": 1, "name": "Black stele", "slug": "black-stele", "short_description": null, "description": null,
                  "price": "12500", "materials": "granite, Marble", "dimensions": null, "image_url": null, "category_id": 1,
                  "created_at": "2024-01-01T00:00:00Z" },
                { "id": 2, "name": "Grey cross", "slug": "grey-cross", "short_description": "Carved stele top", "description": null,
                  "price": null, "materials": "GRANITE", "dimensions": null, "image_url": null, "category_id": 1,
                  "created_at": "2024-02-01T00:00:00Z" },
                { "id": 3, "name": "Retired urn", "slug": "retired-urn", "short_description": null, "description": null,
                  "price": "900", "materials": "bronze", "dimensions": null, "image_url": null, "category_id": null, "is_active": false }
            ]
        }))
        .unwrap()
    }

    async fn send(state: &AppState, request: Request<Body>) -> Response {
        app(state.clone()).oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn login_cookie(state: &AppState) -> String {
        let response = send(
            state,
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "password": PASSWORD }).to_string()))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers()["set-cookie"].to_str().unwrap().to_string();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn catalog_lists_active_products_with_labels() {
        let state = state_with(fixture());
        let body = body_json(send(&state, get("/api/products?categoryId=abc")).await).await;
        assert_eq!(body["success"], true);
        let items = body["data"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        let labels: Vec<&str> = items.iter().map(|p| p["price_label"].as_str().unwrap()).collect();
        assert!(labels.contains(&"12 500 ₽"));
        assert!(labels.contains(&"Price on request"));
    }

    #[tokio::test]
    async fn catalog_search_and_category() {
        let state = state_with(fixture());
        let body = body_json(send(&state, get("/api/products?categoryId=1&search=STELE")).await).await;
        let names: Vec<&str> = body["data"].as_array().unwrap().iter().map(|p| p["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Grey cross", "Black stele"]);
    }

    #[tokio::test]
    async fn filter_options_aggregate_active_rows() {
        let state = state_with(fixture());
        let body = body_json(send(&state, get("/api/products/filters")).await).await;
        assert_eq!(body["data"]["materials"], json!(["Granite", "Marble"]));
        assert_eq!(body["data"]["categories"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["data"]["sort_options"].as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn inactive_product_is_not_found_publicly() {
        let state = state_with(fixture());
        assert_eq!(send(&state, get("/api/products/3")).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(send(&state, get("/api/products/xyz")).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_pages_redirect_without_cookie() {
        let state = state_with(fixture());
        let response = send(&state, get("/admin/products")).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()["location"], "/admin/login");

        // No static directory is configured, so the login page itself is a plain 404.
        assert_eq!(send(&state, get("/admin/login")).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn static_export_is_served_behind_the_gate() {
        let site = static_site();
        let dir = site.path().to_string_lossy().to_string();
        let state = state_with_env(fixture(), &[("STATIC_DIR", dir.as_str())]);

        let home = send(&state, get("/index.html")).await;
        assert_eq!(home.status(), StatusCode::OK);
        assert_eq!(body_text(home).await, "home page");

        let login = send(&state, get("/admin/login/index.html")).await;
        assert_eq!(login.status(), StatusCode::OK);
        assert_eq!(body_text(login).await, "login page");

        for path in [
            "/admin/products/index.html",
            "/%61dmin/products/index.html",
            "/admin%2Fproducts/index.html",
            "//admin/products/index.html",
            "/admin/login/..%2Fproducts/index.html",
        ] {
            let response = send(&state, get(path)).await;
            assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{path}");
            assert_eq!(response.headers()["location"], "/admin/login");
        }

        let cookie = login_cookie(&state).await;
        let request = Request::builder()
            .uri("/admin/products/index.html")
            .header("cookie", &cookie)
            .body(Body::empty())
            .unwrap();
        let page = send(&state, request).await;
        assert_eq!(page.status(), StatusCode::OK);
        assert_eq!(body_text(page).await, "admin products page");
    }

    #[tokio::test]
    async fn admin_api_requires_cookie() {
        let state = state_with(fixture());
        let response = send(&state, get("/api/admin/products")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn admin_listing_includes_inactive() {
        let state = state_with(fixture());
        let cookie = login_cookie(&state).await;
        let request = Request::builder()
            .uri("/api/admin/products")
            .header("cookie", &cookie)
            .body(Body::empty())
            .unwrap();
        let body = body_json(send(&state, request).await).await;
        assert_eq!(body["data"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn admin_create_validates_payload() {
        let state = state_with(fixture());
        let cookie = login_cookie(&state).await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/admin/categories")
            .header("cookie", &cookie)
            .header("content-type", "application/json")
            .body(Body::from(json!({ "sort_order": "first" }).to_string()))
            .unwrap();
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let fields: Vec<&str> = body["field_errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["name", "sort_order"]);
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_conflict() {
        let state = state_with(fixture());
        let cookie = login_cookie(&state).await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/admin/categories")
            .header("cookie", &cookie)
            .header("content-type", "application/json")
            .body(Body::from(json!({ "name": "Monuments" }).to_string()))
            .unwrap();
        assert_eq!(send(&state, request).await.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn verify_reports_session_state() {
        let state = state_with(fixture());
        let anonymous = send(&state, get("/api/auth/verify")).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(anonymous).await["authenticated"], false);

        let cookie = login_cookie(&state).await;
        let request = Request::builder()
            .uri("/api/auth/verify")
            .header("cookie", &cookie)
            .body(Body::empty())
            .unwrap();
        let body = body_json(send(&state, request).await).await;
        assert_eq!(body["authenticated"], true);
    }
}
