use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;
use triplog::{
    config::{AppConfig, StorageBackend},
    entry::RequiredFields,
    routes::create_router,
    services::{
        ledger::TripLedger,
        storage::{JsonFileStore, TripRepository},
    },
    state::AppState,
};

async fn app() -> (Router, AppState, TempDir) {
    let root = TempDir::new().unwrap();
    let trips_file = root.path().join("fleetTrips.json");
    let config = AppConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        storage: StorageBackend::JsonFile(trips_file.clone()),
        cookie_secret: "http-test-secret".into(),
        required_fields: RequiredFields::default(),
    };
    let repo: Arc<dyn TripRepository> = Arc::new(JsonFileStore::new(trips_file));
    let ledger = TripLedger::open(repo).await.unwrap();
    let state = AppState::new(config, ledger);
    (create_router(state.clone()), state, root)
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
}

/// `name=value` part of the first Set-Cookie header.
fn session_cookie(response: &axum::response::Response) -> String {
    let raw = response.headers()[header::SET_COOKIE].to_str().unwrap();
    raw.split(';').next().unwrap().to_string()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

const COMPLETE: &str = "driver_name=Ana&vehicle_type=picape-tipo01&vehicle_plate=ABC-1234\
&date=2024-05-01&start_location=Base&departure_time=23%3A50&initial_kilometers=1000\
&destination=Obra&arrival_time=00%3A10&final_kilometers=1030&activity=";

#[tokio::test]
async fn root_redirects_to_listing() {
    let (router, _, _root) = app().await;
    let response = router.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/trips");
}

#[tokio::test]
async fn empty_listing_says_so() {
    let (router, _, _root) = app().await;
    let response = router.oneshot(get("/trips")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Nenhuma viagem registrada."));
}

#[tokio::test]
async fn valid_submission_is_recorded_and_redirects() {
    let (router, state, _root) = app().await;
    let body = format!("{COMPLETE}&action=submit");
    let response = router
        .clone()
        .oneshot(form_post("/trips/new", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response.headers().contains_key(header::SET_COOKIE));

    let trips = state.ledger.snapshot().await;
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].vehicle_plate, "ABC-1234");

    let listing = router.oneshot(get("/trips")).await.unwrap();
    let html = body_text(listing).await;
    assert!(html.contains("ABC-1234"));
    assert!(html.contains("30 km"));
    assert!(html.contains("0h 20m"));
}

#[tokio::test]
async fn missing_field_rerenders_form_without_saving() {
    let (router, state, _root) = app().await;
    let body = COMPLETE.replace("vehicle_plate=ABC-1234", "vehicle_plate=");
    let response = router
        .oneshot(form_post("/trips/new", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Preencha todos os campos obrigatórios"));
    assert!(html.contains("value=\"Obra\""));
    assert!(state.ledger.snapshot().await.is_empty());
}

#[tokio::test]
async fn add_stop_chains_from_destination() {
    let (router, state, _root) = app().await;
    let body = format!("{COMPLETE}&action=add_stop");
    let response = router
        .oneshot(form_post("/trips/new", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("name=\"stop_departure_location\" value=\"Obra\""));
    assert!(state.ledger.snapshot().await.is_empty());
}

#[tokio::test]
async fn delete_and_export_follow_the_collection() {
    let (router, state, _root) = app().await;
    router
        .clone()
        .oneshot(form_post("/trips/new", COMPLETE))
        .await
        .unwrap();
    let id = state.ledger.snapshot().await[0].id.clone();

    let export = router
        .clone()
        .oneshot(get("/trips/export?format=csv&q=abc"))
        .await
        .unwrap();
    assert_eq!(export.status(), StatusCode::OK);
    let disposition = export.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("registros-viagens-"));
    assert!(disposition.ends_with(".csv\""));
    let csv = body_text(export).await;
    assert_eq!(csv.lines().count(), 2);

    let xlsx = router
        .clone()
        .oneshot(get("/trips/export"))
        .await
        .unwrap();
    assert_eq!(xlsx.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(form_post(&format!("/trips/{id}/delete"), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(state.ledger.snapshot().await.is_empty());

    let missing = router
        .clone()
        .oneshot(form_post(&format!("/trips/{id}/delete"), ""))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&missing);

    let listing = router
        .oneshot(with_cookie(get("/trips"), &cookie))
        .await
        .unwrap();
    let html = body_text(listing).await;
    assert!(html.contains("flash-error"));
    assert!(html.contains("Viagem não encontrada"));
}

#[tokio::test]
async fn out_of_range_odometers_still_list_and_export() {
    let (router, state, _root) = app().await;
    let body = COMPLETE
        .replace("initial_kilometers=1000", "initial_kilometers=9223372036854775807")
        .replace("final_kilometers=1030", "final_kilometers=-2");
    let response = router
        .clone()
        .oneshot(form_post("/trips/new", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.ledger.snapshot().await.len(), 1);

    let listing = router.clone().oneshot(get("/trips")).await.unwrap();
    assert_eq!(listing.status(), StatusCode::OK);
    let html = body_text(listing).await;
    assert!(html.contains("9223372036854775807"));
    assert!(html.contains("N/A"));

    for uri in ["/trips/export?format=csv", "/trips/export?format=xlsx"] {
        let export = router.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(export.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn unreadable_odometers_rerender_form() {
    let (router, state, _root) = app().await;
    let body = format!(
        "{}&stop_id=s1&stop_destination=Posto&stop_departure_location=Obra\
         &stop_arrival_time=&stop_departure_time=&stop_kilometers_at_arrival=muito\
         &stop_activity=&action=submit",
        COMPLETE.replace("initial_kilometers=1000", "initial_kilometers=mil")
    );
    let response = router
        .oneshot(form_post("/trips/new", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Valor numérico inválido"));
    assert!(html.contains("Kilometragem Inicial"));
    assert!(html.contains("Km na chegada (Parada 1)"));
    assert!(html.contains("value=\"Posto\""));
    assert!(state.ledger.snapshot().await.is_empty());
}

#[tokio::test]
async fn unknown_sort_falls_back_to_default_order() {
    let (router, _, _root) = app().await;
    for uri in ["/trips?sort=mileage&dir=up", "/trips?sort=&dir="] {
        let response = router.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }
}
