use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::PrivateCookieJar;
use chrono::Local;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    error::AppError,
    export::{self, ExportFormat},
    flash::{self, Flash},
    listing::{Expansion, ListingQuery, SortDirection, SortKey},
    metrics,
    models::trip::Trip,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(trips_list))
        .route("/export", get(export_trips))
        .route("/:id/delete", post(delete_trip))
}

struct HeaderLink {
    label: &'static str,
    href: String,
    indicator: &'static str,
}

struct StopRow {
    number: usize,
    departure_location: String,
    destination: String,
    arrival_time: String,
    departure_time: String,
    kilometers_at_arrival: i64,
    activity: String,
}

struct TripRow {
    id: String,
    category: &'static str,
    vehicle_label: &'static str,
    plate: String,
    driver: String,
    date: String,
    origin: String,
    destination: String,
    departure_time: String,
    arrival_time: String,
    initial_km: i64,
    final_km: String,
    distance: String,
    duration: String,
    activity: String,
    is_substitution: bool,
    stops: Vec<StopRow>,
    expanded: bool,
    toggle_href: String,
}

#[derive(Template)]
#[template(path = "trips/list.html")]
struct TripsListTemplate {
    show_flash: bool,
    flash_level: &'static str,
    flash_message: String,
    query: String,
    sort: String,
    dir: String,
    headers: Vec<HeaderLink>,
    trips: Vec<TripRow>,
    total: usize,
    export_xlsx_href: String,
    export_csv_href: String,
}

const SORTABLE: [(SortKey, &str); 6] = [
    (SortKey::VehiclePlate, "Placa"),
    (SortKey::Date, "Data"),
    (SortKey::DriverName, "Motorista"),
    (SortKey::StartLocation, "Origem"),
    (SortKey::Destination, "Destino"),
    (SortKey::InitialKilometers, "Km Inicial"),
];

async fn trips_list(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(query): Query<ListingQuery>,
) -> Result<Response, AppError> {
    let (jar, pending) = flash::take(jar);
    let trips = state.ledger.snapshot().await;
    let order = query.order();
    let expansion = query.expansion();

    let headers = SORTABLE
        .iter()
        .map(|&(key, label)| HeaderLink {
            label,
            href: query
                .with_order(order.select(key))
                .with_expansion(Expansion::default())
                .href("/trips"),
            indicator: if order.key != key {
                ""
            } else if order.direction == SortDirection::Asc {
                "▲"
            } else {
                "▼"
            },
        })
        .collect();

    let rows = query
        .apply(&trips)
        .into_iter()
        .map(|trip| trip_row(trip, &query, &expansion))
        .collect();

    let (show_flash, flash_level, flash_message) = match pending {
        Some(flash) => (true, flash.level.as_str(), flash.message),
        None => (false, "", String::new()),
    };

    let template = TripsListTemplate {
        show_flash,
        flash_level,
        flash_message,
        query: query.q.clone(),
        sort: order.key.as_str().to_string(),
        dir: order.direction.as_str().to_string(),
        headers,
        trips: rows,
        total: trips.len(),
        export_xlsx_href: format!("/trips/export?format=xlsx&{}", query.query_string()),
        export_csv_href: format!("/trips/export?format=csv&{}", query.query_string()),
    };
    Ok((jar, AskamaTemplateResponse::into_response(template)).into_response())
}

fn trip_row(trip: &Trip, query: &ListingQuery, expansion: &Expansion) -> TripRow {
    TripRow {
        id: trip.id.clone(),
        category: trip.vehicle_type.category().as_str(),
        vehicle_label: trip.vehicle_type.label(),
        plate: trip.vehicle_plate.clone(),
        driver: trip.driver_text().to_string(),
        date: export::format_date(trip.date),
        origin: trip.start_location.clone(),
        destination: trip.destination.clone(),
        departure_time: trip.departure_time.clone(),
        arrival_time: trip.arrival_text().to_string(),
        initial_km: trip.initial_kilometers,
        final_km: trip
            .final_kilometers
            .map(|km| km.to_string())
            .unwrap_or_else(|| metrics::NOT_AVAILABLE.to_string()),
        distance: metrics::distance_text(trip),
        duration: metrics::duration(trip).to_string(),
        activity: trip.activity_text().to_string(),
        is_substitution: trip.is_substitution,
        stops: trip
            .stops
            .iter()
            .enumerate()
            .map(|(index, stop)| StopRow {
                number: index + 1,
                departure_location: stop.departure_location.clone(),
                destination: stop.destination.clone(),
                arrival_time: stop.arrival_time.clone(),
                departure_time: stop.departure_time.clone(),
                kilometers_at_arrival: stop.kilometers_at_arrival,
                activity: stop.activity.clone().unwrap_or_default(),
            })
            .collect(),
        expanded: expansion.is_expanded(&trip.id),
        toggle_href: query
            .with_expansion(expansion.toggled(&trip.id))
            .href("/trips"),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ExportParams {
    #[serde(default)]
    format: ExportFormat,
}

async fn export_trips(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
    Query(params): Query<ExportParams>,
) -> Result<Response, AppError> {
    let trips = state.ledger.snapshot().await;
    let visible = query.apply(&trips);
    let rows = export::export_rows(&visible);
    let body = export::render(&rows, params.format)?;
    let filename = export::export_filename(Local::now().date_naive(), params.format);
    info!(rows = rows.len(), file = %filename, "trips exported");

    Ok((
        [
            (header::CONTENT_TYPE, params.format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}

async fn delete_trip(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Path(trip_id): Path<String>,
) -> Result<(PrivateCookieJar, Redirect), AppError> {
    let notice = if state.ledger.delete(&trip_id).await? {
        Flash::success("Viagem excluída")
    } else {
        warn!(trip_id = %trip_id, "delete requested for unknown trip");
        Flash::error("Viagem não encontrada")
    };
    let jar = flash::push(jar, &notice);
    Ok((jar, Redirect::to("/trips")))
}
