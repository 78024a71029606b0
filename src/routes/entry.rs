use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::{Form, PrivateCookieJar};
use serde::Deserialize;
use tracing::debug;

use crate::{
    entry::{normalize_optional, Field, RequiredFields, TripDraft},
    error::AppError,
    flash::{self, Flash},
    models::trip::{Stop, VehicleType},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/new", get(new_trip_form).post(new_trip_submit))
}

struct VehicleOption {
    code: &'static str,
    label: &'static str,
    selected: bool,
}

struct StopInput {
    number: usize,
    id: String,
    destination: String,
    departure_location: String,
    arrival_time: String,
    departure_time: String,
    kilometers_at_arrival: String,
    activity: String,
}

#[derive(Template)]
#[template(path = "trips/new.html")]
struct TripFormTemplate {
    show_error: bool,
    error_message: String,
    require_driver: bool,
    require_arrival: bool,
    driver_name: String,
    vehicle_options: Vec<VehicleOption>,
    vehicle_plate: String,
    date: String,
    start_location: String,
    departure_time: String,
    initial_kilometers: String,
    destination: String,
    arrival_time: String,
    final_kilometers: String,
    activity: String,
    is_substitution: bool,
    stops: Vec<StopInput>,
}

impl TripFormTemplate {
    fn from_draft(draft: &TripDraft, required: RequiredFields) -> Self {
        Self {
            show_error: false,
            error_message: String::new(),
            require_driver: required.driver_name,
            require_arrival: required.arrival,
            driver_name: draft.driver_name.clone(),
            vehicle_options: VehicleType::ALL
                .into_iter()
                .map(|vehicle| VehicleOption {
                    code: vehicle.as_str(),
                    label: vehicle.label(),
                    selected: vehicle == draft.vehicle_type,
                })
                .collect(),
            vehicle_plate: draft.vehicle_plate.clone(),
            date: draft.date.clone(),
            start_location: draft.start_location.clone(),
            departure_time: draft.departure_time.clone(),
            initial_kilometers: number_input(draft.initial_kilometers),
            destination: draft.destination.clone(),
            arrival_time: draft.arrival_time.clone(),
            final_kilometers: number_input(draft.final_kilometers),
            activity: draft.activity.clone(),
            is_substitution: draft.is_substitution,
            stops: draft
                .stops
                .iter()
                .enumerate()
                .map(|(index, stop)| StopInput {
                    number: index + 1,
                    id: stop.id.clone(),
                    destination: stop.destination.clone(),
                    departure_location: stop.departure_location.clone(),
                    arrival_time: stop.arrival_time.clone(),
                    departure_time: stop.departure_time.clone(),
                    kilometers_at_arrival: number_input(stop.kilometers_at_arrival),
                    activity: stop.activity.clone().unwrap_or_default(),
                })
                .collect(),
        }
    }

    fn with_error(mut self, message: String) -> Self {
        self.show_error = true;
        self.error_message = message;
        self
    }
}

fn number_input(value: i64) -> String {
    if value == 0 {
        String::new()
    } else {
        value.to_string()
    }
}

async fn new_trip_form(State(state): State<AppState>) -> impl IntoResponse {
    AskamaTemplateResponse::into_response(TripFormTemplate::from_draft(
        &TripDraft::new(),
        state.config.required_fields,
    ))
}

/// Raw form body. Stop rows arrive as parallel repeated fields.
#[derive(Debug, Default, Deserialize)]
pub struct TripForm {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub vehicle_plate: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub start_location: String,
    #[serde(default)]
    pub departure_time: String,
    #[serde(default)]
    pub initial_kilometers: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default)]
    pub final_kilometers: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub is_substitution: Option<String>,
    #[serde(default)]
    pub stop_id: Vec<String>,
    #[serde(default)]
    pub stop_destination: Vec<String>,
    #[serde(default)]
    pub stop_departure_location: Vec<String>,
    #[serde(default)]
    pub stop_arrival_time: Vec<String>,
    #[serde(default)]
    pub stop_departure_time: Vec<String>,
    #[serde(default)]
    pub stop_kilometers_at_arrival: Vec<String>,
    #[serde(default)]
    pub stop_activity: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    AddStop,
    RemoveStop(String),
    Submit,
}

impl FormAction {
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some(("remove_stop", id)) => FormAction::RemoveStop(id.to_string()),
            _ if raw == "add_stop" => FormAction::AddStop,
            _ => FormAction::Submit,
        }
    }
}

fn nth(values: &[String], index: usize) -> String {
    values.get(index).cloned().unwrap_or_default()
}

/// Blank reads as zero. Anything else that is not a whole number is
/// reported under `label`.
fn read_km(raw: &str, label: impl FnOnce() -> String, unreadable: &mut Vec<String>) -> i64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }
    raw.parse().unwrap_or_else(|_| {
        unreadable.push(label());
        0
    })
}

/// Draft rebuilt from a posted form, with the odometer inputs that could
/// not be read.
#[derive(Debug)]
pub struct PostedDraft {
    pub action: FormAction,
    pub draft: TripDraft,
    pub unreadable: Vec<String>,
}

impl PostedDraft {
    pub fn unreadable_message(&self) -> Option<String> {
        if self.unreadable.is_empty() {
            None
        } else {
            Some(format!(
                "Valor numérico inválido: {}",
                self.unreadable.join(", ")
            ))
        }
    }
}

impl TripForm {
    pub fn into_draft(self) -> PostedDraft {
        let action = FormAction::parse(&self.action);
        let mut unreadable = Vec::new();

        let initial_kilometers = read_km(
            &self.initial_kilometers,
            || Field::InitialKilometers.label().to_string(),
            &mut unreadable,
        );
        let final_kilometers = read_km(
            &self.final_kilometers,
            || Field::FinalKilometers.label().to_string(),
            &mut unreadable,
        );

        let mut stops = Vec::with_capacity(self.stop_id.len());
        for (index, id) in self.stop_id.iter().enumerate() {
            let kilometers_at_arrival = read_km(
                &nth(&self.stop_kilometers_at_arrival, index),
                || format!("Km na chegada (Parada {})", index + 1),
                &mut unreadable,
            );
            stops.push(Stop {
                id: id.clone(),
                destination: nth(&self.stop_destination, index),
                departure_location: nth(&self.stop_departure_location, index),
                arrival_time: nth(&self.stop_arrival_time, index),
                departure_time: nth(&self.stop_departure_time, index),
                kilometers_at_arrival,
                activity: normalize_optional(Some(nth(&self.stop_activity, index))),
            });
        }

        let draft = TripDraft {
            driver_name: self.driver_name,
            vehicle_type: self.vehicle_type,
            vehicle_plate: self.vehicle_plate,
            date: self.date,
            start_location: self.start_location,
            departure_time: self.departure_time,
            initial_kilometers,
            destination: self.destination,
            arrival_time: self.arrival_time,
            final_kilometers,
            activity: self.activity,
            is_substitution: self.is_substitution.is_some(),
            stops,
        };
        PostedDraft {
            action,
            draft,
            unreadable,
        }
    }
}

async fn new_trip_submit(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<TripForm>,
) -> Result<Response, AppError> {
    let required = state.config.required_fields;
    let posted = form.into_draft();
    if let Some(message) = posted.unreadable_message() {
        debug!("form rejected: {message}");
        return Ok(render_form(
            &posted.draft,
            required,
            StatusCode::UNPROCESSABLE_ENTITY,
            Some(message),
        ));
    }
    let PostedDraft {
        action, mut draft, ..
    } = posted;

    match action {
        FormAction::AddStop => {
            draft.add_stop();
            debug!(stops = draft.stops.len(), "stop row added");
            Ok(render_form(&draft, required, StatusCode::OK, None))
        }
        FormAction::RemoveStop(id) => {
            draft.remove_stop(&id);
            debug!(stop_id = %id, "stop row removed");
            Ok(render_form(&draft, required, StatusCode::OK, None))
        }
        FormAction::Submit => match draft.submit(required) {
            Ok(trip) => {
                state.ledger.append(trip).await?;
                let jar = flash::push(jar, &Flash::success("Viagem registrada com sucesso!"));
                Ok((jar, Redirect::to("/trips")).into_response())
            }
            Err(err) => {
                debug!("trip rejected: {err}");
                Ok(render_form(
                    &draft,
                    required,
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Some(err.to_string()),
                ))
            }
        },
    }
}

fn render_form(
    draft: &TripDraft,
    required: RequiredFields,
    status: StatusCode,
    error: Option<String>,
) -> Response {
    let template = TripFormTemplate::from_draft(draft, required);
    let template = match error {
        Some(message) => template.with_error(message),
        None => template,
    };
    (status, AskamaTemplateResponse::into_response(template)).into_response()
}
