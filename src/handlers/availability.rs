// src/handlers/availability.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::AppError,
    common::geo::GeoPoint,
    config::AppState,
    handlers::{parse_date, parse_window_params},
    services::search_service::{SearchParams, DEFAULT_LIMIT, DEFAULT_RADIUS_METERS},
};

// ---
// Query: disponibilidade de locais (busca com janela obrigatória)
// ---
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityVenuesQuery {
    pub lat: String,
    pub lng: String,

    #[validate(range(min = 1.0, message = "O raio deve ser positivo."))]
    pub radius: Option<f64>,

    #[validate(range(min = 1, max = 100, message = "O limite deve estar entre 1 e 100."))]
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "O offset não pode ser negativo."))]
    pub offset: Option<i64>,

    #[validate(
        required(message = "O campo 'delegates' é obrigatório."),
        range(min = 1, message = "O número de participantes deve ser positivo.")
    )]
    pub delegates: Option<i32>,

    #[validate(required(message = "O campo 'start_date' é obrigatório."))]
    pub start_date: Option<String>,

    #[validate(required(message = "O campo 'start_time' é obrigatório."))]
    pub start_time: Option<String>,

    #[validate(
        required(message = "O campo 'duration' é obrigatório."),
        range(min = 1, message = "A duração deve ser de pelo menos 1 hora.")
    )]
    pub duration: Option<i64>,
}

// ---
// Query: disponibilidade de salas/pacotes de um local
// ---
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoomAvailabilityQuery {
    #[validate(range(min = 1, message = "O número de participantes deve ser positivo."))]
    pub delegates: Option<i32>,

    // Sem janela, a resposta é disponibilidade grosseira: nenhuma reserva
    // existente é levada em conta.
    pub start_date: Option<String>,
    pub start_time: Option<String>,
    #[validate(range(min = 1, message = "A duração deve ser de pelo menos 1 hora."))]
    pub duration: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DayAvailabilityQuery {
    /// Data no formato YYYY-MM-DD.
    pub date: String,
}

// ---
// Handler: get_venues_availability
// ---
#[utoipa::path(
    get,
    path = "/api/availability/venues",
    tag = "Availability",
    params(AvailabilityVenuesQuery),
    responses(
        (status = 200, description = "Locais com ao menos uma sala livre na janela"),
        (status = 400, description = "Parâmetros inválidos"),
    )
)]
pub async fn get_venues_availability(
    State(app_state): State<AppState>,
    Query(params): Query<AvailabilityVenuesQuery>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;

    let origin = GeoPoint::parse(&params.lat, &params.lng)?;
    // Depois do validate(), os três parâmetros da janela estão presentes.
    let window = parse_window_params(
        params.start_date.as_deref(),
        params.start_time.as_deref(),
        params.duration,
    )?;

    let result = app_state
        .search_service
        .search_venues(SearchParams {
            origin,
            radius_meters: params.radius.unwrap_or(DEFAULT_RADIUS_METERS),
            limit: params.limit.unwrap_or(DEFAULT_LIMIT),
            offset: params.offset.unwrap_or(0),
            delegates: params.delegates,
            window,
        })
        .await?;

    Ok((StatusCode::OK, Json(result)))
}

// ---
// Handler: get_venue_rooms
// ---
#[utoipa::path(
    get,
    path = "/api/availability/venues/{id}",
    tag = "Availability",
    params(("id" = i64, Path, description = "Id do local"), RoomAvailabilityQuery),
    responses(
        (status = 200, description = "Salas livres do local"),
        (status = 404, description = "Local não encontrado"),
    )
)]
pub async fn get_venue_rooms(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<RoomAvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let window = parse_window_params(
        params.start_date.as_deref(),
        params.start_time.as_deref(),
        params.duration,
    )?;

    let rooms = app_state
        .availability_service
        .rooms_available(id, window, params.delegates)
        .await?;
    Ok((StatusCode::OK, Json(rooms)))
}

// ---
// Handler: get_venue_packages
// ---
#[utoipa::path(
    get,
    path = "/api/availability/venues/{id}/packages",
    tag = "Availability",
    params(("id" = i64, Path, description = "Id do local"), RoomAvailabilityQuery),
    responses(
        (status = 200, description = "Pacotes com todas as salas livres"),
        (status = 404, description = "Local não encontrado"),
    )
)]
pub async fn get_venue_packages(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<RoomAvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let window = parse_window_params(
        params.start_date.as_deref(),
        params.start_time.as_deref(),
        params.duration,
    )?;

    let packages = app_state
        .availability_service
        .packages_available(id, window, params.delegates)
        .await?;
    Ok((StatusCode::OK, Json(packages)))
}

// ---
// Handler: get_day_availability
// ---
#[utoipa::path(
    get,
    path = "/api/availability/venues/{id}/day",
    tag = "Availability",
    params(("id" = i64, Path, description = "Id do local"), DayAvailabilityQuery),
    responses(
        (status = 200, description = "Status de cada sala no dia"),
        (status = 404, description = "Local não encontrado"),
    )
)]
pub async fn get_day_availability(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<DayAvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&params.date)?;
    let availability = app_state
        .availability_service
        .day_availability(id, date)
        .await?;
    Ok((StatusCode::OK, Json(availability)))
}

// ---
// Handler: get_meeting_room
// ---
#[utoipa::path(
    get,
    path = "/api/availability/meetingrooms/{id}",
    tag = "Availability",
    params(("id" = i64, Path, description = "Id da sala"), RoomAvailabilityQuery),
    responses(
        (status = 200, description = "Disponibilidade da sala"),
        (status = 404, description = "Sala não encontrada"),
        (status = 409, description = "Sala já reservada na janela"),
    )
)]
pub async fn get_meeting_room(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<RoomAvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let window = parse_window_params(
        params.start_date.as_deref(),
        params.start_time.as_deref(),
        params.duration,
    )?;

    let room = app_state
        .availability_service
        .room_availability(id, window, params.delegates)
        .await?;
    Ok((StatusCode::OK, Json(room)))
}

// ---
// Handler: get_package
// ---
#[utoipa::path(
    get,
    path = "/api/availability/packages/{id}",
    tag = "Availability",
    params(("id" = i64, Path, description = "Id do pacote"), RoomAvailabilityQuery),
    responses(
        (status = 200, description = "Disponibilidade do pacote"),
        (status = 404, description = "Pacote não encontrado"),
        (status = 409, description = "Alguma sala do pacote já reservada na janela"),
    )
)]
pub async fn get_package(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<RoomAvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let window = parse_window_params(
        params.start_date.as_deref(),
        params.start_time.as_deref(),
        params.duration,
    )?;

    let package = app_state
        .availability_service
        .package_availability(id, window, params.delegates)
        .await?;
    Ok((StatusCode::OK, Json(package)))
}
