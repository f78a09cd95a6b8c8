// src/handlers/search.rs

use axum::{
    extract::{Query, State},
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
    handlers::parse_window_params,
    services::search_service::{SearchParams, DEFAULT_LIMIT, DEFAULT_RADIUS_METERS},
};

// ---
// Query: busca de locais por proximidade
// ---
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchVenuesQuery {
    /// Latitude do ponto de busca, em graus decimais.
    pub lat: String,
    /// Longitude do ponto de busca, em graus decimais.
    pub lng: String,

    /// Raio de busca em metros (padrão: 5000).
    #[validate(range(min = 1.0, message = "O raio deve ser positivo."))]
    pub radius: Option<f64>,

    #[validate(range(min = 1, max = 100, message = "O limite deve estar entre 1 e 100."))]
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "O offset não pode ser negativo."))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, message = "O número de participantes deve ser positivo."))]
    pub delegates: Option<i32>,

    // Janela opcional: quando presente, só entram locais com ao menos uma
    // sala livre no período.
    pub start_date: Option<String>,
    pub start_time: Option<String>,
    #[validate(range(min = 1, message = "A duração deve ser de pelo menos 1 hora."))]
    pub duration: Option<i64>,
}

// ---
// Handler: search_venues
// ---
#[utoipa::path(
    get,
    path = "/api/search/venues",
    tag = "Search",
    params(SearchVenuesQuery),
    responses(
        (status = 200, description = "Locais dentro do raio, ordenados por distância"),
        (status = 400, description = "Coordenadas ou parâmetros inválidos"),
    )
)]
pub async fn search_venues(
    State(app_state): State<AppState>,
    Query(params): Query<SearchVenuesQuery>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;

    // Coordenadas são validadas ANTES de qualquer acesso ao banco.
    let origin = GeoPoint::parse(&params.lat, &params.lng)?;
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
