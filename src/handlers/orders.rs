// src/handlers/orders.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::availability::BookingWindow,
    models::order::OrderStatus,
    services::order_service::{CreateOrderData, OrderAddonRequest},
};

// ---
// Payload: CreateOrder
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderPayload {
    #[validate(length(min = 1, message = "O campo 'availability_id' é obrigatório."))]
    pub availability_id: String,

    #[validate(length(min = 1, message = "O campo 'customer_id' é obrigatório."))]
    pub customer_id: String,

    pub room_id: Option<i64>,
    pub layout: Option<String>,
    pub additional_notes: Option<String>,
    pub host_name: Option<String>,
    pub event_name: Option<String>,

    // A janela é obrigatória para criar um pedido: sem ela a reserva nunca
    // entraria nas verificações de conflito.
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,

    #[validate(range(min = 1, message = "O número de participantes deve ser positivo."))]
    pub delegates: Option<i32>,

    #[validate(nested)]
    pub addons: Option<Vec<OrderAddonPayload>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OrderAddonPayload {
    pub id: i64,

    #[validate(range(min = 1, message = "A quantidade deve ser pelo menos 1."))]
    pub quantity: i32,
}

impl CreateOrderPayload {
    fn window(&self) -> Result<BookingWindow, AppError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => BookingWindow::new(start, end),
            _ => Err(AppError::InvalidParameter(
                "um pedido precisa de 'start' e 'end'".into(),
            )),
        }
    }
}

// ---
// Handler: create_order
// ---
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado", body = crate::models::order::OrderInfo),
        (status = 409, description = "Recurso já reservado na janela"),
        (status = 422, description = "Addon inválido"),
    )
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let window = payload.window()?;

    let info = app_state
        .order_service
        .create_order(CreateOrderData {
            availability_id: payload.availability_id,
            customer_id: payload.customer_id,
            room_id: payload.room_id,
            layout: payload.layout,
            additional_notes: payload.additional_notes,
            host_name: payload.host_name,
            event_name: payload.event_name,
            window,
            delegates: payload.delegates,
            addons: payload
                .addons
                .unwrap_or_default()
                .into_iter()
                .map(|a| OrderAddonRequest {
                    id: a.id,
                    quantity: a.quantity,
                })
                .collect(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(info)))
}

// ---
// Handler: get_order
// ---
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = i64, Path, description = "Id do pedido")),
    responses(
        (status = 200, description = "Detalhes do pedido", body = crate::models::order::OrderDetails),
        (status = 404, description = "Pedido não encontrado"),
    )
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let details = app_state.order_service.get_order_details(id).await?;
    Ok((StatusCode::OK, Json(details)))
}

// ---
// Payload: UpdateOrder
// ---
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderPayload {
    pub status: OrderStatus,
    pub notes: Option<String>,
}

// ---
// Handler: update_order
// ---
#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = i64, Path, description = "Id do pedido")),
    request_body = UpdateOrderPayload,
    responses(
        (status = 200, description = "Pedido atualizado", body = crate::models::order::OrderDetails),
        (status = 404, description = "Pedido não encontrado"),
        (status = 409, description = "Transição de status inválida"),
    )
)]
pub async fn update_order(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    let details = app_state
        .order_service
        .update_order_status(id, payload.status, payload.notes.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(details)))
}

// ---
// Payload: SendMessage
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessagePayload {
    #[validate(length(min = 1, message = "A mensagem não pode ser vazia."))]
    pub message: String,

    #[validate(length(min = 1, message = "O remetente é obrigatório."))]
    pub sender: String,
}

// ---
// Handler: get_messages
// ---
#[utoipa::path(
    get,
    path = "/api/orders/{id}/messages",
    tag = "Orders",
    params(("id" = i64, Path, description = "Id do pedido")),
    responses(
        (status = 200, description = "Mensagens em ordem de criação"),
        (status = 404, description = "Pedido não encontrado"),
    )
)]
pub async fn get_messages(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let messages = app_state.order_service.list_messages(id).await?;
    Ok((StatusCode::OK, Json(messages)))
}

// ---
// Handler: send_message
// ---
#[utoipa::path(
    post,
    path = "/api/orders/{id}/messages",
    tag = "Orders",
    params(("id" = i64, Path, description = "Id do pedido")),
    request_body = SendMessagePayload,
    responses(
        (status = 201, description = "Mensagem registrada"),
        (status = 404, description = "Pedido não encontrado"),
    )
)]
pub async fn send_message(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let message = app_state
        .order_service
        .send_message(id, &payload.message, &payload.sender)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}
