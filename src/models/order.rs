// src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- 1. Status do pedido ---
// Pedidos nunca são apagados: só transicionam de status, para preservar o
// histórico de auditoria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")] // Banco
#[serde(rename_all = "lowercase")] // JSON
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl OrderStatus {
    /// Transições permitidas: pending -> confirmed e pending -> cancelled.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

// --- 2. Pedido (a reserva em si) ---

#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: i64,
    pub availability_id: String,
    pub customer_id: String,
    pub booking_reference: String,
    pub status: OrderStatus,
    pub room_id: Option<i64>,
    pub package_id: Option<i64>,
    pub layout: Option<String>,
    pub additional_notes: Option<String>,
    pub host_name: Option<String>,
    pub event_name: Option<String>,
    pub currency: String,
    pub amount_inc_tax: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub delegates: Option<i32>,
    pub created_date: DateTime<Utc>,
}

// --- 3. Itens do pedido ---
// Uma linha para a cobrança base (sala ou pacote) e uma por addon.
// Imutáveis após a criação.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct OrderItem {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub order_id: i64,
    #[serde(skip)]
    pub addon_id: Option<i64>,
    pub name: String,
    pub product: String,
    pub quantity: i32,
    pub unit: String,
    pub unit_price: i64,
    pub unit_price_inc_tax: i64,
    pub amount: i64,
    pub amount_inc_tax: i64,
    pub is_package_content: bool,
}

// --- 4. Mensagens do pedido (log append-only) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct OrderMessage {
    pub id: i64,
    #[serde(skip)]
    pub order_id: i64,
    pub message: String,
    pub sender: String,
    pub created_at: DateTime<Utc>,
}

// --- 5. Formas de resposta da API ---

/// Resposta da criação: id interno + referência compartilhável.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderInfo {
    pub id: i64,
    pub booking_reference: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomDetails {
    pub name: String,
    pub layout: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderDetails {
    pub id: i64,
    pub booking_reference: String,
    pub status: OrderStatus,
    pub created_date: DateTime<Utc>,
    pub currency: String,
    pub amount_inc_tax: i64,
    pub host_name: Option<String>,
    pub event_name: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub delegates: Option<i32>,
    pub rooms: Vec<RoomDetails>,
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_pode_confirmar_e_cancelar() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn estados_finais_nao_transicionam() {
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Confirmed));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }
}
