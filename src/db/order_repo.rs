// src/db/order_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::availability::BookingWindow,
    models::order::{Order, OrderItem, OrderMessage, OrderStatus},
};

const ORDER_COLUMNS: &str = "id, availability_id, customer_id, booking_reference, status, \
     room_id, package_id, layout, additional_notes, host_name, event_name, currency, \
     amount_inc_tax, start_date, end_date, delegates, created_date";

const ITEM_COLUMNS: &str = "id, order_id, addon_id, name, product, quantity, unit, unit_price, \
     unit_price_inc_tax, amount, amount_inc_tax, is_package_content";

/// Argumentos da inserção de um pedido. Agrupados numa struct porque a
/// lista é longa demais para posicionar na chamada sem errar.
pub struct NewOrder<'a> {
    pub availability_id: &'a str,
    pub customer_id: &'a str,
    pub booking_reference: &'a str,
    pub room_id: Option<i64>,
    pub package_id: Option<i64>,
    pub layout: Option<&'a str>,
    pub additional_notes: Option<&'a str>,
    pub host_name: Option<&'a str>,
    pub event_name: Option<&'a str>,
    pub currency: &'a str,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub delegates: Option<i32>,
}

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Verificação de conflito de intervalos
    // ---

    /// Existe algum pedido pending/confirmed vinculado à sala cujo
    /// intervalo [start, end) cruza a janela pedida?
    ///
    /// Teste semiaberto padrão: r.start < end AND r.end > start.
    /// `exclude_order_id` permite re-checar ignorando um pedido (updates
    /// idempotentes).
    pub async fn has_conflict<'e, E>(
        &self,
        executor: E,
        room_id: i64,
        window: BookingWindow,
        exclude_order_id: Option<i64>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let conflict = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM orders o \
                JOIN order_rooms orr ON orr.order_id = o.id \
                WHERE orr.room_id = $1 \
                  AND o.status IN ('pending', 'confirmed') \
                  AND o.start_date < $3 \
                  AND o.end_date > $2 \
                  AND ($4::BIGINT IS NULL OR o.id <> $4) \
             )",
        )
        .bind(room_id)
        .bind(window.start)
        .bind(window.end)
        .bind(exclude_order_id)
        .fetch_one(executor)
        .await?;
        Ok(conflict)
    }

    /// Dentre as salas dadas, quais têm algum pedido pending/confirmed
    /// cruzando a janela. Uma query cobre o leque inteiro da busca.
    pub async fn booked_room_ids(
        &self,
        room_ids: &[i64],
        window: BookingWindow,
    ) -> Result<Vec<i64>, AppError> {
        if room_ids.is_empty() {
            return Ok(Vec::new());
        }
        let booked = sqlx::query_scalar::<_, i64>(
            "SELECT DISTINCT orr.room_id FROM orders o \
             JOIN order_rooms orr ON orr.order_id = o.id \
             WHERE orr.room_id = ANY($1) \
               AND o.status IN ('pending', 'confirmed') \
               AND o.start_date < $3 \
               AND o.end_date > $2",
        )
        .bind(room_ids)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(booked)
    }

    // ---
    // Escritas transacionais
    // ---

    /// Insere o pedido com status pending. Colisão na referência de
    /// reserva (índice único) vira DuplicateReference para o service
    /// tentar de novo com outra referência.
    pub async fn insert_order<'e, E>(
        &self,
        executor: E,
        new_order: NewOrder<'_>,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (availability_id, customer_id, booking_reference, status, \
                 room_id, package_id, layout, additional_notes, host_name, event_name, \
                 currency, start_date, end_date, delegates) \
             VALUES ($1, $2, $3, 'pending', $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(new_order.availability_id)
        .bind(new_order.customer_id)
        .bind(new_order.booking_reference)
        .bind(new_order.room_id)
        .bind(new_order.package_id)
        .bind(new_order.layout)
        .bind(new_order.additional_notes)
        .bind(new_order.host_name)
        .bind(new_order.event_name)
        .bind(new_order.currency)
        .bind(new_order.start_date)
        .bind(new_order.end_date)
        .bind(new_order.delegates)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    let constraint = db_err.constraint().unwrap_or_default();
                    if constraint.contains("booking_reference") {
                        return AppError::DuplicateReference;
                    }
                }
            }
            e.into()
        })
    }

    /// Vincula uma sala ao pedido. Um pacote gera um vínculo por sala.
    pub async fn add_room_binding<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        room_id: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("INSERT INTO order_rooms (order_id, room_id) VALUES ($1, $2)")
            .bind(order_id)
            .bind(room_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        addon_id: Option<i64>,
        name: &str,
        product: &str,
        quantity: i32,
        unit: &str,
        unit_price: i64,
        unit_price_inc_tax: i64,
        amount: i64,
        amount_inc_tax: i64,
        is_package_content: bool,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(&format!(
            "INSERT INTO order_items (order_id, addon_id, name, product, quantity, unit, \
                 unit_price, unit_price_inc_tax, amount, amount_inc_tax, is_package_content) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(order_id)
        .bind(addon_id)
        .bind(name)
        .bind(product)
        .bind(quantity)
        .bind(unit)
        .bind(unit_price)
        .bind(unit_price_inc_tax)
        .bind(amount)
        .bind(amount_inc_tax)
        .bind(is_package_content)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    /// Grava o total agregado do pedido (passo final antes do commit).
    pub async fn update_total<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        amount_inc_tax: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE orders SET amount_inc_tax = $2, updated_at = NOW() WHERE id = $1")
            .bind(order_id)
            .bind(amount_inc_tax)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Busca o pedido travando a linha, para a transição de status não
    /// correr com outra.
    pub async fn get_order_for_update<'e, E>(
        &self,
        executor: E,
        order_id: i64,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(order_id)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        status: OrderStatus,
        notes: Option<&str>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE orders SET status = $2, \
                 additional_notes = COALESCE($3, additional_notes), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(order_id)
        .bind(status)
        .bind(notes)
        .execute(executor)
        .await?;
        Ok(())
    }

    // ---
    // Leituras
    // ---

    pub async fn get_order(&self, order_id: i64) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    pub async fn list_items(&self, order_id: i64) -> Result<Vec<OrderItem>, AppError> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id ASC"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Nomes das salas vinculadas ao pedido, em ordem de id.
    pub async fn room_names(&self, order_id: i64) -> Result<Vec<String>, AppError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT r.name FROM order_rooms orr \
             JOIN rooms r ON r.id = orr.room_id \
             WHERE orr.order_id = $1 \
             ORDER BY r.id ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    /// Mensagens do pedido em ordem de criação (log append-only).
    pub async fn list_messages(&self, order_id: i64) -> Result<Vec<OrderMessage>, AppError> {
        let messages = sqlx::query_as::<_, OrderMessage>(
            "SELECT id, order_id, message, sender, created_at \
             FROM order_messages WHERE order_id = $1 \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    pub async fn insert_message(
        &self,
        order_id: i64,
        message: &str,
        sender: &str,
    ) -> Result<OrderMessage, AppError> {
        let message = sqlx::query_as::<_, OrderMessage>(
            "INSERT INTO order_messages (order_id, message, sender) \
             VALUES ($1, $2, $3) \
             RETURNING id, order_id, message, sender, created_at",
        )
        .bind(order_id)
        .bind(message)
        .bind(sender)
        .fetch_one(&self.pool)
        .await?;
        Ok(message)
    }
}
