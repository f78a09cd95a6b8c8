// src/db/content_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::content::{Addon, Package, Room, VenueRow},
};

const VENUE_COLUMNS: &str = "id, name, street, postal_code, city, country, latitude, longitude, \
     summary, images, currency, max_delegates, starting_price_cents";

const ROOM_COLUMNS: &str = "id, venue_id, name, min_delegates, max_delegates, instant_bookable, \
     credit_card_required, description, images, equipments, layouts, dimensions";

const PACKAGE_COLUMNS: &str =
    "id, venue_id, name, min_delegates, max_delegates, rooms, info, includes";

#[derive(Clone)]
pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras (fora de transação, usam a pool principal)
    // ---

    pub async fn get_venue(&self, venue_id: i64) -> Result<Option<VenueRow>, AppError> {
        let venue = sqlx::query_as::<_, VenueRow>(&format!(
            "SELECT {VENUE_COLUMNS} FROM venues WHERE id = $1"
        ))
        .bind(venue_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(venue)
    }

    /// Todos os locais, opcionalmente filtrados por capacidade máxima.
    pub async fn list_venues(&self, delegates: Option<i32>) -> Result<Vec<VenueRow>, AppError> {
        let venues = sqlx::query_as::<_, VenueRow>(&format!(
            "SELECT {VENUE_COLUMNS} FROM venues \
             WHERE ($1::INT IS NULL OR max_delegates >= $1) \
             ORDER BY id ASC"
        ))
        .bind(delegates)
        .fetch_all(&self.pool)
        .await?;
        Ok(venues)
    }

    /// Salas de um local cuja faixa de capacidade comporta `delegates`.
    pub async fn rooms_by_venue(
        &self,
        venue_id: i64,
        delegates: Option<i32>,
    ) -> Result<Vec<Room>, AppError> {
        let rooms = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms \
             WHERE venue_id = $1 \
               AND ($2::INT IS NULL OR (min_delegates <= $2 AND max_delegates >= $2)) \
             ORDER BY id ASC"
        ))
        .bind(venue_id)
        .bind(delegates)
        .fetch_all(&self.pool)
        .await?;
        Ok(rooms)
    }

    /// Salas de vários locais de uma vez (usado pela busca para checar se
    /// cada local tem ao menos uma sala candidata).
    pub async fn rooms_by_venues(
        &self,
        venue_ids: &[i64],
        delegates: Option<i32>,
    ) -> Result<Vec<Room>, AppError> {
        let rooms = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms \
             WHERE venue_id = ANY($1) \
               AND ($2::INT IS NULL OR (min_delegates <= $2 AND max_delegates >= $2)) \
             ORDER BY id ASC"
        ))
        .bind(venue_ids)
        .bind(delegates)
        .fetch_all(&self.pool)
        .await?;
        Ok(rooms)
    }

    pub async fn packages_by_venue(
        &self,
        venue_id: i64,
        delegates: Option<i32>,
    ) -> Result<Vec<Package>, AppError> {
        let packages = sqlx::query_as::<_, Package>(&format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages \
             WHERE venue_id = $1 \
               AND ($2::INT IS NULL OR (min_delegates <= $2 AND max_delegates >= $2)) \
             ORDER BY id ASC"
        ))
        .bind(venue_id)
        .bind(delegates)
        .fetch_all(&self.pool)
        .await?;
        Ok(packages)
    }

    pub async fn get_room(&self, room_id: i64) -> Result<Option<Room>, AppError> {
        let room = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1"
        ))
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(room)
    }

    pub async fn get_package(&self, package_id: i64) -> Result<Option<Package>, AppError> {
        let package = sqlx::query_as::<_, Package>(&format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages WHERE id = $1"
        ))
        .bind(package_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(package)
    }

    // ---
    // Operações transacionais (recebem o executor da transação)
    // ---

    /// Resolve um addon DENTRO da transação do pedido, para que o preço
    /// cobrado seja o vigente no momento do commit.
    pub async fn get_addon<'e, E>(
        &self,
        executor: E,
        addon_id: i64,
    ) -> Result<Option<Addon>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let addon = sqlx::query_as::<_, Addon>(
            "SELECT id, venue_id, description, category, currency, amount, amount_inc_tax, \
                    unit, available_rooms, package_addon, available_packages \
             FROM addons WHERE id = $1",
        )
        .bind(addon_id)
        .fetch_optional(executor)
        .await?;
        Ok(addon)
    }

    /// Trava as salas alvo com FOR UPDATE e devolve os ids travados.
    ///
    /// A ordem crescente de id é o que impede deadlock entre dois pedidos
    /// de pacote que compartilham salas.
    pub async fn lock_rooms<'e, E>(
        &self,
        executor: E,
        room_ids: &[i64],
    ) -> Result<Vec<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let locked = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM rooms WHERE id = ANY($1) ORDER BY id ASC FOR UPDATE",
        )
        .bind(room_ids)
        .fetch_all(executor)
        .await?;
        Ok(locked)
    }
}
