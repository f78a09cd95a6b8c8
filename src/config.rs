// src/config.rs

use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, str::FromStr, time::Duration};

use crate::db::{ContentRepository, OrderRepository};
use crate::services::{AvailabilityService, OrderService, PricingEngine, SearchService};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub search_service: SearchService,
    pub availability_service: AvailabilityService,
    pub order_service: OrderService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Taxa de imposto configurável; 20% por padrão.
        let tax_rate = match env::var("TAX_RATE") {
            Ok(raw) => Decimal::from_str(&raw)
                .map_err(|_| anyhow::anyhow!("TAX_RATE inválida: '{}'", raw))?,
            Err(_) => Decimal::new(20, 2),
        };

        // O acquire_timeout limita toda chamada ao banco: estourou, o erro
        // vira StoreUnavailable e o cliente pode repetir.
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?; // <-- Se falhar, retorna um Err em vez de dar panic ou exit

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let content_repo = ContentRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let pricing = PricingEngine::new(tax_rate);

        let search_service = SearchService::new(content_repo.clone(), order_repo.clone());
        let availability_service =
            AvailabilityService::new(content_repo.clone(), order_repo.clone(), pricing.clone());
        let order_service =
            OrderService::new(order_repo, content_repo, pricing, db_pool.clone());

        // Retorna Ok com o estado montado
        Ok(Self {
            db_pool,
            search_service,
            availability_service,
            order_service,
        })
    }
}
