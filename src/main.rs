//src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Lida com o Result retornado por AppState::new()
    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Busca por proximidade (janela opcional)
    let search_routes = Router::new().route("/venues", get(handlers::search::search_venues));

    // Disponibilidade de salas e pacotes
    let availability_routes = Router::new()
        .route(
            "/venues",
            get(handlers::availability::get_venues_availability),
        )
        .route("/venues/{id}", get(handlers::availability::get_venue_rooms))
        .route(
            "/venues/{id}/packages",
            get(handlers::availability::get_venue_packages),
        )
        .route(
            "/venues/{id}/day",
            get(handlers::availability::get_day_availability),
        )
        .route(
            "/meetingrooms/{id}",
            get(handlers::availability::get_meeting_room),
        )
        .route("/packages/{id}", get(handlers::availability::get_package));

    // Pedidos: criação transacional, status, mensagens
    let order_routes = Router::new()
        .route("/", post(handlers::orders::create_order))
        .route(
            "/{id}",
            get(handlers::orders::get_order).put(handlers::orders::update_order),
        )
        .route(
            "/{id}/messages",
            get(handlers::orders::get_messages).post(handlers::orders::send_message),
        );

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/search", search_routes)
        .nest("/api/availability", availability_routes)
        .nest("/api/orders", order_routes)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
