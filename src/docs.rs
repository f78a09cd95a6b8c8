// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Search ---
        handlers::search::search_venues,

        // --- Availability ---
        handlers::availability::get_venues_availability,
        handlers::availability::get_venue_rooms,
        handlers::availability::get_venue_packages,
        handlers::availability::get_day_availability,
        handlers::availability::get_meeting_room,
        handlers::availability::get_package,

        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::orders::get_messages,
        handlers::orders::send_message,
    ),
    components(
        schemas(
            // --- Conteúdo ---
            models::content::Address,
            models::content::Image,
            models::content::Equipment,
            models::content::Layout,
            models::content::RoomDimensions,
            models::content::PackageInclude,
            models::content::Venue,
            models::content::VenueSearchResult,
            models::content::Addon,

            // --- Disponibilidade ---
            models::availability::AvailableRoom,
            models::availability::AvailablePackage,
            models::availability::DayStatus,
            models::availability::RoomDayAvailability,

            // --- Pedidos ---
            models::order::OrderStatus,
            models::order::OrderInfo,
            models::order::OrderItem,
            models::order::OrderMessage,
            models::order::RoomDetails,
            models::order::OrderDetails,

            // --- Payloads ---
            handlers::orders::CreateOrderPayload,
            handlers::orders::OrderAddonPayload,
            handlers::orders::UpdateOrderPayload,
            handlers::orders::SendMessagePayload,
        )
    ),
    tags(
        (name = "Search", description = "Busca de locais por proximidade"),
        (name = "Availability", description = "Disponibilidade de salas e pacotes"),
        (name = "Orders", description = "Criação e acompanhamento de pedidos")
    )
)]
pub struct ApiDoc;
