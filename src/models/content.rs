// src/models/content.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;

// Dados de referência: locais, salas, pacotes e addons. O núcleo de
// reservas só lê estas entidades; quem escreve é o serviço de conteúdo.

// --- 1. Endereço e metadados (estruturas tipadas, nada de JSON solto) ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Equipment {
    pub id: i64,
    pub description: String,
    pub free: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Layout {
    pub name: String,
    pub max_delegates: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomDimensions {
    pub area: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub length: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PackageInclude {
    pub id: i64,
    pub description: String,
}

// --- 2. Local (Venue) ---

// Linha do banco, plana. A API expõe o endereço aninhado, então existe a
// struct `Venue` separada abaixo.
#[derive(Debug, Clone, FromRow)]
pub struct VenueRow {
    pub id: i64,
    pub name: String,
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub summary: Option<String>,
    pub images: Option<Json<Vec<Image>>>,
    pub currency: String,
    pub max_delegates: Option<i32>,
    pub starting_price_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub address: Address,
    // Coordenadas trafegam como string de precisão fixa, nunca como float.
    #[serde(with = "rust_decimal::serde::str")]
    #[schema(value_type = String, example = "60.16990000")]
    pub latitude: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    #[schema(value_type = String, example = "24.93840000")]
    pub longitude: Decimal,
    pub summary: Option<String>,
    pub images: Vec<Image>,
    pub currency: String,
    pub max_delegates: Option<i32>,
    pub starting_price_cents: Option<i64>,
}

impl From<VenueRow> for Venue {
    fn from(row: VenueRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: Address {
                street: row.street,
                postal_code: row.postal_code,
                city: row.city,
                country: row.country,
            },
            latitude: row.latitude,
            longitude: row.longitude,
            summary: row.summary,
            images: row.images.map(|j| j.0).unwrap_or_default(),
            currency: row.currency,
            max_delegates: row.max_delegates,
            starting_price_cents: row.starting_price_cents,
        }
    }
}

/// Item da busca por proximidade: o local mais a distância, em metros, até
/// o ponto consultado. A distância só serve para ordenar/filtrar; nunca é
/// persistida.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VenueSearchResult {
    #[serde(flatten)]
    pub venue: Venue,
    pub distance: f64,
}

// --- 3. Sala ---

#[derive(Debug, Clone, FromRow)]
pub struct Room {
    pub id: i64,
    pub venue_id: i64,
    pub name: String,
    pub min_delegates: i32,
    pub max_delegates: i32,
    pub instant_bookable: bool,
    pub credit_card_required: bool,
    pub description: Option<String>,
    pub images: Option<Json<Vec<Image>>>,
    pub equipments: Option<Json<Vec<Equipment>>>,
    pub layouts: Option<Json<Vec<Layout>>>,
    pub dimensions: Option<Json<RoomDimensions>>,
}

// --- 4. Pacote ---
// Um pacote reserva TODAS as salas do conjunto `rooms` de uma vez.
#[derive(Debug, Clone, FromRow)]
pub struct Package {
    pub id: i64,
    pub venue_id: i64,
    pub name: String,
    pub min_delegates: i32,
    pub max_delegates: i32,
    pub rooms: Vec<i64>,
    pub info: Option<String>,
    pub includes: Option<Json<Vec<PackageInclude>>>,
}

// --- 5. Addon ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Addon {
    pub id: i64,
    pub venue_id: i64,
    pub description: String,
    pub category: String,
    pub currency: String,
    // Centavos, sempre inteiros.
    pub amount: i64,
    pub amount_inc_tax: i64,
    pub unit: String,
    // Quando presentes, restringem o addon a salas/pacotes específicos.
    pub available_rooms: Option<Vec<i64>>,
    pub package_addon: bool,
    pub available_packages: Option<Vec<i64>>,
}

impl Addon {
    /// O addon pode ser vendido para esta sala?
    pub fn applies_to_room(&self, room_id: i64) -> bool {
        match &self.available_rooms {
            Some(rooms) => rooms.contains(&room_id),
            None => true,
        }
    }

    /// O addon pode ser vendido para este pacote?
    pub fn applies_to_package(&self, package_id: i64) -> bool {
        match &self.available_packages {
            Some(packages) => packages.contains(&package_id),
            None => self.package_addon || self.available_rooms.is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addon(rooms: Option<Vec<i64>>, packages: Option<Vec<i64>>, package_addon: bool) -> Addon {
        Addon {
            id: 1,
            venue_id: 1,
            description: "Projetor".into(),
            category: "equipment".into(),
            currency: "EUR".into(),
            amount: 1000,
            amount_inc_tax: 1200,
            unit: "piece".into(),
            available_rooms: rooms,
            package_addon,
            available_packages: packages,
        }
    }

    #[test]
    fn addon_sem_restricao_vale_para_qualquer_sala() {
        assert!(addon(None, None, false).applies_to_room(42));
    }

    #[test]
    fn addon_restrito_so_vale_para_as_salas_listadas() {
        let a = addon(Some(vec![1, 2]), None, false);
        assert!(a.applies_to_room(2));
        assert!(!a.applies_to_room(3));
    }

    #[test]
    fn addon_restrito_a_salas_nao_vale_para_pacotes() {
        let a = addon(Some(vec![1]), None, false);
        assert!(!a.applies_to_package(7));
    }

    #[test]
    fn addon_de_pacote_respeita_a_lista_de_pacotes() {
        let a = addon(None, Some(vec![7]), true);
        assert!(a.applies_to_package(7));
        assert!(!a.applies_to_package(8));
    }
}
