// src/services/search_service.rs

use std::collections::{HashMap, HashSet};

use rust_decimal::prelude::ToPrimitive;

use crate::{
    common::error::AppError,
    common::geo::{self, GeoPoint},
    db::{ContentRepository, OrderRepository},
    models::availability::{BookingWindow, PaginatedResponse},
    models::content::{Venue, VenueRow, VenueSearchResult},
};

pub const DEFAULT_RADIUS_METERS: f64 = 5_000.0;
pub const DEFAULT_LIMIT: i64 = 20;

/// Parâmetros já validados da busca por proximidade.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub origin: GeoPoint,
    pub radius_meters: f64,
    pub limit: i64,
    pub offset: i64,
    pub delegates: Option<i32>,
    pub window: Option<BookingWindow>,
}

#[derive(Clone)]
pub struct SearchService {
    content: ContentRepository,
    orders: OrderRepository,
}

impl SearchService {
    pub fn new(content: ContentRepository, orders: OrderRepository) -> Self {
        Self { content, orders }
    }

    /// Pipeline da busca: candidatos por capacidade -> distância -> raio ->
    /// (com janela) pelo menos uma sala livre -> ordenação -> paginação.
    ///
    /// `total_results` é a contagem DEPOIS dos filtros e ANTES do
    /// offset/limit.
    pub async fn search_venues(
        &self,
        params: SearchParams,
    ) -> Result<PaginatedResponse<VenueSearchResult>, AppError> {
        let venues = self.content.list_venues(params.delegates).await?;

        // Coordenadas vêm do banco com precisão fixa; a conversão para f64
        // acontece só aqui, para o cálculo de distância.
        let mut entries: Vec<(i64, GeoPoint)> = Vec::with_capacity(venues.len());
        for venue in &venues {
            let lat = venue.latitude.to_f64().unwrap_or(f64::NAN);
            let lng = venue.longitude.to_f64().unwrap_or(f64::NAN);
            match GeoPoint::new(lat, lng) {
                Ok(point) => entries.push((venue.id, point)),
                // Dado de referência corrompido não derruba a busca toda.
                Err(_) => {
                    tracing::warn!("Local {} com coordenadas inválidas; ignorado.", venue.id);
                }
            }
        }

        let mut ranked = geo::rank_venues(params.origin, &entries, params.radius_meters);

        if let Some(window) = params.window {
            let venue_ids: Vec<i64> = ranked.iter().map(|(id, _)| *id).collect();
            let rooms = self
                .content
                .rooms_by_venues(&venue_ids, params.delegates)
                .await?;
            let room_ids: Vec<i64> = rooms.iter().map(|r| r.id).collect();
            let busy: HashSet<i64> = self
                .orders
                .booked_room_ids(&room_ids, window)
                .await?
                .into_iter()
                .collect();

            let mut venues_with_free_room: HashSet<i64> = HashSet::new();
            for room in &rooms {
                if !busy.contains(&room.id) {
                    venues_with_free_room.insert(room.venue_id);
                }
            }
            ranked.retain(|(id, _)| venues_with_free_room.contains(id));
        }

        let total_results = ranked.len();
        let page = paginate(ranked, params.offset, params.limit);

        let mut by_id: HashMap<i64, VenueRow> =
            venues.into_iter().map(|v| (v.id, v)).collect();
        let items: Vec<VenueSearchResult> = page
            .into_iter()
            .filter_map(|(id, distance)| {
                by_id.remove(&id).map(|row| VenueSearchResult {
                    venue: Venue::from(row),
                    distance,
                })
            })
            .collect();

        Ok(PaginatedResponse {
            results: items.len(),
            items,
            total_results,
            offset: params.offset,
            limit: params.limit,
        })
    }
}

/// Recorta a página [offset, offset+limit) da lista já ordenada.
fn paginate<T>(items: Vec<T>, offset: i64, limit: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginacao_recorta_depois_da_ordenacao() {
        let items = vec![10, 20, 30, 40, 50];
        assert_eq!(paginate(items.clone(), 0, 2), vec![10, 20]);
        assert_eq!(paginate(items.clone(), 2, 2), vec![30, 40]);
        assert_eq!(paginate(items.clone(), 4, 10), vec![50]);
        assert_eq!(paginate(items, 9, 10), Vec::<i32>::new());
    }

    #[test]
    fn limite_zero_devolve_pagina_vazia() {
        assert_eq!(paginate(vec![1, 2, 3], 0, 0), Vec::<i32>::new());
    }
}
