// src/services/availability_service.rs

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::{
    common::error::AppError,
    db::{ContentRepository, OrderRepository},
    models::availability::{
        AvailablePackage, AvailableRoom, BookingWindow, DayStatus, ResourceRef,
        RoomDayAvailability,
    },
    models::content::{Package, Room},
    services::pricing_service::{Price, PricingEngine},
};

// A disponibilidade aqui é uma leitura de snapshot: serve para o cliente
// escolher, mas quem decide de verdade é a re-verificação dentro da
// transação de criação do pedido.
#[derive(Clone)]
pub struct AvailabilityService {
    content: ContentRepository,
    orders: OrderRepository,
    pricing: PricingEngine,
}

impl AvailabilityService {
    pub fn new(
        content: ContentRepository,
        orders: OrderRepository,
        pricing: PricingEngine,
    ) -> Self {
        Self {
            content,
            orders,
            pricing,
        }
    }

    // --- SALAS DE UM LOCAL ---
    pub async fn rooms_available(
        &self,
        venue_id: i64,
        window: Option<BookingWindow>,
        delegates: Option<i32>,
    ) -> Result<Vec<AvailableRoom>, AppError> {
        check_delegates(delegates)?;

        let venue = self
            .content
            .get_venue(venue_id)
            .await?
            .ok_or(AppError::VenueNotFound)?;

        let rooms = self.content.rooms_by_venue(venue_id, delegates).await?;
        let busy = self.busy_set(&room_ids(&rooms), window).await?;

        let available = free_rooms(rooms, &busy)
            .into_iter()
            .map(|room| {
                let price = self.pricing.room_price(&room, window.as_ref(), delegates);
                to_available_room(room, &venue.currency, price)
            })
            .collect();
        Ok(available)
    }

    // --- PACOTES DE UM LOCAL ---
    // Um pacote está disponível SOMENTE se todas as salas do conjunto
    // estiverem livres; não existe verificação de conflito própria do
    // pacote.
    pub async fn packages_available(
        &self,
        venue_id: i64,
        window: Option<BookingWindow>,
        delegates: Option<i32>,
    ) -> Result<Vec<AvailablePackage>, AppError> {
        check_delegates(delegates)?;

        self.content
            .get_venue(venue_id)
            .await?
            .ok_or(AppError::VenueNotFound)?;

        let packages = self.content.packages_by_venue(venue_id, delegates).await?;

        let all_rooms: Vec<i64> = packages
            .iter()
            .flat_map(|p| p.rooms.iter().copied())
            .collect();
        let busy = self.busy_set(&all_rooms, window).await?;

        let available = packages
            .into_iter()
            .filter(|p| package_is_free(p, &busy))
            .map(|p| {
                let price = self.pricing.package_price(&p, window.as_ref(), delegates);
                to_available_package(p, price)
            })
            .collect();
        Ok(available)
    }

    // --- DISPONIBILIDADE DO DIA ---
    // Uma sala fica "booked" se qualquer pedido pending/confirmed cruzar
    // [00:00 do dia, 00:00 do dia seguinte).
    pub async fn day_availability(
        &self,
        venue_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<RoomDayAvailability>, AppError> {
        self.content
            .get_venue(venue_id)
            .await?
            .ok_or(AppError::VenueNotFound)?;

        let rooms = self.content.rooms_by_venue(venue_id, None).await?;
        let window = BookingWindow::day(date)?;
        let busy = self.busy_set(&room_ids(&rooms), Some(window)).await?;

        Ok(rooms
            .into_iter()
            .map(|room| RoomDayAvailability {
                id: room.id,
                availability: if busy.contains(&room.id) {
                    DayStatus::Booked
                } else {
                    DayStatus::Available
                },
            })
            .collect())
    }

    // --- SALA AVULSA ---
    pub async fn room_availability(
        &self,
        room_id: i64,
        window: Option<BookingWindow>,
        delegates: Option<i32>,
    ) -> Result<AvailableRoom, AppError> {
        check_delegates(delegates)?;

        let room = self
            .content
            .get_room(room_id)
            .await?
            .ok_or(AppError::RoomNotFound)?;
        let venue = self
            .content
            .get_venue(room.venue_id)
            .await?
            .ok_or(AppError::VenueNotFound)?;

        let busy = self.busy_set(&[room.id], window).await?;
        if busy.contains(&room.id) {
            return Err(AppError::ResourceConflict);
        }

        let price = self.pricing.room_price(&room, window.as_ref(), delegates);
        Ok(to_available_room(room, &venue.currency, price))
    }

    // --- PACOTE AVULSO ---
    pub async fn package_availability(
        &self,
        package_id: i64,
        window: Option<BookingWindow>,
        delegates: Option<i32>,
    ) -> Result<AvailablePackage, AppError> {
        check_delegates(delegates)?;

        let package = self
            .content
            .get_package(package_id)
            .await?
            .ok_or(AppError::PackageNotFound)?;

        let busy = self.busy_set(&package.rooms, window).await?;
        if !package_is_free(&package, &busy) {
            return Err(AppError::ResourceConflict);
        }

        let price = self
            .pricing
            .package_price(&package, window.as_ref(), delegates);
        Ok(to_available_package(package, price))
    }

    /// Salas ocupadas dentro da janela. Sem janela, o chamador pediu só
    /// disponibilidade grosseira e nada é filtrado.
    async fn busy_set(
        &self,
        room_ids: &[i64],
        window: Option<BookingWindow>,
    ) -> Result<HashSet<i64>, AppError> {
        match window {
            Some(w) => Ok(self
                .orders
                .booked_room_ids(room_ids, w)
                .await?
                .into_iter()
                .collect()),
            None => Ok(HashSet::new()),
        }
    }
}

fn check_delegates(delegates: Option<i32>) -> Result<(), AppError> {
    match delegates {
        Some(d) if d < 1 => Err(AppError::InvalidParameter(
            "o número de participantes deve ser positivo".into(),
        )),
        _ => Ok(()),
    }
}

fn room_ids(rooms: &[Room]) -> Vec<i64> {
    rooms.iter().map(|r| r.id).collect()
}

/// Mantém apenas as salas sem conflito, preservando a ordem (crescente por
/// id, como o repositório devolve).
fn free_rooms(rooms: Vec<Room>, busy: &HashSet<i64>) -> Vec<Room> {
    rooms.into_iter().filter(|r| !busy.contains(&r.id)).collect()
}

fn package_is_free(package: &Package, busy: &HashSet<i64>) -> bool {
    package.rooms.iter().all(|room_id| !busy.contains(room_id))
}

fn to_available_room(room: Room, currency: &str, price: Price) -> AvailableRoom {
    AvailableRoom {
        availability_id: ResourceRef::Room(room.id).availability_token(),
        name: room.name,
        id: room.id,
        venue_id: room.venue_id,
        min_delegates: room.min_delegates,
        max_delegates: room.max_delegates,
        amount_inc_tax: price.amount_inc_tax,
        amount: price.amount,
        currency: currency.to_string(),
        instant_bookable: room.instant_bookable,
        credit_card_required: room.credit_card_required,
        description: room.description,
        images: room.images.map(|j| j.0).unwrap_or_default(),
        equipments: room.equipments.map(|j| j.0).unwrap_or_default(),
        layouts: room.layouts.map(|j| j.0).unwrap_or_default(),
        dimensions: room.dimensions.map(|j| j.0),
    }
}

fn to_available_package(package: Package, price: Price) -> AvailablePackage {
    AvailablePackage {
        availability_id: ResourceRef::Package(package.id).availability_token(),
        name: package.name,
        min_delegates: package.min_delegates,
        max_delegates: package.max_delegates,
        amount_inc_tax: price.amount_inc_tax,
        amount: price.amount,
        price_adjusted_for_min_delegates: false,
        rooms: package.rooms,
        info: package.info,
        includes: package.includes.map(|j| j.0).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: i64) -> Room {
        Room {
            id,
            venue_id: 1,
            name: format!("Sala {id}"),
            min_delegates: 2,
            max_delegates: 20,
            instant_bookable: true,
            credit_card_required: false,
            description: None,
            images: None,
            equipments: None,
            layouts: None,
            dimensions: None,
        }
    }

    fn package(id: i64, rooms: Vec<i64>) -> Package {
        Package {
            id,
            venue_id: 1,
            name: format!("Pacote {id}"),
            min_delegates: 5,
            max_delegates: 50,
            rooms,
            info: None,
            includes: None,
        }
    }

    #[test]
    fn filtra_salas_ocupadas_e_preserva_a_ordem() {
        let busy: HashSet<i64> = [2].into_iter().collect();
        let free = free_rooms(vec![room(1), room(2), room(3)], &busy);
        let ids: Vec<i64> = free.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn mesmo_conjunto_ocupado_da_sempre_o_mesmo_resultado() {
        let busy: HashSet<i64> = [2].into_iter().collect();
        let a = free_rooms(vec![room(1), room(2), room(3)], &busy);
        let b = free_rooms(vec![room(1), room(2), room(3)], &busy);
        let ids = |rs: &[Room]| rs.iter().map(|r| r.id).collect::<Vec<_>>();
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn pacote_com_uma_sala_ocupada_nao_esta_disponivel() {
        // Disponibilidade do pacote é o E lógico das salas.
        let busy: HashSet<i64> = [3].into_iter().collect();
        assert!(!package_is_free(&package(1, vec![1, 2, 3]), &busy));
        assert!(package_is_free(&package(2, vec![1, 2]), &busy));
    }

    #[test]
    fn pacote_sem_salas_conta_como_livre() {
        let busy: HashSet<i64> = [1].into_iter().collect();
        assert!(package_is_free(&package(1, vec![]), &busy));
    }

    #[test]
    fn delegates_nao_positivo_e_rejeitado() {
        assert!(check_delegates(Some(0)).is_err());
        assert!(check_delegates(Some(-3)).is_err());
        assert!(check_delegates(Some(1)).is_ok());
        assert!(check_delegates(None).is_ok());
    }
}
