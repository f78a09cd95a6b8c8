// src/services/order_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{order_repo::NewOrder, ContentRepository, OrderRepository},
    models::availability::{BookingWindow, ResourceRef},
    models::content::Addon,
    models::order::{OrderDetails, OrderInfo, OrderMessage, OrderStatus, RoomDetails},
    services::pricing_service::{Price, PricingEngine},
};

// Quantas referências de reserva tentamos antes de desistir. A colisão é
// improvável; três tentativas já a tornam irrelevante na prática.
const MAX_REFERENCE_ATTEMPTS: u32 = 3;

/// Pedido de criação já validado pelo handler.
#[derive(Debug, Clone)]
pub struct CreateOrderData {
    pub availability_id: String,
    pub customer_id: String,
    pub room_id: Option<i64>,
    pub layout: Option<String>,
    pub additional_notes: Option<String>,
    pub host_name: Option<String>,
    pub event_name: Option<String>,
    pub window: BookingWindow,
    pub delegates: Option<i32>,
    pub addons: Vec<OrderAddonRequest>,
}

#[derive(Debug, Clone, Copy)]
pub struct OrderAddonRequest {
    pub id: i64,
    pub quantity: i32,
}

// O recurso resolvido antes de abrir a transação: quais salas travar, o
// preço base e a moeda do local.
struct ResolvedResource {
    venue_id: i64,
    room_id: Option<i64>,
    package_id: Option<i64>,
    room_ids: Vec<i64>,
    base_name: String,
    base_product: &'static str,
    base_price: Price,
    currency: String,
}

#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    content: ContentRepository,
    pricing: PricingEngine,
    pool: PgPool,
}

impl OrderService {
    pub fn new(
        orders: OrderRepository,
        content: ContentRepository,
        pricing: PricingEngine,
        pool: PgPool,
    ) -> Self {
        Self {
            orders,
            content,
            pricing,
            pool,
        }
    }

    // --- CRIAÇÃO DO PEDIDO ---
    //
    // A leitura de disponibilidade que o cliente fez antes é só consultiva.
    // Quem decide é a re-verificação DENTRO da transação, com as salas
    // travadas: de dois pedidos concorrentes para a mesma sala e janelas
    // que se cruzam, no máximo um commita; o outro recebe ResourceConflict.
    pub async fn create_order(&self, data: CreateOrderData) -> Result<OrderInfo, AppError> {
        // availability_id é o token canônico; room_id explícito cobre
        // clientes que só conhecem a sala.
        let resource = match ResourceRef::parse(&data.availability_id) {
            Ok(resource) => resource,
            Err(parse_err) => match data.room_id {
                Some(id) => ResourceRef::Room(id),
                None => return Err(parse_err),
            },
        };

        // A transação inteira é repetida em caso de colisão de referência:
        // um INSERT que falhou aborta a transação no Postgres, então não
        // adianta trocar só a referência no meio do caminho.
        for attempt in 1..=MAX_REFERENCE_ATTEMPTS {
            let reference = generate_booking_reference();
            match self.try_create(&data, resource, &reference).await {
                Err(AppError::DuplicateReference) if attempt < MAX_REFERENCE_ATTEMPTS => {
                    tracing::warn!(
                        "Referência de reserva {} colidiu; tentando outra ({}/{}).",
                        reference,
                        attempt,
                        MAX_REFERENCE_ATTEMPTS
                    );
                }
                other => return other,
            }
        }
        Err(AppError::DuplicateReference)
    }

    async fn try_create(
        &self,
        data: &CreateOrderData,
        resource: ResourceRef,
        reference: &str,
    ) -> Result<OrderInfo, AppError> {
        let resolved = self
            .resolve_resource(resource, data.window, data.delegates)
            .await?;

        let mut tx = self.pool.begin().await?;

        // 1. Trava as salas alvo com FOR UPDATE, em ordem crescente de id.
        let locked = self.content.lock_rooms(&mut *tx, &resolved.room_ids).await?;
        if locked.len() != resolved.room_ids.len() {
            return Err(AppError::RoomNotFound);
        }

        // 2. Re-verificação autoritativa, sala a sala. Qualquer conflito
        // aborta sem escrever nada (o rollback é o drop da transação).
        for room_id in &resolved.room_ids {
            if self
                .orders
                .has_conflict(&mut *tx, *room_id, data.window, None)
                .await?
            {
                return Err(AppError::ResourceConflict);
            }
        }

        // 3. Pedido em pending.
        let order = self
            .orders
            .insert_order(
                &mut *tx,
                NewOrder {
                    availability_id: &data.availability_id,
                    customer_id: &data.customer_id,
                    booking_reference: reference,
                    room_id: resolved.room_id,
                    package_id: resolved.package_id,
                    layout: data.layout.as_deref(),
                    additional_notes: data.additional_notes.as_deref(),
                    host_name: data.host_name.as_deref(),
                    event_name: data.event_name.as_deref(),
                    currency: &resolved.currency,
                    start_date: data.window.start,
                    end_date: data.window.end,
                    delegates: data.delegates,
                },
            )
            .await?;

        // 4. Vínculo pedido -> salas (é o que a verificação de conflito lê).
        for room_id in &resolved.room_ids {
            self.orders
                .add_room_binding(&mut *tx, order.id, *room_id)
                .await?;
        }

        // 5. Item base (a cobrança da sala ou do pacote).
        self.orders
            .insert_item(
                &mut *tx,
                order.id,
                None,
                &resolved.base_name,
                resolved.base_product,
                1,
                "booking",
                resolved.base_price.amount,
                resolved.base_price.amount_inc_tax,
                resolved.base_price.amount,
                resolved.base_price.amount_inc_tax,
                false,
            )
            .await?;

        // 6. Addons: o preço resolvido AGORA, dentro da transação. Qualquer
        // addon irresolúvel ou inaplicável aborta o pedido inteiro.
        let mut total = resolved.base_price.amount_inc_tax;
        for addon_req in &data.addons {
            let addon = self
                .content
                .get_addon(&mut *tx, addon_req.id)
                .await?
                .ok_or(AppError::InvalidAddon(addon_req.id))?;

            if addon.venue_id != resolved.venue_id || !addon_applies(resource, &addon) {
                return Err(AppError::InvalidAddon(addon.id));
            }

            let line = self.pricing.addon_line_price(&addon, addon_req.quantity)?;
            self.orders
                .insert_item(
                    &mut *tx,
                    order.id,
                    Some(addon.id),
                    &addon.description,
                    &addon.category,
                    addon_req.quantity,
                    &addon.unit,
                    line.unit_price,
                    line.unit_price_inc_tax,
                    line.amount,
                    line.amount_inc_tax,
                    false,
                )
                .await?;
            total += line.amount_inc_tax;
        }

        // 7. Total agregado e commit. Só depois do commit o pedido passa a
        // existir para as verificações de conflito dos outros.
        self.orders.update_total(&mut *tx, order.id, total).await?;
        tx.commit().await?;

        tracing::info!(
            "✅ Pedido {} criado (referência {}, total {} {}).",
            order.id,
            reference,
            total,
            resolved.currency
        );
        Ok(OrderInfo {
            id: order.id,
            booking_reference: reference.to_string(),
        })
    }

    async fn resolve_resource(
        &self,
        resource: ResourceRef,
        window: BookingWindow,
        delegates: Option<i32>,
    ) -> Result<ResolvedResource, AppError> {
        match resource {
            ResourceRef::Room(room_id) => {
                let room = self
                    .content
                    .get_room(room_id)
                    .await?
                    .ok_or(AppError::RoomNotFound)?;
                check_capacity(delegates, room.min_delegates, room.max_delegates, "a sala")?;
                let venue = self
                    .content
                    .get_venue(room.venue_id)
                    .await?
                    .ok_or(AppError::VenueNotFound)?;
                let base_price = self.pricing.room_price(&room, Some(&window), delegates);
                Ok(ResolvedResource {
                    venue_id: room.venue_id,
                    room_id: Some(room.id),
                    package_id: None,
                    room_ids: vec![room.id],
                    base_name: room.name,
                    base_product: "Meeting room",
                    base_price,
                    currency: venue.currency,
                })
            }
            ResourceRef::Package(package_id) => {
                let package = self
                    .content
                    .get_package(package_id)
                    .await?
                    .ok_or(AppError::PackageNotFound)?;
                if package.rooms.is_empty() {
                    return Err(AppError::InvalidParameter(format!(
                        "o pacote {package_id} não tem salas associadas"
                    )));
                }
                check_capacity(
                    delegates,
                    package.min_delegates,
                    package.max_delegates,
                    "o pacote",
                )?;
                let venue = self
                    .content
                    .get_venue(package.venue_id)
                    .await?
                    .ok_or(AppError::VenueNotFound)?;
                let base_price = self.pricing.package_price(&package, Some(&window), delegates);

                // Ordem crescente e sem repetição: é a ordem de travamento.
                let mut room_ids = package.rooms.clone();
                room_ids.sort_unstable();
                room_ids.dedup();

                Ok(ResolvedResource {
                    venue_id: package.venue_id,
                    room_id: None,
                    package_id: Some(package.id),
                    room_ids,
                    base_name: package.name,
                    base_product: "Package",
                    base_price,
                    currency: venue.currency,
                })
            }
        }
    }

    // --- TRANSIÇÕES DE STATUS ---
    // pending -> confirmed e pending -> cancelled, nada mais. A transição
    // não re-verifica conflitos: cancelar sempre pode, e confirmar assume
    // que o pedido já segura o horário desde a criação.
    pub async fn update_order_status(
        &self,
        order_id: i64,
        new_status: OrderStatus,
        notes: Option<&str>,
    ) -> Result<OrderDetails, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .orders
            .get_order_for_update(&mut *tx, order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        if !order.status.can_transition_to(new_status) {
            return Err(AppError::InvalidStatusTransition {
                from: order.status,
                to: new_status,
            });
        }

        self.orders
            .update_status(&mut *tx, order_id, new_status, notes)
            .await?;
        tx.commit().await?;

        tracing::info!("Pedido {} transicionou para {}.", order_id, new_status);
        self.get_order_details(order_id).await
    }

    // --- LEITURA ---

    pub async fn get_order_details(&self, order_id: i64) -> Result<OrderDetails, AppError> {
        let order = self
            .orders
            .get_order(order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;
        let items = self.orders.list_items(order_id).await?;
        let room_names = self.orders.room_names(order_id).await?;

        Ok(OrderDetails {
            id: order.id,
            booking_reference: order.booking_reference,
            status: order.status,
            created_date: order.created_date,
            currency: order.currency,
            amount_inc_tax: order.amount_inc_tax,
            host_name: order.host_name,
            event_name: order.event_name,
            start: order.start_date,
            end: order.end_date,
            delegates: order.delegates,
            rooms: room_names
                .into_iter()
                .map(|name| RoomDetails {
                    name,
                    layout: order.layout.clone(),
                })
                .collect(),
            items,
        })
    }

    // --- MENSAGENS ---
    // Log append-only; nunca muda o status do pedido.

    pub async fn list_messages(&self, order_id: i64) -> Result<Vec<OrderMessage>, AppError> {
        self.orders
            .get_order(order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;
        self.orders.list_messages(order_id).await
    }

    pub async fn send_message(
        &self,
        order_id: i64,
        message: &str,
        sender: &str,
    ) -> Result<OrderMessage, AppError> {
        self.orders
            .get_order(order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;
        self.orders.insert_message(order_id, message, sender).await
    }
}

fn addon_applies(resource: ResourceRef, addon: &Addon) -> bool {
    match resource {
        ResourceRef::Room(id) => addon.applies_to_room(id),
        ResourceRef::Package(id) => addon.applies_to_package(id),
    }
}

fn check_capacity(
    delegates: Option<i32>,
    min: i32,
    max: i32,
    what: &str,
) -> Result<(), AppError> {
    if let Some(d) = delegates {
        if d < 1 {
            return Err(AppError::InvalidParameter(
                "o número de participantes deve ser positivo".into(),
            ));
        }
        if d < min || d > max {
            return Err(AppError::InvalidParameter(format!(
                "{what} comporta de {min} a {max} participantes"
            )));
        }
    }
    Ok(())
}

/// Referência compartilhável: BK + millis em base 36 + 6 caracteres
/// aleatórios, tudo maiúsculo. Quem chama trata a geração como falível e
/// tenta de novo em caso de colisão no índice único.
fn generate_booking_reference() -> String {
    let timestamp = base36(Utc::now().timestamp_millis());
    let entropy = Uuid::new_v4().simple().to_string();
    format!("BK{}{}", timestamp, &entropy[..6]).to_uppercase()
}

fn base36(mut value: i64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value <= 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }
    digits.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_codifica_como_esperado() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(36 * 36 + 1), "101");
    }

    #[test]
    fn referencia_tem_prefixo_e_e_maiuscula() {
        let reference = generate_booking_reference();
        assert!(reference.starts_with("BK"));
        assert_eq!(reference, reference.to_uppercase());
        // BK + timestamp (8+ dígitos em base 36) + 6 de entropia.
        assert!(reference.len() >= 16, "referência curta: {reference}");
    }

    #[test]
    fn referencias_consecutivas_diferem() {
        assert_ne!(generate_booking_reference(), generate_booking_reference());
    }

    #[test]
    fn capacidade_fora_da_faixa_e_rejeitada() {
        assert!(check_capacity(Some(1), 2, 20, "a sala").is_err());
        assert!(check_capacity(Some(21), 2, 20, "a sala").is_err());
        assert!(check_capacity(Some(0), 2, 20, "a sala").is_err());
        assert!(check_capacity(Some(2), 2, 20, "a sala").is_ok());
        assert!(check_capacity(Some(20), 2, 20, "a sala").is_ok());
        assert!(check_capacity(None, 2, 20, "a sala").is_ok());
    }

    #[test]
    fn addon_restrito_nao_se_aplica_a_outra_sala() {
        let addon = Addon {
            id: 9,
            venue_id: 1,
            description: "Videoconferência".into(),
            category: "equipment".into(),
            currency: "EUR".into(),
            amount: 5_000,
            amount_inc_tax: 6_000,
            unit: "piece".into(),
            available_rooms: Some(vec![1, 2]),
            package_addon: false,
            available_packages: None,
        };
        assert!(addon_applies(ResourceRef::Room(1), &addon));
        assert!(!addon_applies(ResourceRef::Room(3), &addon));
        assert!(!addon_applies(ResourceRef::Package(1), &addon));
    }
}
