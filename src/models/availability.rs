// src/models/availability.rs

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::error::AppError;
use crate::models::content::{Equipment, Image, Layout, PackageInclude, RoomDimensions};

// --- 1. Janela de reserva ---

/// Intervalo semiaberto [start, end) durante o qual um recurso é pedido.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BookingWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AppError> {
        if start >= end {
            return Err(AppError::InvalidParameter(
                "o início da janela deve ser anterior ao fim".into(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Monta a janela a partir dos parâmetros da API: data + hora de início
    /// e duração em horas.
    pub fn from_parts(
        start_date: NaiveDate,
        start_time: NaiveTime,
        duration_hours: i64,
    ) -> Result<Self, AppError> {
        if duration_hours < 1 {
            return Err(AppError::InvalidParameter(
                "a duração deve ser de pelo menos 1 hora".into(),
            ));
        }
        let start = start_date.and_time(start_time).and_utc();
        let end = start + Duration::hours(duration_hours);
        Self::new(start, end)
    }

    /// Janela que cobre o dia inteiro: [00:00 do dia, 00:00 do dia seguinte).
    pub fn day(date: NaiveDate) -> Result<Self, AppError> {
        let start = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AppError::InvalidParameter("data inválida".into()))?
            .and_utc();
        Ok(Self {
            start,
            end: start + Duration::days(1),
        })
    }
}

// --- 2. Token de disponibilidade ---

/// O recurso que uma reserva vincula: uma sala, ou o conjunto de salas
/// implicado por um pacote.
///
/// A disponibilidade emite tokens `room_<id>_<nonce>` / `package_<id>_<nonce>`
/// e a criação de pedido os consome; os dois lados passam por aqui para o
/// formato nunca divergir.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRef {
    Room(i64),
    Package(i64),
}

impl ResourceRef {
    /// Gera o token compartilhado com o cliente (o nonce é só para o token
    /// não se repetir entre consultas; não carrega significado).
    pub fn availability_token(self) -> String {
        let nonce = Utc::now().timestamp_millis();
        match self {
            ResourceRef::Room(id) => format!("room_{id}_{nonce}"),
            ResourceRef::Package(id) => format!("package_{id}_{nonce}"),
        }
    }

    pub fn parse(token: &str) -> Result<Self, AppError> {
        let invalid = || {
            AppError::InvalidParameter(format!("availability_id não reconhecido: '{token}'"))
        };
        let mut parts = token.splitn(3, '_');
        let kind = parts.next().ok_or_else(invalid)?;
        let id: i64 = parts
            .next()
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(invalid)?;
        match kind {
            "room" => Ok(ResourceRef::Room(id)),
            "package" => Ok(ResourceRef::Package(id)),
            _ => Err(invalid()),
        }
    }
}

// --- 3. Respostas de disponibilidade ---

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvailableRoom {
    pub availability_id: String,
    pub name: String,
    pub id: i64,
    pub venue_id: i64,
    pub min_delegates: i32,
    pub max_delegates: i32,
    pub amount_inc_tax: i64,
    pub amount: i64,
    pub currency: String,
    pub instant_bookable: bool,
    pub credit_card_required: bool,
    pub description: Option<String>,
    pub images: Vec<Image>,
    pub equipments: Vec<Equipment>,
    pub layouts: Vec<Layout>,
    pub dimensions: Option<RoomDimensions>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvailablePackage {
    pub availability_id: String,
    pub name: String,
    pub min_delegates: i32,
    pub max_delegates: i32,
    pub amount_inc_tax: i64,
    pub amount: i64,
    pub price_adjusted_for_min_delegates: bool,
    pub rooms: Vec<i64>,
    pub info: Option<String>,
    pub includes: Vec<PackageInclude>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Available,
    Booked,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomDayAvailability {
    pub id: i64,
    pub availability: DayStatus,
}

// --- 4. Paginação ---

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    /// Quantidade de itens nesta página.
    pub results: usize,
    /// Total após os filtros, ANTES da paginação.
    pub total_results: usize,
    pub offset: i64,
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn janela_invertida_e_rejeitada() {
        let start = "2024-06-01T13:00:00Z".parse().unwrap();
        let end = "2024-06-01T09:00:00Z".parse().unwrap();
        assert!(matches!(
            BookingWindow::new(start, end),
            Err(AppError::InvalidParameter(_))
        ));
    }

    #[test]
    fn janela_por_partes_soma_a_duracao() {
        let w = BookingWindow::from_parts(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            4,
        )
        .unwrap();
        assert_eq!(w.start.to_rfc3339(), "2024-06-01T09:00:00+00:00");
        assert_eq!(w.end.to_rfc3339(), "2024-06-01T13:00:00+00:00");
    }

    #[test]
    fn duracao_zero_e_rejeitada() {
        let r = BookingWindow::from_parts(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            0,
        );
        assert!(matches!(r, Err(AppError::InvalidParameter(_))));
    }

    #[test]
    fn janela_do_dia_cobre_ate_a_meia_noite_seguinte() {
        let w = BookingWindow::day(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()).unwrap();
        assert_eq!(w.start.to_rfc3339(), "2024-06-01T00:00:00+00:00");
        assert_eq!(w.end.to_rfc3339(), "2024-06-02T00:00:00+00:00");
    }

    #[test]
    fn token_gerado_e_reconhecido_na_volta() {
        let token = ResourceRef::Room(42).availability_token();
        assert!(token.starts_with("room_42_"));
        assert_eq!(ResourceRef::parse(&token).unwrap(), ResourceRef::Room(42));

        let token = ResourceRef::Package(7).availability_token();
        assert_eq!(ResourceRef::parse(&token).unwrap(), ResourceRef::Package(7));
    }

    #[test]
    fn token_ilegivel_e_rejeitado() {
        for bad in ["", "room", "room_x_1", "venue_1_2", "room__"] {
            assert!(
                matches!(ResourceRef::parse(bad), Err(AppError::InvalidParameter(_))),
                "token aceito indevidamente: '{bad}'"
            );
        }
    }
}
