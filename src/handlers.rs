pub mod availability;
pub mod orders;
pub mod search;

use chrono::{NaiveDate, NaiveTime};

use crate::common::error::AppError;
use crate::models::availability::BookingWindow;

// ---
// Helpers compartilhados de parsing da janela de reserva
// ---
// A API recebe a janela como data + hora de início + duração em horas
// (start_date=2024-06-01&start_time=09:00&duration=4). Ou vêm os três, ou
// nenhum; metade de uma janela é erro do cliente.

pub(crate) fn parse_window_params(
    start_date: Option<&str>,
    start_time: Option<&str>,
    duration: Option<i64>,
) -> Result<Option<BookingWindow>, AppError> {
    match (start_date, start_time, duration) {
        (None, None, None) => Ok(None),
        (Some(date), Some(time), Some(hours)) => {
            let window = BookingWindow::from_parts(parse_date(date)?, parse_time(time)?, hours)?;
            Ok(Some(window))
        }
        _ => Err(AppError::InvalidParameter(
            "start_date, start_time e duration devem ser enviados juntos".into(),
        )),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidParameter(format!("data inválida (use YYYY-MM-DD): '{raw}'")))
}

// Aceita "09:00" e "09:00:00".
pub(crate) fn parse_time(raw: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| AppError::InvalidParameter(format!("hora inválida (use HH:MM): '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn janela_completa_e_montada() {
        let w = parse_window_params(Some("2024-06-01"), Some("09:00"), Some(4))
            .unwrap()
            .unwrap();
        assert_eq!(w.start.to_rfc3339(), "2024-06-01T09:00:00+00:00");
        assert_eq!(w.end.to_rfc3339(), "2024-06-01T13:00:00+00:00");
    }

    #[test]
    fn sem_nenhum_parametro_nao_ha_janela() {
        assert!(parse_window_params(None, None, None).unwrap().is_none());
    }

    #[test]
    fn janela_pela_metade_e_rejeitada() {
        assert!(parse_window_params(Some("2024-06-01"), None, Some(4)).is_err());
        assert!(parse_window_params(None, Some("09:00"), None).is_err());
    }

    #[test]
    fn hora_aceita_com_e_sem_segundos() {
        assert!(parse_time("09:00").is_ok());
        assert!(parse_time("09:00:30").is_ok());
        assert!(parse_time("9h").is_err());
    }

    #[test]
    fn data_invalida_e_rejeitada() {
        assert!(parse_date("2024-06-01").is_ok());
        assert!(parse_date("01/06/2024").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }
}
