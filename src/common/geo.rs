// src/common/geo.rs

use crate::common::error::AppError;

/// Raio médio da Terra, em metros.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Um ponto geográfico já validado (lat ∈ [-90,90], lng ∈ [-180,180]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AppError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::InvalidCoordinate(format!(
                "latitude fora do intervalo [-90, 90]: {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::InvalidCoordinate(format!(
                "longitude fora do intervalo [-180, 180]: {longitude}"
            )));
        }
        Ok(Self { latitude, longitude })
    }

    /// As coordenadas chegam na API como strings de precisão fixa.
    pub fn parse(lat: &str, lng: &str) -> Result<Self, AppError> {
        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidCoordinate(format!("latitude ilegível: '{lat}'")))?;
        let longitude: f64 = lng
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidCoordinate(format!("longitude ilegível: '{lng}'")))?;
        Self::new(latitude, longitude)
    }
}

/// Distância de círculo máximo entre dois pontos, em metros.
///
/// Mesma fórmula usada pela busca de locais:
/// d = R * acos(cos(lat1)*cos(lat2)*cos(lng2-lng1) + sin(lat1)*sin(lat2)),
/// tudo em radianos, sem arredondamento intermediário.
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let cos_arg = lat1.cos() * lat2.cos() * delta_lng.cos() + lat1.sin() * lat2.sin();
    // Erro de ponto flutuante pode empurrar o argumento para fora de [-1, 1]
    // quando os pontos coincidem; acos daria NaN.
    EARTH_RADIUS_METERS * cos_arg.clamp(-1.0, 1.0).acos()
}

/// Filtra e ordena candidatos por distância a partir da origem.
///
/// Mantém só quem está a no máximo `radius_meters`; ordena por distância
/// crescente com desempate por id crescente, então o resultado é
/// determinístico e independente da ordem de entrada.
pub fn rank_venues(
    origin: GeoPoint,
    entries: &[(i64, GeoPoint)],
    radius_meters: f64,
) -> Vec<(i64, f64)> {
    let mut ranked: Vec<(i64, f64)> = entries
        .iter()
        .map(|(id, point)| (*id, distance_meters(origin, *point)))
        .filter(|(_, d)| *d <= radius_meters)
        .collect();

    ranked.sort_by(|(id_a, d_a), (id_b, d_b)| {
        d_a.partial_cmp(d_b)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(id_a.cmp(id_b))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[test]
    fn distancia_de_um_ponto_a_ele_mesmo_e_zero() {
        let helsinki = p(60.1699, 24.9384);
        assert_eq!(distance_meters(helsinki, helsinki), 0.0);
    }

    #[test]
    fn distancia_helsinki_espoo_na_ordem_de_grandeza_esperada() {
        // Centro de Helsinque até o centro de Espoo: ~16,5 km.
        let d = distance_meters(p(60.1699, 24.9384), p(60.2055, 24.6559));
        assert!((15_000.0..18_000.0).contains(&d), "distância: {d}");
    }

    #[test]
    fn latitude_fora_do_intervalo_e_rejeitada() {
        assert!(matches!(
            GeoPoint::new(91.0, 0.0),
            Err(AppError::InvalidCoordinate(_))
        ));
        assert!(matches!(
            GeoPoint::new(0.0, -181.0),
            Err(AppError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn parse_rejeita_lixo() {
        assert!(GeoPoint::parse("60.1699", "24.9384").is_ok());
        assert!(matches!(
            GeoPoint::parse("norte", "24.9384"),
            Err(AppError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn rank_filtra_pelo_raio_e_ordena_crescente() {
        let origin = p(60.1699, 24.9384);
        // ~2 km ao norte e ~6 km ao norte (1 grau de latitude ≈ 111,19 km).
        let near = p(60.1699 + 0.018, 24.9384);
        let far = p(60.1699 + 0.054, 24.9384);

        let ranked = rank_venues(origin, &[(2, far), (1, near)], 5_000.0);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].0, 1);
        assert!(ranked[0].1 < 5_000.0);
    }

    #[test]
    fn rank_e_deterministico_com_empate_por_id() {
        let origin = p(60.0, 24.0);
        let same = p(60.01, 24.0);

        let a = rank_venues(origin, &[(7, same), (3, same), (5, same)], 10_000.0);
        let b = rank_venues(origin, &[(5, same), (7, same), (3, same)], 10_000.0);
        assert_eq!(a, b);
        let ids: Vec<i64> = a.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![3, 5, 7]);
    }

    #[test]
    fn rank_ordena_por_distancia_nao_decrescente() {
        let origin = p(60.0, 24.0);
        let entries = [
            (1, p(60.03, 24.0)),
            (2, p(60.01, 24.0)),
            (3, p(60.02, 24.0)),
        ];
        let ranked = rank_venues(origin, &entries, 50_000.0);
        assert_eq!(ranked.len(), 3);
        for pair in ranked.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
    }
}
