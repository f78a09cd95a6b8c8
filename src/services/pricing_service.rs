// src/services/pricing_service.rs

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    common::error::AppError,
    models::availability::BookingWindow,
    models::content::{Addon, Package, Room},
};

/// Valor líquido + valor com imposto, em unidades menores (centavos).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price {
    pub amount: i64,
    pub amount_inc_tax: i64,
}

/// Uma linha de item precificada (addon x quantidade).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePrice {
    pub unit_price: i64,
    pub unit_price_inc_tax: i64,
    pub amount: i64,
    pub amount_inc_tax: i64,
}

/// Tabela de preços base. Hoje são valores fixos por tipo de recurso;
/// trocar esta struct por uma consulta a regras de preço (recurso + janela
/// + participantes) não toca em nada da lógica de conflito.
#[derive(Debug, Clone)]
pub struct RateCard {
    pub room_base: i64,
    pub package_base: i64,
}

impl Default for RateCard {
    fn default() -> Self {
        Self {
            room_base: 12_500,
            package_base: 37_500,
        }
    }
}

// Funções puras, sem I/O. Todo valor monetário é inteiro em centavos;
// Decimal aparece só como intermediário exato da multiplicação do imposto.
#[derive(Clone)]
pub struct PricingEngine {
    tax_rate: Decimal,
    rates: RateCard,
}

impl PricingEngine {
    pub fn new(tax_rate: Decimal) -> Self {
        Self {
            tax_rate,
            rates: RateCard::default(),
        }
    }

    pub fn with_rates(tax_rate: Decimal, rates: RateCard) -> Self {
        Self { tax_rate, rates }
    }

    /// amount_inc_tax = round(amount * (1 + taxa)), metade para cima,
    /// no centavo.
    fn with_tax(&self, amount: i64) -> i64 {
        let gross = Decimal::from(amount) * (Decimal::ONE + self.tax_rate);
        gross
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            // Valores reais de moeda nunca chegam perto do limite de i64.
            .unwrap_or(i64::MAX)
    }

    fn price_from_base(&self, amount: i64) -> Price {
        Price {
            amount,
            amount_inc_tax: self.with_tax(amount),
        }
    }

    pub fn room_price(
        &self,
        _room: &Room,
        _window: Option<&BookingWindow>,
        _delegates: Option<i32>,
    ) -> Price {
        self.price_from_base(self.rates.room_base)
    }

    pub fn package_price(
        &self,
        _package: &Package,
        _window: Option<&BookingWindow>,
        _delegates: Option<i32>,
    ) -> Price {
        self.price_from_base(self.rates.package_base)
    }

    /// Preço de uma linha de addon: unitário vezes quantidade, imposto
    /// aplicado sobre o total da linha.
    pub fn addon_line_price(&self, addon: &Addon, quantity: i32) -> Result<LinePrice, AppError> {
        if quantity < 1 {
            return Err(AppError::InvalidParameter(
                "a quantidade de um addon deve ser pelo menos 1".into(),
            ));
        }
        let amount = addon.amount * i64::from(quantity);
        Ok(LinePrice {
            unit_price: addon.amount,
            unit_price_inc_tax: self.with_tax(addon.amount),
            amount,
            amount_inc_tax: self.with_tax(amount),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addon(amount: i64) -> Addon {
        Addon {
            id: 1,
            venue_id: 1,
            description: "Coffee break".into(),
            category: "catering".into(),
            currency: "EUR".into(),
            amount,
            amount_inc_tax: 0,
            unit: "piece".into(),
            available_rooms: None,
            package_addon: false,
            available_packages: None,
        }
    }

    fn room() -> Room {
        Room {
            id: 1,
            venue_id: 1,
            name: "Sala Aalto".into(),
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

    #[test]
    fn preco_base_de_sala_com_imposto_padrao() {
        let engine = PricingEngine::new(Decimal::new(20, 2));
        let price = engine.room_price(&room(), None, None);
        assert_eq!(price.amount, 12_500);
        assert_eq!(price.amount_inc_tax, 15_000);
    }

    #[test]
    fn linha_de_addon_multiplica_pela_quantidade() {
        let engine = PricingEngine::new(Decimal::new(20, 2));
        let line = engine.addon_line_price(&addon(1_000), 2).unwrap();
        assert_eq!(line.unit_price, 1_000);
        assert_eq!(line.unit_price_inc_tax, 1_200);
        assert_eq!(line.amount, 2_000);
        assert_eq!(line.amount_inc_tax, 2_400);
    }

    #[test]
    fn quantidade_zero_e_rejeitada() {
        let engine = PricingEngine::new(Decimal::new(20, 2));
        assert!(matches!(
            engine.addon_line_price(&addon(1_000), 0),
            Err(AppError::InvalidParameter(_))
        ));
    }

    #[test]
    fn arredondamento_e_metade_para_cima() {
        // 1 centavo a 50% de imposto: 1,5 arredonda para 2.
        let engine = PricingEngine::new(Decimal::new(50, 2));
        let line = engine.addon_line_price(&addon(1), 1).unwrap();
        assert_eq!(line.amount_inc_tax, 2);

        // 3 centavos a 17,5%: 3,525 arredonda para 4.
        let engine = PricingEngine::new(Decimal::new(175, 3));
        let line = engine.addon_line_price(&addon(3), 1).unwrap();
        assert_eq!(line.amount_inc_tax, 4);
    }

    #[test]
    fn tabela_de_precos_customizada_substitui_a_padrao() {
        let engine = PricingEngine::with_rates(
            Decimal::new(20, 2),
            RateCard {
                room_base: 10_000,
                package_base: 30_000,
            },
        );
        assert_eq!(engine.room_price(&room(), None, None).amount_inc_tax, 12_000);
    }

    #[test]
    fn total_do_cenario_de_referencia() {
        // Sala 12500/15000 + 2x addon de 1000 (1200 com imposto) = 17400.
        let engine = PricingEngine::new(Decimal::new(20, 2));
        let base = engine.room_price(&room(), None, None);
        let line = engine.addon_line_price(&addon(1_000), 2).unwrap();
        assert_eq!(base.amount_inc_tax + line.amount_inc_tax, 17_400);
    }
}
