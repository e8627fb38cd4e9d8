//! Cálculo de precios de alquiler
//!
//! Este módulo deriva el precio total de un rango de fechas según las
//! tarifas escalonadas del vehículo: meses completos con la tarifa mensual,
//! semanas completas con la semanal, y el resto con la diaria. Una tarifa
//! ausente cae a la siguiente más barata, en último término la diaria.
//! Funciones puras, sin suspensión.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::vehicle::Vehicle;

/// Tarifas escalonadas de un vehículo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateCard {
    pub per_day: Decimal,
    pub per_week: Option<Decimal>,
    pub per_month: Option<Decimal>,
}

impl From<&Vehicle> for RateCard {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            per_day: vehicle.price_per_day,
            per_week: vehicle.price_per_week,
            per_month: vehicle.price_per_month,
        }
    }
}

/// Días facturables entre dos fechas; mínimo un día.
///
/// El rango invertido debe rechazarse antes en la validación del request;
/// aquí se toma el valor absoluto para que la función siga siendo total.
pub fn rental_days(start_date: NaiveDate, end_date: NaiveDate) -> i64 {
    let days = (end_date - start_date).num_days().abs();
    days.max(1)
}

/// Precio total para un número de días ya calculado
pub fn price_for_days(days: i64, rates: &RateCard) -> Decimal {
    if days >= 30 {
        if let Some(per_month) = rates.per_month {
            let months = Decimal::from(days / 30);
            let remaining = Decimal::from(days % 30);
            return months * per_month + remaining * rates.per_day;
        }
    }

    if days >= 7 {
        if let Some(per_week) = rates.per_week {
            let weeks = Decimal::from(days / 7);
            let remaining = Decimal::from(days % 7);
            return weeks * per_week + remaining * rates.per_day;
        }
    }

    Decimal::from(days) * rates.per_day
}

/// Precio total para un rango de fechas
pub fn total_price(start_date: NaiveDate, end_date: NaiveDate, rates: &RateCard) -> Decimal {
    price_for_days(rental_days(start_date, end_date), rates)
}

/// Ahorro frente a facturar todos los días con la tarifa diaria
pub fn tier_savings(days: i64, rates: &RateCard) -> Decimal {
    Decimal::from(days) * rates.per_day - price_for_days(days, rates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn rates(per_day: i64, per_week: Option<i64>, per_month: Option<i64>) -> RateCard {
        RateCard {
            per_day: Decimal::from(per_day),
            per_week: per_week.map(Decimal::from),
            per_month: per_month.map(Decimal::from),
        }
    }

    #[test]
    fn test_short_rental_bills_daily_rate() {
        let rates = rates(1500, Some(9000), Some(30000));
        assert_eq!(price_for_days(3, &rates), Decimal::from(4500));
        assert_eq!(price_for_days(6, &rates), Decimal::from(9000));
    }

    #[test]
    fn test_ten_days_bills_one_week_plus_three_days() {
        let rates = rates(1500, Some(9000), None);
        assert_eq!(price_for_days(10, &rates), Decimal::from(9000 + 3 * 1500));
    }

    #[test]
    fn test_thirty_five_days_bills_one_month_plus_five_days() {
        let rates = rates(1500, Some(9000), Some(30000));
        assert_eq!(price_for_days(35, &rates), Decimal::from(30000 + 5 * 1500));
    }

    #[test]
    fn test_missing_monthly_rate_falls_through_to_weekly() {
        let rates = rates(1500, Some(9000), None);
        assert_eq!(price_for_days(35, &rates), Decimal::from(5 * 9000));
    }

    #[test]
    fn test_missing_weekly_rate_falls_through_to_daily() {
        let rates = rates(1500, None, None);
        assert_eq!(price_for_days(10, &rates), Decimal::from(10 * 1500));
    }

    #[test]
    fn test_same_day_range_bills_one_day() {
        let rates = rates(1500, None, None);
        let day = date(2025, 3, 1);
        assert_eq!(rental_days(day, day), 1);
        assert_eq!(total_price(day, day, &rates), Decimal::from(1500));
    }

    #[test]
    fn test_inverted_range_is_treated_as_absolute() {
        assert_eq!(rental_days(date(2025, 3, 8), date(2025, 3, 1)), 7);
    }

    #[test]
    fn test_total_price_over_date_range() {
        let rates = rates(1500, Some(9000), None);
        // 2025-03-01 a 2025-03-11: 10 días
        assert_eq!(
            total_price(date(2025, 3, 1), date(2025, 3, 11), &rates),
            Decimal::from(9000 + 3 * 1500)
        );
    }

    #[test]
    fn test_tier_savings_against_pure_daily_billing() {
        let rates = rates(1500, Some(9000), None);
        // 10 días a tarifa diaria serían 15000; con la semanal son 13500
        assert_eq!(tier_savings(10, &rates), Decimal::from(1500));
        assert_eq!(tier_savings(3, &rates), Decimal::ZERO);
    }
}
