use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::{BookingError, Unit, nights_between};

/// Inputs a pricing rule may consult
#[derive(Debug, Clone, Copy)]
pub struct StayContext<'a> {
    /// Unit being priced
    pub unit: &'a Unit,
    /// Check-in date
    pub check_in: NaiveDate,
    /// Check-out date
    pub check_out: NaiveDate,
    /// Number of nights
    pub nights: i64,
}

impl StayContext<'_> {
    /// Iterates the occupied nights: check-in inclusive, check-out
    /// exclusive.
    pub fn occupied_nights(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let check_in = self.check_in;
        (0..self.nights).map(move |i| check_in + Duration::days(i))
    }
}

/// A named rate adjustment. The engine holds rules in a fixed declared
/// order; each applicable rule contributes one signed line item and later
/// rules see the running subtotal, so ordering is part of the contract.
pub trait PricingRule: Send + Sync {
    /// Line-item name, stable across quotes
    fn name(&self) -> &'static str;

    /// Whether this rule contributes to the given stay
    fn applies_to(&self, stay: &StayContext) -> bool;

    /// Signed amount, given the running subtotal after earlier rules
    fn amount(&self, stay: &StayContext, running_subtotal: f64) -> f64;
}

/// One applied adjustment in a quote breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    /// Rule name
    pub name: String,
    /// Signed contribution
    pub amount: f64,
}

/// Full price breakdown for a candidate stay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Unit being priced
    pub unit_id: String,
    /// Check-in date
    pub check_in: NaiveDate,
    /// Check-out date
    pub check_out: NaiveDate,
    /// Number of nights
    pub nights: i64,
    /// Base rate times nights, before adjustments
    pub subtotal: f64,
    /// Applied adjustments, in rule declaration order
    pub adjustments: Vec<Adjustment>,
    /// Subtotal plus the sum of all adjustments
    pub total: f64,
}

/// Computes the total price of a validated date range: base rate times
/// nights plus an ordered sequence of named adjustments. Pure; identical
/// inputs always yield an identical breakdown, which keeps historical
/// quotes auditable.
pub struct PricingEngine {
    rules: Vec<Box<dyn PricingRule>>,
}

impl PricingEngine {
    /// Creates an engine with an explicit rule order
    pub fn new(rules: Vec<Box<dyn PricingRule>>) -> Self {
        Self { rules }
    }

    /// The production rule set, in its contractual order: weekend
    /// surcharge, then weekly discount, then cleaning fee.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(WeekendSurcharge { amount: 50.0 }),
            Box::new(WeeklyDiscount {
                min_nights: 7,
                rate: 0.10,
            }),
            Box::new(CleaningFee { amount: 25.0 }),
        ])
    }

    /// Prices a stay. Rejects `check_out <= check_in` rather than producing
    /// a meaningless number.
    pub fn quote(
        &self,
        unit: &Unit,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Quote, BookingError> {
        if check_out <= check_in {
            return Err(BookingError::InvalidDateRange);
        }

        let nights = nights_between(check_in, check_out);
        let stay = StayContext {
            unit,
            check_in,
            check_out,
            nights,
        };

        let subtotal = unit.base_rate * nights as f64;
        let mut running = subtotal;
        let mut adjustments = Vec::new();

        for rule in &self.rules {
            if rule.applies_to(&stay) {
                let amount = rule.amount(&stay, running);
                running += amount;
                adjustments.push(Adjustment {
                    name: rule.name().to_string(),
                    amount,
                });
            }
        }

        Ok(Quote {
            unit_id: unit.id.clone(),
            check_in,
            check_out,
            nights,
            subtotal,
            adjustments,
            total: running,
        })
    }
}

/// Flat surcharge when any occupied night falls on a Saturday or Sunday
pub struct WeekendSurcharge {
    /// Surcharge per stay
    pub amount: f64,
}

impl PricingRule for WeekendSurcharge {
    fn name(&self) -> &'static str {
        "weekend surcharge"
    }

    fn applies_to(&self, stay: &StayContext) -> bool {
        stay.occupied_nights()
            .any(|night| matches!(night.weekday(), Weekday::Sat | Weekday::Sun))
    }

    fn amount(&self, _stay: &StayContext, _running_subtotal: f64) -> f64 {
        self.amount
    }
}

/// Percentage discount off the running subtotal for long stays
pub struct WeeklyDiscount {
    /// Minimum nights for the discount to apply
    pub min_nights: i64,
    /// Discount rate, e.g. 0.10 for 10%
    pub rate: f64,
}

impl PricingRule for WeeklyDiscount {
    fn name(&self) -> &'static str {
        "weekly discount"
    }

    fn applies_to(&self, stay: &StayContext) -> bool {
        stay.nights >= self.min_nights
    }

    fn amount(&self, _stay: &StayContext, running_subtotal: f64) -> f64 {
        -(running_subtotal * self.rate)
    }
}

/// Flat per-stay cleaning fee
pub struct CleaningFee {
    /// Fee per stay
    pub amount: f64,
}

impl PricingRule for CleaningFee {
    fn name(&self) -> &'static str {
        "cleaning fee"
    }

    fn applies_to(&self, _stay: &StayContext) -> bool {
        true
    }

    fn amount(&self, _stay: &StayContext, _running_subtotal: f64) -> f64 {
        self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn unit(base_rate: f64) -> Unit {
        Unit {
            id: "U1".to_string(),
            name: "Garden Room".to_string(),
            base_rate,
        }
    }

    #[test]
    fn degenerate_range_is_rejected() {
        let engine = PricingEngine::standard();
        let unit = unit(450.0);

        assert!(matches!(
            engine.quote(&unit, date(2024, 6, 10), date(2024, 6, 10)),
            Err(BookingError::InvalidDateRange)
        ));
        assert!(matches!(
            engine.quote(&unit, date(2024, 6, 11), date(2024, 6, 10)),
            Err(BookingError::InvalidDateRange)
        ));
    }

    #[test]
    fn one_night_with_no_applicable_rules_is_the_base_rate() {
        let engine = PricingEngine::new(vec![]);
        let unit = unit(450.0);

        // Monday night only.
        let quote = engine
            .quote(&unit, date(2024, 6, 10), date(2024, 6, 11))
            .unwrap();
        assert_eq!(quote.nights, 1);
        assert_eq!(quote.subtotal, 450.0);
        assert_eq!(quote.total, 450.0);
        assert!(quote.adjustments.is_empty());
    }

    #[test]
    fn weekday_stay_skips_the_weekend_surcharge() {
        let engine = PricingEngine::new(vec![Box::new(WeekendSurcharge { amount: 50.0 })]);
        let unit = unit(450.0);

        // Mon 2024-06-10 through Thu 2024-06-13: three nights, none on a
        // weekend.
        let quote = engine
            .quote(&unit, date(2024, 6, 10), date(2024, 6, 13))
            .unwrap();
        assert_eq!(quote.nights, 3);
        assert_eq!(quote.subtotal, 1350.0);
        assert_eq!(quote.total, 1350.0);
        assert!(quote.adjustments.is_empty());
    }

    #[test]
    fn weekend_night_triggers_the_surcharge() {
        let engine = PricingEngine::new(vec![Box::new(WeekendSurcharge { amount: 50.0 })]);
        let unit = unit(100.0);

        // Fri 2024-06-14 through Sun 2024-06-16: the Saturday night counts.
        let quote = engine
            .quote(&unit, date(2024, 6, 14), date(2024, 6, 16))
            .unwrap();
        assert_eq!(quote.adjustments.len(), 1);
        assert_eq!(quote.adjustments[0].name, "weekend surcharge");
        assert_eq!(quote.adjustments[0].amount, 50.0);
        assert_eq!(quote.total, 250.0);
    }

    #[test]
    fn later_rules_see_the_running_subtotal() {
        let engine = PricingEngine::standard();
        let unit = unit(100.0);

        // Mon 2024-06-10 through Mon 2024-06-17: seven nights, includes a
        // weekend. Discount applies to subtotal plus surcharge, and the
        // cleaning fee lands after the discount.
        let quote = engine
            .quote(&unit, date(2024, 6, 10), date(2024, 6, 17))
            .unwrap();
        assert_eq!(quote.subtotal, 700.0);
        assert_eq!(
            quote.adjustments,
            vec![
                Adjustment {
                    name: "weekend surcharge".to_string(),
                    amount: 50.0
                },
                Adjustment {
                    name: "weekly discount".to_string(),
                    amount: -75.0
                },
                Adjustment {
                    name: "cleaning fee".to_string(),
                    amount: 25.0
                },
            ]
        );
        assert_eq!(quote.total, 700.0);
    }

    #[test]
    fn quotes_are_deterministic() {
        let engine = PricingEngine::standard();
        let unit = unit(123.45);

        let a = engine
            .quote(&unit, date(2024, 6, 7), date(2024, 6, 21))
            .unwrap();
        let b = engine
            .quote(&unit, date(2024, 6, 7), date(2024, 6, 21))
            .unwrap();
        assert_eq!(a, b);
    }
}
