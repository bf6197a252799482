use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

/// Monetary breakdown fixed at order creation and never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping_cost: Decimal,
    pub total_amount: Decimal,
}

/// Source of tax and shipping charges applied on top of the cart subtotal.
pub trait ChargePolicy {
    fn tax(&self, subtotal: Decimal) -> Decimal;
    fn shipping(&self, subtotal: Decimal) -> Decimal;

    fn totals(&self, subtotal: Decimal) -> OrderTotals {
        let tax = self.tax(subtotal);
        let shipping_cost = self.shipping(subtotal);
        OrderTotals {
            subtotal,
            tax,
            shipping_cost,
            total_amount: subtotal + tax + shipping_cost,
        }
    }
}

/// No tax and free shipping.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCharges;

impl ChargePolicy for NoCharges {
    fn tax(&self, _subtotal: Decimal) -> Decimal {
        Decimal::ZERO
    }

    fn shipping(&self, _subtotal: Decimal) -> Decimal {
        Decimal::ZERO
    }
}

pub fn line_subtotal(price: Decimal, quantity: i32) -> Decimal {
    price * Decimal::from(quantity)
}

pub fn cart_subtotal<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, i32)>,
{
    lines
        .into_iter()
        .map(|(price, quantity)| line_subtotal(price, quantity))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtotal_sums_price_times_quantity() {
        let lines = [(Decimal::new(1000, 2), 2), (Decimal::new(500, 2), 1)];
        assert_eq!(cart_subtotal(lines), Decimal::new(2500, 2));
    }

    #[test]
    fn no_charges_leaves_total_equal_to_subtotal() {
        let totals = NoCharges.totals(Decimal::new(2500, 2));
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.shipping_cost, Decimal::ZERO);
        assert_eq!(totals.total_amount, Decimal::new(2500, 2));
    }

    struct FlatShipping;

    impl ChargePolicy for FlatShipping {
        fn tax(&self, subtotal: Decimal) -> Decimal {
            subtotal * Decimal::new(10, 2)
        }
        fn shipping(&self, _subtotal: Decimal) -> Decimal {
            Decimal::new(499, 2)
        }
    }

    #[test]
    fn total_is_subtotal_plus_tax_plus_shipping() {
        let totals = FlatShipping.totals(Decimal::new(10000, 2));
        assert_eq!(totals.total_amount, Decimal::new(11499, 2));
    }
}
