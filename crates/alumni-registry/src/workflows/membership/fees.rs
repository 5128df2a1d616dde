use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{MembershipType, PaymentYears};

/// Yearly fee in BDT for each membership type.
pub fn yearly_fee(membership_type: MembershipType) -> Decimal {
    match membership_type {
        MembershipType::General => Decimal::new(50000, 2),
        MembershipType::Lifetime => Decimal::new(1_000_000, 2),
        MembershipType::Associate => Decimal::new(30000, 2),
    }
}

/// Yearly fee times contracted years; a lifetime payment is charged once.
/// The entry fee is kept on the application and never added here.
pub fn total_paid_amount(yearly_fee: Decimal, payment_years: PaymentYears) -> Decimal {
    match payment_years {
        PaymentYears::Years(years) => yearly_fee * Decimal::from(years),
        PaymentYears::Lifetime => yearly_fee,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeQuote {
    pub yearly_fee: Decimal,
    pub total_paid_amount: Decimal,
}

pub fn quote(membership_type: MembershipType, payment_years: PaymentYears) -> FeeQuote {
    let yearly_fee = yearly_fee(membership_type);
    FeeQuote {
        yearly_fee,
        total_paid_amount: total_paid_amount(yearly_fee, payment_years),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_year_general_membership_multiplies_yearly_fee() {
        let quote = quote(MembershipType::General, PaymentYears::Years(3));
        assert_eq!(quote.yearly_fee, Decimal::new(500, 0));
        assert_eq!(quote.total_paid_amount, Decimal::new(1500, 0));
    }

    #[test]
    fn lifetime_payment_is_charged_once() {
        let quote = quote(MembershipType::Lifetime, PaymentYears::Lifetime);
        assert_eq!(quote.total_paid_amount, Decimal::new(10_000, 0));
    }

    #[test]
    fn associate_fee_ignores_entry_fee() {
        let quote = quote(MembershipType::Associate, PaymentYears::Years(2));
        assert_eq!(quote.total_paid_amount, Decimal::new(600, 0));
    }
}
