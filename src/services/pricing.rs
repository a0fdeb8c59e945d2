//! Cart pricing engine.
//!
//! Computes a cart's payable total by applying a fixed, ordered checklist of
//! discount and fee rules to the fresh subtotal. The evaluation itself is a
//! pure function; promotion lookup for the effective date happens in
//! [`price_cart_on`] and the resolved promotion is passed in explicitly.

use crate::{
    entities::{
        cart::CartType,
        cart_item, promotion,
    },
    errors::ServiceError,
    services::promotions,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};

/// 25% off when the cart holds exactly four units.
const EXACT_FOUR_RATE: Decimal = dec!(0.25);
/// Flat discount when the cart holds more than ten units.
const BULK_DISCOUNT: Decimal = dec!(100.00);
/// Flat discount applied to every VIP cart.
const VIP_GENERAL_DISCOUNT: Decimal = dec!(500.00);
/// Flat charge added after all discounts; also the absolute price floor.
pub const SERVICE_FEE: Decimal = dec!(1000.00);

/// Discriminates entries in the `discounts_applied` breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountKind {
    #[serde(rename = "quantity_exactly_4")]
    QuantityExactlyFour,
    #[serde(rename = "quantity_over_10")]
    QuantityOverTen,
    #[serde(rename = "special_date")]
    SpecialDate,
    #[serde(rename = "vip_free_cheapest")]
    VipFreeCheapest,
    #[serde(rename = "vip_general")]
    VipGeneral,
    #[serde(rename = "service_fee")]
    ServiceFee,
}

/// One applied rule in the itemized receipt. The service fee appears here too,
/// with a positive amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub kind: DiscountKind,
    pub description: String,
    pub amount: Decimal,
}

/// Full pricing breakdown for a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartPricing {
    pub subtotal: Decimal,
    pub total_payable: Decimal,
    pub total_quantity: i64,
    pub discounts_applied: Vec<AppliedDiscount>,
}

/// Resolves the active promotion for `effective_date` and evaluates the rules.
///
/// The lookup is skipped for VIP carts, which never receive the special-date
/// discount.
pub async fn price_cart_on(
    conn: &impl ConnectionTrait,
    items: &[cart_item::Model],
    cart_type: CartType,
    effective_date: NaiveDate,
) -> Result<CartPricing, ServiceError> {
    let active_promotion = if cart_type == CartType::Vip {
        None
    } else {
        promotions::find_active_on(conn, effective_date).await?
    };

    Ok(price_cart(items, cart_type, active_promotion.as_ref()))
}

/// Evaluates the discount/fee checklist against the given line items.
///
/// Rules run in a fixed order, each adjusting the running total and appending
/// its entry to the breakdown:
/// 1. exactly 4 units in total: 25% of the subtotal off
/// 2. more than 10 units in total: flat 100.00 off
/// 3. non-VIP carts: the active promotion's discount amount off, when positive
/// 4. VIP carts: one unit of the cheapest line free (only with more than one
///    unit in the cart, ties broken by insertion order), then a flat 500.00 off
/// 5. flat 1000.00 service fee, always added last
///
/// The payable total is floored at the service fee; it never drops below it.
pub fn price_cart(
    items: &[cart_item::Model],
    cart_type: CartType,
    active_promotion: Option<&promotion::Model>,
) -> CartPricing {
    let subtotal: Decimal = items.iter().map(|item| item.line_total()).sum();
    let total_quantity: i64 = items.iter().map(|item| i64::from(item.quantity)).sum();

    let mut discounts_applied = Vec::new();
    let mut final_total = subtotal;

    if total_quantity == 4 {
        let amount = subtotal * EXACT_FOUR_RATE;
        final_total -= amount;
        discounts_applied.push(AppliedDiscount {
            kind: DiscountKind::QuantityExactlyFour,
            description: "25% discount for exactly 4 items".to_string(),
            amount,
        });
    }

    if total_quantity > 10 {
        final_total -= BULK_DISCOUNT;
        discounts_applied.push(AppliedDiscount {
            kind: DiscountKind::QuantityOverTen,
            description: "$100 discount for more than 10 items".to_string(),
            amount: BULK_DISCOUNT,
        });
    }

    if cart_type != CartType::Vip {
        if let Some(promo) = active_promotion {
            if promo.discount_amount > Decimal::ZERO {
                final_total -= promo.discount_amount;
                discounts_applied.push(AppliedDiscount {
                    kind: DiscountKind::SpecialDate,
                    description: promo.description.clone(),
                    amount: promo.discount_amount,
                });
            }
        }
    }

    if cart_type == CartType::Vip {
        // One unit's worth of the cheapest line, not its full line total.
        if total_quantity > 1 {
            if let Some(cheapest) = cheapest_item(items) {
                final_total -= cheapest.unit_price;
                discounts_applied.push(AppliedDiscount {
                    kind: DiscountKind::VipFreeCheapest,
                    description: "Cheapest item free (one unit)".to_string(),
                    amount: cheapest.unit_price,
                });
            }
        }

        final_total -= VIP_GENERAL_DISCOUNT;
        discounts_applied.push(AppliedDiscount {
            kind: DiscountKind::VipGeneral,
            description: "$500 VIP discount".to_string(),
            amount: VIP_GENERAL_DISCOUNT,
        });
    }

    final_total += SERVICE_FEE;
    discounts_applied.push(AppliedDiscount {
        kind: DiscountKind::ServiceFee,
        description: "$1000 flat service fee".to_string(),
        amount: SERVICE_FEE,
    });

    CartPricing {
        subtotal,
        total_payable: final_total.max(SERVICE_FEE),
        total_quantity,
        discounts_applied,
    }
}

/// Lowest unit price wins; on a tie the earliest item in storage order does.
fn cheapest_item(items: &[cart_item::Model]) -> Option<&cart_item::Model> {
    let mut cheapest: Option<&cart_item::Model> = None;
    for item in items {
        match cheapest {
            Some(best) if best.unit_price <= item.unit_price => {}
            _ => cheapest = Some(item),
        }
    }
    cheapest
}
