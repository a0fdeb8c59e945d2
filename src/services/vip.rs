//! VIP status transition.
//!
//! Runs inside the order-finalization transaction: the monthly spend check,
//! the grant, and the revocation all commit or roll back together with the
//! order itself.

use crate::{
    entities::{order, user_profile, Order, UserProfile},
    errors::ServiceError,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};
use tracing::info;
use uuid::Uuid;

/// Monthly spend that qualifies a user for VIP status.
pub const VIP_MONTHLY_THRESHOLD: Decimal = dec!(10000.00);

/// Outcome of evaluating the transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VipDecision {
    Grant,
    Revoke,
    NoChange,
}

/// Pure transition rule over the current month's order history.
///
/// - at or above the threshold: grant, unless already VIP
/// - below the threshold: revoke only a current VIP with zero orders this month
/// - anything else: no change
pub fn decide(is_vip: bool, monthly_total: Decimal, orders_this_month: u64) -> VipDecision {
    if monthly_total >= VIP_MONTHLY_THRESHOLD {
        if is_vip {
            VipDecision::NoChange
        } else {
            VipDecision::Grant
        }
    } else if is_vip && orders_this_month == 0 {
        VipDecision::Revoke
    } else {
        VipDecision::NoChange
    }
}

/// First instant of the month containing `now`.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.date_naive();
    first_instant(date.year(), date.month())
}

/// First instant of the month after the one containing `now`. VIP status
/// granted for a qualifying month activates here, not retroactively.
pub fn next_month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.date_naive();
    if date.month() == 12 {
        first_instant(date.year() + 1, 1)
    } else {
        first_instant(date.year(), date.month() + 1)
    }
}

fn first_instant(year: i32, month: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .expect("first day of month is always valid")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
}

/// Applied change, reported to the caller so it can emit the matching event
/// after the transaction commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VipChange {
    Granted,
    Revoked,
}

/// Evaluates and applies the VIP transition for `user_id` against the orders
/// of the calendar month containing `now`. Must be called on the same
/// connection/transaction that inserted the finalizing order.
pub async fn apply_vip_transition(
    conn: &impl ConnectionTrait,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<VipChange>, ServiceError> {
    let profile = UserProfile::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;

    let window_start = month_start(now);
    let window_end = next_month_start(now);

    let month_orders = Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .filter(order::Column::OrderedAt.gte(window_start))
        .filter(order::Column::OrderedAt.lt(window_end))
        .all(conn)
        .await?;

    let monthly_total: Decimal = month_orders.iter().map(|o| o.total_paid).sum();
    let orders_this_month = month_orders.len() as u64;

    match decide(profile.is_vip, monthly_total, orders_this_month) {
        VipDecision::Grant => {
            let vip_since = next_month_start(now);
            let mut active: user_profile::ActiveModel = profile.into();
            active.is_vip = Set(true);
            active.vip_since = Set(Some(vip_since));
            active.vip_until = Set(None);
            active.updated_at = Set(now);
            active.update(conn).await?;

            info!(
                user_id = %user_id,
                monthly_total = %monthly_total,
                "Granted VIP status effective {}",
                vip_since
            );
            Ok(Some(VipChange::Granted))
        }
        VipDecision::Revoke => {
            let mut active: user_profile::ActiveModel = profile.into();
            active.is_vip = Set(false);
            active.vip_until = Set(Some(now));
            active.updated_at = Set(now);
            active.update(conn).await?;

            info!(user_id = %user_id, "Revoked VIP status");
            Ok(Some(VipChange::Revoked))
        }
        VipDecision::NoChange => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn grants_at_exactly_the_threshold() {
        assert_eq!(decide(false, dec!(10000.00), 1), VipDecision::Grant);
    }

    #[test]
    fn does_not_grant_below_the_threshold() {
        assert_eq!(decide(false, dec!(9999.99), 3), VipDecision::NoChange);
    }

    #[test]
    fn already_vip_stays_vip_above_threshold() {
        assert_eq!(decide(true, dec!(15000.00), 2), VipDecision::NoChange);
    }

    #[test]
    fn revokes_vip_with_zero_orders_this_month() {
        assert_eq!(decide(true, Decimal::ZERO, 0), VipDecision::Revoke);
    }

    #[test]
    fn keeps_vip_with_small_spend_but_some_orders() {
        assert_eq!(decide(true, dec!(500.00), 1), VipDecision::NoChange);
    }

    #[test]
    fn non_vip_with_no_orders_is_untouched() {
        assert_eq!(decide(false, Decimal::ZERO, 0), VipDecision::NoChange);
    }

    #[test]
    fn next_month_start_mid_month() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 30, 0).unwrap();
        assert_eq!(
            next_month_start(now),
            Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn next_month_start_rolls_over_december() {
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(
            next_month_start(now),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn month_start_truncates_to_first_instant() {
        let now = Utc.with_ymd_and_hms(2025, 2, 28, 8, 0, 0).unwrap();
        assert_eq!(
            month_start(now),
            Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()
        );
    }
}
