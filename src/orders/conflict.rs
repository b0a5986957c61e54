//! Conflict detection for same-service bookings
//!
//! Two rules guard the booking invariant:
//!
//! - **Cross-order**: a candidate conflicts with any other stored order that
//!   shares at least one service id and whose datetime is not earlier than
//!   `candidate - window`. In the default [`WindowMode::Trailing`] mode there
//!   is no upper bound, so a shared-service order far in the future also
//!   conflicts.
//! - **Self-displacement** (update only): an order may not be moved to a
//!   datetime within `window` of its own stored datetime, whatever its
//!   services.
//!
//! Everything here is pure. The store answers a [`ConflictQuery`]; the
//! checker only builds queries and turns answers into a [`Verdict`].

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::models::{Order, OrderDraft, OrderId, ServiceId};

/// Message returned for every conflict, whichever rule fired
pub const CONFLICT_MESSAGE: &str = "An order already exists within 3 hours";

/// Shape of the cross-order window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// `other.datetime >= candidate - window`, no upper bound
    #[default]
    Trailing,
    /// `|other.datetime - candidate| <= window`
    Symmetric,
}

/// Width and shape of the conflict window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictWindow {
    span: TimeDelta,
    mode: WindowMode,
}

impl ConflictWindow {
    pub const DEFAULT_HOURS: i64 = 3;

    pub fn new(span: TimeDelta, mode: WindowMode) -> Self {
        Self {
            span: span.abs(),
            mode,
        }
    }

    pub fn hours(hours: i64, mode: WindowMode) -> Self {
        Self::new(TimeDelta::hours(hours), mode)
    }

    pub fn span(&self) -> TimeDelta {
        self.span
    }

    fn lower_bound(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        at.checked_sub_signed(self.span)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn upper_bound(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.mode {
            WindowMode::Trailing => None,
            WindowMode::Symmetric => Some(
                at.checked_add_signed(self.span)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            ),
        }
    }
}

impl Default for ConflictWindow {
    fn default() -> Self {
        Self::hours(Self::DEFAULT_HOURS, WindowMode::Trailing)
    }
}

/// Typed predicate: "a stored order, other than `exclude`, whose datetime
/// lies in `[not_before, not_after]` and whose service ids intersect
/// `service_ids`".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictQuery {
    pub not_before: DateTime<Utc>,
    pub not_after: Option<DateTime<Utc>>,
    /// Distinct, ascending
    pub service_ids: Vec<ServiceId>,
    pub exclude: Option<OrderId>,
}

impl ConflictQuery {
    pub fn matches(&self, order: &Order) -> bool {
        if self.exclude.as_ref() == Some(&order.id) {
            return false;
        }
        if order.datetime < self.not_before {
            return false;
        }
        if self.not_after.is_some_and(|not_after| order.datetime > not_after) {
            return false;
        }
        order
            .services
            .iter()
            .any(|s| self.service_ids.binary_search(&s.service_id).is_ok())
    }
}

/// Which rule rejected a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictRule {
    CrossOrder,
    SelfDisplacement,
}

impl ConflictRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictRule::CrossOrder => "CROSS_ORDER",
            ConflictRule::SelfDisplacement => "SELF_DISPLACEMENT",
        }
    }
}

impl fmt::Display for ConflictRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Clear,
    Conflict(ConflictRule),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictChecker {
    window: ConflictWindow,
}

impl ConflictChecker {
    pub fn new(window: ConflictWindow) -> Self {
        Self { window }
    }

    /// Query for the creation path: nothing excluded
    pub fn creation_query(&self, draft: &OrderDraft) -> ConflictQuery {
        self.query(draft.datetime, draft.service_ids(), None)
    }

    /// Query for the update path: the order being updated is excluded
    pub fn update_query(&self, order_id: &OrderId, draft: &OrderDraft) -> ConflictQuery {
        self.query(draft.datetime, draft.service_ids(), Some(order_id.clone()))
    }

    fn query(
        &self,
        at: DateTime<Utc>,
        service_ids: BTreeSet<ServiceId>,
        exclude: Option<OrderId>,
    ) -> ConflictQuery {
        ConflictQuery {
            not_before: self.window.lower_bound(at),
            not_after: self.window.upper_bound(at),
            service_ids: service_ids.into_iter().collect(),
            exclude,
        }
    }

    /// Turn the store's answer to a conflict query into a verdict
    pub fn cross_order(&self, found: Option<&Order>) -> Verdict {
        match found {
            Some(_) => Verdict::Conflict(ConflictRule::CrossOrder),
            None => Verdict::Clear,
        }
    }

    /// Rescheduling to within the window of the stored datetime is rejected.
    /// Boundary inclusive: exactly `window` apart is still a conflict.
    pub fn displacement(&self, current: &Order, candidate: &OrderDraft) -> Verdict {
        let moved_by = (candidate.datetime - current.datetime).abs();
        if moved_by <= self.window.span() {
            Verdict::Conflict(ConflictRule::SelfDisplacement)
        } else {
            Verdict::Clear
        }
    }

    /// Update decision from the store's answer to [`Self::update_query`].
    /// Cross-order is reported before self-displacement.
    pub fn update_verdict(
        &self,
        current: &Order,
        draft: &OrderDraft,
        found: Option<&Order>,
    ) -> Verdict {
        match self.cross_order(found) {
            Verdict::Clear => self.displacement(current, draft),
            conflict => conflict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::models::ServiceRef;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 7, 8, 9, 0, 0).unwrap()
    }

    fn order(id: &str, at: DateTime<Utc>, services: &[ServiceId]) -> Order {
        Order {
            id: OrderId::from(id),
            datetime: at,
            total_fee: Decimal::new(100, 0),
            services: services.iter().copied().map(ServiceRef::new).collect(),
        }
    }

    fn draft(at: DateTime<Utc>, services: &[ServiceId]) -> OrderDraft {
        OrderDraft {
            datetime: at,
            total_fee: Decimal::new(200, 0),
            services: services.iter().copied().map(ServiceRef::new).collect(),
        }
    }

    /// Answer the creation query over a snapshot, as a store would
    fn check_create(checker: &ConflictChecker, draft: &OrderDraft, existing: &[Order]) -> Verdict {
        let query = checker.creation_query(draft);
        checker.cross_order(existing.iter().find(|o| query.matches(o)))
    }

    fn check_update(
        checker: &ConflictChecker,
        current: &Order,
        draft: &OrderDraft,
        existing: &[Order],
    ) -> Verdict {
        let query = checker.update_query(&current.id, draft);
        checker.update_verdict(current, draft, existing.iter().find(|o| query.matches(o)))
    }

    #[test]
    fn test_creation_query_shape() {
        let checker = ConflictChecker::default();
        let query = checker.creation_query(&draft(t0(), &[9, 3, 9]));

        assert_eq!(query.not_before, t0() - TimeDelta::hours(3));
        assert_eq!(query.not_after, None);
        assert_eq!(query.service_ids, vec![3, 9]);
        assert_eq!(query.exclude, None);
    }

    #[test]
    fn test_create_conflicts_with_shared_service_inside_window() {
        let checker = ConflictChecker::default();
        let existing = vec![order("a", t0(), &[456])];

        let verdict = check_create(&checker, &draft(t0() + TimeDelta::hours(1), &[456]), &existing);
        assert_eq!(verdict, Verdict::Conflict(ConflictRule::CrossOrder));
    }

    #[test]
    fn test_create_clear_for_other_services() {
        let checker = ConflictChecker::default();
        let existing = vec![order("a", t0(), &[456])];

        let verdict = check_create(&checker, &draft(t0() + TimeDelta::hours(1), &[999]), &existing);
        assert_eq!(verdict, Verdict::Clear);
    }

    #[test]
    fn test_lower_bound_is_inclusive() {
        let checker = ConflictChecker::default();
        let candidate = t0() + TimeDelta::hours(3);

        let at_edge = vec![order("a", t0(), &[1])];
        assert_eq!(
            check_create(&checker, &draft(candidate, &[1]), &at_edge),
            Verdict::Conflict(ConflictRule::CrossOrder)
        );

        let just_outside = vec![order("a", t0() - TimeDelta::milliseconds(1), &[1])];
        assert_eq!(
            check_create(&checker, &draft(candidate, &[1]), &just_outside),
            Verdict::Clear
        );
    }

    #[test]
    fn test_trailing_window_has_no_upper_bound() {
        let checker = ConflictChecker::default();
        let far_future = vec![order("a", t0() + TimeDelta::days(30), &[7])];

        assert_eq!(
            check_create(&checker, &draft(t0(), &[7]), &far_future),
            Verdict::Conflict(ConflictRule::CrossOrder)
        );
    }

    #[test]
    fn test_symmetric_window_bounds_both_sides() {
        let checker = ConflictChecker::new(ConflictWindow::hours(3, WindowMode::Symmetric));

        let far_future = vec![order("a", t0() + TimeDelta::days(30), &[7])];
        assert_eq!(
            check_create(&checker, &draft(t0(), &[7]), &far_future),
            Verdict::Clear
        );

        let near_future = vec![order("a", t0() + TimeDelta::hours(3), &[7])];
        assert_eq!(
            check_create(&checker, &draft(t0(), &[7]), &near_future),
            Verdict::Conflict(ConflictRule::CrossOrder)
        );
    }

    #[test]
    fn test_update_excludes_itself_from_cross_order_scan() {
        let checker = ConflictChecker::default();
        let current = order("x", t0(), &[123]);
        let existing = vec![current.clone()];

        let verdict = check_update(
            &checker,
            &current,
            &draft(t0() + TimeDelta::hours(4), &[123]),
            &existing,
        );
        assert_eq!(verdict, Verdict::Clear);
    }

    #[test]
    fn test_update_self_displacement() {
        let checker = ConflictChecker::default();
        let current = order("x", t0(), &[123]);

        let verdict = check_update(
            &checker,
            &current,
            &draft(t0() + TimeDelta::minutes(5), &[456]),
            std::slice::from_ref(&current),
        );
        assert_eq!(verdict, Verdict::Conflict(ConflictRule::SelfDisplacement));

        // earlier moves count too
        let verdict = check_update(
            &checker,
            &current,
            &draft(t0() - TimeDelta::hours(2), &[456]),
            std::slice::from_ref(&current),
        );
        assert_eq!(verdict, Verdict::Conflict(ConflictRule::SelfDisplacement));
    }

    #[test]
    fn test_displacement_boundary() {
        let checker = ConflictChecker::default();
        let current = order("x", t0(), &[1]);

        assert_eq!(
            checker.displacement(&current, &draft(t0() + TimeDelta::hours(3), &[1])),
            Verdict::Conflict(ConflictRule::SelfDisplacement)
        );
        assert_eq!(
            checker.displacement(
                &current,
                &draft(t0() + TimeDelta::hours(3) + TimeDelta::milliseconds(1), &[1])
            ),
            Verdict::Clear
        );
    }

    #[test]
    fn test_update_cross_order_reported_before_displacement() {
        let checker = ConflictChecker::default();
        let other = order("other", t0() - TimeDelta::hours(2), &[456]);
        let current = order("x", t0(), &[789]);
        let existing = vec![other, current.clone()];

        let verdict = check_update(&checker, &current, &draft(t0(), &[456]), &existing);
        assert_eq!(verdict, Verdict::Conflict(ConflictRule::CrossOrder));
    }

    #[test]
    fn test_update_cross_order_even_when_displacement_fine() {
        let checker = ConflictChecker::default();
        let other = order("other", t0() + TimeDelta::hours(10), &[5]);
        let current = order("x", t0(), &[5]);
        let existing = vec![other, current.clone()];

        let verdict = check_update(
            &checker,
            &current,
            &draft(t0() + TimeDelta::hours(8), &[5]),
            &existing,
        );
        assert_eq!(verdict, Verdict::Conflict(ConflictRule::CrossOrder));
    }

    #[test]
    fn test_query_matches_respects_exclude() {
        let query = ConflictQuery {
            not_before: t0(),
            not_after: None,
            service_ids: vec![1],
            exclude: Some(OrderId::from("x")),
        };
        assert!(!query.matches(&order("x", t0(), &[1])));
        assert!(query.matches(&order("y", t0(), &[1])));
    }

    #[test]
    fn test_window_extremes_do_not_overflow() {
        let checker = ConflictChecker::default();
        let query = checker.creation_query(&draft(DateTime::<Utc>::MIN_UTC, &[1]));
        assert_eq!(query.not_before, DateTime::<Utc>::MIN_UTC);
    }
}
