//! Leave-quota accounting at half-day granularity. Quotas are derived on
//! demand from the request history and the effective policy; no stored
//! balance is ever treated as ground truth.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::model::{LeavePolicy, LeaveRequest, LeaveStatus, LeaveType, PayStatus};

/// Derived quota for one employee + year + leave type. `total`/`remaining`
/// of `None` mean unlimited (unpaid leave). `remaining` may go negative:
/// submission is not quota-gated, and approval surfaces the shortfall as a
/// warning rather than silently blocking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveQuota {
    pub leave_type: LeaveType,
    pub total: Option<f64>,
    pub used: f64,
    pub pending: f64,
    pub remaining: Option<f64>,
}

/// Computes quotas from a policy and the employee's leave-request history.
pub struct LeaveQuotaTracker<'a> {
    policy: &'a LeavePolicy,
    requests: &'a [LeaveRequest],
}

impl<'a> LeaveQuotaTracker<'a> {
    pub fn new(policy: &'a LeavePolicy, requests: &'a [LeaveRequest]) -> Self {
        Self { policy, requests }
    }

    /// Quota for one leave type in one year.
    pub fn quota(&self, leave_type: &LeaveType, year: i32) -> LeaveQuota {
        let Some(rule) = self.policy.rule_for(leave_type) else {
            // Unpaid (and unknown codes) are unlimited and untracked.
            return LeaveQuota {
                leave_type: leave_type.clone(),
                total: None,
                used: 0.0,
                pending: 0.0,
                remaining: None,
            };
        };

        let carried = if rule.carry_forward {
            (rule.per_year_days - self.used_units(leave_type, year - 1)).max(0.0)
        } else {
            0.0
        };
        let total = rule.per_year_days + carried;
        let used = self.used_units(leave_type, year);
        let pending = self.pending_units(leave_type, year);

        LeaveQuota {
            leave_type: leave_type.clone(),
            total: Some(total),
            used,
            pending,
            remaining: Some(total - used - pending),
        }
    }

    /// One quota entry per type the policy knows, in a stable order.
    pub fn quotas_for_year(&self, year: i32) -> Vec<LeaveQuota> {
        self.policy
            .known_types()
            .iter()
            .map(|t| self.quota(t, year))
            .collect()
    }

    /// Approved units in `year`. Only paid approvals draw from the quota
    /// pool; unpaid approvals are tracked on the request but consume
    /// nothing.
    fn used_units(&self, leave_type: &LeaveType, year: i32) -> f64 {
        self.requests
            .iter()
            .filter(|r| {
                r.status == LeaveStatus::Approved
                    && r.pay_status == Some(PayStatus::Paid)
                    && r.leave_type == *leave_type
            })
            .flat_map(|r| &r.approved_days_details)
            .filter(|d| d.date.year() == year)
            .map(|d| d.units())
            .sum()
    }

    /// Requested units across still-pending requests in `year`.
    fn pending_units(&self, leave_type: &LeaveType, year: i32) -> f64 {
        self.requests
            .iter()
            .filter(|r| r.status == LeaveStatus::Pending && r.leave_type == *leave_type)
            .flat_map(|r| &r.requested_days_details)
            .filter(|d| d.date.year() == year)
            .map(|d| d.units())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::model::{HalfDayPeriod, LeaveDayDetail, LeaveTypeRule};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(
        leave_type: LeaveType,
        status: LeaveStatus,
        pay_status: Option<PayStatus>,
        days: Vec<LeaveDayDetail>,
    ) -> LeaveRequest {
        let start = days.iter().map(|d| d.date).min().unwrap();
        let end = days.iter().map(|d| d.date).max().unwrap();
        let approved = if status == LeaveStatus::Approved { days.clone() } else { Vec::new() };
        LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: 1,
            organization_id: 1,
            leave_type,
            start_date: start,
            end_date: end,
            reason: "family matter".to_string(),
            requested_days_details: days,
            status,
            pay_status,
            approved_days_details: approved,
            rejection_reason: None,
            created_at: date(2024, 1, 1).and_hms_opt(9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn remaining_is_total_minus_used_minus_pending() {
        let policy = LeavePolicy {
            paid: LeaveTypeRule::new(15.0, false),
            ..Default::default()
        };
        let requests = vec![
            request(
                LeaveType::Paid,
                LeaveStatus::Approved,
                Some(PayStatus::Paid),
                vec![
                    LeaveDayDetail::full(date(2025, 11, 3)),
                    LeaveDayDetail::half(date(2025, 11, 4), HalfDayPeriod::Morning),
                ],
            ),
            request(
                LeaveType::Paid,
                LeaveStatus::Pending,
                None,
                vec![LeaveDayDetail::full(date(2025, 12, 1))],
            ),
        ];

        let tracker = LeaveQuotaTracker::new(&policy, &requests);
        let quota = tracker.quota(&LeaveType::Paid, 2025);
        assert_eq!(quota.total, Some(15.0));
        assert_eq!(quota.used, 1.5);
        assert_eq!(quota.pending, 1.0);
        assert_eq!(quota.remaining, Some(12.5));
    }

    #[test]
    fn unpaid_approvals_do_not_consume_quota() {
        let policy = LeavePolicy::default();
        let requests = vec![request(
            LeaveType::Sick,
            LeaveStatus::Approved,
            Some(PayStatus::Unpaid),
            vec![LeaveDayDetail::full(date(2025, 6, 2))],
        )];

        let tracker = LeaveQuotaTracker::new(&policy, &requests);
        assert_eq!(tracker.quota(&LeaveType::Sick, 2025).used, 0.0);
    }

    #[test]
    fn unpaid_type_is_unlimited() {
        let policy = LeavePolicy::default();
        let tracker = LeaveQuotaTracker::new(&policy, &[]);
        let quota = tracker.quota(&LeaveType::Unpaid, 2025);
        assert_eq!(quota.total, None);
        assert_eq!(quota.remaining, None);
    }

    #[test]
    fn carry_forward_adds_prior_year_unused() {
        let policy = LeavePolicy {
            paid: LeaveTypeRule::new(10.0, true),
            ..Default::default()
        };
        let requests = vec![request(
            LeaveType::Paid,
            LeaveStatus::Approved,
            Some(PayStatus::Paid),
            vec![
                LeaveDayDetail::full(date(2024, 3, 4)),
                LeaveDayDetail::full(date(2024, 3, 5)),
                LeaveDayDetail::full(date(2024, 3, 6)),
            ],
        )];

        let tracker = LeaveQuotaTracker::new(&policy, &requests);
        // 10 + (10 - 3) carried from 2024
        assert_eq!(tracker.quota(&LeaveType::Paid, 2025).total, Some(17.0));
    }

    #[test]
    fn no_carry_forward_without_the_flag() {
        let policy = LeavePolicy {
            sick: LeaveTypeRule::new(10.0, false),
            ..Default::default()
        };
        let tracker = LeaveQuotaTracker::new(&policy, &[]);
        assert_eq!(tracker.quota(&LeaveType::Sick, 2025).total, Some(10.0));
    }

    #[test]
    fn rejected_and_cancelled_requests_count_nowhere() {
        let policy = LeavePolicy::default();
        let requests = vec![
            request(
                LeaveType::Sick,
                LeaveStatus::Rejected,
                None,
                vec![LeaveDayDetail::full(date(2025, 6, 2))],
            ),
            request(
                LeaveType::Sick,
                LeaveStatus::Cancelled,
                None,
                vec![LeaveDayDetail::full(date(2025, 6, 3))],
            ),
        ];

        let tracker = LeaveQuotaTracker::new(&policy, &requests);
        let quota = tracker.quota(&LeaveType::Sick, 2025);
        assert_eq!(quota.used, 0.0);
        assert_eq!(quota.pending, 0.0);
    }

    #[test]
    fn quotas_for_year_lists_custom_types() {
        let mut policy = LeavePolicy::default();
        policy.custom_types.push(crate::model::CustomLeaveType {
            code: "study".to_string(),
            label: "Study leave".to_string(),
            per_year_days: 5.0,
            carry_forward: false,
        });

        let tracker = LeaveQuotaTracker::new(&policy, &[]);
        let quotas = tracker.quotas_for_year(2025);
        assert_eq!(quotas.len(), 4);
        assert!(quotas.iter().any(|q| q.leave_type == LeaveType::Custom("study".to_string())));
    }
}
