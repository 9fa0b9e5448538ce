use serde::{Deserialize, Serialize};

/// Quota definition for one tracked leave type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeaveTypeRule {
    pub per_year_days: f64,
    pub carry_forward: bool,
}

impl LeaveTypeRule {
    pub fn new(per_year_days: f64, carry_forward: bool) -> Self {
        Self {
            per_year_days,
            carry_forward,
        }
    }
}

/// Organization-defined leave type beyond the built-in ones. Codes are
/// unique within a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomLeaveType {
    pub code: String,
    pub label: String,
    pub per_year_days: f64,
    pub carry_forward: bool,
}

/// Per-type quota definitions. `unpaid` is always unlimited and untracked,
/// so it carries no rule here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeavePolicy {
    pub sick: LeaveTypeRule,
    pub paid: LeaveTypeRule,
    pub custom_types: Vec<CustomLeaveType>,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            sick: LeaveTypeRule::new(10.0, false),
            paid: LeaveTypeRule::new(15.0, true),
            custom_types: Vec::new(),
        }
    }
}

impl LeavePolicy {
    /// Quota rule for a leave type; `None` means the type is unlimited
    /// (unpaid) or unknown to this policy.
    pub fn rule_for(&self, leave_type: &LeaveType) -> Option<LeaveTypeRule> {
        match leave_type {
            LeaveType::Sick => Some(self.sick),
            LeaveType::Paid => Some(self.paid),
            LeaveType::Unpaid => None,
            LeaveType::Custom(code) => self
                .custom_types
                .iter()
                .find(|c| c.code == *code)
                .map(|c| LeaveTypeRule::new(c.per_year_days, c.carry_forward)),
        }
    }

    pub fn knows(&self, leave_type: &LeaveType) -> bool {
        match leave_type {
            LeaveType::Sick | LeaveType::Paid | LeaveType::Unpaid => true,
            LeaveType::Custom(code) => self.custom_types.iter().any(|c| c.code == *code),
        }
    }

    /// All types this policy tracks or recognizes, in a stable order.
    pub fn known_types(&self) -> Vec<LeaveType> {
        let mut types = vec![LeaveType::Sick, LeaveType::Paid, LeaveType::Unpaid];
        types.extend(
            self.custom_types
                .iter()
                .map(|c| LeaveType::Custom(c.code.clone())),
        );
        types
    }
}

/// Sparse policy override carried by [`super::config::UserAttendanceOverride`].
/// An empty `custom_types` list counts as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LeavePolicyOverride {
    pub sick: Option<LeaveTypeRule>,
    pub paid: Option<LeaveTypeRule>,
    pub custom_types: Vec<CustomLeaveType>,
}

/// Leave classification: built-in types plus organization-defined codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LeaveType {
    Sick,
    Paid,
    Unpaid,
    Custom(String),
}

impl LeaveType {
    pub fn as_str(&self) -> &str {
        match self {
            LeaveType::Sick => "sick",
            LeaveType::Paid => "paid",
            LeaveType::Unpaid => "unpaid",
            LeaveType::Custom(code) => code,
        }
    }
}

impl std::fmt::Display for LeaveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for LeaveType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "sick" => LeaveType::Sick,
            "paid" => LeaveType::Paid,
            "unpaid" => LeaveType::Unpaid,
            _ => LeaveType::Custom(s),
        }
    }
}

impl From<LeaveType> for String {
    fn from(t: LeaveType) -> Self {
        t.as_str().to_string()
    }
}
