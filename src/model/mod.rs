pub mod config;
pub mod day_record;
pub mod holiday;
pub mod leave_request;
pub mod policy;

pub use config::{
    AttendanceConfig, Geofence, GeoPoint, UserAttendanceOverride, WeekdayRule, WeekdayRules,
    WorkingDays,
};
pub use day_record::{AdminStatus, CheckEvent, DayRecord, DayStatus, MonthlyAttendance};
pub use holiday::{Holiday, HolidayRecurrence};
pub use leave_request::{HalfDayPeriod, LeaveDayDetail, LeaveRequest, LeaveStatus, PayStatus};
pub use policy::{CustomLeaveType, LeavePolicy, LeavePolicyOverride, LeaveType, LeaveTypeRule};
