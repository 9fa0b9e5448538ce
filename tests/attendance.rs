mod common;

use common::{EMP, ORG, at, base_config, context, context_with, date};
use hrm_core::model::{AdminStatus, DayStatus, GeoPoint, Geofence, Holiday, LeaveType};
use hrm_core::{
    AttendanceService, CalendarService, Conflict, EngineError, EngineResult, LeaveService,
    PolicyViolation,
};

#[tokio::test]
async fn check_in_past_grace_is_late() -> EngineResult<()> {
    let (_store, ctx) = context().await;
    let service = AttendanceService::new(ctx.clone());

    // Work starts 09:30 with 10 minutes grace.
    let outcome = service
        .check_in(EMP, ORG, at(date(2025, 11, 3), 9, 45), None)
        .await?;
    assert_eq!(outcome.minutes_late, 15);
    assert!(!outcome.within_grace);

    let day = CalendarService::new(ctx)
        .resolve_day_for(ORG, EMP, date(2025, 11, 3))
        .await?;
    assert_eq!(day.status, DayStatus::Present);
    assert_eq!(day.minutes_late, Some(15));
    assert_eq!(day.within_grace, Some(false));
    Ok(())
}

#[tokio::test]
async fn early_check_in_is_not_late() -> EngineResult<()> {
    let (_store, ctx) = context().await;
    let service = AttendanceService::new(ctx);

    let outcome = service
        .check_in(EMP, ORG, at(date(2025, 11, 3), 9, 0), None)
        .await?;
    assert_eq!(outcome.minutes_late, 0);
    assert!(outcome.within_grace);
    Ok(())
}

#[tokio::test]
async fn second_check_in_conflicts() -> EngineResult<()> {
    let (_store, ctx) = context().await;
    let service = AttendanceService::new(ctx);

    service
        .check_in(EMP, ORG, at(date(2025, 11, 3), 9, 0), None)
        .await?;
    let err = service
        .check_in(EMP, ORG, at(date(2025, 11, 3), 10, 0), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(Conflict::AlreadyCheckedIn)));
    Ok(())
}

#[tokio::test]
async fn check_out_requires_check_in() {
    let (_store, ctx) = context().await;
    let service = AttendanceService::new(ctx);

    let err = service
        .check_out(EMP, ORG, at(date(2025, 11, 3), 18, 0), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(Conflict::NoCheckInYet)));
}

#[tokio::test]
async fn check_out_flow_and_double_check_out() -> EngineResult<()> {
    let (_store, ctx) = context().await;
    let service = AttendanceService::new(ctx);
    let monday = date(2025, 11, 3);

    service.check_in(EMP, ORG, at(monday, 9, 0), None).await?;
    let record = service.check_out(EMP, ORG, at(monday, 18, 5), None).await?;
    assert!(record.check_out.is_some());

    let err = service
        .check_out(EMP, ORG, at(monday, 18, 30), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(Conflict::AlreadyCheckedOut)));
    Ok(())
}

#[tokio::test]
async fn check_in_on_non_working_day_is_rejected() {
    let (_store, ctx) = context_with(base_config()).await;
    let service = AttendanceService::new(ctx);

    let sunday = date(2025, 11, 2);
    let err = service
        .check_in(EMP, ORG, at(sunday, 9, 0), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Policy(PolicyViolation::NonWorkingDay(_))
    ));
}

#[tokio::test]
async fn non_working_check_in_allowed_when_configured() -> EngineResult<()> {
    let mut config = base_config();
    config.allow_non_working_checkin = true;
    let (_store, ctx) = context_with(config).await;
    let service = AttendanceService::new(ctx);

    let outcome = service
        .check_in(EMP, ORG, at(date(2025, 11, 2), 9, 0), None)
        .await?;
    assert!(!outcome.record.working_day);
    assert!(outcome.record.is_present);
    Ok(())
}

#[tokio::test]
async fn check_in_on_holiday_is_rejected() {
    let (store, ctx) = context_with(base_config()).await;
    let service = AttendanceService::new(ctx);

    store
        .put_holidays(ORG, vec![Holiday::fixed(1, "Founding Day", date(2025, 11, 3))])
        .await;

    let err = service
        .check_in(EMP, ORG, at(date(2025, 11, 3), 9, 0), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Policy(PolicyViolation::HolidayDay(_))
    ));
}

#[tokio::test]
async fn missing_location_is_recorded_but_flagged() -> EngineResult<()> {
    let mut config = base_config();
    config.geofence = Some(Geofence {
        center: GeoPoint { lat: 23.780, lng: 90.410 },
        radius_m: 200.0,
    });
    let (_store, ctx) = context_with(config).await;
    let service = AttendanceService::new(ctx);

    let outcome = service
        .check_in(EMP, ORG, at(date(2025, 11, 3), 9, 0), None)
        .await?;
    assert!(outcome.record.outside_geofence);
    assert!(outcome.record.check_in.is_some());
    Ok(())
}

#[tokio::test]
async fn location_inside_geofence_is_clean() -> EngineResult<()> {
    let mut config = base_config();
    config.geofence = Some(Geofence {
        center: GeoPoint { lat: 23.780, lng: 90.410 },
        radius_m: 200.0,
    });
    let (_store, ctx) = context_with(config).await;
    let service = AttendanceService::new(ctx);

    let outcome = service
        .check_in(
            EMP,
            ORG,
            at(date(2025, 11, 3), 9, 0),
            Some(GeoPoint { lat: 23.7801, lng: 90.4101 }),
        )
        .await?;
    assert!(!outcome.record.outside_geofence);
    Ok(())
}

#[tokio::test]
async fn admin_half_day_overrides_check_in() -> EngineResult<()> {
    let (_store, ctx) = context().await;
    let service = AttendanceService::new(ctx.clone());
    let monday = date(2025, 11, 3);

    service.check_in(EMP, ORG, at(monday, 9, 0), None).await?;
    service
        .admin_set_status(EMP, ORG, monday, AdminStatus::HalfDay, at(monday, 12, 0), Some("left early"))
        .await?;

    let day = CalendarService::new(ctx)
        .resolve_day_for(ORG, EMP, monday)
        .await?;
    assert_eq!(day.status, DayStatus::HalfDay);
    assert!(day.is_half_day);
    Ok(())
}

#[tokio::test]
async fn admin_paid_leave_creates_approved_request_and_consumes_quota() -> EngineResult<()> {
    let (_store, ctx) = context().await;
    let service = AttendanceService::new(ctx.clone());
    let monday = date(2025, 11, 3);

    let record = service
        .admin_set_status(EMP, ORG, monday, AdminStatus::PaidLeave, at(monday, 8, 0), None)
        .await?;
    assert!(record.is_leave_approved);

    let day = CalendarService::new(ctx.clone())
        .resolve_day_for(ORG, EMP, monday)
        .await?;
    assert_eq!(day.status, DayStatus::OnLeave);

    let quotas = LeaveService::new(ctx).get_leave_quota(EMP, ORG, 2025).await?;
    let paid = quotas.iter().find(|q| q.leave_type == LeaveType::Paid).unwrap();
    assert_eq!(paid.used, 1.0);
    Ok(())
}

#[tokio::test]
async fn bulk_marking_reports_per_item_outcomes() -> EngineResult<()> {
    let (store, ctx) = context().await;
    store.put_active_employees(ORG, vec![EMP, 43, 44]).await;
    let service = AttendanceService::new(ctx);
    let monday = date(2025, 11, 3);

    let outcomes = service
        .admin_set_status_bulk(ORG, None, monday, AdminStatus::Absent, at(monday, 8, 0), None)
        .await?;
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.ok));
    Ok(())
}

#[tokio::test]
async fn bulk_paid_leave_on_sunday_fails_per_item_without_aborting() -> EngineResult<()> {
    let (_store, ctx) = context().await;
    let service = AttendanceService::new(ctx);
    let sunday = date(2025, 11, 2);

    let outcomes = service
        .admin_set_status_bulk(
            ORG,
            Some(vec![EMP, 43]),
            sunday,
            AdminStatus::PaidLeave,
            at(sunday, 8, 0),
            None,
        )
        .await?;
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| !o.ok));
    assert!(outcomes.iter().all(|o| o.error.is_some()));
    Ok(())
}

#[tokio::test]
async fn admin_paid_leave_cannot_double_book_a_day() -> EngineResult<()> {
    let (_store, ctx) = context().await;
    let service = AttendanceService::new(ctx.clone());
    let monday = date(2025, 11, 3);

    service
        .admin_set_status(EMP, ORG, monday, AdminStatus::PaidLeave, at(monday, 8, 0), None)
        .await?;
    let err = service
        .admin_set_status(EMP, ORG, monday, AdminStatus::PaidLeave, at(monday, 9, 0), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Policy(PolicyViolation::InvalidDateSelection(_))
    ));

    // The day is still booked exactly once.
    let quotas = LeaveService::new(ctx).get_leave_quota(EMP, ORG, 2025).await?;
    let paid = quotas.iter().find(|q| q.leave_type == LeaveType::Paid).unwrap();
    assert_eq!(paid.used, 1.0);
    Ok(())
}
