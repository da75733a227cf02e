use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::billing::{advance_billing_date, days_until_due, format_timestamp, parse_timestamp};
use crate::error::{BillError, Result};
use crate::history::record_payment;
use crate::i18n::Translate;
use crate::models::{Bill, BillingInterval, NewBill};
use crate::notifications::NotificationScheduler;
use crate::reminders::{
    cancel_all_reminders, cancel_reminder, parse_reminder_schema, schedule_all_reminders,
    serialize_reminder_schema, ReminderSchema,
};

const BILL_COLUMNS: &str = "id, name, amount, currency, billing_interval, next_billing_date, \
     reminder_schema, category_group, notes, active, created_at";

fn bill_from_row(row: &Row) -> rusqlite::Result<Bill> {
    let interval: String = row.get(4)?;
    let billing_interval = interval
        .parse::<BillingInterval>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    Ok(Bill {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        currency: row.get(3)?,
        billing_interval,
        next_billing_date: row.get(5)?,
        reminder_schema: row.get(6)?,
        category_group: row.get(7)?,
        notes: row.get(8)?,
        active: row.get(9)?,
        created_at: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
    })
}

fn query_bills(conn: &Connection, filter: &str) -> Result<Vec<Bill>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM bills {} ORDER BY next_billing_date ASC, id ASC",
        BILL_COLUMNS, filter
    ))?;
    let rows = stmt.query_map([], bill_from_row)?;

    let mut bills = Vec::new();
    for bill in rows {
        bills.push(bill?);
    }
    Ok(bills)
}

pub fn get_bills(conn: &Connection) -> Result<Vec<Bill>> {
    query_bills(conn, "")
}

pub fn get_active_bills(conn: &Connection) -> Result<Vec<Bill>> {
    query_bills(conn, "WHERE active = 1")
}

pub fn get_bill(conn: &Connection, id: i64) -> Result<Bill> {
    conn.query_row(
        &format!("SELECT {} FROM bills WHERE id = ?1", BILL_COLUMNS),
        params![id],
        bill_from_row,
    )
    .optional()?
    .ok_or_else(|| BillError::NotFound(format!("bill {}", id)))
}

/// Trims the name, upper-cases the currency and normalises the due date to UTC ISO form.
fn validated(
    name: &str,
    amount: f64,
    currency: &str,
    next_billing_date: &str,
) -> Result<(String, String, String)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BillError::InvalidInput("bill name is empty".to_string()));
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(BillError::InvalidInput(format!("invalid amount {}", amount)));
    }
    let currency = currency.trim().to_uppercase();
    if currency.is_empty() {
        return Err(BillError::InvalidInput("currency is empty".to_string()));
    }
    let due = parse_timestamp(next_billing_date)?;
    Ok((name.to_string(), currency, format_timestamp(&due)))
}

fn write_schema(conn: &Connection, id: i64, schema: &ReminderSchema) -> Result<()> {
    conn.execute(
        "UPDATE bills SET reminder_schema = ?1 WHERE id = ?2",
        params![serialize_reminder_schema(schema)?, id],
    )?;
    Ok(())
}

/// Persists a freshly scheduled schema; if the write fails the new handles are
/// cancelled so no notification outlives its record.
async fn store_scheduled<S: NotificationScheduler>(
    conn: &Connection,
    scheduler: &S,
    id: i64,
    scheduled: &ReminderSchema,
) -> Result<()> {
    if let Err(e) = write_schema(conn, id, scheduled) {
        log::error!("Failed to store reminders for bill {}: {}", id, e);
        abandon_scheduled(conn, scheduler, id, scheduled).await;
        return Err(e);
    }
    Ok(())
}

/// Cancels handles that never made it into the database and stores the
/// handle-free schema so the record does not point at cancelled notifications.
async fn abandon_scheduled<S: NotificationScheduler>(
    conn: &Connection,
    scheduler: &S,
    id: i64,
    scheduled: &ReminderSchema,
) {
    let cleared = cancel_all_reminders(scheduler, scheduled).await;
    if let Err(e) = write_schema(conn, id, &cleared) {
        log::error!("Failed to clear reminder handles for bill {}: {}", id, e);
    }
}

/// Schedules for active bills, cancels for inactive ones.
async fn refresh_reminders<S, T>(
    scheduler: &S,
    bill: &Bill,
    schema: &ReminderSchema,
    translator: &T,
) -> ReminderSchema
where
    S: NotificationScheduler,
    T: Translate + ?Sized,
{
    if bill.active {
        schedule_all_reminders(scheduler, bill.into(), schema, translator).await
    } else {
        cancel_all_reminders(scheduler, schema).await
    }
}

pub async fn add_bill<S, T>(
    conn: &Connection,
    scheduler: &S,
    translator: &T,
    new_bill: NewBill,
) -> Result<Bill>
where
    S: NotificationScheduler,
    T: Translate + ?Sized,
{
    let (name, currency, next_billing_date) = validated(
        &new_bill.name,
        new_bill.amount,
        &new_bill.currency,
        &new_bill.next_billing_date,
    )?;
    let schema = ReminderSchema::with_default();
    conn.execute(
        "INSERT INTO bills (name, amount, currency, billing_interval, next_billing_date, reminder_schema, category_group, notes, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1)",
        params![
            name,
            new_bill.amount,
            currency,
            new_bill.billing_interval.as_str(),
            next_billing_date,
            serialize_reminder_schema(&schema)?,
            new_bill.category_group,
            new_bill.notes,
        ],
    )?;
    let bill = get_bill(conn, conn.last_insert_rowid())?;
    log::info!("Added bill {} '{}' due {}", bill.id, bill.name, bill.next_billing_date);

    let scheduled = refresh_reminders(scheduler, &bill, &schema, translator).await;
    store_scheduled(conn, scheduler, bill.id, &scheduled).await?;
    get_bill(conn, bill.id)
}

/// Writes the editable fields of `bill` and re-schedules its stored reminders.
/// The reminder schema passed in is ignored; use `update_reminder_schema` to edit reminders.
pub async fn update_bill<S, T>(
    conn: &Connection,
    scheduler: &S,
    translator: &T,
    bill: &Bill,
) -> Result<Bill>
where
    S: NotificationScheduler,
    T: Translate + ?Sized,
{
    let existing = get_bill(conn, bill.id)?;
    let (name, currency, next_billing_date) =
        validated(&bill.name, bill.amount, &bill.currency, &bill.next_billing_date)?;
    conn.execute(
        "UPDATE bills SET name = ?1, amount = ?2, currency = ?3, billing_interval = ?4, next_billing_date = ?5,
                category_group = ?6, notes = ?7, active = ?8
         WHERE id = ?9",
        params![
            name,
            bill.amount,
            currency,
            bill.billing_interval.as_str(),
            next_billing_date,
            bill.category_group,
            bill.notes,
            bill.active,
            bill.id,
        ],
    )?;

    let updated = get_bill(conn, bill.id)?;
    let schema = parse_reminder_schema(existing.reminder_schema.as_deref());
    let scheduled = refresh_reminders(scheduler, &updated, &schema, translator).await;
    store_scheduled(conn, scheduler, bill.id, &scheduled).await?;
    get_bill(conn, bill.id)
}

/// Replaces a bill's reminders. Handles are taken from the stored schema, and
/// reminders that disappeared have their notifications cancelled.
pub async fn update_reminder_schema<S, T>(
    conn: &Connection,
    scheduler: &S,
    translator: &T,
    id: i64,
    mut schema: ReminderSchema,
) -> Result<Bill>
where
    S: NotificationScheduler,
    T: Translate + ?Sized,
{
    let bill = get_bill(conn, id)?;
    let stored = parse_reminder_schema(bill.reminder_schema.as_deref());

    for reminder in &mut schema.reminders {
        reminder.notification_id = stored.find(&reminder.id).and_then(|r| r.notification_id.clone());
    }
    for removed in stored.reminders.iter().filter(|r| schema.find(&r.id).is_none()) {
        if let Some(handle) = removed.notification_id.as_deref() {
            cancel_reminder(scheduler, handle).await;
        }
    }

    let scheduled = refresh_reminders(scheduler, &bill, &schema, translator).await;
    store_scheduled(conn, scheduler, id, &scheduled).await?;
    get_bill(conn, id)
}

pub async fn set_bill_active<S, T>(
    conn: &Connection,
    scheduler: &S,
    translator: &T,
    id: i64,
    active: bool,
) -> Result<Bill>
where
    S: NotificationScheduler,
    T: Translate + ?Sized,
{
    conn.execute("UPDATE bills SET active = ?1 WHERE id = ?2", params![active, id])?;
    let bill = get_bill(conn, id)?;
    let schema = parse_reminder_schema(bill.reminder_schema.as_deref());
    let scheduled = refresh_reminders(scheduler, &bill, &schema, translator).await;
    store_scheduled(conn, scheduler, id, &scheduled).await?;
    get_bill(conn, id)
}

/// Cancels the bill's notifications, then removes it together with its payment history.
pub async fn delete_bill<S: NotificationScheduler>(
    conn: &Connection,
    scheduler: &S,
    id: i64,
) -> Result<()> {
    let bill = get_bill(conn, id)?;
    let schema = parse_reminder_schema(bill.reminder_schema.as_deref());
    cancel_all_reminders(scheduler, &schema).await;

    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM payment_history WHERE bill_id = ?1", params![id])?;
    tx.execute("DELETE FROM bills WHERE id = ?1", params![id])?;
    tx.commit()?;
    log::info!("Deleted bill {} '{}'", id, bill.name);
    Ok(())
}

fn commit_payment(
    conn: &Connection,
    bill: &Bill,
    paid_at: &str,
    next_billing_date: &str,
    active: bool,
    schema: &ReminderSchema,
) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    record_payment(&tx, bill, paid_at)?;
    tx.execute(
        "UPDATE bills SET next_billing_date = ?1, reminder_schema = ?2, active = ?3 WHERE id = ?4",
        params![next_billing_date, serialize_reminder_schema(schema)?, active, bill.id],
    )?;
    tx.commit()?;
    Ok(())
}

/// Records a payment for the current due date.
///
/// Recurring bills move to their next due date and get their reminders
/// re-scheduled against it; one-time bills are deactivated. Notifications are
/// scheduled before the database write; if that write fails they are cancelled
/// and the bill keeps its old due date with no notification handles.
pub async fn mark_bill_paid<S, T>(
    conn: &Connection,
    scheduler: &S,
    translator: &T,
    id: i64,
    paid_at: &DateTime<Utc>,
) -> Result<Bill>
where
    S: NotificationScheduler,
    T: Translate + ?Sized,
{
    let bill = get_bill(conn, id)?;
    let schema = parse_reminder_schema(bill.reminder_schema.as_deref());
    let paid_at = format_timestamp(paid_at);

    if !bill.billing_interval.is_recurring() {
        let cleared = cancel_all_reminders(scheduler, &schema).await;
        commit_payment(conn, &bill, &paid_at, &bill.next_billing_date, false, &cleared)?;
        log::info!("One-time bill {} '{}' paid", bill.id, bill.name);
        return get_bill(conn, id);
    }

    let next_billing_date = advance_billing_date(&bill.next_billing_date, bill.billing_interval)?;
    let advanced = Bill {
        next_billing_date: next_billing_date.clone(),
        ..bill.clone()
    };
    let scheduled = refresh_reminders(scheduler, &advanced, &schema, translator).await;

    if let Err(e) = commit_payment(conn, &bill, &paid_at, &next_billing_date, bill.active, &scheduled) {
        log::error!("Failed to record payment for bill {}: {}", bill.id, e);
        abandon_scheduled(conn, scheduler, bill.id, &scheduled).await;
        return Err(e);
    }
    log::info!(
        "Bill {} '{}' paid; next due {}",
        bill.id, bill.name, next_billing_date
    );
    get_bill(conn, id)
}

fn active_bills_where<F>(conn: &Connection, now: &DateTime<Utc>, keep: F) -> Result<Vec<Bill>>
where
    F: Fn(i64) -> bool,
{
    let mut selected = Vec::new();
    for bill in get_active_bills(conn)? {
        match days_until_due(&bill, now) {
            Ok(days) if keep(days) => selected.push(bill),
            Ok(_) => {}
            Err(e) => log::warn!("Skipping bill {} with bad due date: {}", bill.id, e),
        }
    }
    Ok(selected)
}

/// Active bills due today or within the next `within_days` days.
pub fn get_upcoming_bills(
    conn: &Connection,
    now: &DateTime<Utc>,
    within_days: i64,
) -> Result<Vec<Bill>> {
    active_bills_where(conn, now, |days| (0..=within_days).contains(&days))
}

pub fn get_overdue_bills(conn: &Connection, now: &DateTime<Utc>) -> Result<Vec<Bill>> {
    active_bills_where(conn, now, |days| days < 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::get_payment_history;
    use crate::i18n::Catalog;
    use crate::notifications::fake::FakeScheduler;
    use crate::reminders::create_default_reminder;
    use crate::utils::init_db;
    use chrono::Duration;

    fn setup_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("open in-memory");
        init_db(&conn).expect("create schema");
        conn
    }

    fn new_bill(name: &str, interval: BillingInterval, due: &str) -> NewBill {
        NewBill {
            name: name.to_string(),
            amount: 12.5,
            currency: "usd".to_string(),
            billing_interval: interval,
            next_billing_date: due.to_string(),
            category_group: Some("streaming".to_string()),
            notes: None,
        }
    }

    fn in_days(days: i64) -> String {
        format_timestamp(&(Utc::now() + Duration::days(days)))
    }

    fn schema_of(bill: &Bill) -> ReminderSchema {
        parse_reminder_schema(bill.reminder_schema.as_deref())
    }

    #[tokio::test]
    async fn add_bill_schedules_the_default_reminder() {
        let conn = setup_conn();
        let scheduler = FakeScheduler::new();
        let catalog = Catalog::default();

        let bill = add_bill(&conn, &scheduler, &catalog, new_bill("  Netflix ", BillingInterval::Monthly, &in_days(30)))
            .await
            .unwrap();

        assert_eq!(bill.name, "Netflix");
        assert_eq!(bill.currency, "USD");
        assert!(bill.active);
        let schema = schema_of(&bill);
        assert_eq!(schema.reminders.len(), 1);
        assert_eq!(schema.reminders[0].notification_id.as_deref(), Some("notif-1"));
        assert_eq!(scheduler.scheduled().len(), 1);
    }

    #[tokio::test]
    async fn add_bill_rejects_bad_input() {
        let conn = setup_conn();
        let scheduler = FakeScheduler::new();
        let catalog = Catalog::default();

        let empty_name = add_bill(&conn, &scheduler, &catalog, new_bill(" ", BillingInterval::Monthly, &in_days(3))).await;
        assert!(matches!(empty_name, Err(BillError::InvalidInput(_))));

        let bad_date = add_bill(&conn, &scheduler, &catalog, new_bill("Gym", BillingInterval::Monthly, "soon")).await;
        assert!(matches!(bad_date, Err(BillError::InvalidTimestamp(_))));

        let mut negative = new_bill("Gym", BillingInterval::Monthly, &in_days(3));
        negative.amount = -1.0;
        assert!(add_bill(&conn, &scheduler, &catalog, negative).await.is_err());
        assert!(get_bills(&conn).unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_bill_missing_is_not_found() {
        let conn = setup_conn();
        assert!(matches!(get_bill(&conn, 42), Err(BillError::NotFound(_))));
    }

    #[tokio::test]
    async fn mark_paid_advances_monthly_with_rollover_and_records_history() {
        let conn = setup_conn();
        let scheduler = FakeScheduler::new();
        let catalog = Catalog::default();
        let bill = add_bill(&conn, &scheduler, &catalog, new_bill("Rent", BillingInterval::Monthly, "2023-01-31T00:00:00Z"))
            .await
            .unwrap();
        let paid_at = parse_timestamp("2023-01-30T12:00:00Z").unwrap();

        let paid = mark_bill_paid(&conn, &scheduler, &catalog, bill.id, &paid_at).await.unwrap();

        assert_eq!(paid.next_billing_date, "2023-03-03T00:00:00.000Z");
        let history = get_payment_history(&conn, Some(bill.id)).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].billing_date, "2023-01-31T00:00:00.000Z");
        assert_eq!(history[0].paid_at, "2023-01-30T12:00:00.000Z");
        assert_eq!(history[0].amount, 12.5);
        // The new due date is long past, so nothing is scheduled.
        assert_eq!(schema_of(&paid).scheduled_ids().count(), 0);
    }

    #[tokio::test]
    async fn mark_paid_reschedules_against_the_new_date() {
        let conn = setup_conn();
        let scheduler = FakeScheduler::new();
        let catalog = Catalog::default();
        let bill = add_bill(&conn, &scheduler, &catalog, new_bill("Phone", BillingInterval::Weekly, &in_days(10)))
            .await
            .unwrap();
        let reminder_id = schema_of(&bill).reminders[0].id.clone();

        let paid = mark_bill_paid(&conn, &scheduler, &catalog, bill.id, &Utc::now()).await.unwrap();

        let before = parse_timestamp(&bill.next_billing_date).unwrap();
        let after = parse_timestamp(&paid.next_billing_date).unwrap();
        assert_eq!((after - before).num_days(), 7);
        assert_eq!(scheduler.cancelled(), vec!["notif-1".to_string()]);
        let schema = schema_of(&paid);
        assert_eq!(schema.reminders[0].id, reminder_id);
        assert_eq!(schema.reminders[0].notification_id.as_deref(), Some("notif-2"));
        assert!(scheduler.scheduled()[1].1.trigger_at > scheduler.scheduled()[0].1.trigger_at);
    }

    #[tokio::test]
    async fn failed_payment_write_leaves_no_stale_handles() {
        let conn = setup_conn();
        let scheduler = FakeScheduler::new();
        let catalog = Catalog::default();
        let bill = add_bill(&conn, &scheduler, &catalog, new_bill("Water", BillingInterval::Monthly, &in_days(10)))
            .await
            .unwrap();
        assert_eq!(schema_of(&bill).reminders[0].notification_id.as_deref(), Some("notif-1"));
        conn.execute_batch(
            "CREATE TRIGGER reject_payments BEFORE INSERT ON payment_history
             BEGIN SELECT RAISE(ABORT, 'history is read-only'); END;",
        )
        .expect("create trigger");

        let result = mark_bill_paid(&conn, &scheduler, &catalog, bill.id, &Utc::now()).await;

        assert!(matches!(result, Err(BillError::Database(_))));
        assert_eq!(scheduler.cancelled(), vec!["notif-1".to_string(), "notif-2".to_string()]);
        let stored = get_bill(&conn, bill.id).unwrap();
        assert_eq!(stored.next_billing_date, bill.next_billing_date);
        assert_eq!(schema_of(&stored).scheduled_ids().count(), 0);
        assert_eq!(schema_of(&stored).reminders[0].id, schema_of(&bill).reminders[0].id);
        assert!(get_payment_history(&conn, Some(bill.id)).unwrap().is_empty());
    }

    #[tokio::test]
    async fn one_time_bills_are_deactivated_when_paid() {
        let conn = setup_conn();
        let scheduler = FakeScheduler::new();
        let catalog = Catalog::default();
        let due = in_days(5);
        let bill = add_bill(&conn, &scheduler, &catalog, new_bill("Repair", BillingInterval::Unique, &due))
            .await
            .unwrap();

        let paid = mark_bill_paid(&conn, &scheduler, &catalog, bill.id, &Utc::now()).await.unwrap();

        assert!(!paid.active);
        assert_eq!(paid.next_billing_date, bill.next_billing_date);
        assert_eq!(schema_of(&paid).scheduled_ids().count(), 0);
        assert_eq!(scheduler.cancelled(), vec!["notif-1".to_string()]);
        assert_eq!(get_payment_history(&conn, Some(bill.id)).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn editing_reminders_cancels_removed_ones() {
        let conn = setup_conn();
        let scheduler = FakeScheduler::new();
        let catalog = Catalog::default();
        let bill = add_bill(&conn, &scheduler, &catalog, new_bill("Cloud", BillingInterval::Yearly, &in_days(60)))
            .await
            .unwrap();

        let mut replacement = create_default_reminder();
        replacement.days_before = 7;
        let edited = ReminderSchema { reminders: vec![replacement.clone()] };
        let updated = update_reminder_schema(&conn, &scheduler, &catalog, bill.id, edited).await.unwrap();

        assert_eq!(scheduler.cancelled(), vec!["notif-1".to_string()]);
        let schema = schema_of(&updated);
        assert_eq!(schema.reminders.len(), 1);
        assert_eq!(schema.reminders[0].id, replacement.id);
        assert_eq!(schema.reminders[0].days_before, 7);
        assert_eq!(schema.reminders[0].notification_id.as_deref(), Some("notif-2"));
    }

    #[tokio::test]
    async fn deactivating_cancels_and_reactivating_reschedules() {
        let conn = setup_conn();
        let scheduler = FakeScheduler::new();
        let catalog = Catalog::default();
        let bill = add_bill(&conn, &scheduler, &catalog, new_bill("Gym", BillingInterval::Monthly, &in_days(20)))
            .await
            .unwrap();

        let paused = set_bill_active(&conn, &scheduler, &catalog, bill.id, false).await.unwrap();
        assert!(!paused.active);
        assert_eq!(schema_of(&paused).scheduled_ids().count(), 0);
        assert!(get_active_bills(&conn).unwrap().is_empty());

        let resumed = set_bill_active(&conn, &scheduler, &catalog, bill.id, true).await.unwrap();
        assert_eq!(schema_of(&resumed).reminders[0].notification_id.as_deref(), Some("notif-2"));
    }

    #[tokio::test]
    async fn update_bill_moves_reminders_with_the_due_date() {
        let conn = setup_conn();
        let scheduler = FakeScheduler::new();
        let catalog = Catalog::default();
        let bill = add_bill(&conn, &scheduler, &catalog, new_bill("Insurance", BillingInterval::Yearly, &in_days(40)))
            .await
            .unwrap();

        let edited = Bill {
            amount: 99.0,
            next_billing_date: in_days(50),
            notes: Some("renewal".to_string()),
            ..bill.clone()
        };
        let updated = update_bill(&conn, &scheduler, &catalog, &edited).await.unwrap();

        assert_eq!(updated.amount, 99.0);
        assert_eq!(updated.notes.as_deref(), Some("renewal"));
        assert_eq!(scheduler.cancelled(), vec!["notif-1".to_string()]);
        assert_eq!(schema_of(&updated).reminders[0].notification_id.as_deref(), Some("notif-2"));
        assert!(scheduler.scheduled()[1].1.body.contains("$99.00"));
    }

    #[tokio::test]
    async fn delete_bill_cancels_and_removes_history() {
        let conn = setup_conn();
        let scheduler = FakeScheduler::new();
        let catalog = Catalog::default();
        let bill = add_bill(&conn, &scheduler, &catalog, new_bill("Spotify", BillingInterval::Monthly, &in_days(15)))
            .await
            .unwrap();
        mark_bill_paid(&conn, &scheduler, &catalog, bill.id, &Utc::now()).await.unwrap();

        delete_bill(&conn, &scheduler, bill.id).await.unwrap();

        assert!(matches!(get_bill(&conn, bill.id), Err(BillError::NotFound(_))));
        assert!(get_payment_history(&conn, None).unwrap().is_empty());
        assert_eq!(scheduler.cancelled().last().map(String::as_str), Some("notif-2"));
    }

    #[tokio::test]
    async fn legacy_schema_is_upgraded_on_next_schedule() {
        let conn = setup_conn();
        let scheduler = FakeScheduler::new();
        let catalog = Catalog::default();
        conn.execute(
            "INSERT INTO bills (name, amount, currency, billing_interval, next_billing_date, reminder_schema)
             VALUES ('Old', 5.0, 'EUR', 'monthly', ?1, '{\"notificationId\":\"legacy-id\"}')",
            params![in_days(20)],
        )
        .unwrap();
        let id = conn.last_insert_rowid();

        let bill = set_bill_active(&conn, &scheduler, &catalog, id, true).await.unwrap();

        assert_eq!(scheduler.cancelled(), vec!["legacy-id".to_string()]);
        let schema = schema_of(&bill);
        assert_eq!(schema.reminders.len(), 1);
        assert_eq!(schema.reminders[0].hour, 0);
        assert_eq!(schema.reminders[0].notification_id.as_deref(), Some("notif-1"));
        assert!(bill.reminder_schema.unwrap().contains("\"reminders\""));
    }

    #[tokio::test]
    async fn upcoming_and_overdue_views() {
        let conn = setup_conn();
        let scheduler: Option<FakeScheduler> = None;
        let catalog = Catalog::default();
        let now = parse_timestamp("2024-03-10T12:00:00Z").unwrap();
        for (name, due) in [
            ("late", "2024-03-08T00:00:00Z"),
            ("today", "2024-03-10T20:00:00Z"),
            ("soon", "2024-03-15T00:00:00Z"),
            ("later", "2024-04-15T00:00:00Z"),
        ] {
            add_bill(&conn, &scheduler, &catalog, new_bill(name, BillingInterval::Monthly, due))
                .await
                .unwrap();
        }

        let upcoming: Vec<String> = get_upcoming_bills(&conn, &now, 7).unwrap().into_iter().map(|b| b.name).collect();
        assert_eq!(upcoming, vec!["today".to_string(), "soon".to_string()]);

        let overdue = get_overdue_bills(&conn, &now).unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].name, "late");
        assert_eq!(get_bills(&conn).unwrap().len(), 4);
    }
}
