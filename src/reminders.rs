use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::billing::parse_timestamp;
use crate::currency::format_amount;
use crate::error::Result;
use crate::i18n::{interpolate, Translate};
use crate::models::Bill;
use crate::notifications::{NotificationRequest, NotificationScheduler};

pub const DEFAULT_DAYS_BEFORE: u32 = 1;
pub const DEFAULT_HOUR: u32 = 9;
pub const DEFAULT_MINUTE: u32 = 0;

/// One notification rule for a bill.
///
/// `notification_id` is the platform handle of the currently scheduled
/// notification; `None` means nothing is scheduled for this rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub notification_id: Option<String>,
    pub days_before: u32,
    pub hour: u32,
    pub minute: u32,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSchema {
    pub reminders: Vec<Reminder>,
}

impl ReminderSchema {
    /// Schema of a freshly created bill: exactly one default reminder.
    pub fn with_default() -> Self {
        Self {
            reminders: vec![create_default_reminder()],
        }
    }

    pub fn find(&self, id: &str) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    pub fn add_default(&mut self) -> &Reminder {
        self.reminders.push(create_default_reminder());
        &self.reminders[self.reminders.len() - 1]
    }

    /// Removes a reminder, handing it back so its handle can be cancelled.
    pub fn remove(&mut self, id: &str) -> Option<Reminder> {
        let index = self.reminders.iter().position(|r| r.id == id)?;
        Some(self.reminders.remove(index))
    }

    pub fn scheduled_ids(&self) -> impl Iterator<Item = &str> {
        self.reminders.iter().filter_map(|r| r.notification_id.as_deref())
    }
}

/// `reminder_<unix millis>_<random>`; two calls in the same millisecond still differ.
pub fn generate_reminder_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("reminder_{}_{}", Utc::now().timestamp_millis(), &random[..9])
}

pub fn create_default_reminder() -> Reminder {
    Reminder {
        id: generate_reminder_id(),
        notification_id: None,
        days_before: DEFAULT_DAYS_BEFORE,
        hour: DEFAULT_HOUR,
        minute: DEFAULT_MINUTE,
        enabled: true,
    }
}

/// Salvages a reminder list entry by entry. Entries that do not deserialize keep
/// their id and notification handle and get default timing, so a scheduled
/// notification is never forgotten.
fn recover_reminders(list: &Value) -> ReminderSchema {
    let entries = match list.as_array() {
        Some(entries) => entries,
        None => return ReminderSchema::with_default(),
    };

    let mut reminders = Vec::with_capacity(entries.len());
    for entry in entries {
        match serde_json::from_value::<Reminder>(entry.clone()) {
            Ok(reminder) => reminders.push(reminder),
            Err(_) => {
                let id = entry.get("id").and_then(Value::as_str);
                let notification_id = entry.get("notificationId").and_then(Value::as_str);
                if id.is_none() && notification_id.is_none() {
                    continue;
                }
                reminders.push(Reminder {
                    id: id.map_or_else(generate_reminder_id, str::to_string),
                    notification_id: notification_id.map(str::to_string),
                    ..create_default_reminder()
                });
            }
        }
    }

    if reminders.is_empty() {
        ReminderSchema::with_default()
    } else {
        ReminderSchema { reminders }
    }
}

/// Reads a persisted schema. Never fails: empty or unreadable input yields a
/// one-reminder default schema, and the legacy `{"notificationId": ...}` shape
/// is upgraded to a single reminder keeping the old handle.
pub fn parse_reminder_schema(serialized: Option<&str>) -> ReminderSchema {
    let raw = match serialized.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return ReminderSchema::with_default(),
    };

    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Malformed reminder schema, using default: {}", e);
            return ReminderSchema::with_default();
        }
    };

    if let Some(list) = value.get("reminders") {
        return match serde_json::from_value::<Vec<Reminder>>(list.clone()) {
            Ok(reminders) => ReminderSchema { reminders },
            Err(e) => {
                log::warn!("Unreadable reminder list, recovering entries: {}", e);
                recover_reminders(list)
            }
        };
    }

    match value.get("notificationId") {
        Some(legacy) => {
            let notification_id = legacy.as_str().map(str::to_string);
            log::info!("Upgrading legacy reminder schema (handle: {:?})", notification_id);
            ReminderSchema {
                reminders: vec![Reminder {
                    id: generate_reminder_id(),
                    notification_id,
                    days_before: 1,
                    hour: 0,
                    minute: 0,
                    enabled: true,
                }],
            }
        }
        None => {
            log::warn!("Reminder schema has no reminders, using default");
            ReminderSchema::with_default()
        }
    }
}

pub fn serialize_reminder_schema(schema: &ReminderSchema) -> Result<String> {
    Ok(serde_json::to_string(schema)?)
}

/// The bill fields that go into a notification.
#[derive(Debug, Clone, Copy)]
pub struct NotificationSubject<'a> {
    pub name: &'a str,
    pub amount: f64,
    pub currency: &'a str,
    pub next_billing_date: &'a str,
}

impl<'a> From<&'a Bill> for NotificationSubject<'a> {
    fn from(bill: &'a Bill) -> Self {
        Self {
            name: &bill.name,
            amount: bill.amount,
            currency: &bill.currency,
            next_billing_date: &bill.next_billing_date,
        }
    }
}

/// Due date minus `days_before` calendar days in `tz`, at the reminder's hour and minute.
pub fn reminder_trigger_time<Tz: TimeZone>(
    due: &DateTime<Utc>,
    reminder: &Reminder,
    tz: &Tz,
) -> Option<DateTime<Utc>> {
    let date = due
        .with_timezone(tz)
        .date_naive()
        .checked_sub_signed(Duration::days(i64::from(reminder.days_before)))?;
    let local = date.and_time(NaiveTime::from_hms_opt(reminder.hour, reminder.minute, 0)?);
    tz.from_local_datetime(&local)
        .earliest()
        // Local times skipped by a DST jump fire an hour later.
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|trigger| trigger.with_timezone(&Utc))
}

fn days_phrase<T: Translate + ?Sized>(days_before: u32, translator: &T) -> String {
    match days_before {
        0 => translator.translate("days.today"),
        1 => translator.translate("days.tomorrow"),
        n => interpolate(&translator.translate("days.inDays"), &[("count", n.to_string().as_str())]),
    }
}

fn pending_request<T: Translate + ?Sized, Tz: TimeZone>(
    subject: &NotificationSubject<'_>,
    due: Option<&DateTime<Utc>>,
    reminder: &Reminder,
    translator: &T,
    now: &DateTime<Utc>,
    tz: &Tz,
) -> Option<NotificationRequest> {
    if !reminder.enabled {
        return None;
    }
    let trigger_at = match reminder_trigger_time(due?, reminder, tz) {
        Some(trigger_at) => trigger_at,
        None => {
            log::warn!(
                "Reminder {} has an invalid time {}:{}",
                reminder.id, reminder.hour, reminder.minute
            );
            return None;
        }
    };
    if trigger_at <= *now {
        log::debug!("Reminder {} for '{}' already passed at {}", reminder.id, subject.name, trigger_at);
        return None;
    }

    let amount = format_amount(subject.amount, subject.currency);
    let when = days_phrase(reminder.days_before, translator);
    let title = format!("{}: {}", translator.translate("notifications.title"), subject.name);
    let body = interpolate(
        &translator.translate("notifications.body"),
        &[("name", subject.name), ("amount", amount.as_str()), ("when", when.as_str())],
    );
    Some(NotificationRequest { title, body, trigger_at })
}

/// Re-schedules every reminder of a bill against its current due date, using
/// the local time zone and the current time.
pub async fn schedule_all_reminders<S, T>(
    scheduler: &S,
    subject: NotificationSubject<'_>,
    schema: &ReminderSchema,
    translator: &T,
) -> ReminderSchema
where
    S: NotificationScheduler,
    T: Translate + ?Sized,
{
    schedule_all_reminders_at(scheduler, subject, schema, translator, &Utc::now(), &Local).await
}

/// Reminders are handled strictly in order. Existing handles are cancelled
/// first; disabled, past and failed reminders end up with no handle.
pub async fn schedule_all_reminders_at<S, T, Tz>(
    scheduler: &S,
    subject: NotificationSubject<'_>,
    schema: &ReminderSchema,
    translator: &T,
    now: &DateTime<Utc>,
    tz: &Tz,
) -> ReminderSchema
where
    S: NotificationScheduler,
    T: Translate + ?Sized,
    Tz: TimeZone,
{
    let due = match parse_timestamp(subject.next_billing_date) {
        Ok(due) => Some(due),
        Err(e) => {
            log::warn!("Cannot schedule reminders for '{}': {}", subject.name, e);
            None
        }
    };

    let mut permission: Option<bool> = None;
    let mut reminders = Vec::with_capacity(schema.reminders.len());
    for reminder in &schema.reminders {
        if let Some(existing) = reminder.notification_id.as_deref() {
            cancel_reminder(scheduler, existing).await;
        }

        let mut next = Reminder {
            notification_id: None,
            ..reminder.clone()
        };
        if let Some(request) = pending_request(&subject, due.as_ref(), reminder, translator, now, tz) {
            if permission.is_none() {
                let granted = scheduler.request_permission().await;
                if !granted {
                    log::warn!("Notification permission denied; reminders for '{}' not scheduled", subject.name);
                }
                permission = Some(granted);
            }
            if permission == Some(true) {
                next.notification_id = match scheduler.schedule(&request).await {
                    Ok(handle) => handle,
                    Err(e) => {
                        log::warn!("Failed to schedule reminder {}: {}", reminder.id, e);
                        None
                    }
                };
            }
        }
        reminders.push(next);
    }

    ReminderSchema { reminders }
}

/// Best-effort; unknown or already cancelled handles are only logged.
pub async fn cancel_reminder<S: NotificationScheduler>(scheduler: &S, notification_id: &str) {
    if let Err(e) = scheduler.cancel(notification_id).await {
        log::warn!("Failed to cancel notification {}: {}", notification_id, e);
    }
}

/// Cancels every scheduled handle and returns the schema with all handles cleared.
pub async fn cancel_all_reminders<S: NotificationScheduler>(
    scheduler: &S,
    schema: &ReminderSchema,
) -> ReminderSchema {
    for notification_id in schema.scheduled_ids() {
        cancel_reminder(scheduler, notification_id).await;
    }
    ReminderSchema {
        reminders: schema
            .reminders
            .iter()
            .map(|r| Reminder {
                notification_id: None,
                ..r.clone()
            })
            .collect(),
    }
}

/// `9:05 AM`, `12:00 AM`, `11:59 PM`
pub fn format_time_12h(hour: u32, minute: u32) -> String {
    let period = if hour % 24 >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display_hour, minute, period)
}

/// `1 day before at 9:00 AM`, `On due date at 12:00 AM`
pub fn get_reminder_display_text<T: Translate + ?Sized>(reminder: &Reminder, translator: &T) -> String {
    let days = match reminder.days_before {
        0 => translator.translate("reminders.onDueDate"),
        1 => format!("1 {}", translator.translate("reminders.dayBefore")),
        n => format!("{} {}", n, translator.translate("reminders.daysBefore")),
    };
    format!(
        "{} {} {}",
        days,
        translator.translate("reminders.at"),
        format_time_12h(reminder.hour, reminder.minute)
    )
}
