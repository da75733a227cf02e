mod backup;
mod billing;
mod bills;
mod config;
mod currency;
mod error;
mod history;
mod i18n;
mod models;
mod notifications;
mod reminders;
mod utils;

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

// Re-export data model and error types
pub use error::{BillError, Result};
pub use models::{Bill, BillingInterval, CategorySpending, MonthlyTotal, NewBill, PaymentRecord};

// Re-export date advancement and due-date status
pub use billing::{
    advance_billing_date, bill_status, calculate_next_billing_date, days_until_due, format_timestamp,
    parse_timestamp, BillStatus,
};

// Re-export reminder scheduling
pub use reminders::{
    cancel_all_reminders, cancel_reminder, create_default_reminder, format_time_12h, generate_reminder_id,
    get_reminder_display_text, parse_reminder_schema, reminder_trigger_time, schedule_all_reminders,
    schedule_all_reminders_at, serialize_reminder_schema, NotificationSubject, Reminder, ReminderSchema,
};
pub use notifications::{NotificationRequest, NotificationScheduler};

// Re-export localization and currency tables
pub use currency::{currency_symbol, format_amount, is_supported_currency, supported_currencies};
pub use i18n::{interpolate, Catalog, Translate, SUPPORTED_LANGUAGES};

// Re-export bill and history operations
pub use bills::{
    add_bill, delete_bill, get_active_bills, get_bill, get_bills, get_overdue_bills, get_upcoming_bills,
    mark_bill_paid, set_bill_active, update_bill, update_reminder_schema,
};
pub use history::{delete_payment, get_monthly_totals, get_payment_history, get_spending_by_category};

// Re-export storage, backup and settings functions
pub use backup::{backup_database, list_backups, restore_database, BackupInfo};
pub use config::{get_config_path, load_config, save_config, AppConfig};
pub use utils::{app_data_dir, get_db_path, init_db, open_database, reset_database};

/// Installs the `env_logger` backend. `RUST_LOG` wins; otherwise debug builds log
/// at info and release builds at warn. Later calls are ignored.
pub fn init_logging() {
    let default_level = if cfg!(debug_assertions) {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .try_init();
}

/// Everything a front end needs after startup: settings, the open database and
/// the string catalog for the configured language.
pub struct AppContext {
    pub config: AppConfig,
    pub conn: Connection,
    pub catalog: Catalog,
}

impl AppContext {
    /// Loads settings (default location when `config_path` is `None`), then opens
    /// and migrates the database.
    pub async fn start(config_path: Option<&Path>) -> Result<Self> {
        init_logging();
        let config = match config_path {
            Some(path) => load_config(path).await,
            None => load_config(&get_config_path()?).await,
        };
        let conn = open_database(&config)?;
        let catalog = Catalog::new(&config.language);
        log::info!("Started with language '{}' and currency {}", catalog.language(), config.default_currency);
        Ok(Self { config, conn, catalog })
    }

    pub fn set_language(&mut self, language: &str) {
        self.catalog.set_language(language);
        self.config.language = self.catalog.language().to_string();
    }

    /// The platform scheduler, or `None` when notifications are switched off in
    /// settings. Bill operations then keep reminders but schedule nothing.
    pub fn notifier<S: NotificationScheduler>(&self, platform: S) -> Option<S> {
        if self.config.notifications_enabled {
            Some(platform)
        } else {
            log::info!("Notifications disabled in settings");
            None
        }
    }

    /// A bill draft in the configured default currency.
    pub fn draft_bill(
        &self,
        name: &str,
        amount: f64,
        billing_interval: BillingInterval,
        next_billing_date: &str,
    ) -> NewBill {
        NewBill {
            name: name.to_string(),
            amount,
            currency: self.config.default_currency.clone(),
            billing_interval,
            next_billing_date: next_billing_date.to_string(),
            category_group: None,
            notes: None,
        }
    }

    /// Active bills due within the configured upcoming window.
    pub fn upcoming_bills(&self, now: &DateTime<Utc>) -> Result<Vec<Bill>> {
        get_upcoming_bills(&self.conn, now, self.config.upcoming_window_days)
    }

    pub fn overdue_bills(&self, now: &DateTime<Utc>) -> Result<Vec<Bill>> {
        get_overdue_bills(&self.conn, now)
    }

    /// Backs up into `backup_dir`, keeping as many backups as settings allow.
    pub fn backup(&self, backup_dir: &Path) -> Result<BackupInfo> {
        backup_database(&self.conn, backup_dir, self.config.backup_keep_count)
    }
}
