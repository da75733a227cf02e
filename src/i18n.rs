use std::collections::HashMap;

/// Injected translation provider. Unknown keys conventionally come back unchanged.
pub trait Translate {
    fn translate(&self, key: &str) -> String;
}

impl<F> Translate for F
where
    F: Fn(&str) -> String,
{
    fn translate(&self, key: &str) -> String {
        self(key)
    }
}

const EN: &[(&str, &str)] = &[
    ("reminders.onDueDate", "On due date"),
    ("reminders.dayBefore", "day before"),
    ("reminders.daysBefore", "days before"),
    ("reminders.at", "at"),
    ("days.today", "today"),
    ("days.tomorrow", "tomorrow"),
    ("days.inDays", "in {{count}} days"),
    ("notifications.title", "Payment reminder"),
    ("notifications.body", "{{name}} ({{amount}}) is due {{when}}"),
    ("bills.overdue", "Overdue"),
    ("bills.dueToday", "Due today"),
    ("bills.upcoming", "Upcoming"),
];

const ES: &[(&str, &str)] = &[
    ("reminders.onDueDate", "El día de vencimiento"),
    ("reminders.dayBefore", "día antes"),
    ("reminders.daysBefore", "días antes"),
    ("reminders.at", "a las"),
    ("days.today", "hoy"),
    ("days.tomorrow", "mañana"),
    ("days.inDays", "en {{count}} días"),
    ("notifications.title", "Recordatorio de pago"),
    ("notifications.body", "{{name}} ({{amount}}) vence {{when}}"),
    ("bills.overdue", "Vencido"),
    ("bills.dueToday", "Vence hoy"),
    ("bills.upcoming", "Próximo"),
];

const DE: &[(&str, &str)] = &[
    ("reminders.onDueDate", "Am Fälligkeitstag"),
    ("reminders.dayBefore", "Tag vorher"),
    ("reminders.daysBefore", "Tage vorher"),
    ("reminders.at", "um"),
    ("days.today", "heute"),
    ("days.tomorrow", "morgen"),
    ("days.inDays", "in {{count}} Tagen"),
    ("notifications.title", "Zahlungserinnerung"),
    ("notifications.body", "{{name}} ({{amount}}) ist {{when}} fällig"),
    ("bills.overdue", "Überfällig"),
    ("bills.dueToday", "Heute fällig"),
    ("bills.upcoming", "Demnächst"),
];

pub const SUPPORTED_LANGUAGES: [&str; 3] = ["en", "es", "de"];

fn table_for(language: &str) -> Option<&'static [(&'static str, &'static str)]> {
    match language {
        "en" => Some(EN),
        "es" => Some(ES),
        "de" => Some(DE),
        _ => None,
    }
}

/// Built-in string tables for one active language, with English as the fallback.
#[derive(Debug, Clone)]
pub struct Catalog {
    language: String,
    strings: HashMap<&'static str, &'static str>,
    fallback: HashMap<&'static str, &'static str>,
}

impl Catalog {
    pub fn new(language: &str) -> Self {
        let mut catalog = Self {
            language: String::new(),
            strings: HashMap::new(),
            fallback: EN.iter().copied().collect(),
        };
        catalog.set_language(language);
        catalog
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Switches the active table; unsupported languages fall back to English.
    pub fn set_language(&mut self, language: &str) {
        let (language, table) = match table_for(language) {
            Some(table) => (language, table),
            None => {
                log::warn!("Unsupported language '{}', falling back to English", language);
                ("en", EN)
            }
        };
        self.language = language.to_string();
        self.strings = table.iter().copied().collect();
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new("en")
    }
}

impl Translate for Catalog {
    fn translate(&self, key: &str) -> String {
        self.strings
            .get(key)
            .or_else(|| self.fallback.get(key))
            .map(|s| s.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

/// Replaces `{{name}}` placeholders in a translated template.
pub fn interpolate(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{{{}}}}}", name), value)
    })
}
