const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("CNY", "¥"),
    ("INR", "₹"),
    ("KRW", "₩"),
    ("BRL", "R$"),
    ("CAD", "C$"),
    ("AUD", "A$"),
    ("CHF", "CHF"),
    ("MXN", "MX$"),
    ("RUB", "₽"),
    ("TRY", "₺"),
    ("SEK", "kr"),
    ("NOK", "kr"),
    ("DKK", "kr"),
    ("PLN", "zł"),
    ("UAH", "₴"),
    ("IDR", "Rp"),
    ("THB", "฿"),
    ("VND", "₫"),
    ("PHP", "₱"),
    ("ZAR", "R"),
    ("NZD", "NZ$"),
    ("SGD", "S$"),
    ("HKD", "HK$"),
    ("ILS", "₪"),
];

// Currencies conventionally shown without minor units.
const ZERO_DECIMAL: &[&str] = &["JPY", "KRW", "VND", "IDR"];

/// Display symbol for an ISO 4217 code; unknown codes are shown as the code itself.
pub fn currency_symbol(code: &str) -> &str {
    CURRENCY_SYMBOLS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, symbol)| *symbol)
        .unwrap_or(code)
}

pub fn is_supported_currency(code: &str) -> bool {
    CURRENCY_SYMBOLS.iter().any(|(c, _)| c.eq_ignore_ascii_case(code))
}

pub fn supported_currencies() -> Vec<&'static str> {
    CURRENCY_SYMBOLS.iter().map(|(c, _)| *c).collect()
}

/// `$15.49`, `¥1200`
pub fn format_amount(amount: f64, code: &str) -> String {
    let symbol = currency_symbol(code);
    if ZERO_DECIMAL.iter().any(|c| c.eq_ignore_ascii_case(code)) {
        format!("{}{:.0}", symbol, amount)
    } else {
        format!("{}{:.2}", symbol, amount)
    }
}
