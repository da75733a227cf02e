use rusqlite::{params, Connection, Row};

use crate::error::{BillError, Result};
use crate::models::{Bill, CategorySpending, MonthlyTotal, PaymentRecord};

const UNCATEGORIZED: &str = "uncategorized";

fn payment_from_row(row: &Row) -> rusqlite::Result<PaymentRecord> {
    Ok(PaymentRecord {
        id: row.get(0)?,
        bill_id: row.get(1)?,
        bill_name: row.get(2)?,
        amount: row.get(3)?,
        currency: row.get(4)?,
        billing_date: row.get(5)?,
        paid_at: row.get(6)?,
    })
}

/// Inserts one history row for the bill's current due date. Runs inside the caller's transaction.
pub fn record_payment(conn: &Connection, bill: &Bill, paid_at: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO payment_history (bill_id, amount, currency, billing_date, paid_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![bill.id, bill.amount, bill.currency, bill.next_billing_date, paid_at],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Newest payments first, optionally for a single bill.
pub fn get_payment_history(conn: &Connection, bill_id: Option<i64>) -> Result<Vec<PaymentRecord>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.bill_id, b.name, p.amount, p.currency, p.billing_date, p.paid_at
         FROM payment_history p
         JOIN bills b ON b.id = p.bill_id
         WHERE ?1 IS NULL OR p.bill_id = ?1
         ORDER BY p.paid_at DESC, p.id DESC",
    )?;
    let rows = stmt.query_map(params![bill_id], payment_from_row)?;

    let mut payments = Vec::new();
    for payment in rows {
        payments.push(payment?);
    }
    Ok(payments)
}

pub fn delete_payment(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn.execute("DELETE FROM payment_history WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(BillError::NotFound(format!("payment {}", id)));
    }
    Ok(())
}

/// Totals paid between two ISO timestamps (inclusive), per category group and currency.
pub fn get_spending_by_category(conn: &Connection, start: &str, end: &str) -> Result<Vec<CategorySpending>> {
    let mut stmt = conn.prepare(
        "SELECT COALESCE(b.category_group, ?3) AS grp, p.currency, SUM(p.amount), COUNT(*)
         FROM payment_history p
         JOIN bills b ON b.id = p.bill_id
         WHERE p.paid_at >= ?1 AND p.paid_at <= ?2
         GROUP BY grp, p.currency
         ORDER BY SUM(p.amount) DESC",
    )?;
    let rows = stmt.query_map(params![start, end, UNCATEGORIZED], |row| {
        Ok(CategorySpending {
            category_group: row.get(0)?,
            currency: row.get(1)?,
            total: row.get(2)?,
            payments: row.get(3)?,
        })
    })?;

    let mut spending = Vec::new();
    for entry in rows {
        spending.push(entry?);
    }
    Ok(spending)
}

/// Per month (`YYYY-MM`) and currency totals for one calendar year.
pub fn get_monthly_totals(conn: &Connection, year: i32) -> Result<Vec<MonthlyTotal>> {
    let mut stmt = conn.prepare(
        "SELECT substr(paid_at, 1, 7) AS month, currency, SUM(amount)
         FROM payment_history
         WHERE substr(paid_at, 1, 4) = ?1
         GROUP BY month, currency
         ORDER BY month ASC, currency ASC",
    )?;
    let rows = stmt.query_map(params![format!("{:04}", year)], |row| {
        Ok(MonthlyTotal {
            month: row.get(0)?,
            currency: row.get(1)?,
            total: row.get(2)?,
        })
    })?;

    let mut totals = Vec::new();
    for total in rows {
        totals.push(total?);
    }
    Ok(totals)
}
