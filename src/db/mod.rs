mod schema;

use anyhow::{Context, Result};
use rusqlite::types::{Type, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::models::*;

const INVOICE_COLUMNS: &str = "id, date, customer, archived";

/// Prices read back as REAL are rounded to this many places before normalizing.
const REAL_PRICE_SCALE: u32 = 6;

/// Handle to the invoice store. Holds only the location; every operation
/// opens its own connection and drops it before returning.
#[derive(Debug, Clone)]
pub(crate) struct Database {
    path: PathBuf,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let db = Self {
            path: path.to_path_buf(),
        };
        let conn = db.connect()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        migrate(&conn).context("Database migration failed")?;
        conn.execute(
            "INSERT OR IGNORE INTO config (key, value) VALUES (?1, '')",
            params![FILTER_KEY],
        )?;
        debug!(path = %path.display(), "invoice store ready");
        Ok(db)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)
            .with_context(|| format!("Failed to open database: {}", self.path.display()))?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    /// Insert the sample invoices when the store holds none. Returns how many were added.
    pub(crate) fn seed_sample_invoices(&self) -> Result<usize> {
        if self.invoice_count()? > 0 {
            return Ok(0);
        }

        let mut conn = self.connect()?;

        let tx = conn.transaction()?;
        for (date, customer, items) in schema::SAMPLE_INVOICES {
            tx.execute(
                "INSERT INTO invoices (date, customer, archived) VALUES (?1, ?2, 0)",
                params![date, customer],
            )?;
            let invoice_id = tx.last_insert_rowid();
            for (description, price, quantity) in items.iter() {
                tx.execute(
                    "INSERT INTO line_items (invoice_id, description, price, quantity)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![invoice_id, description, price, quantity],
                )?;
            }
        }
        tx.commit()?;
        info!(
            invoices = schema::SAMPLE_INVOICES.len(),
            "seeded empty store with sample invoices"
        );
        Ok(schema::SAMPLE_INVOICES.len())
    }

    // ── Config ────────────────────────────────────────────────

    pub(crate) fn get_config(&self, key: &str) -> Result<String> {
        let conn = self.connect()?;
        let value: Option<Option<String>> = conn
            .query_row(
                "SELECT value FROM config WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.flatten().unwrap_or_default())
    }

    pub(crate) fn set_config(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT OR REPLACE INTO config (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .with_context(|| format!("Failed to save preference {key}"))?;
        Ok(())
    }

    // ── Invoices ──────────────────────────────────────────────

    pub(crate) fn list_active(&self) -> Result<Vec<Invoice>> {
        self.list_by_archived(false)
    }

    pub(crate) fn list_archived(&self) -> Result<Vec<Invoice>> {
        self.list_by_archived(true)
    }

    fn list_by_archived(&self, archived: bool) -> Result<Vec<Invoice>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE archived = ?1 ORDER BY id DESC"
        ))?;
        let rows = stmt.query_map(params![archived], invoice_from_row)?;
        let mut invoices = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        for invoice in &mut invoices {
            if let Some(id) = invoice.id {
                invoice.items = load_items(&conn, id)?;
            }
        }
        Ok(invoices)
    }

    pub(crate) fn get_invoice(&self, id: i64) -> Result<Option<Invoice>> {
        let conn = self.connect()?;
        let invoice = conn
            .query_row(
                &format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"),
                params![id],
                invoice_from_row,
            )
            .optional()?;
        match invoice {
            Some(mut invoice) => {
                invoice.items = load_items(&conn, id)?;
                Ok(Some(invoice))
            }
            None => Ok(None),
        }
    }

    pub(crate) fn invoice_count(&self) -> Result<i64> {
        let conn = self.connect()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM invoices", [], |row| row.get(0))?)
    }

    /// Insert the header and every line item in one transaction. Returns the new id.
    pub(crate) fn insert_invoice(&self, invoice: &Invoice) -> Result<i64> {
        invoice.validate()?;
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO invoices (date, customer, archived) VALUES (?1, ?2, ?3)",
            params![invoice.format_date(), invoice.customer, invoice.archived],
        )
        .context("Failed to insert invoice")?;
        let id = tx.last_insert_rowid();
        insert_items(&tx, id, &invoice.items)
            .with_context(|| format!("Failed to insert line items for invoice {id}"))?;
        tx.commit()?;
        debug!(id, items = invoice.items.len(), "invoice inserted");
        Ok(id)
    }

    /// Rewrite the header and replace the whole item list. An empty list
    /// leaves the invoice with no items. Returns false if no such invoice exists.
    pub(crate) fn update_invoice(&self, invoice: &Invoice) -> Result<bool> {
        invoice.validate()?;
        let id = invoice.id.ok_or(ValidationError::MissingId)?;
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "UPDATE invoices SET date = ?1, customer = ?2, archived = ?3 WHERE id = ?4",
            params![invoice.format_date(), invoice.customer, invoice.archived, id],
        )?;
        if changed == 0 {
            return Ok(false);
        }
        tx.execute("DELETE FROM line_items WHERE invoice_id = ?1", params![id])?;
        insert_items(&tx, id, &invoice.items)
            .with_context(|| format!("Failed to replace line items for invoice {id}"))?;
        tx.commit()?;
        debug!(id, items = invoice.items.len(), "invoice updated");
        Ok(true)
    }

    pub(crate) fn delete_invoice(&self, id: i64) -> Result<bool> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM line_items WHERE invoice_id = ?1", params![id])?;
        let changed = tx.execute("DELETE FROM invoices WHERE id = ?1", params![id])?;
        tx.commit()?;
        debug!(id, found = changed > 0, "invoice deleted");
        Ok(changed > 0)
    }

    pub(crate) fn archive_invoice(&self, id: i64) -> Result<bool> {
        self.set_archived(id, true)
    }

    pub(crate) fn unarchive_invoice(&self, id: i64) -> Result<bool> {
        self.set_archived(id, false)
    }

    fn set_archived(&self, id: i64, archived: bool) -> Result<bool> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE invoices SET archived = ?1 WHERE id = ?2",
            params![archived, id],
        )?;
        debug!(id, archived, found = changed > 0, "archive flag set");
        Ok(changed > 0)
    }
}

fn migrate(conn: &Connection) -> Result<()> {
    let has_version_table: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !has_version_table {
        conn.execute_batch(schema::SCHEMA_V1)?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![schema::CURRENT_VERSION],
        )?;
    }
    Ok(())
}

fn insert_items(tx: &Transaction<'_>, invoice_id: i64, items: &[LineItem]) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO line_items (invoice_id, description, price, quantity)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for item in items {
        stmt.execute(params![
            invoice_id,
            item.description,
            item.price.to_string(),
            item.quantity,
        ])?;
    }
    Ok(())
}

fn load_items(conn: &Connection, invoice_id: i64) -> Result<Vec<LineItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, description, quantity, price FROM line_items WHERE invoice_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![invoice_id], |row| {
        Ok(LineItem {
            id: Some(row.get(0)?),
            invoice_id: Some(invoice_id),
            description: row.get(1)?,
            quantity: row.get::<_, Option<u32>>(2)?.unwrap_or(1),
            price: price_from_row(row, 3)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

fn invoice_from_row(row: &Row<'_>) -> rusqlite::Result<Invoice> {
    let raw_date: String = row.get(1)?;
    let date = parse_date(&raw_date).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            Type::Text,
            format!("invalid invoice date: {raw_date}").into(),
        )
    })?;
    Ok(Invoice {
        id: Some(row.get(0)?),
        date,
        customer: row.get(2)?,
        archived: row.get::<_, Option<bool>>(3)?.unwrap_or(false),
        items: Vec::new(),
    })
}

fn price_from_row(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let value = row.get_ref(idx)?;
    decimal_from_value(value).map_err(|msg| {
        rusqlite::Error::FromSqlConversionFailure(idx, value.data_type(), msg.into())
    })
}

/// Normalize a stored price to a `Decimal`, whatever storage class it came back as.
pub(crate) fn decimal_from_value(value: ValueRef<'_>) -> std::result::Result<Decimal, String> {
    let parsed = match value {
        ValueRef::Integer(i) => Decimal::from(i),
        ValueRef::Real(f) => Decimal::try_from(f)
            .map_err(|e| format!("invalid price {f}: {e}"))?
            .round_dp(REAL_PRICE_SCALE),
        ValueRef::Text(bytes) => {
            let s = std::str::from_utf8(bytes).map_err(|e| e.to_string())?;
            Decimal::from_str(s.trim()).map_err(|e| format!("invalid price {s:?}: {e}"))?
        }
        other => return Err(format!("unsupported price type: {}", other.data_type())),
    };
    Ok(parsed.normalize())
}
