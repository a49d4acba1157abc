mod writer;

use anyhow::Result;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::categorize::Categorizer;
use crate::db::Database;
use crate::models::{Invoice, LineItem, SortOrder, FILTER_KEY, SORT_KEY};
use crate::stats;

use writer::{PreferenceWriter, Preferences};

/// Session-scoped working set: the active invoices plus the current filter
/// and sort. The cache only changes after the store confirms a write.
pub(crate) struct InvoiceController {
    db: Database,
    invoices: Vec<Invoice>,
    filter: String,
    sort: SortOrder,
    categorizer: Categorizer,
    writer: PreferenceWriter,
}

impl InvoiceController {
    pub(crate) fn new(db: Database) -> Result<Self> {
        let writer = PreferenceWriter::spawn(db.clone())?;
        Ok(Self {
            db,
            invoices: Vec::new(),
            filter: String::new(),
            sort: SortOrder::default(),
            categorizer: Categorizer::new(),
            writer,
        })
    }

    pub(crate) fn load_preferences(&mut self) -> Result<()> {
        self.filter = self.db.get_config(FILTER_KEY)?;
        self.sort = SortOrder::parse(&self.db.get_config(SORT_KEY)?);
        debug!(filter = %self.filter, sort = self.sort.as_str(), "preferences loaded");
        Ok(())
    }

    pub(crate) fn load_invoices(&mut self) -> Result<()> {
        self.invoices = self.db.list_active()?;
        debug!(count = self.invoices.len(), "working set loaded");
        Ok(())
    }

    pub(crate) fn filter(&self) -> &str {
        &self.filter
    }

    pub(crate) fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub(crate) fn sort(&self) -> SortOrder {
        self.sort
    }

    pub(crate) fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    pub(crate) fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    /// Cached invoices matching the customer filter, in the selected order.
    /// Also queues a background save of the filter and sort.
    pub(crate) fn filtered_view(&self) -> Vec<Invoice> {
        let mut view: Vec<Invoice> = if self.filter.trim().is_empty() {
            self.invoices.clone()
        } else {
            let needle = self.filter.to_lowercase();
            self.invoices
                .iter()
                .filter(|i| i.customer.to_lowercase().contains(&needle))
                .cloned()
                .collect()
        };

        match self.sort {
            SortOrder::DateDesc => view.sort_by(|a, b| b.date.cmp(&a.date)),
            SortOrder::IdDesc => view.sort_by(|a, b| b.id.cmp(&a.id)),
            SortOrder::CustomerAsc => view.sort_by_cached_key(|i| i.customer.to_lowercase()),
        }

        self.writer.submit(Preferences {
            filter: self.filter.clone(),
            sort: self.sort,
        });

        view
    }

    /// Persist a new invoice, then reload the working set from the store.
    pub(crate) fn create(&mut self, invoice: Invoice) -> Result<i64> {
        let id = self.db.insert_invoice(&invoice)?;
        info!(id, customer = %invoice.customer, "invoice created");
        self.load_invoices()?;
        Ok(id)
    }

    /// Persist the edit and swap the cached copy. The item list is replaced
    /// wholesale, so `invoice` must carry every item it should keep.
    pub(crate) fn update(&mut self, invoice: Invoice) -> Result<bool> {
        if !self.db.update_invoice(&invoice)? {
            return Ok(false);
        }
        info!(id = invoice.id, "invoice updated");
        if let Some(slot) = self.invoices.iter_mut().find(|i| i.id == invoice.id) {
            *slot = invoice;
        }
        Ok(true)
    }

    pub(crate) fn delete(&mut self, id: i64) -> Result<bool> {
        let found = self.db.delete_invoice(id)?;
        self.invoices.retain(|i| i.id != Some(id));
        info!(id, found, "invoice deleted");
        Ok(found)
    }

    pub(crate) fn archive(&mut self, id: i64) -> Result<bool> {
        let found = self.db.archive_invoice(id)?;
        self.invoices.retain(|i| i.id != Some(id));
        info!(id, found, "invoice archived");
        Ok(found)
    }

    pub(crate) fn unarchive(&mut self, id: i64) -> Result<bool> {
        if !self.db.unarchive_invoice(id)? {
            return Ok(false);
        }
        if let Some(invoice) = self.db.get_invoice(id)? {
            match self.invoices.iter_mut().find(|i| i.id == Some(id)) {
                Some(slot) => *slot = invoice,
                None => self.invoices.push(invoice),
            }
        }
        info!(id, "invoice unarchived");
        Ok(true)
    }

    /// Cache first; on a miss the stored invoice is added to the cache.
    pub(crate) fn get_by_id(&mut self, id: i64) -> Result<Option<Invoice>> {
        if let Some(cached) = self.invoices.iter().find(|i| i.id == Some(id)) {
            return Ok(Some(cached.clone()));
        }
        let stored = self.db.get_invoice(id)?;
        if let Some(invoice) = &stored {
            debug!(id, "cache miss filled from store");
            self.invoices.push(invoice.clone());
        }
        Ok(stored)
    }

    /// Archived invoices straight from the store; they are never cached.
    pub(crate) fn archived(&self) -> Result<Vec<Invoice>> {
        self.db.list_archived()
    }

    // ── Statistics over the working set ───────────────────────

    pub(crate) fn total_revenue(&self) -> Decimal {
        stats::total_revenue(&self.invoices)
    }

    pub(crate) fn revenue_by_customer(&self) -> BTreeMap<String, Decimal> {
        stats::revenue_by_customer(&self.invoices)
    }

    pub(crate) fn purchases_by_customer(&self) -> BTreeMap<String, usize> {
        stats::purchases_by_customer(&self.invoices)
    }

    pub(crate) fn top_customer_by_revenue(&self) -> Option<(String, Decimal)> {
        stats::top_customer_by_revenue(&self.invoices)
    }

    pub(crate) fn top_customer_by_purchases(&self) -> Option<(String, usize)> {
        stats::top_customer_by_purchases(&self.invoices)
    }

    pub(crate) fn most_sold_item(&self) -> Option<(String, u64)> {
        stats::most_sold_item(&self.invoices)
    }

    pub(crate) fn most_expensive_item(&self) -> Option<LineItem> {
        stats::most_expensive_item(&self.invoices)
    }

    pub(crate) fn classify(&self, description: &str) -> &'static str {
        self.categorizer.categorize(description)
    }

    pub(crate) fn top_category(&self) -> Option<(&'static str, u64)> {
        stats::top_category(&self.invoices, &self.categorizer)
    }

    pub(crate) fn total_items_sold(&self) -> u64 {
        stats::total_items_sold(&self.invoices)
    }

    pub(crate) fn quantity_by_category(&self) -> BTreeMap<&'static str, u64> {
        stats::quantity_by_category(&self.invoices, &self.categorizer)
    }

    pub(crate) fn categories(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.categorizer.categories()
    }
}
