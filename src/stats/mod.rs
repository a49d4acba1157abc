//! Aggregate queries over a set of invoices. Everything here is pure: no
//! store access, no mutation. "Top" queries return `None` when there is
//! nothing to rank; ties go to the alphabetically first key.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::categorize::Categorizer;
use crate::models::{Invoice, LineItem};

pub(crate) fn total_revenue(invoices: &[Invoice]) -> Decimal {
    invoices.iter().map(Invoice::total).sum()
}

pub(crate) fn total_items_sold(invoices: &[Invoice]) -> u64 {
    invoices.iter().map(Invoice::item_count).sum()
}

pub(crate) fn revenue_by_customer(invoices: &[Invoice]) -> BTreeMap<String, Decimal> {
    let mut map = BTreeMap::new();
    for invoice in invoices {
        *map.entry(invoice.customer.clone()).or_insert(Decimal::ZERO) += invoice.total();
    }
    map
}

/// Number of invoices per customer.
pub(crate) fn purchases_by_customer(invoices: &[Invoice]) -> BTreeMap<String, usize> {
    let mut map = BTreeMap::new();
    for invoice in invoices {
        *map.entry(invoice.customer.clone()).or_insert(0) += 1;
    }
    map
}

pub(crate) fn top_customer_by_revenue(invoices: &[Invoice]) -> Option<(String, Decimal)> {
    top_entry(&revenue_by_customer(invoices))
}

pub(crate) fn top_customer_by_purchases(invoices: &[Invoice]) -> Option<(String, usize)> {
    top_entry(&purchases_by_customer(invoices))
}

/// Units sold per item description.
pub(crate) fn quantity_by_item(invoices: &[Invoice]) -> BTreeMap<String, u64> {
    let mut map = BTreeMap::new();
    for item in invoices.iter().flat_map(|i| &i.items) {
        *map.entry(item.description.clone()).or_insert(0) += u64::from(item.quantity);
    }
    map
}

pub(crate) fn most_sold_item(invoices: &[Invoice]) -> Option<(String, u64)> {
    top_entry(&quantity_by_item(invoices))
}

/// Line item with the highest unit price; the first one seen on a tie.
pub(crate) fn most_expensive_item(invoices: &[Invoice]) -> Option<LineItem> {
    let mut best: Option<&LineItem> = None;
    for item in invoices.iter().flat_map(|i| &i.items) {
        if best.map_or(true, |b| item.price > b.price) {
            best = Some(item);
        }
    }
    best.cloned()
}

pub(crate) fn quantity_by_category(
    invoices: &[Invoice],
    categorizer: &Categorizer,
) -> BTreeMap<&'static str, u64> {
    let mut map = BTreeMap::new();
    for item in invoices.iter().flat_map(|i| &i.items) {
        *map.entry(categorizer.categorize(&item.description))
            .or_insert(0) += u64::from(item.quantity);
    }
    map
}

pub(crate) fn top_category(
    invoices: &[Invoice],
    categorizer: &Categorizer,
) -> Option<(&'static str, u64)> {
    top_entry(&quantity_by_category(invoices, categorizer))
}

fn top_entry<K: Clone + Ord, V: Ord + Copy>(map: &BTreeMap<K, V>) -> Option<(K, V)> {
    let mut best: Option<(&K, &V)> = None;
    for (key, value) in map {
        if best.map_or(true, |(_, b)| value > b) {
            best = Some((key, value));
        }
    }
    best.map(|(k, v)| (k.clone(), *v))
}

#[cfg(test)]
mod tests;
