#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;
use crate::models::parse_date;

fn make_invoice(customer: &str, items: &[(&str, Decimal, u32)]) -> Invoice {
    Invoice::new(
        customer.into(),
        parse_date("2025-01-05").unwrap(),
        items
            .iter()
            .map(|(d, p, q)| LineItem::new((*d).into(), *p, *q))
            .collect(),
    )
}

fn sample() -> Vec<Invoice> {
    vec![
        make_invoice(
            "Luis Martínez",
            &[("Tesla Model 3", dec!(875000), 2), ("Gasolina Premium", dec!(25), 40)],
        ),
        make_invoice("Ana Torres", &[("BMW M5", dec!(2390000), 1)]),
        make_invoice(
            "Ana Torres",
            &[("Gasolina Premium", dec!(25), 10), ("Sushi Omakase", dec!(4200), 3)],
        ),
    ]
}

// ── Empty input ───────────────────────────────────────────────

#[test]
fn test_empty_returns_no_data() {
    let cat = Categorizer::new();
    let empty: Vec<Invoice> = vec![];
    assert_eq!(total_revenue(&empty), Decimal::ZERO);
    assert_eq!(total_items_sold(&empty), 0);
    assert!(revenue_by_customer(&empty).is_empty());
    assert!(purchases_by_customer(&empty).is_empty());
    assert!(top_customer_by_revenue(&empty).is_none());
    assert!(top_customer_by_purchases(&empty).is_none());
    assert!(most_sold_item(&empty).is_none());
    assert!(most_expensive_item(&empty).is_none());
    assert!(top_category(&empty, &cat).is_none());
    assert!(quantity_by_category(&empty, &cat).is_empty());
}

#[test]
fn test_invoices_without_items_have_no_item_stats() {
    let invoices = vec![make_invoice("Ana", &[])];
    assert!(most_sold_item(&invoices).is_none());
    assert!(most_expensive_item(&invoices).is_none());
    assert!(top_category(&invoices, &Categorizer::new()).is_none());
    // Customer stats still count the invoice
    assert_eq!(top_customer_by_purchases(&invoices), Some(("Ana".into(), 1)));
    assert_eq!(top_customer_by_revenue(&invoices), Some(("Ana".into(), Decimal::ZERO)));
}

// ── Totals ────────────────────────────────────────────────────

#[test]
fn test_total_revenue() {
    // 1,750,000 + 1,000 + 2,390,000 + 250 + 12,600
    assert_eq!(total_revenue(&sample()), dec!(4153850));
}

#[test]
fn test_total_items_sold() {
    assert_eq!(total_items_sold(&sample()), 2 + 40 + 1 + 10 + 3);
}

// ── Customers ─────────────────────────────────────────────────

#[test]
fn test_revenue_by_customer() {
    let map = revenue_by_customer(&sample());
    assert_eq!(map.len(), 2);
    assert_eq!(map["Luis Martínez"], dec!(1751000));
    assert_eq!(map["Ana Torres"], dec!(2402850));
}

#[test]
fn test_purchases_by_customer() {
    let map = purchases_by_customer(&sample());
    assert_eq!(map["Ana Torres"], 2);
    assert_eq!(map["Luis Martínez"], 1);
}

#[test]
fn test_top_customers() {
    let invoices = sample();
    assert_eq!(
        top_customer_by_revenue(&invoices),
        Some(("Ana Torres".into(), dec!(2402850)))
    );
    assert_eq!(
        top_customer_by_purchases(&invoices),
        Some(("Ana Torres".into(), 2))
    );
}

#[test]
fn test_top_customer_tie_goes_to_first_name() {
    let invoices = vec![
        make_invoice("Zoe", &[("x", dec!(10), 1)]),
        make_invoice("Bruno", &[("x", dec!(10), 1)]),
    ];
    assert_eq!(top_customer_by_revenue(&invoices).unwrap().0, "Bruno");
    assert_eq!(top_customer_by_purchases(&invoices).unwrap().0, "Bruno");
}

// ── Items ─────────────────────────────────────────────────────

#[test]
fn test_most_sold_item_sums_across_invoices() {
    assert_eq!(
        most_sold_item(&sample()),
        Some(("Gasolina Premium".into(), 50))
    );
    assert_eq!(quantity_by_item(&sample())["Tesla Model 3"], 2);
}

#[test]
fn test_most_expensive_item_by_unit_price() {
    let item = most_expensive_item(&sample()).unwrap();
    assert_eq!(item.description, "BMW M5");
    assert_eq!(item.price, dec!(2390000));
}

#[test]
fn test_most_expensive_item_tie_keeps_first() {
    let invoices = vec![make_invoice("Ana", &[("first", dec!(5), 1), ("second", dec!(5), 9)])];
    assert_eq!(most_expensive_item(&invoices).unwrap().description, "first");
}

// ── Categories ────────────────────────────────────────────────

#[test]
fn test_quantity_by_category() {
    let map = quantity_by_category(&sample(), &Categorizer::new());
    assert_eq!(map["Vehicles"], 3);
    assert_eq!(map["Fuel"], 50);
    assert_eq!(map["Food"], 3);
    assert!(!map.contains_key("Luxury"));
}

#[test]
fn test_top_category() {
    assert_eq!(
        top_category(&sample(), &Categorizer::new()),
        Some(("Fuel", 50))
    );
}

#[test]
fn test_unknown_items_fall_into_other() {
    let invoices = vec![make_invoice("Ana", &[("Consultoría", dec!(100), 7)])];
    assert_eq!(
        top_category(&invoices, &Categorizer::new()),
        Some((crate::categorize::OTHER, 7))
    );
}
