use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use std::str::FromStr;

use super::format::{format_amount, pad};
use crate::controller::InvoiceController;
use crate::db::Database;
use crate::models::{parse_date, Invoice, LineItem, SortOrder};

/// Flags that consume the following argument.
const VALUE_FLAGS: &[&str] = &["--date", "--item", "--customer"];

pub(crate) fn as_cli(args: &[String], db: &Database) -> Result<()> {
    let mut ctl = InvoiceController::new(db.clone())?;
    ctl.load_preferences()?;
    ctl.load_invoices()?;

    let command = args.get(1).map(String::as_str).unwrap_or("list");
    let rest = args.get(2..).unwrap_or(&[]);
    match command {
        "list" | "ls" => cli_list(rest, &ctl),
        "show" => cli_show(rest, &mut ctl),
        "add" => cli_add(rest, &mut ctl),
        "edit" => cli_edit(rest, &mut ctl),
        "delete" | "rm" => cli_delete(rest, &mut ctl),
        "archive" => cli_archive(rest, &mut ctl),
        "unarchive" => cli_unarchive(rest, &mut ctl),
        "filter" => {
            ctl.set_filter(rest.join(" "));
            cli_list(&[], &ctl)
        }
        "sort" => cli_sort(rest, &mut ctl),
        "stats" | "s" => cli_stats(&ctl),
        "--help" | "-h" | "help" => {
            print_usage(db);
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("facturas {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage(db);
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage(db: &Database) {
    println!("Facturas — local invoice book");
    println!();
    println!("Usage: facturas [command]");
    println!();
    println!("Commands:");
    println!("  list [--archived]             List invoices (default command)");
    println!("  show <id>                     Show one invoice with its items");
    println!("  add <customer>                Record a new invoice");
    println!("    --date <YYYY-MM-DD[ HH:MM:SS]>  Invoice date (default: now)");
    println!("    --item \"desc;price[;qty]\"   Line item, repeatable");
    println!("  edit <id>                     Change an invoice");
    println!("    --customer <name>           New customer name");
    println!("    --date <date>               New date");
    println!("    --item \"desc;price[;qty]\"   Replaces ALL items when given");
    println!("    --clear-items               Remove every item");
    println!("  delete <id>                   Delete an invoice and its items");
    println!("  archive <id>                  Hide an invoice from the list");
    println!("  unarchive <id>                Bring an archived invoice back");
    println!("  filter [text]                 Filter by customer (no text clears)");
    println!("  sort <date|id|customer>       Choose list order");
    println!("  stats                         Sales statistics");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Sort orders:");
    for sort in SortOrder::all() {
        println!("  {:<8}{}", sort_arg(*sort), sort.label());
    }
    println!();
    println!("Database: {}", db.path().display());
}

fn cli_list(args: &[String], ctl: &InvoiceController) -> Result<()> {
    let (invoices, heading) = if args.iter().any(|a| a == "--archived") {
        (ctl.archived()?, "Archived invoices".to_string())
    } else {
        let heading = if ctl.filter().trim().is_empty() {
            format!("Invoices by {}", ctl.sort())
        } else {
            format!("Invoices matching \"{}\" by {}", ctl.filter(), ctl.sort())
        };
        (ctl.filtered_view(), heading)
    };

    println!("{heading}");
    if invoices.is_empty() {
        println!("No invoices");
        return Ok(());
    }
    println!(
        "{:>5}  {:<19}  {}  {:>5}  {:>18}",
        "ID",
        "Date",
        pad("Customer", 24),
        "Items",
        "Total"
    );
    println!("{}", "─".repeat(79));
    for invoice in &invoices {
        println!(
            "{:>5}  {:<19}  {}  {:>5}  {:>18}",
            invoice.id.unwrap_or(0),
            invoice.format_date(),
            pad(&invoice.customer, 24),
            invoice.item_count(),
            format_amount(invoice.total()),
        );
    }
    Ok(())
}

fn cli_show(args: &[String], ctl: &mut InvoiceController) -> Result<()> {
    let id = parse_id(args)?;
    let Some(invoice) = ctl.get_by_id(id)? else {
        println!("Invoice {id} not found");
        return Ok(());
    };

    let status = if invoice.archived { " (archived)" } else { "" };
    println!("Invoice #{id}{status}");
    println!("  Customer: {}", invoice.customer);
    println!("  Date:     {}", invoice.format_date());
    println!("{}", "─".repeat(79));
    if invoice.items.is_empty() {
        println!("  No items");
    }
    for item in &invoice.items {
        println!(
            "  {}  {}  {:>4} x {:>15} = {:>16}",
            pad(&item.description, 26),
            pad(ctl.classify(&item.description), 11),
            item.quantity,
            format_amount(item.price),
            format_amount(item.subtotal()),
        );
    }
    println!("{}", "─".repeat(79));
    println!("  Total: {}", format_amount(invoice.total()));
    Ok(())
}

fn cli_add(args: &[String], ctl: &mut InvoiceController) -> Result<()> {
    let (positional, flags) = split_args(args)?;
    if positional.is_empty() {
        anyhow::bail!("Usage: facturas add <customer> [--date <date>] --item \"desc;price;qty\"...");
    }

    let date = match flag_value(&flags, "--date") {
        Some(s) => parse_date_arg(s)?,
        None => now(),
    };
    let items = flag_values(&flags, "--item")
        .map(parse_item)
        .collect::<Result<Vec<_>>>()?;

    let invoice = Invoice::new(positional.join(" "), date, items);
    let id = ctl.create(invoice)?;
    println!("Created invoice #{id}");
    Ok(())
}

fn cli_edit(args: &[String], ctl: &mut InvoiceController) -> Result<()> {
    let (positional, flags) = split_args(args)?;
    let id = parse_id(&positional)?;
    let Some(mut invoice) = ctl.get_by_id(id)? else {
        println!("Invoice {id} not found");
        return Ok(());
    };

    if let Some(customer) = flag_value(&flags, "--customer") {
        invoice.customer = customer.to_string();
    }
    if let Some(date) = flag_value(&flags, "--date") {
        invoice.date = parse_date_arg(date)?;
    }
    let items = flag_values(&flags, "--item")
        .map(parse_item)
        .collect::<Result<Vec<_>>>()?;
    if !items.is_empty() {
        invoice.items = items;
    } else if args.iter().any(|a| a == "--clear-items") {
        invoice.items.clear();
    }

    if ctl.update(invoice)? {
        println!("Updated invoice #{id}");
    } else {
        println!("Invoice {id} not found");
    }
    Ok(())
}

fn cli_delete(args: &[String], ctl: &mut InvoiceController) -> Result<()> {
    let id = parse_id(args)?;
    if ctl.delete(id)? {
        println!("Deleted invoice #{id}");
    } else {
        println!("Invoice {id} not found");
    }
    Ok(())
}

fn cli_archive(args: &[String], ctl: &mut InvoiceController) -> Result<()> {
    let id = parse_id(args)?;
    if ctl.archive(id)? {
        println!("Archived invoice #{id}");
    } else {
        println!("Invoice {id} not found");
    }
    Ok(())
}

fn cli_unarchive(args: &[String], ctl: &mut InvoiceController) -> Result<()> {
    let id = parse_id(args)?;
    if ctl.unarchive(id)? {
        println!("Restored invoice #{id}");
    } else {
        println!("Invoice {id} not found");
    }
    Ok(())
}

fn cli_sort(args: &[String], ctl: &mut InvoiceController) -> Result<()> {
    let arg = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("Usage: facturas sort <date|id|customer>"))?;
    let sort = SortOrder::from_arg(arg)
        .ok_or_else(|| anyhow::anyhow!("Unknown sort: {arg} (use date, id or customer)"))?;
    ctl.set_sort(sort);
    cli_list(&[], ctl)
}

fn cli_stats(ctl: &InvoiceController) -> Result<()> {
    const NO_DATA: &str = "no data";

    println!("Facturas — statistics ({} active invoices)", ctl.invoices().len());
    println!("{}", "─".repeat(50));
    println!("  Total revenue:      {}", format_amount(ctl.total_revenue()));
    println!("  Items sold:         {}", ctl.total_items_sold());

    let top_revenue = ctl
        .top_customer_by_revenue()
        .map(|(name, total)| format!("{name} ({})", format_amount(total)))
        .unwrap_or_else(|| NO_DATA.into());
    println!("  Top customer ($):   {top_revenue}");

    let top_count = ctl
        .top_customer_by_purchases()
        .map(|(name, n)| format!("{name} ({n} invoices)"))
        .unwrap_or_else(|| NO_DATA.into());
    println!("  Top customer (#):   {top_count}");

    let most_sold = ctl
        .most_sold_item()
        .map(|(desc, qty)| format!("{desc} ({qty} units)"))
        .unwrap_or_else(|| NO_DATA.into());
    println!("  Best seller:        {most_sold}");

    let priciest = ctl
        .most_expensive_item()
        .map(|item| format!("{} ({})", item.description, format_amount(item.price)))
        .unwrap_or_else(|| NO_DATA.into());
    println!("  Most expensive:     {priciest}");

    let top_category = ctl
        .top_category()
        .map(|(name, qty)| format!("{name} ({qty} units)"))
        .unwrap_or_else(|| NO_DATA.into());
    println!("  Top category:       {top_category}");

    let revenue = ctl.revenue_by_customer();
    if !revenue.is_empty() {
        let purchases = ctl.purchases_by_customer();
        println!();
        println!("By customer:");
        for (name, total) in &revenue {
            println!(
                "  {}  {:>3}  {:>18}",
                pad(name, 24),
                purchases.get(name).copied().unwrap_or(0),
                format_amount(*total)
            );
        }
    }

    let by_category = ctl.quantity_by_category();
    if !by_category.is_empty() {
        println!();
        println!("Units by category:");
        for name in ctl.categories() {
            if let Some(qty) = by_category.get(name) {
                println!("  {}  {qty:>8}", pad(name, 24));
            }
        }
    }
    Ok(())
}

// ── Argument helpers ─────────────────────────────────────────

fn sort_arg(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::DateDesc => "date",
        SortOrder::IdDesc => "id",
        SortOrder::CustomerAsc => "customer",
    }
}

type SplitArgs<'a> = (Vec<String>, Vec<(&'a str, &'a str)>);

/// Split into positional arguments and `(flag, value)` pairs. A value flag
/// at the end with nothing after it is an error.
fn split_args(args: &[String]) -> Result<SplitArgs<'_>> {
    let mut positional = Vec::new();
    let mut flags = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            let value = iter
                .next()
                .ok_or_else(|| anyhow::anyhow!("Missing value after {arg}"))?;
            flags.push((arg.as_str(), value.as_str()));
        } else if !arg.starts_with("--") {
            positional.push(arg.clone());
        }
    }
    Ok((positional, flags))
}

fn flag_value<'a>(flags: &[(&'a str, &'a str)], name: &str) -> Option<&'a str> {
    flags.iter().rev().find(|(f, _)| *f == name).map(|(_, v)| *v)
}

fn flag_values<'a, 'f>(
    flags: &'f [(&'a str, &'a str)],
    name: &'f str,
) -> impl Iterator<Item = &'a str> + 'f {
    flags
        .iter()
        .filter(move |(f, _)| *f == name)
        .map(|(_, v)| *v)
}

fn parse_id(args: &[String]) -> Result<i64> {
    let raw = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("Missing invoice id"))?;
    raw.trim_start_matches('#')
        .parse()
        .with_context(|| format!("Invalid invoice id: {raw}"))
}

fn parse_date_arg(s: &str) -> Result<NaiveDateTime> {
    parse_date(s).ok_or_else(|| {
        anyhow::anyhow!("Invalid date: {s} (expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)")
    })
}

/// Local time truncated to whole seconds, the precision dates are stored at.
fn now() -> NaiveDateTime {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Parse `description;price[;quantity]`.
pub(crate) fn parse_item(s: &str) -> Result<LineItem> {
    let parts: Vec<&str> = s.split(';').map(str::trim).collect();
    let (description, price, quantity) = match parts.as_slice() {
        [d, p] => (*d, *p, "1"),
        [d, p, q] => (*d, *p, *q),
        _ => anyhow::bail!("Invalid item {s:?} (expected \"description;price[;quantity]\")"),
    };
    let price = Decimal::from_str(price)
        .with_context(|| format!("Invalid price in item {s:?}"))?;
    let quantity: u32 = quantity
        .parse()
        .with_context(|| format!("Invalid quantity in item {s:?}"))?;
    Ok(LineItem::new(description.to_string(), price, quantity))
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
