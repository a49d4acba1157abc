mod invoice;
mod sort;

pub use invoice::{parse_date, Invoice, LineItem, ValidationError, DATE_FORMAT};
pub use sort::SortOrder;

/// Preference keys stored in the `config` table.
pub const FILTER_KEY: &str = "FiltroNombreCliente";
pub const SORT_KEY: &str = "CriterioOrdenacion";
