pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS invoices (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    date      TEXT NOT NULL,
    customer  TEXT NOT NULL,
    archived  BOOLEAN NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS line_items (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    invoice_id   INTEGER NOT NULL REFERENCES invoices(id),
    description  TEXT NOT NULL,
    price        TEXT NOT NULL,
    quantity     INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_line_items_invoice ON line_items(invoice_id);
CREATE INDEX IF NOT EXISTS idx_invoices_archived ON invoices(archived);

CREATE TABLE IF NOT EXISTS config (
    key    TEXT PRIMARY KEY,
    value  TEXT
);

"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Sample data for a brand-new store: (date, customer, items as (description, price, quantity)).
pub(crate) const SAMPLE_INVOICES: &[(&str, &str, &[(&str, &str, u32)])] = &[
    (
        "2025-01-03 00:00:00",
        "Luis Martínez",
        &[
            ("Tesla Model S", "1740000", 1),
            ("Tesla Model 3", "875000", 2),
            ("Gasolina Premium", "25", 40),
            ("Cena lujo restaurante", "3500", 2),
            ("Rolex Submariner", "215000", 1),
        ],
    ),
    (
        "2025-01-05 00:00:00",
        "Ana Torres",
        &[
            ("BMW M5", "2390000", 1),
            ("Gasolina Magna", "22", 50),
            ("Louis Vuitton Bolsa", "58000", 1),
        ],
    ),
    (
        "2025-01-06 00:00:00",
        "Carlos Vega",
        &[
            ("Mercedes AMG GT", "4200000", 1),
            ("Casa residencial", "4500000", 1),
            ("Sushi Omakase", "4200", 3),
        ],
    ),
    (
        "2025-01-08 00:00:00",
        "Fernanda López",
        &[
            ("BMW X6", "1850000", 1),
            ("Departamento en playa", "6200000", 1),
            ("Buffet Gourmet", "1800", 4),
        ],
    ),
    (
        "2025-01-09 00:00:00",
        "Pedro Sánchez",
        &[
            ("Tesla Model Y", "1100000", 3),
            ("Gasolina Diesel", "24", 80),
            ("Gucci Sneakers", "35000", 2),
        ],
    ),
];
