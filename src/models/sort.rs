#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    DateDesc,
    IdDesc,
    CustomerAsc,
}

impl SortOrder {
    /// Text form persisted in the `config` table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DateDesc => "FechaDescendente",
            Self::IdDesc => "IdDescendente",
            Self::CustomerAsc => "NombreClienteAscendente",
        }
    }

    /// Strict parse of the stored form; anything else is the default.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "IdDescendente" => Self::IdDesc,
            "NombreClienteAscendente" => Self::CustomerAsc,
            _ => Self::DateDesc,
        }
    }

    /// Short names accepted on the command line.
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "date" | "fecha" => Some(Self::DateDesc),
            "id" => Some(Self::IdDesc),
            "customer" | "cliente" | "name" => Some(Self::CustomerAsc),
            _ => None,
        }
    }

    pub fn all() -> &'static [SortOrder] {
        &[Self::DateDesc, Self::IdDesc, Self::CustomerAsc]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::DateDesc => "date (newest first)",
            Self::IdDesc => "id (newest first)",
            Self::CustomerAsc => "customer (A-Z)",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
