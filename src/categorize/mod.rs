/// Fallback for descriptions that match no keyword.
pub(crate) const OTHER: &str = "Other";

/// Category keyword lists, checked in order. The first category with a
/// keyword contained in the description wins.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Vehicles",
        &[
            "tesla", "bmw", "mercedes", "audi", "porsche", "ferrari", "toyota", "auto",
            "camioneta", "moto",
        ],
    ),
    (
        "Real Estate",
        &["casa", "departamento", "terreno", "oficina", "local comercial"],
    ),
    ("Fuel", &["gasolina", "diesel", "combustible"]),
    (
        "Food",
        &["cena", "restaurante", "sushi", "buffet", "comida", "desayuno"],
    ),
    (
        "Luxury",
        &["rolex", "louis vuitton", "gucci", "prada", "cartier", "joya"],
    ),
];

pub(crate) struct Categorizer {
    rules: Vec<CompiledRule>,
}

struct CompiledRule {
    category: &'static str,
    keywords: Vec<String>,
}

impl Categorizer {
    pub(crate) fn new() -> Self {
        let rules = CATEGORIES
            .iter()
            .map(|(category, keywords)| CompiledRule {
                category: *category,
                keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Self { rules }
    }

    pub(crate) fn categorize(&self, description: &str) -> &'static str {
        let desc_lower = description.to_lowercase();

        for rule in &self.rules {
            if rule.keywords.iter().any(|k| desc_lower.contains(k.as_str())) {
                return rule.category;
            }
        }

        OTHER
    }

    /// Every category name in match order, `OTHER` last.
    pub(crate) fn categories(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules
            .iter()
            .map(|r| r.category)
            .chain(std::iter::once(OTHER))
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new()
    }
}
