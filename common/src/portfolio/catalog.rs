use std::{fmt, str::FromStr};

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Eventos,
    Retratos,
    Polas,
    Fiestas,
}

impl Category {
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Eventos => "eventos",
            Category::Retratos => "retratos",
            Category::Polas => "polas",
            Category::Fiestas => "fiestas",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(tag: &str) -> anyhow::Result<Self> {
        match tag {
            "eventos" => Ok(Category::Eventos),
            "retratos" => Ok(Category::Retratos),
            "polas" => Ok(Category::Polas),
            "fiestas" => Ok(Category::Fiestas),
            other => Err(anyhow::Error::msg(format!("unknown portfolio category: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PortfolioItem {
    pub id: u32,
    pub category: Category,
    pub image: &'static str,
    pub alt: &'static str,
}

impl PortfolioItem {
    pub fn alt_text(&self) -> String {
        if self.alt.is_empty() {
            format!("Fotografía de {}", self.category)
        } else {
            self.alt.to_string()
        }
    }
}

const fn item(id: u32, category: Category, image: &'static str, alt: &'static str) -> PortfolioItem {
    PortfolioItem {
        id,
        category,
        image,
        alt,
    }
}

pub const CATALOG: [PortfolioItem; 10] = [
    item(
        1,
        Category::Eventos,
        "../images/portfolio-images/59.jpg",
        "Evento corporativo con ambiente elegante y luces cálidas",
    ),
    item(
        2,
        Category::Eventos,
        "../images/portfolio-images/60.jpg",
        "Conferencia tecnológica con ponente en escenario",
    ),
    item(
        3,
        Category::Retratos,
        "../images/portfolio-images/59.jpg",
        "Retrato profesional con iluminación natural suave",
    ),
    item(
        4,
        Category::Polas,
        "../images/portfolio-images/60.jpg",
        "Fotografía instantánea con estética vintage y colores cálidos",
    ),
    item(
        5,
        Category::Fiestas,
        "../images/portfolio-images/59.jpg",
        "Celebración familiar con momentos de alegría nocturna",
    ),
    item(
        6,
        Category::Eventos,
        "../images/portfolio-images/59.jpg",
        "Lanzamiento de producto con ambiente profesional",
    ),
    item(
        7,
        Category::Retratos,
        "../images/portfolio-images/60.jpg",
        "Retrato artístico con juego de luces y sombras",
    ),
    item(
        8,
        Category::Eventos,
        "../images/portfolio-images/60.jpg",
        "Conferencia de negocios con networking",
    ),
    item(
        9,
        Category::Polas,
        "../images/portfolio-images/59.jpg",
        "Serie de polaroids con estética retro y nostálgica",
    ),
    item(
        10,
        Category::Fiestas,
        "../images/portfolio-images/60.jpg",
        "Fiesta de aniversario con decoración elegante",
    ),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Only(Category),
}

impl Filter {
    pub fn admits(&self, item: &PortfolioItem) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(category) => item.category == *category,
        }
    }

    // keeps catalog order
    pub fn apply(&self, items: &[PortfolioItem]) -> Vec<PortfolioItem> {
        items.iter().filter(|item| self.admits(item)).cloned().collect()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("all"),
            Filter::Only(category) => fmt::Display::fmt(category, f),
        }
    }
}

impl FromStr for Filter {
    type Err = anyhow::Error;

    fn from_str(tag: &str) -> anyhow::Result<Self> {
        match tag {
            "all" => Ok(Filter::All),
            other => Ok(Filter::Only(other.parse()?)),
        }
    }
}
