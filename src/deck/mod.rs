//! Aircraft models catalog and card presentation for the deck gallery.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Card, Tier};

/// Rarity category of an aircraft model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardCategory {
    #[default]
    Common,
    Uncommon,
    Rare,
    Scarce,
    Ultra,
    Fantasy,
    Historical,
}

impl CardCategory {
    /// Header text colour used on the card face.
    pub fn header_color(&self) -> &'static str {
        match self {
            CardCategory::Common => "#4883a8",
            CardCategory::Uncommon => "#247251",
            CardCategory::Rare => "#ad6422",
            CardCategory::Scarce => "#a68e5e",
            CardCategory::Ultra => "#a86a88",
            CardCategory::Fantasy | CardCategory::Historical => "#75232f",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CardCategory::Common => "Common",
            CardCategory::Uncommon => "Uncommon",
            CardCategory::Rare => "Rare",
            CardCategory::Scarce => "Scarce",
            CardCategory::Ultra => "Ultra",
            CardCategory::Fantasy => "Fantasy",
            CardCategory::Historical => "Historical",
        }
    }
}

/// One aircraft model as published in the models file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRow {
    pub id: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    pub name: String,
    #[serde(default)]
    pub card_category: CardCategory,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

/// The models file served by the game's asset host.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsFile {
    #[serde(default)]
    pub updated_at: i64,
    pub rows: Vec<ModelRow>,
    #[serde(default)]
    pub blacklist: Vec<String>,
}

/// Aircraft models indexed by id.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    rows: HashMap<String, ModelRow>,
    updated_at: i64,
}

impl ModelCatalog {
    pub fn from_file_contents(contents: &str) -> Result<Self, AppError> {
        let file: ModelsFile = serde_json::from_str(contents)?;
        let rows = file
            .rows
            .into_iter()
            .filter(|row| !file.blacklist.contains(&row.id))
            .map(|row| (row.id.clone(), row))
            .collect();
        Ok(Self {
            rows,
            updated_at: file.updated_at,
        })
    }

    /// Load the catalog from disk. A missing path yields an empty catalog.
    pub async fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to read models file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_file_contents(&contents)
    }

    pub fn get(&self, model_id: &str) -> Option<&ModelRow> {
        self.rows.get(model_id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Publication time of the models file, zero when absent.
    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }
}

/// Outer frame class: rainbow for glowing cards, then by tier.
pub fn outer_class(glow: bool, tier: Tier) -> &'static str {
    if glow {
        return "card-outer glow";
    }
    match tier {
        Tier::Gold => "card-outer gold",
        Tier::Silver => "card-outer silver",
        Tier::Paper => "card-outer paper",
    }
}

/// Inner face class by tier.
pub fn inner_class(tier: Tier) -> &'static str {
    match tier {
        Tier::Gold => "card-inner gold",
        Tier::Silver => "card-inner silver",
        Tier::Paper => "card-inner paper",
    }
}

/// Artwork URL for a model at a tier.
pub fn aircraft_image_url(
    base_url: &str,
    aircraft_id: &str,
    tier: Tier,
    model: Option<&ModelRow>,
) -> String {
    let image = model
        .and_then(|m| m.images.as_ref())
        .and_then(|images| images.first())
        .map(String::as_str)
        .unwrap_or(aircraft_id);
    format!("{}/models/images/{}/{}_lg.png", base_url, tier.as_str(), image)
}

/// Sort cards for display, highest XP first.
pub fn sort_for_display(cards: &mut [Card]) {
    cards.sort_by(|a, b| b.xp.cmp(&a.xp));
}

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const PAGE_STYLE: &str = r#"
body { background: #000; color: #fff; font-family: sans-serif; margin: 0; }
.deck { display: flex; flex-wrap: wrap; gap: 1rem; justify-content: center; padding: 1.5rem; }
.card-outer { border-radius: 1.5rem; padding: 0.5rem; width: 20rem; height: 24rem; }
.card-outer.paper, .card-inner.paper { background: #fff; }
.card-outer.silver { background: linear-gradient(to top left, #4b5563, #e5e7eb); }
.card-outer.gold { background: linear-gradient(to top left, #fccf4b, #fef08a); }
.card-outer.glow { background: linear-gradient(to bottom right, #f2725d, #fccf4b, #ffff50, #aff7b6, #93ecf8, #ddaaff, #ffaaff); }
.card-inner { border-radius: 1rem; padding: 1rem; height: calc(100% - 2rem); display: flex; flex-direction: column; align-items: center; color: #111; }
.card-inner.silver { background: linear-gradient(to top left, #d1d5db, #e5e7eb); }
.card-inner.gold { background: linear-gradient(to top left, #fef9c3, #fff); }
.card-inner img { width: 16rem; }
.card-inner h1 { font-size: 1.5rem; text-align: center; }
.login { max-width: 24rem; margin: 4rem auto; display: flex; flex-direction: column; gap: 0.75rem; }
"#;

/// Wrap a page body in the shared layout.
pub fn render_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head><body>{}</body></html>",
        escape_html(title),
        PAGE_STYLE,
        body
    )
}

/// Render one card face.
pub fn render_card(card: &Card, catalog: &ModelCatalog, asset_base_url: &str) -> String {
    let model = catalog.get(&card.aircraft_id);
    let category = model.map(|m| m.card_category).unwrap_or_default();
    let title = match model {
        Some(m) => format!(
            "{} {}",
            m.manufacturer.as_deref().unwrap_or("Unknown"),
            m.name
        ),
        None => card.aircraft_id.clone(),
    };
    let image_url = aircraft_image_url(asset_base_url, &card.aircraft_id, card.tier, model);

    format!(
        r#"<div class="{outer}"><div class="{inner}"><span class="category">{category}</span><img src="{image}" alt="{alt}"><h1 style="color: {color}">{title}</h1><p>{tier} &middot; {xp} XP &middot; {captures} captures</p></div></div>"#,
        outer = outer_class(card.glow, card.tier),
        inner = inner_class(card.tier),
        category = category.label(),
        image = escape_html(&image_url),
        alt = escape_html(&card.aircraft_id),
        color = category.header_color(),
        title = escape_html(&title),
        tier = card.tier.as_str(),
        xp = card.xp,
        captures = card.captures.len(),
    )
}

/// Render the whole deck gallery.
pub fn render_deck(cards: &[Card], catalog: &ModelCatalog, asset_base_url: &str) -> String {
    let faces: String = cards
        .iter()
        .map(|card| render_card(card, catalog, asset_base_url))
        .collect();
    render_page("Deck", &format!(r#"<div class="deck">{}</div>"#, faces))
}

/// Render the login form.
pub fn render_login(error: Option<&str>) -> String {
    let error_html = error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape_html(e)))
        .unwrap_or_default();
    render_page(
        "Login",
        &format!(
            r#"<form class="login" method="post" action="/app/login"><h1>Login to your account</h1>{}<label for="email">Email</label><input id="email" name="email" type="email" placeholder="m@example.com" required><label for="password">Password</label><input id="password" name="password" type="password" required><button type="submit">Login</button></form>"#,
            error_html
        ),
    )
}
