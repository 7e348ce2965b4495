//! TOML description of an order, for non-interactive submission.
//!
//! ```toml
//! unique_size = "155x195"
//!
//! [header]
//! organization = "ООО Сон"
//! delivery_type = "Регионы"
//! region = "Тверская область"
//! delivery_date = "2026-10-20"
//!
//! [[mattresses]]
//! name = "Уникальный матрас"
//! price = 25000
//! photo = "photos/front.jpg"
//!
//! [[additional]]
//! name = "Чехол"
//! quantity = 2
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::draft::{OrderDraft, parse_delivery_date};
use super::photo::PhotoAttachment;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderEntry {
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub contact: String,
    pub delivery_type: Option<String>,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub region: String,
    /// `YYYY-MM-DD`; today when absent.
    pub delivery_date: Option<String>,
    #[serde(default)]
    pub prepayment: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MattressEntry {
    pub name: String,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub top_fabric: String,
    #[serde(default)]
    pub side_fabric: String,
    #[serde(default)]
    pub spring_block: String,
    #[serde(default)]
    pub comment: String,
    /// Image path, relative to the draft file.
    pub photo: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdditionalEntry {
    pub name: String,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub price: f64,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DraftFile {
    #[serde(default)]
    pub header: HeaderEntry,
    #[serde(default)]
    pub unique_size: String,
    #[serde(default)]
    pub mattresses: Vec<MattressEntry>,
    #[serde(default)]
    pub additional: Vec<AdditionalEntry>,
}

impl DraftFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read order draft: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse order draft: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid order draft TOML")
    }

    /// Replay the file onto a fresh draft. Photo paths resolve against
    /// `base_dir`.
    pub fn into_draft(self, base_dir: &Path, max_photo_bytes: u64) -> Result<OrderDraft> {
        let mut draft = OrderDraft::new();

        let header = self.header;
        draft.header.organization = header.organization;
        draft.header.contact = header.contact;
        if let Some(delivery_type) = header.delivery_type {
            draft.header.delivery_type = delivery_type;
        }
        draft.header.delivery_address = header.delivery_address;
        draft.header.region = header.region;
        if let Some(date) = header.delivery_date {
            draft.header.delivery_date = parse_delivery_date(&date)?;
        }
        draft.header.prepayment = header.prepayment;

        for entry in self.mattresses {
            let id = draft.add_mattress(&entry.name);
            draft.set_quantity(id, entry.quantity)?;
            draft.set_price(id, entry.price)?;
            if let Some(photo) = &entry.photo {
                let path = base_dir.join(photo);
                draft
                    .attach_photo(id, || PhotoAttachment::from_path(&path, max_photo_bytes))
                    .with_context(|| format!("Photo for '{}'", entry.name))?;
            }
            let options = draft.mattress_mut(id)?;
            options.size = entry.size;
            options.top_fabric = entry.top_fabric;
            options.side_fabric = entry.side_fabric;
            options.spring_block = entry.spring_block;
            options.comment = entry.comment;
        }

        for entry in self.additional {
            let id = draft.add_additional(&entry.name);
            draft.set_quantity(id, entry.quantity)?;
            draft.set_price(id, entry.price)?;
        }

        if draft.unique_size_visible() {
            draft.unique_size = self.unique_size;
        }
        Ok(draft)
    }
}
