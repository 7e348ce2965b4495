//! In-memory order draft.
//!
//! Line items keep insertion order. Quantities stay within
//! [`MIN_QUANTITY`]..=[`MAX_QUANTITY`]; decrementing past the minimum removes
//! the line instead.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use super::photo::PhotoAttachment;
use crate::errors::OrderError;

pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 999;

/// Mattress name that needs a custom size.
pub const UNIQUE_MATTRESS: &str = "Уникальный матрас";
/// Delivery type that needs no address.
pub const PICKUP: &str = "Самовывоз";
/// Delivery type that needs a region.
pub const REGIONS: &str = "Регионы";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MattressOptions {
    pub size: String,
    pub top_fabric: String,
    pub side_fabric: String,
    pub spring_block: String,
    pub comment: String,
    pub photo: Option<PhotoAttachment>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Mattress(MattressOptions),
    Additional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub id: u32,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    pub kind: ItemKind,
}

impl LineItem {
    pub fn is_mattress(&self) -> bool {
        matches!(self.kind, ItemKind::Mattress(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderHeader {
    pub organization: String,
    pub contact: String,
    pub delivery_type: String,
    pub delivery_address: String,
    pub region: String,
    pub delivery_date: NaiveDate,
    pub prepayment: f64,
}

impl Default for OrderHeader {
    fn default() -> Self {
        Self {
            organization: String::new(),
            contact: String::new(),
            delivery_type: PICKUP.to_string(),
            delivery_address: String::new(),
            region: String::new(),
            delivery_date: Local::now().date_naive(),
            prepayment: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderDraft {
    pub header: OrderHeader,
    /// Size for `Уникальный матрас` lines that have none of their own.
    pub unique_size: String,
    items: Vec<LineItem>,
    next_id: u32,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, name: &str, kind: ItemKind) -> u32 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(LineItem {
            id,
            name: name.to_string(),
            quantity: MIN_QUANTITY,
            price: 0.0,
            kind,
        });
        id
    }

    pub fn add_mattress(&mut self, name: &str) -> u32 {
        self.push(name, ItemKind::Mattress(MattressOptions::default()))
    }

    pub fn add_additional(&mut self, name: &str) -> u32 {
        self.push(name, ItemKind::Additional)
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn item_mut(&mut self, id: u32) -> Result<&mut LineItem, OrderError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(OrderError::ItemNotFound { id })
    }

    pub fn remove(&mut self, id: u32) -> Result<LineItem, OrderError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(OrderError::ItemNotFound { id })?;
        let removed = self.items.remove(index);
        if !self.unique_size_visible() {
            self.unique_size.clear();
        }
        Ok(removed)
    }

    /// Set a quantity, clamped to the allowed range.
    pub fn set_quantity(&mut self, id: u32, quantity: u32) -> Result<u32, OrderError> {
        let item = self.item_mut(id)?;
        item.quantity = quantity.clamp(MIN_QUANTITY, MAX_QUANTITY);
        Ok(item.quantity)
    }

    pub fn increment(&mut self, id: u32) -> Result<u32, OrderError> {
        let item = self.item_mut(id)?;
        item.quantity = (item.quantity + 1).min(MAX_QUANTITY);
        Ok(item.quantity)
    }

    /// Decrease a quantity. Returns `None` when the line was removed.
    pub fn decrement(&mut self, id: u32) -> Result<Option<u32>, OrderError> {
        let item = self.item_mut(id)?;
        if item.quantity <= MIN_QUANTITY {
            self.remove(id)?;
            return Ok(None);
        }
        item.quantity -= 1;
        Ok(Some(item.quantity))
    }

    pub fn set_price(&mut self, id: u32, price: f64) -> Result<(), OrderError> {
        if !price.is_finite() || price < 0.0 {
            return Err(OrderError::InvalidPrice {
                value: price.to_string(),
            });
        }
        self.item_mut(id)?.price = price;
        Ok(())
    }

    pub fn mattress_mut(&mut self, id: u32) -> Result<&mut MattressOptions, OrderError> {
        match &mut self.item_mut(id)?.kind {
            ItemKind::Mattress(options) => Ok(options),
            ItemKind::Additional => Err(OrderError::NotAMattress { id }),
        }
    }

    /// Attach a photo produced by `load`. A failed load leaves the line
    /// without a photo.
    pub fn attach_photo<F>(&mut self, id: u32, load: F) -> Result<(), OrderError>
    where
        F: FnOnce() -> Result<PhotoAttachment, crate::errors::PhotoError>,
    {
        let options = self.mattress_mut(id)?;
        options.photo = None;
        options.photo = Some(load()?);
        Ok(())
    }

    pub fn clear_photo(&mut self, id: u32) -> Result<(), OrderError> {
        self.mattress_mut(id)?.photo = None;
        Ok(())
    }

    pub fn can_submit(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn unique_size_visible(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.is_mattress() && item.name == UNIQUE_MATTRESS)
    }

    pub fn address_visible(&self) -> bool {
        self.header.delivery_type != PICKUP
    }

    pub fn region_visible(&self) -> bool {
        self.header.delivery_type == REGIONS
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.unique_size.clear();
        self.header = OrderHeader::default();
    }

    /// Build the submission body. Hidden fields are sent empty.
    pub fn to_payload(&self) -> Result<OrderPayload, OrderError> {
        if !self.can_submit() {
            return Err(OrderError::EmptyOrder);
        }

        let mut mattresses = Vec::new();
        let mut additional_items = Vec::new();
        for item in &self.items {
            match &item.kind {
                ItemKind::Mattress(options) => {
                    let size = if options.size.is_empty() && item.name == UNIQUE_MATTRESS {
                        self.unique_size.clone()
                    } else {
                        options.size.clone()
                    };
                    mattresses.push(MattressPayload {
                        name: item.name.clone(),
                        quantity: item.quantity,
                        price: item.price,
                        size,
                        top_fabric: options.top_fabric.clone(),
                        side_fabric: options.side_fabric.clone(),
                        spring_block: options.spring_block.clone(),
                        comment: options.comment.clone(),
                        photo: options
                            .photo
                            .as_ref()
                            .map(PhotoAttachment::data_url)
                            .unwrap_or_default(),
                    });
                }
                ItemKind::Additional => additional_items.push(AdditionalPayload {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    price: item.price,
                }),
            }
        }

        let header = &self.header;
        Ok(OrderPayload {
            mattresses,
            additional_items,
            delivery_date: header.delivery_date,
            prepayment: header.prepayment,
            organization: header.organization.clone(),
            contact: header.contact.clone(),
            delivery_type: header.delivery_type.clone(),
            delivery_address: if self.address_visible() {
                header.delivery_address.clone()
            } else {
                String::new()
            },
            region_select: if self.region_visible() {
                header.region.clone()
            } else {
                String::new()
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MattressPayload {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    pub size: String,
    pub top_fabric: String,
    pub side_fabric: String,
    pub spring_block: String,
    pub comment: String,
    /// Data URL, or empty when no photo is attached.
    pub photo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdditionalPayload {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

/// JSON body of an order submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub mattresses: Vec<MattressPayload>,
    pub additional_items: Vec<AdditionalPayload>,
    #[serde(with = "iso_date")]
    pub delivery_date: NaiveDate,
    pub prepayment: f64,
    pub organization: String,
    pub contact: String,
    pub delivery_type: String,
    pub delivery_address: String,
    pub region_select: String,
}

mod iso_date {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }
}

/// Parse a `YYYY-MM-DD` delivery date.
pub fn parse_delivery_date(value: &str) -> Result<NaiveDate, OrderError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| OrderError::InvalidDate {
        value: value.to_string(),
    })
}
