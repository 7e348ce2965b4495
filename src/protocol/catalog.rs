use serde_json::Value;

use crate::errors::ProtocolError;

/// Option lists served under `/api/*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Fabrics,
    Springs,
    Mattresses,
    Nomenclatures,
    Additions,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 5] = [
        CatalogKind::Fabrics,
        CatalogKind::Springs,
        CatalogKind::Mattresses,
        CatalogKind::Nomenclatures,
        CatalogKind::Additions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Fabrics => "fabrics",
            CatalogKind::Springs => "springs",
            CatalogKind::Mattresses => "mattresses",
            CatalogKind::Nomenclatures => "nomenclatures",
            CatalogKind::Additions => "additions",
        }
    }

    pub fn path(&self) -> String {
        format!("/api/{}", self.as_str())
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CatalogKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        CatalogKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid catalog '{}'. Valid values: fabrics, springs, mattresses, nomenclatures, additions",
                    s
                )
            })
    }
}

/// Extract the option list from a bare array or a `{status, data: [..]}`
/// envelope. Non-string entries are rendered as JSON text.
pub fn parse_catalog(value: Value) -> Result<Vec<String>, ProtocolError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => return Err(ProtocolError::InvalidCatalog),
        },
        _ => return Err(ProtocolError::InvalidCatalog),
    };

    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}
