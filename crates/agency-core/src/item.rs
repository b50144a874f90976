//! # Inventory Items
//!
//! Item drafts and the QR payload strings printed on item labels.
//! Rendering the payload into an image happens outside this workspace.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreResult;
use crate::purchase::trimmed;
use crate::types::Item;
use crate::validation::{validate_name, validate_pieces_per_packet, validate_qr_code};

/// Prefix used when the configuration does not name one.
pub const DEFAULT_QR_PREFIX: &str = "AGY";

/// Generates a QR payload: `{PREFIX}-{yyyymmdd}-{8 hex chars}`.
///
/// The random part comes from a UUID v4, so two labels printed on the same
/// day still differ. The prefix is upper-cased and stripped to ASCII
/// alphanumerics; an empty result falls back to [`DEFAULT_QR_PREFIX`].
///
/// ```rust
/// use agency_core::item::generate_qr_code;
/// use agency_core::validation::validate_qr_code;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
/// let code = generate_qr_code("shop", day);
/// assert!(code.starts_with("SHOP-20261018-"));
/// assert_eq!(code.len(), "SHOP-20261018-".len() + 8);
/// assert!(validate_qr_code(&code).is_ok());
/// ```
pub fn generate_qr_code(prefix: &str, date: NaiveDate) -> String {
    let mut prefix: String = prefix
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(16)
        .collect();
    if prefix.is_empty() {
        prefix = DEFAULT_QR_PREFIX.to_string();
    }

    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, date.format("%Y%m%d"), &random[..8])
}

/// An inventory item form before it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub description: Option<String>,
    /// Explicit QR payload; generated when absent.
    pub qr_code: Option<String>,
    pub pieces_per_packet: i64,
}

impl ItemDraft {
    /// Validates the form and builds the row, generating a QR payload with
    /// `qr_prefix` when none was given.
    pub fn into_item(self, id: String, qr_prefix: &str, now: DateTime<Utc>) -> CoreResult<Item> {
        validate_name("item name", &self.name)?;
        validate_pieces_per_packet(self.pieces_per_packet)?;

        let qr_code = match trimmed(self.qr_code) {
            Some(code) => {
                validate_qr_code(&code)?;
                code
            }
            None => generate_qr_code(qr_prefix, now.date_naive()),
        };

        Ok(Item {
            id,
            name: self.name.trim().to_string(),
            description: trimmed(self.description),
            qr_code,
            pieces_per_packet: self.pieces_per_packet,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_qr_code_sanitizes_prefix() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert!(generate_qr_code("a-b c", day).starts_with("ABC-20260102-"));
        assert!(generate_qr_code("!!", day).starts_with("AGY-20260102-"));
    }

    #[test]
    fn test_generated_codes_differ() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_ne!(generate_qr_code("X", day), generate_qr_code("X", day));
    }

    #[test]
    fn test_into_item() {
        let now = Utc::now();
        let generated = ItemDraft {
            name: " Green Tea ".to_string(),
            description: None,
            qr_code: Some("   ".to_string()),
            pieces_per_packet: 12,
        }
        .into_item("i-1".to_string(), "GT", now)
        .unwrap();
        assert_eq!(generated.name, "Green Tea");
        assert!(generated.qr_code.starts_with("GT-"));
        assert!(generated.is_active);

        let explicit = ItemDraft {
            name: "Mug".to_string(),
            description: Some("white".to_string()),
            qr_code: Some("MUG_0001".to_string()),
            pieces_per_packet: 0,
        }
        .into_item("i-2".to_string(), "GT", now)
        .unwrap();
        assert_eq!(explicit.qr_code, "MUG_0001");

        let bad = ItemDraft {
            name: "Mug".to_string(),
            description: None,
            qr_code: Some("no spaces allowed".to_string()),
            pieces_per_packet: 0,
        }
        .into_item("i-3".to_string(), "GT", now);
        assert!(bad.is_err());
    }
}
