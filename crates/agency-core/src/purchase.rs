//! # Purchase Derivation
//!
//! Turns a buying form into a [`Purchase`] with its derived columns filled.
//!
//! ```text
//! quantity ──────────┬──────────────────► total_pieces   = quantity × pieces
//!                    │
//! pieces_per_packet ─┤
//!                    │
//! price_per_packet ──┼──────────────────► total_amount   = quantity × price
//!                    │
//!                    └──────────────────► price_per_piece = price / pieces
//!                                                           (0 if no pieces)
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::Purchase;
use crate::validation::{
    validate_name, validate_pieces_per_packet, validate_price_cents, validate_quantity,
    validate_uuid,
};

/// Values derived from one buying line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseTotals {
    pub total_pieces: i64,
    pub price_per_piece: Money,
    pub total_amount: Money,
}

impl PurchaseTotals {
    /// Derives totals for `quantity` packets at `price_per_packet`, each
    /// holding `pieces_per_packet` pieces.
    ///
    /// ```rust
    /// use agency_core::money::Money;
    /// use agency_core::purchase::PurchaseTotals;
    ///
    /// let t = PurchaseTotals::derive(10, Money::from_cents(12_000), 24);
    /// assert_eq!(t.total_pieces, 240);
    /// assert_eq!(t.price_per_piece.cents(), 500);
    /// assert_eq!(t.total_amount.cents(), 120_000);
    ///
    /// let no_pieces = PurchaseTotals::derive(2, Money::from_cents(500), 0);
    /// assert!(no_pieces.price_per_piece.is_zero());
    /// ```
    pub fn derive(quantity: i64, price_per_packet: Money, pieces_per_packet: i64) -> Self {
        PurchaseTotals {
            total_pieces: quantity * pieces_per_packet,
            price_per_piece: price_per_packet.divide_rounded(pieces_per_packet),
            total_amount: price_per_packet.multiply_quantity(quantity),
        }
    }
}

/// A buying form before it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseDraft {
    pub item_name: String,
    pub item_id: Option<String>,
    pub supplier: Option<String>,
    pub quantity: i64,
    pub price_per_packet: Money,
    pub pieces_per_packet: i64,
    pub purchase_date: NaiveDate,
    pub notes: Option<String>,
}

impl PurchaseDraft {
    /// Checks the form against the buying rules.
    pub fn validate(&self) -> CoreResult<()> {
        validate_name("item name", &self.item_name)?;
        if let Some(item_id) = &self.item_id {
            validate_uuid(item_id)?;
        }
        validate_quantity(self.quantity)?;
        validate_price_cents(self.price_per_packet.cents())?;
        validate_pieces_per_packet(self.pieces_per_packet)?;
        Ok(())
    }

    /// Derived totals for this form.
    pub fn totals(&self) -> PurchaseTotals {
        PurchaseTotals::derive(self.quantity, self.price_per_packet, self.pieces_per_packet)
    }

    /// Validates and builds the row to insert.
    pub fn into_purchase(self, id: String, now: DateTime<Utc>) -> CoreResult<Purchase> {
        self.validate()?;
        let totals = self.totals();

        Ok(Purchase {
            id,
            item_name: self.item_name.trim().to_string(),
            item_id: self.item_id,
            supplier: trimmed(self.supplier),
            quantity: self.quantity,
            price_per_packet_cents: self.price_per_packet.cents(),
            pieces_per_packet: self.pieces_per_packet,
            total_pieces: totals.total_pieces,
            price_per_piece_cents: totals.price_per_piece.cents(),
            total_amount_cents: totals.total_amount.cents(),
            purchase_date: self.purchase_date,
            notes: trimmed(self.notes),
            created_at: now,
            updated_at: now,
        })
    }

    /// Validates and overwrites an existing row (explicit edit).
    ///
    /// Derived columns are recomputed; `id` and `created_at` are kept.
    pub fn apply_to(self, existing: &Purchase, now: DateTime<Utc>) -> CoreResult<Purchase> {
        let mut updated = self.into_purchase(existing.id.clone(), now)?;
        updated.created_at = existing.created_at;
        Ok(updated)
    }
}

/// Empty optional text becomes `None`.
pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================
