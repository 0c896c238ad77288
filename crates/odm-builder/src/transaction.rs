//! The transactional capability: a `TransactionType` attribute whose legal
//! values depend on the concrete element type.

use odm_model::TransactionType;

use crate::element::Element;
use crate::error::{OdmError, Result};

/// Every transaction type.
pub const ALL_TRANSACTION_TYPES: &[TransactionType] = &[
    TransactionType::Insert,
    TransactionType::Update,
    TransactionType::Upsert,
    TransactionType::Context,
    TransactionType::Remove,
];

/// Only `Insert`.
pub const INSERT_ONLY: &[TransactionType] = &[TransactionType::Insert];

/// Elements carrying an optional, validated `TransactionType`.
///
/// An unset transaction type is omitted from output rather than defaulted.
pub trait Transactional: Element {
    /// Transaction types this element accepts.
    const TRANSACTION_TYPES: &'static [TransactionType];

    fn transaction_type(&self) -> Option<TransactionType>;

    #[doc(hidden)]
    fn transaction_type_slot(&mut self) -> &mut Option<TransactionType>;

    /// Sets the transaction type, rejecting values outside
    /// [`Self::TRANSACTION_TYPES`] without changing the element.
    fn set_transaction_type(&mut self, value: TransactionType) -> Result<&mut Self>
    where
        Self: Sized,
    {
        if !Self::TRANSACTION_TYPES.contains(&value) {
            return Err(OdmError::TransactionTypeNotAllowed {
                element: Self::TAG,
                value,
            });
        }
        *self.transaction_type_slot() = Some(value);
        Ok(self)
    }

    /// Parses and sets a transaction type given as its wire value.
    fn set_transaction_type_str(&mut self, value: &str) -> Result<&mut Self>
    where
        Self: Sized,
    {
        let parsed: TransactionType = value.parse()?;
        self.set_transaction_type(parsed)
    }

    fn clear_transaction_type(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        *self.transaction_type_slot() = None;
        self
    }
}
