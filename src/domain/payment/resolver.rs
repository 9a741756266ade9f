//! Metadata resolution across linked payment objects.
//!
//! Checkout metadata is stamped on the payment intent, but downstream
//! objects (charges, refunds, disputes) often arrive without it. The
//! resolver walks the object graph back to the intent and, where allowed,
//! pushes the recovered metadata onto the charge so later events find it
//! without another hop.

use tracing::{debug, info};

use crate::ports::{ChargeStore, GatewayError};

use super::metadata::Metadata;
use super::objects::Charge;

/// Where resolved metadata was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataSource {
    /// The object carried its own metadata.
    Own,
    /// Recovered from the linked payment intent.
    PaymentIntent,
    /// Nothing found anywhere on the chain.
    Absent,
}

/// Outcome of a resolution pass.
#[derive(Debug, Clone)]
pub struct ResolvedMetadata {
    pub metadata: Metadata,
    pub source: MetadataSource,
}

impl ResolvedMetadata {
    fn own(metadata: Metadata) -> Self {
        Self {
            metadata,
            source: MetadataSource::Own,
        }
    }

    fn from_intent(metadata: Metadata) -> Self {
        Self {
            metadata,
            source: MetadataSource::PaymentIntent,
        }
    }

    fn absent() -> Self {
        Self {
            metadata: Metadata::new(),
            source: MetadataSource::Absent,
        }
    }
}

/// Resolves metadata for charges and charge-linked objects.
pub struct MetadataResolver<'a> {
    store: &'a dyn ChargeStore,
}

impl<'a> MetadataResolver<'a> {
    pub fn new(store: &'a dyn ChargeStore) -> Self {
        Self { store }
    }

    /// Resolves metadata for a charge, backfilling the charge when it
    /// arrived empty.
    ///
    /// The charge's own metadata always wins. Only when it is empty do we
    /// fall back to the linked payment intent, and only then do we write
    /// the recovered metadata back. The non-overwrite rule keeps redelivery
    /// and concurrent deliveries harmless: a second pass sees the populated
    /// charge and stops at the first branch.
    pub async fn resolve_for_charge(
        &self,
        charge: &Charge,
    ) -> Result<ResolvedMetadata, GatewayError> {
        if charge.has_metadata() {
            return Ok(ResolvedMetadata::own(charge.metadata.clone()));
        }

        let Some(intent_id) = charge.payment_intent.as_deref() else {
            debug!(charge_id = %charge.id, "charge has no payment intent link");
            return Ok(ResolvedMetadata::absent());
        };

        let intent = self.store.retrieve_payment_intent(intent_id).await?;
        if intent.metadata.is_empty() {
            return Ok(ResolvedMetadata::absent());
        }

        // Re-check before writing: another delivery may have raced us.
        let current = self.store.retrieve_charge(&charge.id).await?;
        if current.has_metadata() {
            debug!(charge_id = %charge.id, "charge metadata already populated, skipping write");
            return Ok(ResolvedMetadata::own(current.metadata));
        }

        self.store
            .update_charge_metadata(&charge.id, &intent.metadata)
            .await?;
        info!(
            charge_id = %charge.id,
            payment_intent_id = %intent_id,
            "backfilled charge metadata from payment intent"
        );

        Ok(ResolvedMetadata::from_intent(intent.metadata))
    }

    /// Resolves metadata for an object that only references a charge by ID
    /// (refunds and disputes). Never writes back: the charge is fetched for
    /// reading and the two-hop fallback goes through `resolve_for_charge`'s
    /// read path only.
    pub async fn resolve_for_charge_id(
        &self,
        charge_id: &str,
    ) -> Result<ResolvedMetadata, GatewayError> {
        let charge = self.store.retrieve_charge(charge_id).await?;

        if charge.has_metadata() {
            return Ok(ResolvedMetadata::own(charge.metadata));
        }

        let Some(intent_id) = charge.payment_intent.as_deref() else {
            return Ok(ResolvedMetadata::absent());
        };

        let intent = self.store.retrieve_payment_intent(intent_id).await?;
        if intent.metadata.is_empty() {
            return Ok(ResolvedMetadata::absent());
        }

        Ok(ResolvedMetadata::from_intent(intent.metadata))
    }
}
