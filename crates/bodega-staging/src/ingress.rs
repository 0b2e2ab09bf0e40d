//! Staged assembly of an ingress document: header plus an ordered,
//! SKU-unique set of locally validated line items with running totals.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use bodega_core::{
    IngressReceipt, IngressSubmission, IngressSubmissionItem, MovementError, MovementSubmit,
    canonical_sku, money,
};

/// What the entry form holds while a line is being typed. `area_id` is
/// optional here because the form may not have an area picked yet; staging
/// requires it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineInput {
    pub sku: String,
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub area_id: Option<i64>,
    pub area_name: String,
    pub category: String,
    pub unit_of_measure: String,
    pub is_new_product: bool,
}

/// A validated, staged line. `computed_net`/`computed_gross` are derived at
/// staging time and only ever change by re-staging the line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftLineItem {
    pub sku: String,
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub area_id: i64,
    pub area_name: String,
    pub category: String,
    pub unit_of_measure: String,
    pub is_new_product: bool,
    pub computed_net: Decimal,
    pub computed_gross: Decimal,
}

impl From<DraftLineItem> for LineInput {
    fn from(line: DraftLineItem) -> Self {
        Self {
            sku: line.sku,
            name: line.name,
            quantity: line.quantity,
            unit_price: line.unit_price,
            area_id: Some(line.area_id),
            area_name: line.area_name,
            category: line.category,
            unit_of_measure: line.unit_of_measure,
            is_new_product: line.is_new_product,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngressHeader {
    pub date: NaiveDate,
    pub document_number: String,
    pub supplier_tax_id: String,
    pub supplier_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentTotals {
    pub net: Decimal,
    pub tax: Decimal,
    pub gross: Decimal,
}

pub struct IngressBuilder {
    submit: Arc<dyn MovementSubmit>,
    lines: Vec<DraftLineItem>,
    submitting: bool,
}

impl IngressBuilder {
    pub fn new(submit: Arc<dyn MovementSubmit>) -> Self {
        Self {
            submit,
            lines: Vec::new(),
            submitting: false,
        }
    }

    pub fn lines(&self) -> &[DraftLineItem] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Validates and appends a line. The SKU must not already be staged.
    pub fn add_line(&mut self, input: LineInput) -> Result<&DraftLineItem, MovementError> {
        let line = self.validate(input, None)?;
        info!(sku = %line.sku, net = %line.computed_net, "ingress line staged");
        let index = self.lines.len();
        self.lines.push(line);
        Ok(&self.lines[index])
    }

    /// Replaces the line at `index`, running the full `add_line` validation.
    /// The uniqueness check ignores the slot being replaced, so re-staging a
    /// line under its own SKU succeeds.
    pub fn replace_line(
        &mut self,
        index: usize,
        input: LineInput,
    ) -> Result<&DraftLineItem, MovementError> {
        if index >= self.lines.len() {
            return Err(MovementError::IndexOutOfRange(index));
        }
        let line = self.validate(input, Some(index))?;
        self.lines[index] = line;
        Ok(&self.lines[index])
    }

    /// Removes the line at `index` and returns its editable values, for
    /// repopulating the entry form.
    pub fn take_line(&mut self, index: usize) -> Result<LineInput, MovementError> {
        if index >= self.lines.len() {
            return Err(MovementError::IndexOutOfRange(index));
        }
        Ok(self.lines.remove(index).into())
    }

    pub fn remove_line(&mut self, index: usize) -> Result<(), MovementError> {
        if index >= self.lines.len() {
            return Err(MovementError::IndexOutOfRange(index));
        }
        self.lines.remove(index);
        Ok(())
    }

    /// Live fold over the staged lines; never cached.
    pub fn totals(&self) -> DocumentTotals {
        let net = self.lines.iter().map(|l| l.computed_net).sum();
        let gross = self.lines.iter().map(|l| l.computed_gross).sum();
        DocumentTotals {
            net,
            tax: money::tax(net, gross),
            gross,
        }
    }

    /// Pairs the header with the staged lines and hands the document to the
    /// submit collaborator. The draft is cleared on success and preserved on
    /// failure so the operator can retry.
    pub async fn finalize(
        &mut self,
        header: &IngressHeader,
        responsible: &str,
    ) -> Result<IngressReceipt, MovementError> {
        if self.submitting {
            return Err(MovementError::SubmissionInFlight);
        }
        if header.document_number.trim().is_empty() {
            return Err(MovementError::MissingField("document_number"));
        }
        if header.supplier_tax_id.trim().is_empty() {
            return Err(MovementError::MissingField("supplier_tax_id"));
        }
        if responsible.trim().is_empty() {
            return Err(MovementError::MissingField("responsible"));
        }
        if self.lines.is_empty() {
            return Err(MovementError::EmptyDocument);
        }

        let document = IngressSubmission {
            date: header.date,
            document_number: header.document_number.clone(),
            supplier_tax_id: header.supplier_tax_id.clone(),
            supplier_name: header.supplier_name.clone(),
            responsible: responsible.to_string(),
            items: self
                .lines
                .iter()
                .map(|l| IngressSubmissionItem {
                    sku: l.sku.clone(),
                    name: l.name.clone(),
                    area_id: l.area_id,
                    quantity: l.quantity,
                    unit_cost: l.unit_price,
                    category: l.category.clone(),
                    unit_of_measure: l.unit_of_measure.clone(),
                })
                .collect(),
        };

        self.submitting = true;
        let outcome = self.submit.submit_ingress(&document).await;
        self.submitting = false;

        match outcome {
            Ok(receipt) => {
                info!(
                    document_number = %document.document_number,
                    lines = document.items.len(),
                    "ingress document submitted"
                );
                self.lines.clear();
                Ok(receipt)
            }
            Err(err) => {
                warn!(document_number = %document.document_number, error = %err, "ingress submission failed");
                Err(MovementError::remote(err))
            }
        }
    }

    fn validate(
        &self,
        input: LineInput,
        skip: Option<usize>,
    ) -> Result<DraftLineItem, MovementError> {
        let sku = canonical_sku(&input.sku);
        if sku.is_empty() {
            return Err(MovementError::MissingField("sku"));
        }
        if input.name.trim().is_empty() {
            return Err(MovementError::MissingField("name"));
        }
        if input.quantity <= Decimal::ZERO {
            return Err(MovementError::InvalidQuantity);
        }
        if input.unit_price < Decimal::ZERO {
            return Err(MovementError::InvalidUnitPrice);
        }
        let area_id = input.area_id.ok_or(MovementError::MissingField("area"))?;

        let clash = self
            .lines
            .iter()
            .enumerate()
            .any(|(i, l)| Some(i) != skip && l.sku == sku);
        if clash {
            return Err(MovementError::DuplicateSku(sku));
        }

        let computed_net = money::net(input.quantity, input.unit_price);
        Ok(DraftLineItem {
            sku,
            name: input.name.trim().to_string(),
            quantity: input.quantity,
            unit_price: input.unit_price,
            area_id,
            area_name: input.area_name,
            category: input.category,
            unit_of_measure: input.unit_of_measure,
            is_new_product: input.is_new_product,
            computed_net,
            computed_gross: money::gross(computed_net),
        })
    }
}
