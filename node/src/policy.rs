//! # Catalog Policy
//!
//! The business rules the node runs for every sign request: payments may
//! only go to allowlisted merchant accounts, and every SKU an invoice names
//! must be in the catalog. An empty allowlist or catalog disables that
//! check.

use std::collections::HashSet;

use paygate_protocol::crypto::AccountId;
use paygate_protocol::webhook::{InvoiceErrorReason, SignPolicy, SignRequest, SignResponse};

#[derive(Debug, Clone, Default)]
pub struct CatalogPolicy {
    destinations: HashSet<AccountId>,
    skus: HashSet<Vec<u8>>,
}

impl CatalogPolicy {
    pub fn new(
        destinations: impl IntoIterator<Item = AccountId>,
        skus: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> Self {
        Self {
            destinations: destinations.into_iter().collect(),
            skus: skus.into_iter().map(Into::into).collect(),
        }
    }

    fn destination_allowed(&self, destination: &AccountId) -> bool {
        self.destinations.is_empty() || self.destinations.contains(destination)
    }

    fn sku_known(&self, sku: &[u8]) -> bool {
        self.skus.is_empty() || self.skus.contains(sku)
    }
}

impl SignPolicy for CatalogPolicy {
    fn decide(&self, request: &SignRequest, response: &mut SignResponse) {
        for payment in request.payments() {
            if !self.destination_allowed(&payment.destination) {
                tracing::debug!(
                    op_index = payment.op_index,
                    destination = %payment.destination,
                    "destination not allowlisted"
                );
                response.mark_invoice_error(payment.op_index, InvoiceErrorReason::WrongDestination);
                continue;
            }

            let Some(invoice) = payment.reference.invoice() else {
                continue;
            };
            let unknown = invoice
                .items
                .iter()
                .filter_map(|item| item.sku.as_deref())
                .any(|sku| !self.sku_known(sku));
            if unknown {
                response.mark_invoice_error(payment.op_index, InvoiceErrorReason::SkuNotFound);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paygate_protocol::crypto::ServiceKeypair;
    use paygate_protocol::invoice::{Invoice, InvoiceList, LineItem};
    use paygate_protocol::transaction::{Operation, TransactionBuilder, TransactionFamily};
    use paygate_protocol::webhook::InvoiceError;

    const MERCHANT: AccountId = AccountId::new([0xaa; 32]);

    fn a(b: u8) -> AccountId {
        AccountId::new([b; 32])
    }

    /// fee, transfer → merchant, transfer → 0xee
    fn request(skus: Option<[&str; 2]>) -> SignRequest {
        let payer = ServiceKeypair::from_seed(&[1u8; 32]);
        let tx = TransactionBuilder::new(TransactionFamily::Relayed)
            .fee_payer(&payer)
            .operation(Operation::fee(a(1), 5))
            .transfer(a(1), MERCHANT, 100)
            .transfer(a(1), a(0xee), 200)
            .build()
            .to_bytes()
            .unwrap();
        let list = skus.map(|skus| {
            InvoiceList::new(
                skus.iter()
                    .map(|sku| Invoice::new(vec![LineItem::new("item", 100).with_sku(sku.as_bytes())]))
                    .collect(),
            )
            .encode()
            .unwrap()
        });
        SignRequest::decode(TransactionFamily::Relayed, &tx, list.as_deref()).unwrap()
    }

    fn decide(policy: &CatalogPolicy, req: &SignRequest) -> SignResponse {
        let mut resp = SignResponse::new();
        policy.decide(req, &mut resp);
        resp
    }

    #[test]
    fn empty_policy_accepts_everything() {
        let resp = decide(&CatalogPolicy::default(), &request(Some(["X", "Y"])));
        assert!(!resp.is_rejected());
    }

    #[test]
    fn foreign_destination_is_wrong_destination() {
        let policy = CatalogPolicy::new([MERCHANT], Vec::<String>::new());
        let resp = decide(&policy, &request(None));

        assert_eq!(
            resp.invoice_errors(),
            &[InvoiceError {
                op_index: 2,
                reason: InvoiceErrorReason::WrongDestination
            }]
        );
    }

    #[test]
    fn unknown_sku_is_sku_not_found() {
        let policy = CatalogPolicy::new([MERCHANT, a(0xee)], ["SKU-1"]);
        let resp = decide(&policy, &request(Some(["SKU-1", "SKU-9"])));

        assert_eq!(
            resp.invoice_errors(),
            &[InvoiceError {
                op_index: 2,
                reason: InvoiceErrorReason::SkuNotFound
            }]
        );
    }

    #[test]
    fn wrong_destination_takes_precedence_over_sku() {
        let policy = CatalogPolicy::new([MERCHANT], ["SKU-1"]);
        let resp = decide(&policy, &request(Some(["SKU-1", "SKU-9"])));

        assert_eq!(resp.invoice_errors().len(), 1);
        assert_eq!(
            resp.invoice_errors()[0].reason,
            InvoiceErrorReason::WrongDestination
        );
    }
}
