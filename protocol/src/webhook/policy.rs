//! The seam where business rules plug into the webhook.

use super::{SignRequest, SignResponse};

/// Business policy invoked once per request.
///
/// Implementations inspect `request.payments()` and move `response` to
/// approved or rejected. Leaving it pending means approve. Any
/// `Fn(&SignRequest, &mut SignResponse)` closure is a policy.
pub trait SignPolicy: Send + Sync {
    fn decide(&self, request: &SignRequest, response: &mut SignResponse);
}

impl<F> SignPolicy for F
where
    F: Fn(&SignRequest, &mut SignResponse) + Send + Sync,
{
    fn decide(&self, request: &SignRequest, response: &mut SignResponse) {
        self(request, response)
    }
}

/// Approves everything that decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproveAll;

impl SignPolicy for ApproveAll {
    fn decide(&self, _request: &SignRequest, response: &mut SignResponse) {
        response.approve();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::{AccountId, ServiceKeypair};
    use crate::transaction::{TransactionBuilder, TransactionFamily};
    use crate::webhook::InvoiceErrorReason;

    fn request() -> SignRequest {
        let payer = ServiceKeypair::from_seed(&[4u8; 32]);
        let bytes = TransactionBuilder::new(TransactionFamily::Relayed)
            .fee_payer(&payer)
            .transfer(AccountId::new([1u8; 32]), AccountId::new([2u8; 32]), 10)
            .build()
            .to_bytes()
            .unwrap();
        SignRequest::decode(TransactionFamily::Relayed, &bytes, None).unwrap()
    }

    #[test]
    fn closures_are_policies() {
        let policy = |req: &SignRequest, resp: &mut SignResponse| {
            for p in req.payments() {
                resp.mark_invoice_error(p.op_index, InvoiceErrorReason::AlreadyPaid);
            }
        };
        let mut resp = SignResponse::new();
        policy.decide(&request(), &mut resp);
        assert_eq!(resp.invoice_errors().len(), 1);
    }

    #[test]
    fn approve_all_approves() {
        let mut resp = SignResponse::new();
        ApproveAll.decide(&request(), &mut resp);
        assert!(resp.is_approved());
    }
}
