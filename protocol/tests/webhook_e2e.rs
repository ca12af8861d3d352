//! End-to-end tests for the sign-transaction webhook.
//!
//! Each test starts from raw bytes the way a caller would send them: build a
//! transaction, encode it and its invoices, wrap both in a JSON body, and
//! run the full pipeline with a policy. Nothing is shared between tests.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use paygate_protocol::crypto::{AccountId, ServiceKeypair};
use paygate_protocol::invoice::{Invoice, InvoiceList, LineItem};
use paygate_protocol::transaction::{
    decoder_for, sign_transaction, Operation, SignOutcome, Transaction, TransactionBuilder,
    TransactionFamily,
};
use paygate_protocol::webhook::{
    handle_sign_transaction, ApproveAll, InvoiceErrorReason, SignRequest, SignResponse,
    SignTransactionBody, WebhookError,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn account(b: u8) -> AccountId {
    AccountId::new([b; 32])
}

const MERCHANT: u8 = 0xaa;
const STRANGER: u8 = 0xee;

/// fee, transfer → merchant, create-account, transfer → stranger, transfer → merchant
fn checkout(family: TransactionFamily, payer: &ServiceKeypair) -> Transaction {
    TransactionBuilder::new(family)
        .fee_payer(payer)
        .sequence(7)
        .operation(Operation::fee(account(1), 100))
        .transfer(account(1), account(MERCHANT), 1_000)
        .operation(Operation::create_account(account(1), account(0x42), 1))
        .transfer_with_memo(account(1), account(STRANGER), 2_000, "order-77")
        .transfer(account(1), account(MERCHANT), 3_000)
        .build()
}

fn invoices(skus: &[&str]) -> InvoiceList {
    InvoiceList::new(
        skus.iter()
            .map(|sku| Invoice::new(vec![LineItem::new("widget", 1_000).with_sku(sku.as_bytes())]))
            .collect(),
    )
}

fn body(family: TransactionFamily, tx: &Transaction, list: Option<&InvoiceList>) -> SignTransactionBody {
    let list = list.map(|l| l.encode().unwrap());
    SignTransactionBody::new(family, &tx.to_bytes().unwrap(), list.as_deref())
}

/// Rejects every payment whose destination is not the merchant.
fn merchant_only(req: &SignRequest, resp: &mut SignResponse) {
    for payment in req.payments() {
        if payment.destination != account(MERCHANT) {
            resp.mark_invoice_error(payment.op_index, InvoiceErrorReason::WrongDestination);
        }
    }
}

// ---------------------------------------------------------------------------
// 1. Extraction
// ---------------------------------------------------------------------------

#[test]
fn payments_keep_original_operation_indexes() {
    let payer = ServiceKeypair::generate();
    for family in [TransactionFamily::Envelope, TransactionFamily::Relayed] {
        let tx = checkout(family, &payer);
        let req = SignRequest::from_body(&body(family, &tx, None)).unwrap();

        let indexes: Vec<_> = req.payments().iter().map(|p| p.op_index).collect();
        assert_eq!(indexes, vec![1, 3, 4]);
        assert_eq!(req.payments()[1].reference.memo().unwrap().as_text(), "order-77");
    }
}

#[test]
fn invoice_i_belongs_to_transfer_i() {
    let payer = ServiceKeypair::generate();
    let tx = checkout(TransactionFamily::Relayed, &payer);
    let list = invoices(&["A", "B", "C"]);
    let req = SignRequest::from_body(&body(TransactionFamily::Relayed, &tx, Some(&list))).unwrap();

    for (payment, invoice) in req.payments().iter().zip(&list.invoices) {
        assert_eq!(payment.reference.invoice(), Some(invoice));
    }
}

#[test]
fn invoice_count_mismatch_fails_the_call() {
    let payer = ServiceKeypair::generate();
    let tx = checkout(TransactionFamily::Envelope, &payer);
    let err = handle_sign_transaction(
        &body(TransactionFamily::Envelope, &tx, Some(&invoices(&["A", "B"]))),
        &ApproveAll,
        None,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        WebhookError::InvoiceMismatch {
            invoices: 2,
            transfers: 3
        }
    ));
    assert!(err.is_client_error());
}

// ---------------------------------------------------------------------------
// 2. Decisions and replies
// ---------------------------------------------------------------------------

#[test]
fn wrong_destination_is_reported_by_original_index() {
    let payer = ServiceKeypair::generate();
    let service = ServiceKeypair::generate();
    let tx = checkout(TransactionFamily::Envelope, &payer);

    let reply = handle_sign_transaction(
        &body(TransactionFamily::Envelope, &tx, Some(&invoices(&["A", "B", "C"]))),
        &merchant_only,
        Some(&service),
    )
    .unwrap();

    assert!(reply.rejected);
    assert!(reply.envelope.is_none());
    assert_eq!(
        serde_json::to_string(&reply).unwrap(),
        r#"{"invoice_errors":[{"op_index":3,"reason":"WRONG_DESTINATION"}]}"#
    );
}

#[test]
fn approved_envelope_comes_back_co_signed() {
    let payer = ServiceKeypair::generate();
    let service = ServiceKeypair::generate();
    let tx = TransactionBuilder::new(TransactionFamily::Envelope)
        .fee_payer(&payer)
        .transfer(account(1), account(MERCHANT), 10)
        .build();

    let reply = handle_sign_transaction(
        &body(TransactionFamily::Envelope, &tx, None),
        &merchant_only,
        Some(&service),
    )
    .unwrap();
    assert!(!reply.rejected);

    let bytes = STANDARD.decode(reply.envelope.unwrap()).unwrap();
    let signed = decoder_for(TransactionFamily::Envelope).decode(&bytes).unwrap();
    let Transaction::Envelope(envelope) = &signed else {
        panic!("expected envelope");
    };
    assert!(envelope.is_signed_by(&service.account_id()));
    assert_eq!(signed.identifier(), tx.identifier());
}

#[test]
fn resubmitted_co_signed_envelope_is_still_approved() {
    let payer = ServiceKeypair::generate();
    let service = ServiceKeypair::generate();
    let mut tx = checkout(TransactionFamily::Envelope, &payer);
    assert_eq!(sign_transaction(&mut tx, &service).unwrap(), SignOutcome::Signed);
    let list = invoices(&["A", "B", "C"]);

    let reply = handle_sign_transaction(
        &body(TransactionFamily::Envelope, &tx, Some(&list)),
        &ApproveAll,
        Some(&service),
    )
    .unwrap();
    assert!(!reply.rejected);
    assert!(reply.envelope.is_none());
    assert_eq!(serde_json::to_string(&reply).unwrap(), "{}");
}

#[test]
fn approved_relayed_transaction_is_not_touched() {
    let payer = ServiceKeypair::generate();
    let tx = TransactionBuilder::new(TransactionFamily::Relayed)
        .fee_payer(&payer)
        .transfer(account(1), account(MERCHANT), 10)
        .build();

    let reply = handle_sign_transaction(
        &body(TransactionFamily::Relayed, &tx, None),
        &ApproveAll,
        Some(&ServiceKeypair::generate()),
    )
    .unwrap();
    assert!(!reply.rejected);
    assert_eq!(serde_json::to_string(&reply).unwrap(), "{}");
}

#[test]
fn relayed_gate_leaves_bytes_unchanged() {
    let payer = ServiceKeypair::generate();
    let mut tx = checkout(TransactionFamily::Relayed, &payer);
    let before = tx.to_bytes().unwrap();

    let outcome = sign_transaction(&mut tx, &ServiceKeypair::generate()).unwrap();
    assert_eq!(outcome, SignOutcome::Skipped);
    assert_eq!(tx.to_bytes().unwrap(), before);
}

#[test]
fn bare_reject_is_rejected_with_empty_body() {
    let payer = ServiceKeypair::generate();
    let tx = checkout(TransactionFamily::Relayed, &payer);
    let policy = |_: &SignRequest, resp: &mut SignResponse| resp.reject();

    let reply =
        handle_sign_transaction(&body(TransactionFamily::Relayed, &tx, None), &policy, None)
            .unwrap();
    assert!(reply.rejected);
    assert_eq!(serde_json::to_string(&reply).unwrap(), "{}");
}

// ---------------------------------------------------------------------------
// 3. Malformed input
// ---------------------------------------------------------------------------

#[test]
fn empty_transaction_is_missing_field_not_decode() {
    let reply = handle_sign_transaction(
        &SignTransactionBody {
            family: TransactionFamily::Envelope,
            transaction: Some(String::new()),
            invoice_list: Some(STANDARD.encode(b"garbage")),
        },
        &ApproveAll,
        None,
    );
    assert!(matches!(
        reply.unwrap_err(),
        WebhookError::MissingField {
            field: "transaction"
        }
    ));
}

#[test]
fn truncated_transaction_is_a_decode_error() {
    let payer = ServiceKeypair::generate();
    let bytes = checkout(TransactionFamily::Envelope, &payer).to_bytes().unwrap();
    let body = SignTransactionBody::new(TransactionFamily::Envelope, &bytes[..bytes.len() / 2], None);

    let err = handle_sign_transaction(&body, &ApproveAll, None).unwrap_err();
    assert!(matches!(
        err,
        WebhookError::Decode {
            target: "transaction",
            ..
        }
    ));
}

#[test]
fn same_bytes_same_payments() {
    let payer = ServiceKeypair::generate();
    let tx = checkout(TransactionFamily::Relayed, &payer);
    let b = body(TransactionFamily::Relayed, &tx, Some(&invoices(&["A", "B", "C"])));

    let first = SignRequest::from_body(&b).unwrap();
    let second = SignRequest::from_body(&b).unwrap();
    assert_eq!(first.payments(), second.payments());
    assert_eq!(first.tx_id(), second.tx_id());
}
