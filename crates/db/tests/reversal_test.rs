//! Reversal integration tests.

mod common;

use common::{actor, date, journal, setup, simple};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_core::ledger::{LedgerError, PostingLine, ReversalService};

#[tokio::test]
async fn test_reversal_nets_every_account_to_zero() {
    let engines = setup().await;
    engines
        .ledger
        .post(journal(
            vec![
                PostingLine::debit("6100", dec!(60)).with_memo("Paper"),
                PostingLine::debit("1400", dec!(6)),
                PostingLine::credit("1100", dec!(66)),
            ],
            date(2026, 3, 10),
        ))
        .await
        .expect("post voucher");

    let reversal = engines
        .ledger
        .reverse_on("JV-1", "Entered twice", actor(), date(2026, 3, 12))
        .await
        .expect("reverse voucher");
    assert_eq!(reversal.voucher_number, "REV-1");
    assert_eq!(reversal.document_type, "REV");
    assert_eq!(reversal.reverses.as_deref(), Some("JV-1"));

    let original = engines.ledger.find_voucher("JV-1").await.expect("original");
    let mirror = engines.ledger.find_voucher("REV-1").await.expect("mirror");
    assert_eq!(original.reversed_by.as_deref(), Some("REV-1"));
    assert_eq!(mirror.voucher.reverses_voucher_number.as_deref(), Some("JV-1"));

    let lines: Vec<_> = original
        .entries
        .iter()
        .chain(mirror.entries.iter())
        .map(tally_db::entities::ledger_entries::Model::to_line)
        .collect();
    for (account, net) in ReversalService::net_by_account(&lines) {
        assert_eq!(net, Decimal::ZERO, "account {account} does not net to zero");
    }

    for code in ["6100", "1400", "1100"] {
        let balance = engines
            .ledger
            .account_balance(code, date(2026, 3, 31))
            .await
            .expect("balance");
        assert_eq!(balance, Decimal::ZERO);
    }
}

#[tokio::test]
async fn test_reversal_keeps_reference_and_memo() {
    let engines = setup().await;
    engines
        .ledger
        .post(simple("6100", "1100", dec!(10), date(2026, 3, 10)))
        .await
        .expect("post voucher");

    engines
        .ledger
        .reverse_on("JV-1", "Wrong account", actor(), date(2026, 3, 11))
        .await
        .expect("reverse voucher");

    let mirror = engines.ledger.find_voucher("REV-1").await.expect("mirror");
    assert_eq!(mirror.voucher.reference_table, "manual_journals");
    assert!(
        mirror
            .entries
            .iter()
            .all(|e| e.memo.as_deref() == Some("Reversal of JV-1: Wrong account"))
    );
    assert_eq!(
        mirror.voucher.description.as_deref(),
        Some("Reversal of voucher JV-1. Reason: Wrong account")
    );
}

#[tokio::test]
async fn test_reverse_twice_rejected() {
    let engines = setup().await;
    engines
        .ledger
        .post(simple("6100", "1100", dec!(10), date(2026, 3, 10)))
        .await
        .expect("post voucher");
    engines
        .ledger
        .reverse_on("JV-1", "Mistake", actor(), date(2026, 3, 11))
        .await
        .expect("first reversal");

    let result = engines
        .ledger
        .reverse_on("JV-1", "Mistake again", actor(), date(2026, 3, 11))
        .await;

    assert!(matches!(
        result,
        Err(LedgerError::VoucherAlreadyReversed { ref voucher, ref reversal })
            if voucher == "JV-1" && reversal == "REV-1"
    ));
}

#[tokio::test]
async fn test_reversal_of_reversal_rejected() {
    let engines = setup().await;
    engines
        .ledger
        .post(simple("6100", "1100", dec!(10), date(2026, 3, 10)))
        .await
        .expect("post voucher");
    engines
        .ledger
        .reverse_on("JV-1", "Mistake", actor(), date(2026, 3, 11))
        .await
        .expect("reverse voucher");

    let result = engines
        .ledger
        .reverse_on("REV-1", "Undo", actor(), date(2026, 3, 12))
        .await;

    assert!(matches!(result, Err(LedgerError::ReversalOfReversal(n)) if n == "REV-1"));
}

#[tokio::test]
async fn test_reverse_unknown_voucher() {
    let engines = setup().await;

    let result = engines
        .ledger
        .reverse_on("JV-404", "Missing", actor(), date(2026, 3, 11))
        .await;

    assert!(matches!(result, Err(LedgerError::VoucherNotFound(n)) if n == "JV-404"));
}

#[tokio::test]
async fn test_reversal_into_locked_period_rejected() {
    let engines = setup().await;
    engines
        .ledger
        .post(simple("6100", "1100", dec!(10), date(2026, 3, 10)))
        .await
        .expect("post voucher");
    let april = engines
        .fiscal
        .create_period("April 2026", date(2026, 4, 1), date(2026, 4, 30))
        .await
        .expect("create period");
    engines
        .fiscal
        .lock(april.id.into(), actor())
        .await
        .expect("lock");

    let result = engines
        .ledger
        .reverse_on("JV-1", "Late", actor(), date(2026, 4, 2))
        .await;
    assert!(matches!(result, Err(LedgerError::PeriodLocked { .. })));

    let original = engines.ledger.find_voucher("JV-1").await.expect("original");
    assert!(original.reversed_by.is_none());
}
