//! # Transaction Log
//!
//! Append-only list of committed transactions, newest first.
//!
//! ## Invoice Numbers
//! Format: `{PREFIX}-{YYYYMMDD}-{NNNNN}`
//! - PREFIX: from config (default `INV`)
//! - YYYYMMDD: commit date (UTC)
//! - NNNNN: one past the log length, bumped until unused
//!
//! Example: `INV-20261015-00042`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::types::Transaction;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionLog {
    /// Newest first.
    transactions: Vec<Transaction>,
}

impl TransactionLog {
    pub fn new() -> Self {
        TransactionLog::default()
    }

    /// Builds a log from stored transactions (expected newest first).
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        TransactionLog { transactions }
    }

    /// All transactions, newest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// The `limit` most recent transactions.
    pub fn recent(&self, limit: usize) -> &[Transaction] {
        &self.transactions[..limit.min(self.transactions.len())]
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn find_by_invoice(&self, invoice_number: &str) -> Option<&Transaction> {
        self.transactions
            .iter()
            .find(|t| t.invoice_number == invoice_number)
    }

    /// Generates an invoice number not yet used in this log.
    pub fn next_invoice_number(&self, prefix: &str, now: DateTime<Utc>) -> String {
        let date_part = now.format("%Y%m%d");
        let mut seq = self.transactions.len() + 1;

        loop {
            let candidate = format!("{}-{}-{:05}", prefix, date_part, seq);
            if self.find_by_invoice(&candidate).is_none() {
                return candidate;
            }
            seq += 1;
        }
    }

    /// Fails with `DuplicateTransaction` if the id or invoice number is taken.
    pub fn check_unique(&self, transaction: &Transaction) -> CoreResult<()> {
        if self.get(&transaction.id).is_some() {
            return Err(CoreError::DuplicateTransaction(transaction.id.clone()));
        }
        if self.find_by_invoice(&transaction.invoice_number).is_some() {
            return Err(CoreError::DuplicateTransaction(transaction.invoice_number.clone()));
        }
        Ok(())
    }

    /// Appends a committed transaction at the front.
    ///
    /// Rejects a transaction whose id or invoice number is already logged.
    pub fn append(&mut self, transaction: Transaction) -> CoreResult<()> {
        self.check_unique(&transaction)?;

        info!(
            invoice = %transaction.invoice_number,
            total = %transaction.total,
            method = %transaction.payment_method,
            "Transaction logged"
        );
        self.transactions.insert(0, transaction);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::money::PreciseMoney;
    use crate::types::PaymentMethod;
    use chrono::TimeZone;

    pub(crate) fn transaction(id: &str, invoice: &str, timestamp: DateTime<Utc>) -> Transaction {
        Transaction {
            id: id.to_string(),
            invoice_number: invoice.to_string(),
            lines: Vec::new(),
            customer: None,
            subtotal: PreciseMoney::zero(),
            gst_amount: PreciseMoney::zero(),
            discount_amount: PreciseMoney::zero(),
            total: PreciseMoney::zero(),
            payment_method: PaymentMethod::Cash,
            cashier: "John Doe".to_string(),
            timestamp,
        }
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_append_keeps_newest_first() {
        let mut log = TransactionLog::new();
        log.append(transaction("a", "INV-1", at(1))).unwrap();
        log.append(transaction("b", "INV-2", at(2))).unwrap();

        assert_eq!(log.transactions()[0].id, "b");
        assert_eq!(log.recent(1).len(), 1);
        assert_eq!(log.recent(10).len(), 2);
    }

    #[test]
    fn test_append_rejects_duplicates() {
        let mut log = TransactionLog::new();
        log.append(transaction("a", "INV-1", at(1))).unwrap();

        assert!(matches!(
            log.append(transaction("a", "INV-9", at(1))),
            Err(CoreError::DuplicateTransaction(_))
        ));
        assert!(matches!(
            log.append(transaction("z", "INV-1", at(1))),
            Err(CoreError::DuplicateTransaction(_))
        ));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_check_unique_does_not_touch_log() {
        let mut log = TransactionLog::new();
        log.append(transaction("a", "INV-1", at(1))).unwrap();

        assert!(log.check_unique(&transaction("b", "INV-2", at(2))).is_ok());
        assert!(matches!(
            log.check_unique(&transaction("b", "INV-1", at(2))),
            Err(CoreError::DuplicateTransaction(invoice)) if invoice == "INV-1"
        ));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_invoice_number_skips_used_sequence() {
        let mut log = TransactionLog::new();
        assert_eq!(log.next_invoice_number("INV", at(15)), "INV-20261015-00001");

        log.append(transaction("a", "INV-20261015-00002", at(15))).unwrap();
        assert_eq!(log.next_invoice_number("INV", at(15)), "INV-20261015-00003");
    }
}
