//! The ledger store: the ordered collection of transactions, mirrored to durable storage after
//! every change.
//!
//! Each mutating operation finishes by serializing the whole collection and overwriting the
//! `Storage` slot before it returns. There is no incremental write and no batching. Operations
//! that target an unknown `id` are silent no-ops and do not touch storage.

mod clock;
mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use storage::{FileStorage, MemoryStorage, Storage};

use crate::error::Res;
use crate::model::{
    newest_first, Category, Draft, Transaction, TransactionId, TransactionUpdates,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How many transactions are handed to the inference service as examples.
pub const DEFAULT_CONTEXT_SIZE: usize = 20;

/// Selects the context window for categorization: the `size` most recent transactions by date.
///
/// Recency is computed from the dates themselves, not from the stored order, because editing a
/// date does not re-sort the ledger.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct ContextPolicy {
    size: usize,
}

impl ContextPolicy {
    pub fn most_recent(size: usize) -> Self {
        Self { size }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl Default for ContextPolicy {
    fn default() -> Self {
        Self::most_recent(DEFAULT_CONTEXT_SIZE)
    }
}

/// The in-memory ledger along with the storage it mirrors itself to.
pub struct Ledger {
    storage: Box<dyn Storage>,
    clock: Box<dyn Clock>,
    transactions: Vec<Transaction>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("transactions", &self.transactions)
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Loads the ledger from `storage`, using the system clock for new IDs.
    pub async fn load(storage: impl Storage + 'static) -> Res<Self> {
        Self::load_with_clock(storage, SystemClock).await
    }

    /// Loads the ledger from `storage`.
    ///
    /// Missing, empty or malformed contents are treated as an empty ledger; malformed contents are
    /// logged and will be overwritten by the next mutation. Only a failure to read the storage at
    /// all is an error.
    pub async fn load_with_clock(
        storage: impl Storage + 'static,
        clock: impl Clock + 'static,
    ) -> Res<Self> {
        let contents = storage
            .read()
            .await
            .context("Unable to read the stored ledger")?;
        let transactions = match contents {
            Some(s) => parse_transactions(&s),
            None => {
                debug!("No stored ledger found, starting empty");
                Vec::new()
            }
        };
        debug!("Loaded {} transactions", transactions.len());
        Ok(Self {
            storage: Box::new(storage),
            clock: Box::new(clock),
            transactions,
        })
    }

    /// All transactions in stored order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Adds a new transaction with a fresh `id`, re-sorts the ledger newest first and persists it.
    pub async fn create(&mut self, draft: Draft) -> Res<Transaction> {
        let id = self.next_id()?;
        let transaction = Transaction::from_draft(id, draft);
        self.transactions.push(transaction.clone());
        self.transactions.sort_by(newest_first);
        self.persist().await?;
        debug!("Created transaction {id}");
        Ok(transaction)
    }

    /// Applies `updates` to the transaction with `id` and persists. The ledger is not re-sorted,
    /// even when the date changes.
    ///
    /// Returns the updated transaction, or `None` if there is no transaction with `id`.
    pub async fn update(
        &mut self,
        id: TransactionId,
        updates: TransactionUpdates,
    ) -> Res<Option<Transaction>> {
        let Some(transaction) = self.transactions.iter_mut().find(|t| t.id == id) else {
            debug!("No transaction with id {id}, nothing to update");
            return Ok(None);
        };
        transaction.apply(updates);
        let updated = transaction.clone();
        self.persist().await?;
        debug!("Updated transaction {id}");
        Ok(Some(updated))
    }

    /// Removes the transaction with `id` and persists.
    ///
    /// Returns the removed transaction, or `None` if there is no transaction with `id`.
    pub async fn delete(&mut self, id: TransactionId) -> Res<Option<Transaction>> {
        let Some(ix) = self.transactions.iter().position(|t| t.id == id) else {
            debug!("No transaction with id {id}, nothing to delete");
            return Ok(None);
        };
        let removed = self.transactions.remove(ix);
        self.persist().await?;
        debug!("Deleted transaction {id}");
        Ok(Some(removed))
    }

    /// Sets the category of the transaction with `id`. Same semantics as `update`.
    pub async fn replace_category(
        &mut self,
        id: TransactionId,
        category: Category,
    ) -> Res<Option<Transaction>> {
        let updates = TransactionUpdates {
            category: Some(category),
            ..Default::default()
        };
        self.update(id, updates).await
    }

    /// Returns the transactions selected by `policy`, most recent first.
    pub fn context_window(&self, policy: ContextPolicy) -> Vec<Transaction> {
        let mut recent = self.transactions.clone();
        recent.sort_by(newest_first);
        recent.truncate(policy.size());
        recent
    }

    /// Timestamp-derived, but never reuses or goes below an existing `id`.
    fn next_id(&self) -> Res<TransactionId> {
        let now = self.clock.now_millis();
        match self.transactions.iter().map(|t| t.id).max() {
            Some(max) if max >= now => max
                .checked_add(1)
                .with_context(|| format!("No ID is available after the largest stored ID {max}")),
            _ => Ok(now),
        }
    }

    async fn persist(&self) -> Res<()> {
        let json = serde_json::to_string_pretty(&self.transactions)
            .context("Unable to serialize the ledger")?;
        self.storage
            .write(&json)
            .await
            .context("Unable to write the ledger to storage")
    }
}

/// Parses the stored ledger. Anything that is not a JSON array of transactions yields an empty
/// ledger.
fn parse_transactions(contents: &str) -> Vec<Transaction> {
    if contents.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<Transaction>>(contents) {
        Ok(transactions) => transactions,
        Err(e) => {
            warn!("The stored ledger is not valid and will be ignored: {e}");
            Vec::new()
        }
    }
}
