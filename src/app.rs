//! The application controller. It owns the ledger and runs categorization against it.

use crate::categorize::Categorizer;
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{Transaction, TransactionId};
use crate::store::{ContextPolicy, Ledger};
use crate::Result;
use anyhow::anyhow;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Where a transaction's categorization stands. A request that is still in flight is `Pending`;
/// one that failed stays `Failed` until the next attempt.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "message")]
pub enum CategorizationStatus {
    #[default]
    Idle,
    Pending,
    Failed(String),
}

/// Owns the ledger behind a shared handle, so anything that renders or edits the ledger can hold
/// it, and categorizes transactions against it.
pub struct App<C> {
    ledger: Arc<Mutex<Ledger>>,
    categorizer: C,
    policy: ContextPolicy,
    // Locked before `ledger` when both are held.
    statuses: Mutex<HashMap<TransactionId, CategorizationStatus>>,
}

impl<C> App<C>
where
    C: Categorizer,
{
    pub fn new(ledger: Ledger, categorizer: C, policy: ContextPolicy) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            categorizer,
            policy,
            statuses: Mutex::new(HashMap::new()),
        }
    }

    /// A handle to the ledger. Lock it to read or mutate.
    pub fn ledger(&self) -> Arc<Mutex<Ledger>> {
        self.ledger.clone()
    }

    /// The categorization status of `id`. A transaction that no longer exists is always `Idle`.
    pub async fn status(&self, id: TransactionId) -> CategorizationStatus {
        let mut statuses = self.statuses.lock().await;
        if self.ledger.lock().await.get(id).is_none() {
            statuses.remove(&id);
            return CategorizationStatus::Idle;
        }
        statuses.get(&id).cloned().unwrap_or_default()
    }

    /// Asks the categorizer for a category and writes it onto the transaction with `id`.
    ///
    /// The ledger is not locked while waiting on the categorizer, so other transactions can be
    /// edited meanwhile. If the transaction is deleted before the answer arrives, the answer is
    /// dropped and `Ok(None)` is returned.
    ///
    /// # Errors
    /// - `ErrorType::NotFound` if there is no transaction with `id`.
    /// - `ErrorType::Categorization` if the categorizer fails. The transaction is left untouched.
    /// - `ErrorType::Storage` if the result cannot be persisted.
    pub async fn categorize(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let (target, context) = {
            let ledger = self.ledger.lock().await;
            let target = ledger.get(id).cloned().ok_or_else(|| {
                Error::new(ErrorType::NotFound, anyhow!("No transaction with ID {id}"))
            })?;
            (target, ledger.context_window(self.policy))
        };

        self.set_status(id, CategorizationStatus::Pending).await;
        let category = match self.categorizer.categorize(&target, &context).await {
            Ok(category) => category,
            Err(e) => {
                warn!("Unable to categorize transaction {id}: {e}");
                self.set_status(id, CategorizationStatus::Failed(e.to_string()))
                    .await;
                return Err(Error::new(ErrorType::Categorization, e));
            }
        };

        let result = self
            .ledger
            .lock()
            .await
            .replace_category(id, category)
            .await;
        let updated = match result {
            Ok(updated) => updated,
            Err(e) => {
                warn!("Unable to store the category of transaction {id}: {e:#}");
                self.set_status(id, CategorizationStatus::Failed(format!("{e:#}")))
                    .await;
                return Err(e).pub_result(ErrorType::Storage);
            }
        };
        self.set_status(id, CategorizationStatus::Idle).await;
        match &updated {
            Some(t) => {
                if let Some(category) = t.category() {
                    info!("Transaction {id} categorized as {category}");
                }
            }
            None => debug!("Transaction {id} was deleted before its category arrived"),
        }
        Ok(updated)
    }

    /// Records `status` for `id` and drops entries for transactions that have been deleted.
    async fn set_status(&self, id: TransactionId, status: CategorizationStatus) {
        let mut statuses = self.statuses.lock().await;
        if status == CategorizationStatus::Idle {
            statuses.remove(&id);
        } else {
            statuses.insert(id, status);
        }
        let ledger = self.ledger.lock().await;
        statuses.retain(|id, _| ledger.get(*id).is_some());
    }
}
