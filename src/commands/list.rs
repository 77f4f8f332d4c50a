use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Transaction;
use crate::{Config, Result};
use std::fmt::Write;

/// Lists all transactions in ledger order. The message holds one line per transaction.
pub async fn list(config: Config) -> Result<Out<Vec<Transaction>>> {
    let ledger = config.ledger().await.pub_result(ErrorType::Storage)?;
    let transactions = ledger.transactions().to_vec();
    if transactions.is_empty() {
        return Ok(Out::new("The ledger is empty", transactions));
    }

    let mut message = format!(
        "{} transaction{}:",
        transactions.len(),
        if transactions.len() == 1 { "" } else { "s" }
    );
    for t in &transactions {
        let _ = write!(message, "\n{}", render(t));
    }
    Ok(Out::new(message, transactions))
}

fn render(t: &Transaction) -> String {
    let mut line = format!(
        "{:>14}  {}  {:<7}  {:>12}  {}",
        t.id(),
        t.date().format("%Y-%m-%d"),
        t.transaction_type().to_string(),
        t.amount().to_string(),
        t.label()
    );
    if let Some(category) = t.category() {
        let _ = write!(line, "  [{category}]");
    }
    if !t.notes().is_empty() {
        let _ = write!(line, "  ({})", t.notes());
    }
    line
}
