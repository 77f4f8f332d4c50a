//! Update command handler.

use crate::args::UpdateArgs;
use crate::commands::Out;
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::Transaction;
use crate::{Config, Result};
use anyhow::anyhow;

/// Applies the fields given in `args` to the transaction with `args.id`. Fields that are not given
/// keep their values, and the ledger order is not changed even when the date is.
///
/// An unknown ID is not an error. Nothing is written and the message says so.
///
/// # Errors
/// - `ErrorType::Request` if no field to change was given, or the new label is blank.
/// - `ErrorType::Storage` if the ledger cannot be read or written.
pub async fn update(config: Config, args: UpdateArgs) -> Result<Out<Option<Transaction>>> {
    let updates = args.updates();
    if updates.is_empty() {
        return Err(Error::new(
            ErrorType::Request,
            anyhow!("Nothing to update, give at least one field to change"),
        ));
    }
    if updates.label.as_deref().is_some_and(|l| l.trim().is_empty()) {
        return Err(Error::new(
            ErrorType::Request,
            anyhow!("A transaction needs a non-empty label"),
        ));
    }

    let mut ledger = config.ledger().await.pub_result(ErrorType::Storage)?;
    let updated = ledger
        .update(args.id, updates)
        .await
        .pub_result(ErrorType::Storage)?;
    let message = match &updated {
        Some(_) => format!("Updated transaction {}", args.id),
        None => format!("No transaction with ID {}, nothing was updated", args.id),
    };
    Ok(Out::new(message, updated))
}
