//! Delete command handler.

use crate::args::IdArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Transaction;
use crate::{Config, Result};

/// Deletes the transaction with `args.id`. Deleting an ID that does not exist is not an error, so
/// running the command twice has the same effect as running it once.
pub async fn delete(config: Config, args: IdArgs) -> Result<Out<Option<Transaction>>> {
    let mut ledger = config.ledger().await.pub_result(ErrorType::Storage)?;
    let deleted = ledger
        .delete(args.id)
        .await
        .pub_result(ErrorType::Storage)?;
    let message = match &deleted {
        Some(t) => format!("Deleted transaction {} ({})", args.id, t.label()),
        None => format!("No transaction with ID {}, nothing was deleted", args.id),
    };
    Ok(Out::new(message, deleted))
}
