use crate::args::AddArgs;
use crate::commands::Out;
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{Draft, Transaction};
use crate::{Config, Result};
use anyhow::anyhow;
use chrono::Utc;

/// Records a new transaction. The date defaults to now and the notes to an empty string.
///
/// # Errors
/// - `ErrorType::Request` if the label is blank.
/// - `ErrorType::Storage` if the ledger cannot be read or written.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<Transaction>> {
    if args.label.trim().is_empty() {
        return Err(Error::new(
            ErrorType::Request,
            anyhow!("A transaction needs a non-empty label"),
        ));
    }
    let draft = Draft::new(
        args.transaction_type,
        args.label,
        args.amount,
        args.date.unwrap_or_else(Utc::now),
    )
    .with_notes(args.notes.unwrap_or_default());

    let mut ledger = config.ledger().await.pub_result(ErrorType::Storage)?;
    let created = ledger.create(draft).await.pub_result(ErrorType::Storage)?;
    Ok(Out::new(
        format!("Added transaction {}", created.id()),
        created,
    ))
}
