use crate::app::App;
use crate::args::IdArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Transaction;
use crate::{Config, Result};

/// Asks the configured inference service for a category and stores it on the transaction.
///
/// # Errors
/// - `ErrorType::NotFound` if there is no transaction with `args.id`.
/// - `ErrorType::Categorization` if the service is unreachable, answers with an error status, or
///   answers with something that is not a category. The transaction is left unchanged.
/// - `ErrorType::Storage` if the ledger cannot be read or written.
pub async fn categorize(config: Config, args: IdArgs) -> Result<Out<Option<Transaction>>> {
    let ledger = config.ledger().await.pub_result(ErrorType::Storage)?;
    let categorizer = config
        .categorizer()
        .pub_result(ErrorType::Categorization)?;
    let app = App::new(ledger, categorizer, config.context_policy());

    let updated = app.categorize(args.id).await?;
    let message = match updated.as_ref().and_then(|t| t.category()) {
        Some(category) => format!("Transaction {} is now categorized as {category}", args.id),
        None => format!(
            "Transaction {} was deleted before its category arrived",
            args.id
        ),
    };
    Ok(Out::new(message, updated))
}
