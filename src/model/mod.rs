//! Types that represent the core data model, such as `Transaction` and `Category`.
mod amount;
mod category;
mod transaction;

pub use amount::{Amount, AmountError};
pub use category::Category;
pub use transaction::{
    newest_first, Draft, Transaction, TransactionId, TransactionType, TransactionUpdates,
};
