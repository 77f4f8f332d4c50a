use crate::model::{Amount, Category};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Transactions are identified by a millisecond timestamp taken when they were created.
pub type TransactionId = i64;

/// Whether money went out or came in.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[default]
    Expense,
    Revenue,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// A single entry in the ledger.
///
/// On disk this looks like:
/// ```json
/// {
///   "id": 1704844800000,
///   "type": "expense",
///   "label": "Coffee",
///   "amount": "3.50",
///   "date": "2024-01-05T00:00:00Z",
///   "notes": "",
///   "category": { "name": "Café", "icon": "☕" }
/// }
/// ```
/// The `category` key is omitted until the transaction has been categorized.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub(crate) id: TransactionId,
    #[serde(rename = "type")]
    pub(crate) transaction_type: TransactionType,
    pub(crate) label: String,
    pub(crate) amount: Amount,
    pub(crate) date: DateTime<Utc>,
    #[serde(default)]
    pub(crate) notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) category: Option<Category>,
}

impl Transaction {
    pub(crate) fn from_draft(id: TransactionId, draft: Draft) -> Self {
        Self {
            id,
            transaction_type: draft.transaction_type,
            label: draft.label,
            amount: draft.amount,
            date: draft.date,
            notes: draft.notes,
            category: draft.category,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    /// Replaces each field that is `Some` in `updates` and leaves the rest alone.
    pub(crate) fn apply(&mut self, updates: TransactionUpdates) {
        let TransactionUpdates {
            transaction_type,
            label,
            amount,
            date,
            notes,
            category,
        } = updates;
        if let Some(v) = transaction_type {
            self.transaction_type = v;
        }
        if let Some(v) = label {
            self.label = v;
        }
        if let Some(v) = amount {
            self.amount = v;
        }
        if let Some(v) = date {
            self.date = v;
        }
        if let Some(v) = notes {
            self.notes = v;
        }
        if let Some(v) = category {
            self.category = Some(v);
        }
    }
}

/// Orders transactions newest first. Equal dates fall back to the larger (more recently
/// assigned) `id`, so the order is deterministic.
pub fn newest_first(a: &Transaction, b: &Transaction) -> Ordering {
    b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id))
}

/// The fields of a transaction before it has been given an `id`.
///
/// The ledger does not validate a draft; a non-empty label is the caller's responsibility.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub label: String,
    pub amount: Amount,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Draft {
    pub fn new(
        transaction_type: TransactionType,
        label: impl Into<String>,
        amount: impl Into<Amount>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_type,
            label: label.into(),
            amount: amount.into(),
            date,
            notes: String::new(),
            category: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// A partial update to a transaction. Fields that are `None` are left unchanged.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionUpdates {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl TransactionUpdates {
    /// Returns `true` when the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self == &TransactionUpdates::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn coffee() -> Transaction {
        let draft = Draft::new(
            TransactionType::Expense,
            "Coffee",
            Decimal::new(350, 2),
            Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
        );
        Transaction::from_draft(1, draft)
    }

    #[test]
    fn test_transaction_type_strings() {
        assert_eq!(TransactionType::Expense.to_string(), "expense");
        assert_eq!(
            "revenue".parse::<TransactionType>().unwrap(),
            TransactionType::Revenue
        );
        assert!("refund".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_apply_changes_only_given_fields() {
        let mut t = coffee();
        let before = t.clone();
        t.apply(TransactionUpdates {
            notes: Some("morning".to_string()),
            ..Default::default()
        });
        assert_eq!(t.notes(), "morning");
        assert_eq!(t.amount(), before.amount());
        assert_eq!(t.label(), before.label());
        assert_eq!(t.date(), before.date());
        assert_eq!(t.transaction_type(), before.transaction_type());
        assert!(t.category().is_none());
    }

    #[test]
    fn test_updates_is_empty() {
        assert!(TransactionUpdates::default().is_empty());
        let updates = TransactionUpdates {
            label: Some(String::new()),
            ..Default::default()
        };
        assert!(!updates.is_empty());
    }

    #[test]
    fn test_serialization_omits_missing_category() {
        let json = serde_json::to_value(coffee()).unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["date"], "2024-01-05T00:00:00Z");
        assert_eq!(json["amount"], "3.50");
        assert!(json.get("category").is_none());
    }

    #[test]
    fn test_deserialize_browser_style_record() {
        // Millisecond timestamps with a trailing Z, and no notes key.
        let json = r#"{
            "id": 1704844800000,
            "type": "revenue",
            "label": "Salary",
            "amount": 2000,
            "date": "2024-01-10T00:00:00.000Z",
            "category": { "name": "Salaire", "icon": "💶" }
        }"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.id(), 1704844800000);
        assert_eq!(t.transaction_type(), TransactionType::Revenue);
        assert_eq!(t.notes(), "");
        assert_eq!(
            t.date(),
            Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
        );
        assert_eq!(t.category().unwrap().name(), "Salaire");
    }

    #[test]
    fn test_newest_first_tie_breaks_on_id() {
        let a = coffee();
        let mut b = coffee();
        b.id = 2;
        assert_eq!(newest_first(&a, &b), Ordering::Greater);
        assert_eq!(newest_first(&b, &a), Ordering::Less);
    }
}
