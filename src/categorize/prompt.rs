use crate::model::Transaction;

/// Builds the instruction sent to the model. Both the target transaction and the context window
/// are embedded as JSON so the model sees exactly what is stored.
pub fn build_prompt(
    transaction: &Transaction,
    context: &[Transaction],
) -> Result<String, serde_json::Error> {
    let target = serde_json::to_string(transaction)?;
    let context_json = serde_json::to_string(context)?;
    let count = context.len();
    Ok(format!(
        "You are a tool that categorizes bank transactions. Your job is to assign a relevant \
category to a transaction given as JSON.

Assign a category to this transaction: {target}
Use everyday-life categories. Base your choice on the label, the amount, the type of the \
transaction and its notes. Give the category a fitting emoji that represents it.

Here are my {count} most recent transactions. Use them as context and reuse the same categories \
for similar transactions whenever possible: {context_json}

Reply only with JSON that can be parsed in this format: {{ \"name\": string, \"icon\": string }}, \
for example {{ \"name\": \"Groceries\", \"icon\": \"🛒\" }}"
    ))
}
