//! Context assembly for the inference engine
//!
//! Renders an ingredient snapshot into the text block injected into the
//! system prompt. The rendering is deterministic for a given set of records
//! (sorted by batch, then by detail key) because the text is part of the
//! response cache fingerprint.

use foodtrace_clients::IngredientRecord;

/// Context used when the snapshot is empty or could not be fetched
pub const NO_DATA: &str = "No ingredient data available.";

/// Label placed between the instructions and the context
pub const CONTEXT_LABEL: &str = "Ingredient data:";

const SYSTEM_PROMPT: &str = "\
[Role]
You are the AI assistant of a food ingredient traceability system. Follow the rules below strictly.

[Rules]
1. Be concise: no greetings, no closing remarks. Answer with the requested information only.
2. Answer in the language of the question. Batch numbers and proper nouns from the data stay as written.
3. No emoji or emoticons.
4. Use only the ingredient data provided. If the data is insufficient, answer exactly: \"The available data cannot answer this question.\"
5. Present multiple values as an aligned bulleted list.

[Example answer]
Batch: BA20241202-002
Test result: Meets safety standards
Test details:
* pesticide: not detected
* bacteria: negative
* heavy metals: not detected

Apply these rules to every request that follows.";

/// Render records into context text, one line per record ordered by batch.
pub fn build_context(records: &[IngredientRecord]) -> String {
    if records.is_empty() {
        return NO_DATA.to_string();
    }

    let mut sorted: Vec<&IngredientRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.batch_number.cmp(&b.batch_number));

    sorted
        .into_iter()
        .map(render_record)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Single-line rendering of one record
pub fn render_record(record: &IngredientRecord) -> String {
    let mut line = format!(
        "batch: {}, name: {}, origin: {}, supplier: {}, result: {}",
        record.batch_number, record.name, record.origin, record.supplier, record.test_result
    );

    let details = record.rendered_details();
    if !details.is_empty() {
        let joined = details
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<_>>()
            .join("; ");
        line.push_str(&format!(", details: ({})", joined));
    }

    line
}

/// Fixed persona and formatting instructions
pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// Instructions followed by the labelled context
pub fn full_system_prompt(context: &str) -> String {
    format!("{}\n\n{}\n{}", system_prompt(), CONTEXT_LABEL, context)
}
