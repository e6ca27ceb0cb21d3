// Shared prompt fragments.
// Each feature module that calls the LLM keeps its own prompts.rs alongside it;
// this file holds only the cross-cutting pieces.

/// System prompt suffix that enforces JSON-only output.
pub const JSON_ONLY_RULES: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that rewrites or drafts resume content.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Only use facts present in the material provided. \
    Do NOT invent employers, titles, dates, degrees, certifications or metrics. \
    If a metric is not given, describe the impact qualitatively instead of guessing a number.";

/// Builds a system prompt from a role description plus the JSON-only rules.
pub fn json_system(role: &str) -> String {
    format!("{role} {JSON_ONLY_RULES}")
}

/// Fills `{name}` placeholders in a single pass. Substituted text is never
/// rescanned, and braces with no matching name (JSON schemas) are kept.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let filled = after.find('}').and_then(|close| {
            values
                .iter()
                .find(|(name, _)| *name == &after[..close])
                .map(|(_, value)| (*value, close))
        });
        match filled {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
