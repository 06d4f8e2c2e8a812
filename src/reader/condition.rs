//! Evaluation of KV1 conditional suffixes such as `[$WIN32]` or `[!$X360 && $PS3]`.
//!
//! `&&` binds tighter than `||`. Symbols compare case-insensitively against the
//! configured condition list, which holds names without their `$`.

/// Evaluates the text between the brackets. Errors carry a description of the
/// malformed part.
pub(crate) fn evaluate(expression: &str, conditions: &[String]) -> Result<bool, String> {
    if expression.trim().is_empty() {
        return Err("empty conditional".to_string());
    }

    let mut any = false;
    for alternative in expression.split("||") {
        let mut all = true;
        for term in alternative.split("&&") {
            // every term is checked so malformed input never slips through
            let holds = evaluate_term(term, conditions)?;
            all = all && holds;
        }
        any = any || all;
    }
    Ok(any)
}

fn evaluate_term(term: &str, conditions: &[String]) -> Result<bool, String> {
    let term = term.trim();
    let (negated, rest) = match term.strip_prefix('!') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, term),
    };

    let name = rest
        .strip_prefix('$')
        .ok_or_else(|| format!("conditional term '{}' must start with '$'", term))?;

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("invalid conditional symbol '{}'", term));
    }

    let defined = conditions.iter().any(|c| c.eq_ignore_ascii_case(name));
    Ok(defined != negated)
}
