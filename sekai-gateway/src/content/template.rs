//! `{{name}}` substitution for prompt bodies.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::ContentError;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("valid regex"));

pub type TemplateVars = HashMap<String, String>;

pub fn vars_from_pairs(pairs: &[(&str, &str)]) -> TemplateVars {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

/// Substitute `{{name}}` placeholders. Every placeholder must have a value,
/// and text between placeholders may not contain a stray `{{`.
pub fn render_template(template: &str, vars: &TemplateVars) -> Result<String, ContentError> {
    let mut out = String::with_capacity(template.len() + 32);
    let mut literal_start = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let placeholder = caps.get_match();
        push_literal(&mut out, &template[literal_start..placeholder.start()])?;

        let name = caps[1].trim();
        if name.is_empty() {
            return Err(ContentError::TemplateParse(format!(
                "empty placeholder at byte {}",
                placeholder.start()
            )));
        }
        let value = vars
            .get(name)
            .ok_or_else(|| ContentError::MissingVar(name.to_string()))?;
        out.push_str(value);
        literal_start = placeholder.end();
    }

    push_literal(&mut out, &template[literal_start..])?;
    Ok(out)
}

fn push_literal(out: &mut String, text: &str) -> Result<(), ContentError> {
    if text.contains("{{") {
        return Err(ContentError::TemplateParse(
            "unclosed {{ in template".to_string(),
        ));
    }
    out.push_str(text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_and_trims_names() {
        let vars = vars_from_pairs(&[("title", "Today's small talk")]);
        let out = render_template("**{{ title }}**\nnext", &vars).unwrap();
        assert_eq!(out, "**Today's small talk**\nnext");
    }

    #[test]
    fn missing_and_malformed_placeholders_fail() {
        let vars = TemplateVars::new();
        assert!(matches!(
            render_template("{{title}}", &vars),
            Err(ContentError::MissingVar(name)) if name == "title"
        ));
        assert!(matches!(
            render_template("{{title", &vars),
            Err(ContentError::TemplateParse(_))
        ));
        assert!(matches!(
            render_template("{{ }}", &vars),
            Err(ContentError::TemplateParse(_))
        ));
    }

    #[test]
    fn repeated_placeholders_and_lone_braces() {
        let vars = vars_from_pairs(&[("lang", "JP")]);
        let out = render_template("{{lang}} / {{lang}} }} {", &vars).unwrap();
        assert_eq!(out, "JP / JP }} {");
        assert!(matches!(
            render_template("{{lang}} then {{ oops", &vars),
            Err(ContentError::TemplateParse(_))
        ));
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let text = "JP: ___ に行きたい";
        assert_eq!(render_template(text, &TemplateVars::new()).unwrap(), text);
    }
}
