//! form-errors probe
//!
//! Forms with required fields must expose somewhere for validation errors
//! to be announced: a live region, a known error-class container, or an
//! aria-describedby target carrying error wording.

use chromiumoxide::Page;
use url::Url;

use super::{build_finding, node_from_snippet};
use crate::browser::eval_json;
use crate::error::Result;
use crate::report::{ProbeFindings, Severity, ViolationNode};

const HELP_URL: &str = "https://www.w3.org/WAI/WCAG21/Understanding/error-identification.html";

/// Tokens that mark text as error wording, English and Czech
const ERROR_TOKENS: &[&str] = &[
    "error", "invalid", "required", "must", "chyba", "povinné", "neplatný", "vyplňte",
];

const FORM_JS: &str = r#"
(() => {
    const errorTokens = %TOKENS%;
    const errorSelectors =
        '[role="alert"], [aria-live], .error, .error-message, .validation-error, .form-error';
    const failing = [];
    document.querySelectorAll('form').forEach((form, index) => {
        const required = form.querySelectorAll('[required], [aria-required="true"]');
        if (required.length === 0) return;

        if (form.querySelector(errorSelectors)) return;

        let described = false;
        form.querySelectorAll('[aria-describedby]').forEach(field => {
            for (const id of (field.getAttribute('aria-describedby') || '').split(/\s+/)) {
                const target = document.getElementById(id);
                if (!target) continue;
                const text = (target.textContent || '').toLowerCase();
                if (errorTokens.some(t => text.includes(t))) described = true;
            }
        });
        if (described) return;

        let selector = 'form';
        if (form.id) selector = 'form#' + form.id;
        else if (form.name) selector = 'form[name="' + form.name + '"]';
        else selector = 'form:nth-of-type(' + (index + 1) + ')';
        failing.push({
            selector,
            html: form.outerHTML.slice(0, 300),
            requiredCount: required.length
        });
    });
    return JSON.stringify(failing);
})()
"#;

/// Run the form-errors probe
pub async fn check(page: &Page, url: &Url) -> Result<Option<ProbeFindings>> {
    let js = FORM_JS.replace("%TOKENS%", &serde_json::to_string(ERROR_TOKENS)?);
    let raw = eval_json(page, &js).await?;
    let Some(forms) = raw.as_array() else {
        return Ok(None);
    };
    if forms.is_empty() {
        return Ok(None);
    }

    let nodes: Vec<ViolationNode> = forms
        .iter()
        .map(|form| {
            node_from_snippet(
                form["html"].as_str().unwrap_or("<form>"),
                form["selector"].as_str().unwrap_or("form"),
                format!(
                    "Form with {} required field(s) exposes no error region.",
                    form["requiredCount"].as_u64().unwrap_or(0)
                ),
            )
        })
        .collect();

    Ok(Some(build_finding(
        "form-errors",
        "Forms must expose validation errors to assistive technology",
        "Without a live error region, screen-reader users never hear why a submission failed.",
        Severity::Serious,
        HELP_URL,
        nodes,
        url,
    )))
}
