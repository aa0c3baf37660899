//! Minimal markdown-to-HTML conversion for the LLM report.
//!
//! Supports headings (`#`, `##`, `###`), `**bold**`, `*italic*`, blank-line breaks and
//! `* ` bullets. Source text is HTML-escaped before any rule runs, so the output never
//! contains markup that was not produced by one of the rules below.

use regex::Regex;
use std::sync::LazyLock;

// Applied in order. Heading rules run longest-prefix first. CRLF mode keeps `\r` out of
// `$` and `.` so Windows line endings render like bare `\n`.
static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?miR)^### (.*)$", "<h3>${1}</h3>"),
        (r"(?miR)^## (.*)$", "<h2>${1}</h2>"),
        (r"(?miR)^# (.*)$", "<h1>${1}</h1>"),
        (r"(?iR)\*\*(.*?)\*\*", "<strong>${1}</strong>"),
        (r"(?iR)\*(.*?)\*", "<em>${1}</em>"),
        (r"\n\n", "<br/><br/>"),
        (r"\n\* ", "<br/>• "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("markdown rule regex"),
            replacement,
        )
    })
    .collect()
});

pub fn render(markdown: &str) -> String {
    let mut html = escape_html(markdown);
    for (re, replacement) in RULES.iter() {
        html = re.replace_all(&html, *replacement).into_owned();
    }
    html
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
