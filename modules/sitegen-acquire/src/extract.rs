// Last-resort text extraction from raw HTML, used when the primary scraper
// times out.

use std::sync::LazyLock;

use regex::Regex;

/// Upper bound on extracted body text, in characters.
pub const MAX_FALLBACK_CHARS: usize = 5000;

const UNTITLED: &str = "Untitled";

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").expect("valid regex"));
static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+name\s*=\s*["']description["']\s+content\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>"#)
        .expect("valid regex")
});
static BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body[^>]*>(.*?)</body>").expect("valid regex"));
static NON_CONTENT_RES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    ["script", "style", "nav", "footer"]
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}[^>]*>.*?</{tag}>")).expect("valid regex"))
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

/// Title, description and readable text pulled from a raw HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,
    pub description: String,
    pub text: String,
}

pub fn extract_page(html: &str) -> ExtractedPage {
    ExtractedPage {
        title: extract_title(html).unwrap_or_else(|| UNTITLED.to_string()),
        description: extract_description(html).unwrap_or_default(),
        text: truncate_chars(&extract_body_text(html), MAX_FALLBACK_CHARS),
    }
}

fn extract_title(html: &str) -> Option<String> {
    TITLE_RE.captures(html).map(|c| c[1].to_string())
}

fn extract_description(html: &str) -> Option<String> {
    let caps = DESCRIPTION_RE.captures(html)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Body text with non-content blocks and tags stripped, blank lines collapsed
/// and the common entities decoded. Falls back to the whole document when
/// there is no `<body>`.
fn extract_body_text(html: &str) -> String {
    let body = BODY_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map_or(html, |m| m.as_str());

    let mut cleaned = body.to_string();
    for re in NON_CONTENT_RES.iter() {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }
    let cleaned = TAG_RE.replace_all(&cleaned, "\n");
    let cleaned = BLANK_LINES_RE.replace_all(&cleaned, "\n");

    decode_entities(&cleaned).trim().to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
}

pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
