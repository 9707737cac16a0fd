/// Normalization applied to raw email text before vectorization in the
/// command-line harnesses.
use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder substituted for every URL-like token
pub const URL_PLACEHOLDER: &str = "url_link";

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"http\S+|www\S+|https\S+").expect("valid URL regex"));

/// Flatten control whitespace, mask URLs, lower-case and collapse spaces.
///
/// Lower-casing happens before URL masking so that `HTTP://...` is masked on
/// the first pass; this keeps the function idempotent.
pub fn clean_email_text(text: &str) -> String {
    let flattened = text.replace(['\n', '\r', '\t'], " ").to_lowercase();
    let masked = URL_RE.replace_all(&flattened, URL_PLACEHOLDER);
    masked.split_whitespace().collect::<Vec<_>>().join(" ")
}
