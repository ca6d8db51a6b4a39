use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("valid tag pattern"));

static ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&quot;|\[.*?\]|【.*?】|「.*?」").expect("valid annotation pattern")
});

/// Normalize a headline (or description) for comparison and storage.
///
/// Removes HTML tags, `&quot;` escapes and bracketed annotations such as
/// `[속보]`, `【단독】` or `「기획」`, then trims surrounding whitespace.
/// Removing one token can expose another (`&q<b>uot;`), so the passes repeat
/// until the text stops changing, which keeps `clean` idempotent.
pub fn clean(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let without_tags = HTML_TAG.replace_all(&current, "");
        let next = ANNOTATION.replace_all(&without_tags, "").trim().to_string();
        if next == current {
            return next;
        }
        current = next;
    }
}
