use once_cell::sync::Lazy;
use regex::Regex;

/// Macros rewritten to demo values before previewing. Anything not listed
/// here is passed through untouched.
const MACRO_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("%%CLICK_URL_UNESC%%", "https://example.com/click"),
    ("%%CLICK_URL_ESC%%", "https%3A%2F%2Fexample.com%2Fclick"),
    ("%%CACHEBUSTER%%", "123456789"),
    ("%%DEST_URL%%", "demo_value"),
    ("%%DEST_URL_ESC%%", "demo_value"),
    ("%%SESSION_ID%%", "demo_value"),
    ("%%SITE%%", "demo_value"),
    ("%%AD_ID%%", "demo_value"),
    ("%%CAMPAIGN_ID%%", "demo_value"),
    ("%%PLACEMENT_ID%%", "demo_value"),
];

static MACRO_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\[APIFRAMEWORKS\]|\[OMIDPARTNER\]|\{clickurl\}|\$\{GDPR\}|\$\{GDPR_CONSENT_755\}|\$\{ADDTL_CONSENT\}|%%CLICK_URL%%|%%CACHEBUSTER%%",
    )
    .expect("macro pattern is valid")
});

pub fn substitute_macros(text: &str) -> String {
    MACRO_SUBSTITUTIONS
        .iter()
        .fold(text.to_owned(), |out, (token, value)| out.replace(token, value))
}

/// Known macro tokens present in `text`, each reported once in the order
/// they first appear.
pub fn detect_macro_tokens(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = vec![];
    for found in MACRO_PATTERN.find_iter(text) {
        let token = found.as_str();
        if !tokens.iter().any(|seen| seen == token) {
            tokens.push(token.to_owned());
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_macros_are_left_alone() {
        let text = "a=%%UNKNOWN_TOKEN%%&cb=%%CACHEBUSTER%%";

        assert_eq!(substitute_macros(text), "a=%%UNKNOWN_TOKEN%%&cb=123456789");
    }

    #[test]
    fn click_macros_get_their_own_values() {
        let text = "%%CLICK_URL_UNESC%% %%CLICK_URL_ESC%% %%SITE%%";

        assert_eq!(
            substitute_macros(text),
            "https://example.com/click https%3A%2F%2Fexample.com%2Fclick demo_value"
        );
    }

    #[test]
    fn substitution_is_case_sensitive() {
        assert_eq!(substitute_macros("%%cachebuster%%"), "%%cachebuster%%");
    }

    #[test]
    fn detection_is_case_insensitive_and_distinct() {
        let text = "${gdpr} {clickurl} ${GDPR} [OMIDPARTNER] {ClickUrl}";

        assert_eq!(
            detect_macro_tokens(text),
            vec!["${gdpr}", "{clickurl}", "${GDPR}", "[OMIDPARTNER]", "{ClickUrl}"]
        );
    }

    #[test]
    fn repeated_tokens_are_reported_once() {
        let text = "%%CACHEBUSTER%% and %%CACHEBUSTER%% and [APIFRAMEWORKS]";

        assert_eq!(
            detect_macro_tokens(text),
            vec!["%%CACHEBUSTER%%", "[APIFRAMEWORKS]"]
        );
    }

    #[test]
    fn longer_gdpr_tokens_match_whole() {
        assert_eq!(
            detect_macro_tokens("x=${GDPR_CONSENT_755}"),
            vec!["${GDPR_CONSENT_755}"]
        );
    }
}
