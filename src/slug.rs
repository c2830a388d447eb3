use once_cell::sync::Lazy;
use regex::Regex;

static RE_DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_\s-]").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_HYPHENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").unwrap());

/// Turn a title into the file name / URL segment a post is stored under.
///
/// The result only ever contains `[a-z0-9_-]`, never starts or ends with a
/// hyphen and never holds two in a row. Titles made only of punctuation (or
/// non-ASCII text) yield an empty string.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let kept = RE_DISALLOWED.replace_all(&lower, "");
    let hyphenated = RE_WHITESPACE.replace_all(&kept, "-");
    let collapsed = RE_HYPHENS.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(slug: &str) {
        assert!(
            slug.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'),
            "bad char in {slug:?}"
        );
        assert!(!slug.starts_with('-') && !slug.ends_with('-'), "{slug:?}");
        assert!(!slug.contains("--"), "{slug:?}");
    }

    #[test]
    fn test_basic_title() {
        assert_eq!(
            slugify("Critical Zero-Day Exploit Hits Routers"),
            "critical-zero-day-exploit-hits-routers"
        );
    }

    #[test]
    fn test_punctuation_and_spacing() {
        assert_eq!(slugify("  Apple's  new M4 -- chip!  "), "apples-new-m4-chip");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
        assert_eq!(slugify("tab\tand\nnewline"), "tab-and-newline");
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("?!... --- ***"), "");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn test_non_ascii_letters_are_dropped() {
        let slug = slugify("Café Über Straße — résumé");
        assert_eq!(slug, "caf-ber-strae-rsum");
        assert_well_formed(&slug);
    }

    #[test]
    fn test_output_always_well_formed() {
        let titles = [
            "-leading and trailing-",
            "Multiple   ---   separators",
            "Ünïcödé & symbols © 2024",
            "UPPER lower MiXeD",
            "a-b - c",
            " ",
        ];
        for title in titles {
            assert_well_formed(&slugify(title));
        }
    }

    #[test]
    fn test_deterministic() {
        let title = "Same Title, Same Slug";
        assert_eq!(slugify(title), slugify(title));
    }
}
