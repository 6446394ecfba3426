use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const SEPARATOR: &str = "-";

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_]").unwrap());
static HYPHENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// Builds the branch name for an issue: `title-issue_id`, lowercased, ASCII
/// only, words joined by single hyphens.
///
/// The result is empty when neither the title nor the id has a single letter
/// or digit; callers must not create a branch from it.
pub fn slugify(title: &str, issue_id: &str) -> String {
    let joined = format!("{}{}{}", title, SEPARATOR, issue_id);
    let ascii = transliterate(joined.trim()).to_lowercase();

    let underscored = WHITESPACE.replace_all(&ascii, "_").replace('-', "_");
    let underscored = UNDERSCORES.replace_all(&underscored, "_");
    let cleaned = DISALLOWED.replace_all(&underscored, "");

    // Removing symbol-only words above can leave doubled or edge underscores.
    let hyphenated = cleaned.replace('_', "-");
    HYPHENS
        .replace_all(&hyphenated, "-")
        .trim_matches('-')
        .to_string()
}

/// NFKD decomposition with combining marks dropped, plus the Latin letters
/// that have no decomposition. Characters outside both stay untouched.
fn transliterate(text: &str) -> String {
    let mut ascii = String::with_capacity(text.len());

    for c in text.nfkd().filter(|c| !is_combining_mark(*c)) {
        match fold_letter(c) {
            Some(folded) => ascii.push_str(folded),
            None => ascii.push(c),
        }
    }

    ascii
}

fn fold_letter(c: char) -> Option<&'static str> {
    let folded = match c {
        'ß' => "ss",
        'ẞ' => "SS",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'ø' => "o",
        'Ø' => "O",
        'đ' | 'ð' => "d",
        'Đ' | 'Ð' => "D",
        'ł' => "l",
        'Ł' => "L",
        'þ' => "th",
        'Þ' => "TH",
        'ı' => "i",
        _ => return None,
    };
    Some(folded)
}
