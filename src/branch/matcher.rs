/// Returns the branches that mention `issue_id` as a whole token, trimmed and
/// in their original order.
///
/// The id must be delimited by non-word characters or the ends of the name,
/// so `241` does not pick up `feature-2415`. An empty id mentions nothing.
pub fn branches_for<S: AsRef<str>>(issue_id: &str, branches: &[S]) -> Vec<String> {
    if issue_id.is_empty() {
        return Vec::new();
    }

    branches
        .iter()
        .map(|branch| branch.as_ref().trim())
        .filter(|branch| mentions(branch, issue_id))
        .map(str::to_string)
        .collect()
}

// Letters, digits and `_`.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn mentions(branch: &str, issue_id: &str) -> bool {
    let mut from = 0;

    while let Some(offset) = branch[from..].find(issue_id) {
        let start = from + offset;
        let end = start + issue_id.len();

        let before = branch[..start].chars().next_back();
        let after = branch[end..].chars().next();
        if !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char) {
            return true;
        }

        // Step one character so overlapping occurrences are still tried.
        from = start + branch[start..].chars().next().map_or(1, char::len_utf8);
    }

    false
}
