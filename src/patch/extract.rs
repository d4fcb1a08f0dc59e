use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Extraction tiers only accept a candidate longer than this after trimming,
/// counted in characters; anything shorter is likelier a fragment than a
/// whole replacement.
const MIN_REPLACEMENT_LEN: usize = 50;

/// Tagged block with an optional language hint on the fence line.
static TAGGED_HINTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)CORRECTED_CODE:\s*```[a-zA-Z]*\s*\n([\s\S]*?)```").unwrap()
});

/// Tagged block, any fence content up to the first newline discarded.
static TAGGED_ANY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)CORRECTED_CODE:\s*```[\s\S]*?\n([\s\S]*?)```").unwrap());

/// First fenced block anywhere in the text.
static ANY_FENCED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[\s\S]*?\n([\s\S]*?)```").unwrap());

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)//.*$").unwrap());
static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\*[\s\S]*?\*/").unwrap());

/// Pulls the replacement code out of free-form advisory text.
///
/// Tries the extraction tiers in priority order and accepts the first
/// candidate whose trimmed length exceeds 50 characters: a
/// `CORRECTED_CODE:`-tagged fenced block with a language hint, a tagged
/// fenced block of any shape, then the first fenced block anywhere. When no
/// tier qualifies, a tagged block still wins even when short (the tag is an
/// explicit signal that its content is the whole replacement), and otherwise
/// the trimmed advisory text itself is used. The function is total: it
/// returns a non-empty string for any non-empty input.
///
/// The selected text is passed through blunt comment stripping. The scan is
/// not string-literal aware, so literals that look like comments can lose
/// content; callers accepting that trade-off is part of this contract.
pub fn extract_replacement(advisory: &str) -> String {
    let mut replacement = String::new();

    for (tier, pattern) in [&*TAGGED_HINTED, &*TAGGED_ANY, &*ANY_FENCED]
        .into_iter()
        .enumerate()
    {
        if let Some(captures) = pattern.captures(advisory) {
            let candidate = captures[1].trim();
            if candidate.chars().count() > MIN_REPLACEMENT_LEN {
                debug!(tier, len = candidate.len(), "extracted fenced replacement");
                replacement = candidate.to_string();
                break;
            }
        }
    }

    if replacement.chars().count() < MIN_REPLACEMENT_LEN {
        // A tagged block under the threshold is still the replacement; the
        // tag is explicit even when the code is a one-liner.
        if let Some(captures) = TAGGED_ANY.captures(advisory) {
            let candidate = captures[1].trim();
            if !candidate.is_empty() {
                replacement = candidate.to_string();
            }
        }
    }

    // Last tier: the advisory text itself, even when short.
    if replacement.is_empty() {
        replacement = advisory.trim().to_string();
    }

    let stripped = strip_comments(&replacement);
    if stripped.is_empty() && !advisory.trim().is_empty() {
        // Stripping ate everything; better to splice the advisory verbatim
        // than an empty line.
        return advisory.trim().to_string();
    }
    stripped
}

/// Removes `//` trailing comments and `/* */` blocks, then trims.
fn strip_comments(code: &str) -> String {
    let without_line = LINE_COMMENT.replace_all(code, "");
    BLOCK_COMMENT.replace_all(&without_line, "").trim().to_string()
}
