use crate::model::{Region, SourceBuffer};
use tracing::debug;

/// Words that introduce a declaration in the supported languages. A line
/// qualifies as a construct start only if it also carries (or is followed by
/// a line carrying) an opening parameter-list parenthesis.
const DECLARATION_KEYWORDS: [&str; 6] = [
    "public ",
    "private ",
    "protected ",
    "void ",
    "function ",
    "def ",
];

/// Lines kept before the target when no declaration keyword is found.
const START_FALLBACK_BACKTRACK: usize = 5;

/// Lines kept after the start when opened braces never rebalance.
const END_FALLBACK_SPAN: usize = 20;

/// Bounds the construct containing `target_line` (1-based) with line-level
/// heuristics only.
///
/// The start is the nearest line at or before the target that carries a
/// declaration keyword next to a parameter list; without one, the region
/// starts five lines before the target. The end is found by running a brace
/// balance forward from the start until it returns to zero. A region with no
/// braces at all is taken to be a single statement and ends at its start; a
/// region whose braces never rebalance is capped at twenty lines past the
/// start.
///
/// Total: the returned region is always in-bounds for a non-empty buffer.
/// Braces inside strings or comments are counted like structural braces, and
/// the backward keyword scan is unbounded up to the buffer start.
pub fn locate_region(buffer: &SourceBuffer, target_line: usize) -> Region {
    let last = buffer.len().saturating_sub(1);
    let target = target_line.saturating_sub(1).min(last);

    let start = find_start(buffer, target);
    let end = find_end(buffer, start, last);

    let region = Region::new(start, end);
    debug!(target_line, %region, "located replacement region");
    region
}

fn find_start(buffer: &SourceBuffer, target: usize) -> usize {
    for i in (0..=target).rev() {
        let line = &buffer.lines()[i];
        if !DECLARATION_KEYWORDS.iter().any(|kw| line.contains(kw)) {
            continue;
        }
        let next_has_params = buffer.line(i + 1).map_or(false, |next| next.contains('('));
        if line.contains('(') || next_has_params {
            return i;
        }
    }
    target.saturating_sub(START_FALLBACK_BACKTRACK)
}

fn find_end(buffer: &SourceBuffer, start: usize, last: usize) -> usize {
    let mut balance: i64 = 0;
    let mut seen_brace = false;

    for i in start..=last {
        let line = &buffer.lines()[i];
        let opens = line.matches('{').count() as i64;
        let closes = line.matches('}').count() as i64;
        if opens > 0 || closes > 0 {
            seen_brace = true;
        }
        balance += opens - closes;

        if seen_brace && balance == 0 && i > start {
            return i;
        }
    }

    if seen_brace {
        // Opened braces never rebalanced before the buffer ended.
        (start + END_FALLBACK_SPAN).min(last)
    } else {
        // No braces anywhere: a single brace-less statement.
        start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(lines: &[&str]) -> SourceBuffer {
        SourceBuffer::from_lines(lines.iter().map(|l| l.to_string()).collect())
    }

    fn net_balance(buffer: &SourceBuffer, region: Region) -> i64 {
        buffer.lines()[region.start..=region.end]
            .iter()
            .map(|l| l.matches('{').count() as i64 - l.matches('}').count() as i64)
            .sum()
    }

    #[test]
    fn test_finds_enclosing_java_method() {
        let buf = buffer(&[
            "class UserDao {",
            "    public User find(String id) {",
            "        String q = \"SELECT * FROM users WHERE id = \" + id;",
            "        return run(q);",
            "    }",
            "}",
        ]);

        // vulnerability on line 3, inside find()
        let region = locate_region(&buf, 3);
        assert_eq!(region, Region::new(1, 4));
        assert_eq!(net_balance(&buf, region), 0);
    }

    #[test]
    fn test_keyword_on_target_line_itself() {
        let buf = buffer(&[
            "const a = 1;",
            "function handler(req, res) {",
            "    res.send(eval(req.query.code));",
            "}",
        ]);

        let region = locate_region(&buf, 2);
        assert_eq!(region, Region::new(1, 3));
    }

    #[test]
    fn test_parameter_list_on_following_line() {
        let buf = buffer(&[
            "public static void",
            "process(String input) {",
            "    exec(input);",
            "}",
        ]);

        let region = locate_region(&buf, 3);
        assert_eq!(region.start, 0);
        assert_eq!(region.end, 3);
    }

    #[test]
    fn test_keyword_without_parens_does_not_start_region() {
        // "void " appears in a comment-like line with no parameter list; the
        // scan keeps walking back and then falls back to the 5-line buffer.
        let buf = buffer(&[
            "x = 1",
            "y = 2",
            "the void is vast",
            "z = 3",
            "a = 4",
            "b = 5",
            "c = 6",
            "d = 7",
            "target = 8",
            "e = 9",
        ]);

        let region = locate_region(&buf, 9);
        assert_eq!(region.start, 3); // 8 (0-based target) - 5
    }

    #[test]
    fn test_start_fallback_at_buffer_top() {
        // Vulnerability at line 1 with no declaration keyword anywhere
        // before it: max(0, 0 - 5) pins the start to the first line.
        let buf = buffer(&["evil()", "x = 1", "y = 2"]);
        let region = locate_region(&buf, 1);
        assert_eq!(region.start, 0);
    }

    #[test]
    fn test_braceless_statement_is_single_line_region() {
        let mut lines = vec!["x = 1"; 10];
        lines[4] = "private void legacyCall(request);";
        let buf = buffer(&lines);

        let region = locate_region(&buf, 5);
        assert_eq!(region, Region::new(4, 4));
    }

    #[test]
    fn test_unbalanced_braces_cap_at_twenty_lines() {
        // 30 lines; the construct at index 2 opens a brace that never
        // closes, so the end is capped at 2 + 20.
        let mut lines = vec!["filler();"; 30];
        lines[2] = "function broken(a, b) {";
        lines[3] = "    if (a) {";
        let buf = buffer(&lines);

        let region = locate_region(&buf, 4);
        assert_eq!(region.start, 2);
        assert_eq!(region.end, 22);
    }

    #[test]
    fn test_unbalanced_cap_clamps_to_buffer_end() {
        let mut lines = vec!["filler();"; 10];
        lines[2] = "function broken() {";
        let buf = buffer(&lines);

        let region = locate_region(&buf, 4);
        assert_eq!(region.end, 9);
    }

    #[test]
    fn test_target_beyond_buffer_is_clamped() {
        let buf = buffer(&["function f() {", "    g();", "}"]);
        let region = locate_region(&buf, 99);
        assert_eq!(region, Region::new(0, 2));
    }

    #[test]
    fn test_balanced_region_spans_target() {
        let buf = buffer(&[
            "def outer():",
            "    pass",
            "",
            "function target(a) {",
            "    inner = {",
            "        key: value,",
            "    };",
            "    sink(a);",
            "}",
            "trailing();",
        ]);

        let target_line = 8; // sink(a)
        let region = locate_region(&buf, target_line);
        assert!(region.start <= target_line - 1);
        assert!(region.end >= target_line - 1);
        assert_eq!(net_balance(&buf, region), 0);
    }
}
