use crate::edit::EditSet;

/// Produces a unified-diff patch (3 lines of context, GNU-patch-compatible) for one file
/// by running its edit set against the file's byte contents. Line endings are preserved
/// as found in the input, per spec.md §4.1.
pub fn unified_diff(
    path: &str,
    original: &[u8],
    edits: &EditSet,
) -> Result<String, crate::edit::EditError> {
    let updated = edits.apply_to(original)?;
    let orig_lines = split_keep_endings(original);
    let new_lines = split_keep_endings(&updated);
    Ok(render_patch(path, &orig_lines, &new_lines))
}

fn split_keep_endings(bytes: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(bytes);
    let mut lines = Vec::new();
    let mut start = 0;
    let b = text.as_bytes();
    for i in 0..b.len() {
        if b[i] == b'\n' {
            lines.push(text[start..=i].to_string());
            start = i + 1;
        }
    }
    if start < text.len() {
        lines.push(text[start..].to_string());
    }
    lines
}

const CONTEXT: usize = 3;

#[derive(Clone, Copy, PartialEq)]
enum Op {
    Equal,
    Delete,
    Insert,
}

/// Each element pairs an edit-script operation with the old-line-index and/or
/// new-line-index it consumes, so hunk rendering can recover both line numbers and text.
struct Step {
    op: Op,
    old_idx: Option<usize>,
    new_idx: Option<usize>,
}

fn diff_steps(a: &[String], b: &[String]) -> Vec<Step> {
    let n = a.len();
    let m = b.len();
    let mut dp = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            dp[i][j] = if a[i] == b[j] {
                dp[i + 1][j + 1] + 1
            } else {
                dp[i + 1][j].max(dp[i][j + 1])
            };
        }
    }
    let mut steps = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);
    while i < n && j < m {
        if a[i] == b[j] {
            steps.push(Step { op: Op::Equal, old_idx: Some(i), new_idx: Some(j) });
            i += 1;
            j += 1;
        } else if dp[i + 1][j] >= dp[i][j + 1] {
            steps.push(Step { op: Op::Delete, old_idx: Some(i), new_idx: None });
            i += 1;
        } else {
            steps.push(Step { op: Op::Insert, old_idx: None, new_idx: Some(j) });
            j += 1;
        }
    }
    while i < n {
        steps.push(Step { op: Op::Delete, old_idx: Some(i), new_idx: None });
        i += 1;
    }
    while j < m {
        steps.push(Step { op: Op::Insert, old_idx: None, new_idx: Some(j) });
        j += 1;
    }
    steps
}

struct HunkRange {
    start: usize,
    end: usize,
}

fn render_patch(path: &str, a: &[String], b: &[String]) -> String {
    let steps = diff_steps(a, b);
    if steps.iter().all(|s| s.op == Op::Equal) {
        return String::new();
    }

    let mut ranges: Vec<HunkRange> = Vec::new();
    let mut i = 0usize;
    while i < steps.len() {
        if steps[i].op == Op::Equal {
            i += 1;
            continue;
        }
        let start = i.saturating_sub(CONTEXT);
        let mut end = i + 1;
        loop {
            let mut run = 0usize;
            let mut j = end;
            while j < steps.len() && steps[j].op == Op::Equal {
                run += 1;
                j += 1;
            }
            if run > CONTEXT * 2 || j >= steps.len() {
                end = (end + CONTEXT.min(run)).min(steps.len());
                break;
            }
            end = j;
        }
        ranges.push(HunkRange { start, end });
        i = end;
    }

    let mut merged: Vec<HunkRange> = Vec::new();
    for r in ranges {
        if let Some(last) = merged.last_mut() {
            if r.start <= last.end {
                last.end = last.end.max(r.end);
                continue;
            }
        }
        merged.push(r);
    }

    let mut out = String::new();
    out.push_str(&format!("--- a/{path}\n"));
    out.push_str(&format!("+++ b/{path}\n"));
    for r in &merged {
        out.push_str(&render_hunk(&steps[r.start..r.end], a, b));
    }
    out
}

fn render_hunk(slice: &[Step], a: &[String], b: &[String]) -> String {
    let old_start = slice
        .iter()
        .find_map(|s| s.old_idx)
        .map(|i| i + 1)
        .unwrap_or(0);
    let new_start = slice
        .iter()
        .find_map(|s| s.new_idx)
        .map(|i| i + 1)
        .unwrap_or(0);
    let old_count = slice.iter().filter(|s| s.old_idx.is_some()).count();
    let new_count = slice.iter().filter(|s| s.new_idx.is_some()).count();

    let mut body = format!("@@ -{old_start},{old_count} +{new_start},{new_count} @@\n");
    for s in slice {
        match s.op {
            Op::Equal => body.push_str(&format!(" {}", a[s.old_idx.unwrap()])),
            Op::Delete => body.push_str(&format!("-{}", a[s.old_idx.unwrap()])),
            Op::Insert => body.push_str(&format!("+{}", b[s.new_idx.unwrap()])),
        }
        if !body.ends_with('\n') {
            body.push('\n');
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::Extent;

    #[test]
    fn no_edits_produces_empty_diff() {
        let edits = EditSet::new();
        let diff = unified_diff("a.go", b"line one\nline two\n", &edits).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn single_line_substitution_produces_one_hunk() {
        let mut edits = EditSet::new();
        edits.add(Extent::new(5, 3), "two").unwrap();
        let diff = unified_diff("a.go", b"line one\nline two\nline three\n", &edits).unwrap();
        assert!(diff.contains("--- a/a.go"));
        assert!(diff.contains("+++ b/a.go"));
        assert!(diff.contains("@@"));
    }
}
