/// Whole-word occurrences of `needle` inside `haystack`, found via KMP with the match
/// boundaries checked against a Unicode word-character classifier (§4.4 Comment-text
/// occurrence search). The sole authoritative comment-search entry point (§9 Open
/// Questions: the KMP/Unicode-word-char version, not the `[\PL]` regex variant).
///
/// Returns byte offsets (into `haystack`) of each match start.
pub fn find_whole_word_occurrences(haystack: &str, needle: &str) -> Vec<usize> {
    if needle.is_empty() {
        return Vec::new();
    }
    let h: Vec<char> = haystack.chars().collect();
    let n: Vec<char> = needle.chars().collect();
    let char_offsets = char_byte_offsets(haystack);

    let failure = kmp_failure_table(&n);
    let mut matches_char_idx = Vec::new();

    let mut i = 0usize;
    let mut j = 0usize;
    while i < h.len() {
        if h[i] == n[j] {
            i += 1;
            j += 1;
            if j == n.len() {
                matches_char_idx.push(i - j);
                j = failure[j - 1];
            }
        } else if j > 0 {
            j = failure[j - 1];
        } else {
            i += 1;
        }
    }

    matches_char_idx
        .into_iter()
        .filter(|&start| {
            let end = start + n.len();
            let before_ok = start == 0 || !is_word_char(h[start - 1]);
            let after_ok = end == h.len() || !is_word_char(h[end]);
            before_ok && after_ok
        })
        .map(|start| char_offsets[start])
        .collect()
}

fn is_word_char(c: char) -> bool {
    unicode_ident::is_xid_continue(c) || c == '_'
}

fn kmp_failure_table(pattern: &[char]) -> Vec<usize> {
    let mut table = vec![0usize; pattern.len()];
    let mut k = 0usize;
    for i in 1..pattern.len() {
        while k > 0 && pattern[k] != pattern[i] {
            k = table[k - 1];
        }
        if pattern[k] == pattern[i] {
            k += 1;
        }
        table[i] = k;
    }
    table
}

fn char_byte_offsets(s: &str) -> Vec<usize> {
    let mut offsets: Vec<usize> = s.char_indices().map(|(i, _)| i).collect();
    offsets.push(s.len());
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_word_with_non_word_neighbors() {
        let hits = find_whole_word_occurrences("see foo and food and foo.", "foo");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn does_not_match_inside_a_longer_word() {
        let hits = find_whole_word_occurrences("food foo", "foo");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn matches_at_string_boundaries() {
        let hits = find_whole_word_occurrences("foo", "foo");
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn handles_multibyte_identifiers() {
        let hits = find_whole_word_occurrences("see こんにちは here", "こんにちは");
        assert_eq!(hits.len(), 1);
    }
}
