//! Word-token diff used by the minor-edit classifier
//!
//! Produces the list of changed spans between two texts. Tokens are runs of
//! alphanumeric characters, runs of whitespace, or single punctuation
//! characters; spans merge adjacent token-level changes so "replaced one
//! sentence" counts as one span, not ten.
//!
//! The LCS table is quadratic, so inputs whose token product exceeds
//! `TOKEN_PRODUCT_CAP` fall back to a single span between the common prefix
//! and suffix. That over-merges spans but never under-counts changed
//! characters, which keeps the classifier biased toward "major".

/// One contiguous changed region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSpan {
    /// Text removed from the old version
    pub removed: String,
    /// Text inserted in the new version
    pub inserted: String,
}

impl ChangeSpan {
    /// Characters touched by this span (removed plus inserted)
    pub fn changed_chars(&self) -> usize {
        self.removed.chars().count() + self.inserted.chars().count()
    }

    /// True if both sides consist solely of whitespace
    pub fn is_whitespace(&self) -> bool {
        !self.is_empty()
            && self.removed.chars().all(char::is_whitespace)
            && self.inserted.chars().all(char::is_whitespace)
    }

    /// True if both sides consist solely of punctuation or whitespace
    pub fn is_punctuation_or_whitespace(&self) -> bool {
        !self.is_empty()
            && self
                .removed
                .chars()
                .chain(self.inserted.chars())
                .all(|c| !c.is_alphanumeric())
    }

    fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.inserted.is_empty()
    }
}

/// Above this old×new token product the diff degrades to a single span
const TOKEN_PRODUCT_CAP: usize = 1_000_000;

/// Compute the changed spans between `old` and `new`
///
/// Returns an empty list when the texts are identical.
pub fn change_spans(old: &str, new: &str) -> Vec<ChangeSpan> {
    if old == new {
        return Vec::new();
    }
    let old_tokens = tokenize(old);
    let new_tokens = tokenize(new);
    if old_tokens.len().saturating_mul(new_tokens.len()) > TOKEN_PRODUCT_CAP {
        return vec![trimmed_span(old, new)];
    }
    spans_from_lcs(&old_tokens, &new_tokens)
}

/// Split text into alphanumeric runs, whitespace runs, and single
/// punctuation characters
fn tokenize(text: &str) -> Vec<&str> {
    #[derive(PartialEq)]
    enum Class {
        Word,
        Space,
        Other,
    }
    fn classify(c: char) -> Class {
        if c.is_alphanumeric() {
            Class::Word
        } else if c.is_whitespace() {
            Class::Space
        } else {
            Class::Other
        }
    }

    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<Class> = None;
    for (idx, c) in text.char_indices() {
        let class = classify(c);
        let split = match (&current, &class) {
            (None, _) => false,
            // Punctuation never coalesces; each char is its own token.
            (Some(Class::Other), _) | (_, Class::Other) => true,
            (Some(prev), next) => prev != next,
        };
        if split {
            tokens.push(&text[start..idx]);
            start = idx;
        }
        current = Some(class);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// Single change span between the longest common prefix and suffix
fn trimmed_span(old: &str, new: &str) -> ChangeSpan {
    let prefix = old
        .char_indices()
        .zip(new.char_indices())
        .take_while(|((_, a), (_, b))| a == b)
        .last()
        .map(|((i, a), _)| i + a.len_utf8())
        .unwrap_or(0);

    let old_rest = &old[prefix..];
    let new_rest = &new[prefix..];
    let suffix = old_rest
        .chars()
        .rev()
        .zip(new_rest.chars().rev())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .sum::<usize>();

    ChangeSpan {
        removed: old_rest[..old_rest.len() - suffix].to_string(),
        inserted: new_rest[..new_rest.len() - suffix].to_string(),
    }
}

/// Build merged change spans from a token-level LCS alignment
fn spans_from_lcs(old: &[&str], new: &[&str]) -> Vec<ChangeSpan> {
    // Standard LCS length table, then a backward walk emitting ops.
    let n = old.len();
    let m = new.len();
    let mut table = vec![0u32; (n + 1) * (m + 1)];
    let at = |i: usize, j: usize| i * (m + 1) + j;
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[at(i, j)] = if old[i] == new[j] {
                table[at(i + 1, j + 1)] + 1
            } else {
                table[at(i + 1, j)].max(table[at(i, j + 1)])
            };
        }
    }

    let mut spans = Vec::new();
    let mut removed = String::new();
    let mut inserted = String::new();
    // Word tokens over-count small intra-word edits (a one-letter typo fix
    // would charge the whole word twice), so each span is narrowed to the
    // characters that actually differ before it is emitted.
    let flush = |removed: &mut String, inserted: &mut String, spans: &mut Vec<ChangeSpan>| {
        if !removed.is_empty() || !inserted.is_empty() {
            spans.push(trimmed_span(
                &std::mem::take(removed),
                &std::mem::take(inserted),
            ));
        }
    };

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            flush(&mut removed, &mut inserted, &mut spans);
            i += 1;
            j += 1;
        } else if table[at(i + 1, j)] >= table[at(i, j + 1)] {
            removed.push_str(old[i]);
            i += 1;
        } else {
            inserted.push_str(new[j]);
            j += 1;
        }
    }
    for token in &old[i..] {
        removed.push_str(token);
    }
    for token in &new[j..] {
        inserted.push_str(token);
    }
    flush(&mut removed, &mut inserted, &mut spans);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_changed(spans: &[ChangeSpan]) -> usize {
        spans.iter().map(ChangeSpan::changed_chars).sum()
    }

    #[test]
    fn identical_texts_have_no_spans() {
        assert!(change_spans("same text", "same text").is_empty());
    }

    #[test]
    fn single_word_replacement_is_one_span() {
        let spans = change_spans("the quick brown fox", "the slow brown fox");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].removed, "quick");
        assert_eq!(spans[0].inserted, "slow");
    }

    #[test]
    fn two_separated_edits_are_two_spans() {
        let spans = change_spans("one two three four five", "one 2 three four 5");
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn pure_insertion() {
        let spans = change_spans("alpha gamma", "alpha beta gamma");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].removed, "");
        assert!(spans[0].inserted.contains("beta"));
    }

    #[test]
    fn whitespace_only_change_detected() {
        let spans = change_spans("a b", "a  b");
        assert_eq!(spans.len(), 1);
        assert!(spans[0].is_whitespace());
    }

    #[test]
    fn punctuation_span_detected() {
        let spans = change_spans("done", "done!");
        assert_eq!(spans.len(), 1);
        assert!(spans[0].is_punctuation_or_whitespace());
        assert!(!spans[0].is_whitespace());
    }

    #[test]
    fn fallback_counts_all_changed_chars() {
        let span = trimmed_span("prefix OLD suffix", "prefix NEW suffix");
        assert_eq!(span.removed, "OLD");
        assert_eq!(span.inserted, "NEW");
    }

    #[test]
    fn fallback_handles_disjoint_texts() {
        let span = trimmed_span("abc", "xyz");
        assert_eq!(span.removed, "abc");
        assert_eq!(span.inserted, "xyz");
    }

    #[test]
    fn changed_chars_counts_both_sides() {
        let spans = change_spans("aaa bbb", "aaa ccc");
        assert_eq!(total_changed(&spans), 6);
    }

    #[test]
    fn tokenizer_splits_classes() {
        assert_eq!(tokenize("ab cd"), vec!["ab", " ", "cd"]);
        assert_eq!(tokenize("a,b"), vec!["a", ",", "b"]);
        assert_eq!(tokenize("!!"), vec!["!", "!"]);
        assert!(tokenize("").is_empty());
    }
}
