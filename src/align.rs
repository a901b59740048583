/// How a span of the source relates to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Equal,
    Replace,
    Insert,
    Delete,
}

/// A contiguous region of the alignment between a source and target string.
///
/// `source_start..source_end` are character offsets into the source; for an
/// `Insert` the range is empty and marks the insertion point. `replacement`
/// holds the target characters for `Replace` and `Insert` spans and is empty
/// for `Equal` and `Delete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSpan {
    pub kind: DiffKind,
    pub source_start: usize,
    pub source_end: usize,
    pub replacement: String,
}

impl DiffSpan {
    /// The source characters this span covers. Empty for `Insert`.
    pub fn source_text(&self, source: &str) -> String {
        source
            .chars()
            .skip(self.source_start)
            .take(self.source_end - self.source_start)
            .collect()
    }
}

/// Align `source` against `target` at character granularity.
///
/// Returns spans covering the source end to end with no gaps or overlaps;
/// adjacent operations of the same run are coalesced, and an interleaved run
/// of deletions and insertions collapses into one `Replace`. Concatenating
/// source slices for `Equal` spans and `replacement` for the rest rebuilds
/// `target` exactly (see [`reconstruct`]).
///
/// Inputs are single sentences, so a quadratic LCS table is acceptable and
/// easier to verify than an O(ND) search.
pub fn align(source: &str, target: &str) -> Vec<DiffSpan> {
    let s: Vec<char> = source.chars().collect();
    let t: Vec<char> = target.chars().collect();

    let ops = edit_ops(&s, &t);
    coalesce(&ops, &t)
}

/// Only the spans that change the source, in source order.
pub fn changes(spans: Vec<DiffSpan>) -> Vec<DiffSpan> {
    spans
        .into_iter()
        .filter(|span| span.kind != DiffKind::Equal)
        .collect()
}

/// Rebuild the target string from an alignment. Test support for the
/// round-trip property.
pub fn reconstruct(source: &str, spans: &[DiffSpan]) -> String {
    let mut out = String::new();
    for span in spans {
        match span.kind {
            DiffKind::Equal => out.push_str(&span.source_text(source)),
            DiffKind::Replace | DiffKind::Insert => out.push_str(&span.replacement),
            DiffKind::Delete => {}
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Keep,
    Delete,
    Insert,
}

/// Character-level shortest edit script via an LCS table, as a flat op list.
fn edit_ops(s: &[char], t: &[char]) -> Vec<Op> {
    let n = s.len();
    let m = t.len();

    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            lcs[i][j] = if s[i - 1] == t[j - 1] {
                lcs[i - 1][j - 1] + 1
            } else {
                lcs[i - 1][j].max(lcs[i][j - 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let mut i = n;
    let mut j = m;
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && s[i - 1] == t[j - 1] {
            ops.push(Op::Keep);
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || lcs[i][j - 1] >= lcs[i - 1][j]) {
            ops.push(Op::Insert);
            j -= 1;
        } else {
            ops.push(Op::Delete);
            i -= 1;
        }
    }
    ops.reverse();
    ops
}

/// Merge runs of ops into spans; a run mixing deletions and insertions
/// becomes a single `Replace`.
fn coalesce(ops: &[Op], t: &[char]) -> Vec<DiffSpan> {
    let mut spans = Vec::new();
    let mut idx = 0;
    let mut si = 0;
    let mut ti = 0;

    while idx < ops.len() {
        if ops[idx] == Op::Keep {
            let start = si;
            while idx < ops.len() && ops[idx] == Op::Keep {
                si += 1;
                ti += 1;
                idx += 1;
            }
            spans.push(DiffSpan {
                kind: DiffKind::Equal,
                source_start: start,
                source_end: si,
                replacement: String::new(),
            });
        } else {
            let s_start = si;
            let t_start = ti;
            while idx < ops.len() && ops[idx] != Op::Keep {
                match ops[idx] {
                    Op::Delete => si += 1,
                    Op::Insert => ti += 1,
                    Op::Keep => unreachable!(),
                }
                idx += 1;
            }

            let kind = match (si > s_start, ti > t_start) {
                (true, true) => DiffKind::Replace,
                (true, false) => DiffKind::Delete,
                (false, true) => DiffKind::Insert,
                (false, false) => unreachable!(),
            };
            spans.push(DiffSpan {
                kind,
                source_start: s_start,
                source_end: si,
                replacement: t[t_start..ti].iter().collect(),
            });
        }
    }

    spans
}
