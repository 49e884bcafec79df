use crate::quotes::finder::QuoteCandidate;
use crate::types::{QuoteKind, QuoteRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairedQuote {
    pub position: usize,
    pub len: usize,
    pub kind: QuoteKind,
    pub role: QuoteRole,
}

/// Assign open/close roles with one stack per quote kind.
///
/// Closing wins over opening when a candidate could do both and its kind has
/// an open quote pending. Openers still on a stack at the end are dropped.
/// The result is sorted by position.
pub fn pair(candidates: &[QuoteCandidate]) -> Vec<PairedQuote> {
    let mut singles: Vec<&QuoteCandidate> = Vec::new();
    let mut doubles: Vec<&QuoteCandidate> = Vec::new();
    let mut out = Vec::new();

    for candidate in candidates {
        let stack = match candidate.kind {
            QuoteKind::Single => &mut singles,
            QuoteKind::Double => &mut doubles,
        };
        if candidate.can_close {
            if let Some(open) = stack.pop() {
                out.push(paired(open, QuoteRole::Open));
                out.push(paired(candidate, QuoteRole::Close));
                continue;
            }
        }
        if candidate.can_open {
            stack.push(candidate);
        }
    }

    out.sort_by_key(|q| q.position);
    out
}

fn paired(candidate: &QuoteCandidate, role: QuoteRole) -> PairedQuote {
    PairedQuote {
        position: candidate.position,
        len: candidate.len,
        kind: candidate.kind,
        role,
    }
}
