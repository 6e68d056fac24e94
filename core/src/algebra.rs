//! Set algebra over posting lists sorted by document id.
//!
//! Every function expects both inputs sorted ascending by `document_id` and
//! free of duplicates, which is what [`InvertedIndex::postings_for_term`]
//! produces. Unsorted input gives meaningless (but memory-safe) output; debug
//! builds assert the precondition.
//!
//! [`InvertedIndex::postings_for_term`]: crate::InvertedIndex::postings_for_term

use std::cmp::Ordering;

use crate::Posting;

fn is_sorted(list: &[Posting]) -> bool {
    list.windows(2).all(|w| w[0].document_id < w[1].document_id)
}

/// Postings whose document appears in both lists. Postings are taken from `left`.
pub fn and_intersect(left: &[Posting], right: &[Posting]) -> Vec<Posting> {
    debug_assert!(is_sorted(left) && is_sorted(right), "posting lists must be sorted");
    let mut out = Vec::with_capacity(left.len().min(right.len()));
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].document_id.cmp(&right[j].document_id) {
            Ordering::Equal => {
                out.push(left[i].clone());
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }
    out
}

/// Postings whose document appears in either list. On a shared document the
/// posting from `left` wins.
pub fn or_intersect(left: &[Posting], right: &[Posting]) -> Vec<Posting> {
    debug_assert!(is_sorted(left) && is_sorted(right), "posting lists must be sorted");
    let mut out = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].document_id.cmp(&right[j].document_id) {
            Ordering::Equal => {
                out.push(left[i].clone());
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                out.push(left[i].clone());
                i += 1;
            }
            Ordering::Greater => {
                out.push(right[j].clone());
                j += 1;
            }
        }
    }
    out.extend_from_slice(&left[i..]);
    out.extend_from_slice(&right[j..]);
    out
}

/// Postings of `left` whose document does not appear in `right`.
pub fn and_not(left: &[Posting], right: &[Posting]) -> Vec<Posting> {
    debug_assert!(is_sorted(left) && is_sorted(right), "posting lists must be sorted");
    let mut out = Vec::with_capacity(left.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() {
        if j >= right.len() {
            out.extend_from_slice(&left[i..]);
            break;
        }
        match left[i].document_id.cmp(&right[j].document_id) {
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                out.push(left[i].clone());
                i += 1;
            }
            Ordering::Greater => j += 1,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(ids: &[&str]) -> Vec<Posting> {
        ids.iter().map(|id| Posting::new(*id)).collect()
    }

    fn ids(postings: &[Posting]) -> Vec<&str> {
        postings.iter().map(|p| p.document_id.as_str()).collect()
    }

    #[test]
    fn and_keeps_shared_documents() {
        let p1 = list(&["d1", "d2", "d3"]);
        let p2 = list(&["d2", "d3", "d4"]);
        assert_eq!(ids(&and_intersect(&p1, &p2)), vec!["d2", "d3"]);
    }

    #[test]
    fn or_keeps_every_document_once() {
        let p1 = list(&["d1", "d2", "d3"]);
        let p2 = list(&["d2", "d3", "d4"]);
        assert_eq!(ids(&or_intersect(&p1, &p2)), vec!["d1", "d2", "d3", "d4"]);
    }

    #[test]
    fn empty_list_is_not_an_and_identity() {
        let p = list(&["d1", "d2"]);
        assert!(and_intersect(&[], &p).is_empty());
        assert!(and_intersect(&p, &[]).is_empty());
        assert_eq!(ids(&or_intersect(&[], &p)), vec!["d1", "d2"]);
        assert_eq!(ids(&or_intersect(&p, &[])), vec!["d1", "d2"]);
    }

    #[test]
    fn and_not_removes_right_side() {
        let p1 = list(&["d1", "d2", "d3", "d5"]);
        let p2 = list(&["d0", "d2", "d5", "d9"]);
        assert_eq!(ids(&and_not(&p1, &p2)), vec!["d1", "d3"]);
        assert_eq!(ids(&and_not(&p1, &[])), vec!["d1", "d2", "d3", "d5"]);
        assert!(and_not(&[], &p2).is_empty());
    }

    #[test]
    fn or_prefers_left_posting() {
        let mut left = list(&["d1"]);
        left[0].term_frequency = 7;
        let right = list(&["d1"]);
        assert_eq!(or_intersect(&left, &right)[0].term_frequency, 7);
    }
}
