//! Sorted posting list algebra: union for merging runs, intersection for
//! conjunctive lookups.

use crate::index::types::{DocId, PostingList};
use std::cmp::Ordering;

/// Union of two posting lists of the same term.
///
/// Linear two-pointer merge; ids present in both are kept once. If either
/// list is empty the other is returned as-is.
pub fn merge(p1: PostingList, p2: PostingList) -> PostingList {
    debug_assert_eq!(p1.term_id, p2.term_id);

    if p1.is_empty() {
        return p2;
    }
    if p2.is_empty() {
        return p1;
    }

    let a = &p1.doc_ids;
    let b = &p2.doc_ids;
    let mut merged = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => {
                merged.push(a[i]);
                i += 1;
            }
            Ordering::Greater => {
                merged.push(b[j]);
                j += 1;
            }
            Ordering::Equal => {
                merged.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    merged.extend_from_slice(&a[i..]);
    merged.extend_from_slice(&b[j..]);

    PostingList::new(p1.term_id, merged)
}

/// Ids of `ids` that also appear in `posting`, ascending.
pub fn intersect(ids: &[DocId], posting: &PostingList) -> Vec<DocId> {
    let b = &posting.doc_ids;
    let mut result = Vec::with_capacity(ids.len().min(b.len()));
    let (mut i, mut j) = (0, 0);

    while i < ids.len() && j < b.len() {
        match ids[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                result.push(ids[i]);
                i += 1;
                j += 1;
            }
        }
    }

    result
}
