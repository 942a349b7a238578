//! # ThreadBuilder
//!
//! Turns a flat list of parent-pointer comment rows into an ordered
//! reply forest. The build is fully iterative (breadth-first flatten,
//! reverse unwind), so a thousand-deep reply chain costs heap, not
//! call stack.
//!
//! Degradation policy: a comment whose parent is missing from the set
//! becomes a root; comments trapped in a parent cycle are promoted to
//! roots starting from the oldest. No input comment is ever dropped.

use std::collections::{HashMap, HashSet, VecDeque};

use domains::Comment;
use serde::Serialize;
use uuid::Uuid;

/// One node of the reply forest.
#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

struct Flat {
    node: CommentNode,
    parent: Option<usize>,
}

/// Builds the ordered forest. Siblings are ordered by `created_at`
/// ascending at every level; ties keep the input order (stable sort).
pub fn build_forest(mut comments: Vec<Comment>) -> Vec<CommentNode> {
    comments.sort_by_key(|c| c.created_at);

    let present: HashSet<Uuid> = comments.iter().map(|c| c.id).collect();

    // Partition into roots and a parent -> children index. A parent
    // pointer at itself or at an id outside the set heals to a root.
    let mut children: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    let mut roots: Vec<Comment> = Vec::new();
    for c in comments {
        match c.parent_id.filter(|p| *p != c.id && present.contains(p)) {
            Some(parent) => children.entry(parent).or_default().push(c),
            None => roots.push(c),
        }
    }

    // Breadth-first flatten: every parent lands at a lower index than
    // its children.
    let mut flat: Vec<Flat> = Vec::new();
    let mut queue: VecDeque<(Comment, Option<usize>)> =
        roots.into_iter().map(|c| (c, None)).collect();
    loop {
        while let Some((comment, parent)) = queue.pop_front() {
            let idx = flat.len();
            let kids = children.remove(&comment.id).unwrap_or_default();
            flat.push(Flat {
                node: CommentNode { comment, replies: Vec::new() },
                parent,
            });
            for kid in kids {
                queue.push_back((kid, Some(idx)));
            }
        }

        // Leftover index entries mean a parent cycle (the invariant says
        // this cannot happen, but a corrupt store must not eat comments).
        // Promote the oldest trapped comment to a root and go again.
        if children.is_empty() {
            break;
        }
        let mut trapped: Vec<Comment> = children.drain().flat_map(|(_, v)| v).collect();
        trapped.sort_by_key(|c| (c.created_at, c.id));
        let promoted = trapped.remove(0);
        for c in trapped {
            // Trapped comments always carry a parent pointer; that is
            // how they ended up in the index.
            if let Some(parent) = c.parent_id {
                children.entry(parent).or_default().push(c);
            }
        }
        queue.push_back((promoted, None));
    }

    // Reverse unwind: children (higher indices) attach to parents before
    // the parents themselves are finalized.
    let mut forest: Vec<CommentNode> = Vec::new();
    while let Some(Flat { mut node, parent }) = flat.pop() {
        node.replies.reverse();
        match parent {
            Some(p) => flat[p].node.replies.push(node),
            None => forest.push(node),
        }
    }
    forest.reverse();
    // Promoted cycle roots were enqueued after the ordinary roots; one
    // stable pass restores created_at order at the top level.
    forest.sort_by_key(|node| node.comment.created_at);
    forest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn comment(id: u128, parent: Option<u128>, minute: i64) -> Comment {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Comment {
            id: Uuid::from_u128(id),
            post_id: Uuid::from_u128(999),
            author_id: Uuid::from_u128(7),
            content: format!("c{id}"),
            parent_id: parent.map(Uuid::from_u128),
            score: 0,
            created_at: base + Duration::minutes(minute),
        }
    }

    /// Iterative node count; keeps deep-chain tests off the call stack.
    fn count(forest: &[CommentNode]) -> usize {
        let mut total = 0;
        let mut stack: Vec<&CommentNode> = forest.iter().collect();
        while let Some(node) = stack.pop() {
            total += 1;
            stack.extend(node.replies.iter());
        }
        total
    }

    #[test]
    fn empty_input_yields_empty_forest() {
        assert!(build_forest(Vec::new()).is_empty());
    }

    #[test]
    fn chain_of_three_builds_single_spine() {
        // A(root), B(parent=A), C(parent=B) -> one chain of depth 3.
        let forest = build_forest(vec![
            comment(1, None, 0),
            comment(2, Some(1), 1),
            comment(3, Some(2), 2),
        ]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].comment.id, Uuid::from_u128(1));
        assert_eq!(forest[0].replies.len(), 1);
        assert_eq!(forest[0].replies[0].comment.id, Uuid::from_u128(2));
        assert_eq!(forest[0].replies[0].replies[0].comment.id, Uuid::from_u128(3));
    }

    #[test]
    fn siblings_order_by_created_at_ascending() {
        let forest = build_forest(vec![
            comment(1, None, 0),
            comment(3, Some(1), 5),
            comment(2, Some(1), 2),
            comment(4, None, 1),
        ]);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].comment.id, Uuid::from_u128(1));
        assert_eq!(forest[1].comment.id, Uuid::from_u128(4));
        let kids: Vec<_> = forest[0].replies.iter().map(|n| n.comment.id).collect();
        assert_eq!(kids, vec![Uuid::from_u128(2), Uuid::from_u128(3)]);
    }

    #[test]
    fn missing_parent_heals_to_root() {
        let forest = build_forest(vec![
            comment(1, None, 0),
            comment(2, Some(42), 1), // parent never existed / was deleted
        ]);
        assert_eq!(forest.len(), 2);
        assert_eq!(count(&forest), 2);
        assert_eq!(forest[1].comment.id, Uuid::from_u128(2));
        assert!(forest[1].replies.is_empty());
    }

    #[test]
    fn self_parent_heals_to_root() {
        let forest = build_forest(vec![comment(1, Some(1), 0)]);
        assert_eq!(forest.len(), 1);
        assert!(forest[0].replies.is_empty());
    }

    #[test]
    fn parent_cycle_keeps_every_comment() {
        // 1 -> 2 -> 1 cycle, with 3 hanging off 2.
        let forest = build_forest(vec![
            comment(1, Some(2), 0),
            comment(2, Some(1), 1),
            comment(3, Some(2), 2),
        ]);
        assert_eq!(count(&forest), 3);
        // Oldest cycle member surfaces as the root.
        assert_eq!(forest[0].comment.id, Uuid::from_u128(1));
    }

    #[test]
    fn cycle_promoted_root_sorts_among_ordinary_roots() {
        // The cycle pair predates the ordinary root, so its promoted
        // member must surface first, not get appended at the end.
        let forest = build_forest(vec![
            comment(1, Some(2), 0),
            comment(2, Some(1), 1),
            comment(3, None, 5),
        ]);
        assert_eq!(count(&forest), 3);
        let roots: Vec<_> = forest.iter().map(|n| n.comment.id).collect();
        assert_eq!(roots, vec![Uuid::from_u128(1), Uuid::from_u128(3)]);
    }

    #[test]
    fn pathological_depth_does_not_overflow() {
        let mut rows = vec![comment(1, None, 0)];
        for i in 2..=20_000u128 {
            rows.push(comment(i, Some(i - 1), i as i64));
        }
        let forest = build_forest(rows);
        assert_eq!(forest.len(), 1);
        assert_eq!(count(&forest), 20_000);
        // Walk down iteratively to confirm the chain survived intact.
        let mut depth = 0usize;
        let mut cursor = &forest[0];
        loop {
            depth += 1;
            match cursor.replies.first() {
                Some(next) => cursor = next,
                None => break,
            }
        }
        assert_eq!(depth, 20_000);
    }

    #[test]
    fn created_at_ties_keep_insertion_order() {
        let forest = build_forest(vec![
            comment(5, None, 0),
            comment(6, None, 0),
            comment(7, None, 0),
        ]);
        let ids: Vec<_> = forest.iter().map(|n| n.comment.id).collect();
        assert_eq!(
            ids,
            vec![Uuid::from_u128(5), Uuid::from_u128(6), Uuid::from_u128(7)]
        );
    }
}
