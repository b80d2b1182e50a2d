use std::fmt;

use uuid::Uuid;

use super::document::{DocumentId, TextBuffer};
use super::error::DocumentError;

/// Identity of a pending edit. Queues look requests up and remove them by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Insert,
    Delete,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Insert => write!(f, "insert"),
            RequestKind::Delete => write!(f, "delete"),
        }
    }
}

/// What `apply_transform` did to a pending request. The owning queue acts on
/// `Redundant` and `Split`; the request never touches its queue itself.
#[derive(Debug, PartialEq, Eq)]
pub enum Transform {
    Unchanged,
    Shifted,
    /// The resolved delete already removed everything this delete covers.
    Redundant,
    /// An insert landed inside this delete. `self` now covers the part before
    /// the inserted text; the returned request covers the part after it and
    /// must be queued right behind `self`.
    Split(Request),
}

/// One pending insert or delete against a single document.
///
/// Positions count Unicode scalar values. For a delete the range is
/// `[start, end)`; for an insert `end == start + text length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    id: RequestId,
    kind: RequestKind,
    start: usize,
    end: usize,
    text: String,
    document: DocumentId,
    /// Set on split remainders: they are already expressed in coordinates
    /// after this request was applied.
    settled_against: Option<RequestId>,
}

impl Request {
    /// Fails when `pos` plus the text length does not fit a position.
    pub fn insert(document: DocumentId, pos: usize, text: impl Into<String>) -> Result<Self, DocumentError> {
        let text = text.into();
        let len = text.chars().count();
        let end = pos
            .checked_add(len)
            .ok_or(DocumentError::PositionOverflow { pos, len })?;
        Ok(Self {
            id: RequestId::new(),
            kind: RequestKind::Insert,
            start: pos,
            end,
            text,
            document,
            settled_against: None,
        })
    }

    pub fn delete(document: DocumentId, begin: usize, end: usize) -> Self {
        Self {
            id: RequestId::new(),
            kind: RequestKind::Delete,
            start: begin,
            end,
            text: String::new(),
            document,
            settled_against: None,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    fn span(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    fn shift_right(&mut self, by: usize) {
        self.start = self.start.saturating_add(by);
        self.end = self.end.saturating_add(by);
    }

    fn shift_left(&mut self, by: usize) {
        self.start = self.start.saturating_sub(by);
        self.end = self.end.saturating_sub(by);
    }

    /// Performs this edit on the buffer. The only place document text changes.
    ///
    /// A delete whose end runs past the text is clamped, and the clamped end is
    /// recorded so that requests transformed against this one see the range
    /// that was really removed.
    pub fn apply_edit(&mut self, buffer: &mut TextBuffer) -> Result<(), DocumentError> {
        match self.kind {
            RequestKind::Insert => {
                buffer.insert(self.start, &self.text)?;
            }
            RequestKind::Delete => {
                self.end = buffer.delete(self.start, self.end)?;
            }
        }
        Ok(())
    }

    /// Rebases this pending request over `other`, which has just been applied.
    ///
    /// Afterwards, applying `self` has the effect it would have had if it had
    /// been issued right after `other` in one sequential timeline.
    pub fn apply_transform(&mut self, other: &Request) -> Transform {
        if self.settled_against == Some(other.id) {
            return Transform::Unchanged;
        }

        // other lies entirely after us
        if other.start >= self.end {
            return Transform::Unchanged;
        }

        // other lies entirely before us
        if other.end <= self.start {
            match other.kind {
                RequestKind::Insert => self.shift_right(other.span()),
                RequestKind::Delete => self.shift_left(other.span()),
            }
            return Transform::Shifted;
        }

        match (self.kind, other.kind) {
            (RequestKind::Delete, RequestKind::Delete) => self.rebase_delete_over_delete(other),
            (RequestKind::Insert, RequestKind::Insert) | (RequestKind::Insert, RequestKind::Delete) => {
                // Later inserts land at the start of the span other touched.
                self.start = other.start;
                self.end = self.start.saturating_add(self.text_len());
                Transform::Shifted
            }
            (RequestKind::Delete, RequestKind::Insert) => {
                if other.start <= self.start {
                    // Inserted before our first character: plain shift.
                    self.shift_right(other.span());
                    return Transform::Shifted;
                }
                let inserted = other.span();
                let remainder_end = self.end;
                self.end = other.start;
                let remainder = Request {
                    id: RequestId::new(),
                    kind: RequestKind::Delete,
                    start: other.start.saturating_add(inserted),
                    end: remainder_end.saturating_add(inserted),
                    text: String::new(),
                    document: self.document,
                    settled_against: Some(other.id),
                };
                Transform::Split(remainder)
            }
        }
    }

    fn rebase_delete_over_delete(&mut self, other: &Request) -> Transform {
        let removed = other.span();
        if other.start >= self.start && other.end >= self.end {
            // other covers our tail
            self.end = other.start;
        } else if other.start <= self.start && other.end <= self.end {
            // other covers our head
            self.start = other.end - removed;
            self.end -= removed;
        } else if other.start <= self.start && other.end >= self.end {
            return Transform::Redundant;
        } else {
            // other sits strictly inside us
            self.end -= removed;
        }
        Transform::Shifted
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RequestKind::Insert => write!(f, "insert({}, {:?})", self.start, self.text),
            RequestKind::Delete => write!(f, "delete({}, {})", self.start, self.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: DocumentId = DocumentId(1);

    fn buffer(text: &str) -> TextBuffer {
        TextBuffer::from(text)
    }

    /// Applies `first`, rebases `second` over it, applies `second`.
    fn resolve_pair(initial: &str, mut first: Request, mut second: Request) -> String {
        let mut buf = buffer(initial);
        first.apply_edit(&mut buf).unwrap();
        match second.apply_transform(&first) {
            Transform::Redundant => {}
            Transform::Split(mut remainder) => {
                second.apply_edit(&mut buf).unwrap();
                remainder.apply_transform(&second);
                remainder.apply_edit(&mut buf).unwrap();
            }
            Transform::Unchanged | Transform::Shifted => second.apply_edit(&mut buf).unwrap(),
        }
        buf.as_str().to_string()
    }

    #[test]
    fn insert_request_spans_its_text() {
        let req = Request::insert(DOC, 3, "héllo").unwrap();
        assert_eq!((req.start(), req.end()), (3, 8));
        assert_eq!(req.kind, RequestKind::Insert);
    }

    #[test]
    fn insert_span_must_fit_a_position() {
        assert_eq!(
            Request::insert(DOC, usize::MAX, "ab").unwrap_err(),
            DocumentError::PositionOverflow { pos: usize::MAX, len: 2 }
        );
        let edge = Request::insert(DOC, usize::MAX - 1, "a").unwrap();
        assert_eq!(edge.end(), usize::MAX);
    }

    #[test]
    fn shifting_near_the_top_saturates() {
        let other = Request::insert(DOC, 0, "abc").unwrap();
        let mut req = Request::delete(DOC, usize::MAX - 1, usize::MAX);
        assert_eq!(req.apply_transform(&other), Transform::Shifted);
        assert_eq!((req.start(), req.end()), (usize::MAX, usize::MAX));
    }

    #[test]
    fn other_after_leaves_request_alone() {
        let other = Request::insert(DOC, 9, "d").unwrap();
        let mut req = Request::insert(DOC, 2, "t").unwrap();
        assert_eq!(req.apply_transform(&other), Transform::Unchanged);
        assert_eq!((req.start(), req.end()), (2, 3));
    }

    #[test]
    fn insert_before_shifts_right() {
        let other = Request::insert(DOC, 6, "plex").unwrap();
        let mut req = Request::insert(DOC, 10, "k").unwrap();
        assert_eq!(req.apply_transform(&other), Transform::Shifted);
        assert_eq!((req.start(), req.end()), (14, 15));
        assert_eq!(resolve_pair("google doc", other, Request::insert(DOC, 10, "k").unwrap()), "googleplex dock");
    }

    #[test]
    fn delete_before_shifts_left() {
        let other = Request::delete(DOC, 4, 5);
        let mut req = Request::delete(DOC, 10, 13);
        req.apply_transform(&other);
        assert_eq!((req.start(), req.end()), (9, 12));
        assert_eq!(
            resolve_pair("hello goodbye", Request::delete(DOC, 4, 5), Request::delete(DOC, 10, 13)),
            "hell good"
        );
    }

    #[test]
    fn delete_delete_tail_overlap_truncates() {
        // other starts inside us and runs past our end
        assert_eq!(
            resolve_pair("jar of lava", Request::delete(DOC, 4, 9), Request::delete(DOC, 2, 6)),
            "java"
        );
        let other = Request::delete(DOC, 4, 9);
        let mut req = Request::delete(DOC, 2, 6);
        req.apply_transform(&other);
        assert_eq!((req.start(), req.end()), (2, 4));
    }

    #[test]
    fn delete_delete_head_overlap_pins_start() {
        let other = Request::delete(DOC, 2, 6);
        let mut req = Request::delete(DOC, 4, 9);
        req.apply_transform(&other);
        assert_eq!((req.start(), req.end()), (2, 5));
        assert_eq!(
            resolve_pair("jar of lava", Request::delete(DOC, 2, 6), Request::delete(DOC, 4, 9)),
            "java"
        );
    }

    #[test]
    fn delete_contained_in_resolved_delete_is_redundant() {
        let other = Request::delete(DOC, 1, 6);
        let mut req = Request::delete(DOC, 2, 5);
        assert_eq!(req.apply_transform(&other), Transform::Redundant);
        assert_eq!(
            resolve_pair("eclipse", Request::delete(DOC, 1, 6), Request::delete(DOC, 2, 5)),
            "ee"
        );
    }

    #[test]
    fn delete_containing_resolved_delete_shrinks() {
        let other = Request::delete(DOC, 2, 5);
        let mut req = Request::delete(DOC, 1, 6);
        req.apply_transform(&other);
        assert_eq!((req.start(), req.end()), (1, 3));
        assert_eq!(
            resolve_pair("eclipse", Request::delete(DOC, 2, 5), Request::delete(DOC, 1, 6)),
            "ee"
        );
    }

    #[test]
    fn insert_insert_tie_lands_before_earlier_text() {
        let other = Request::insert(DOC, 0, "patrick ").unwrap();
        let mut req = Request::insert(DOC, 0, "neil ").unwrap();
        req.apply_transform(&other);
        assert_eq!((req.start(), req.end()), (0, 5));
        assert_eq!(
            resolve_pair("harris", Request::insert(DOC, 0, "patrick ").unwrap(), Request::insert(DOC, 0, "neil ").unwrap()),
            "neil patrick harris"
        );
    }

    #[test]
    fn insert_into_deleted_range_moves_to_range_start() {
        let other = Request::delete(DOC, 4, 8);
        let mut req = Request::insert(DOC, 4, " tim").unwrap();
        req.apply_transform(&other);
        assert_eq!((req.start(), req.end()), (4, 8));
        assert_eq!(
            resolve_pair("it's the beaver", Request::delete(DOC, 4, 8), Request::insert(DOC, 4, " tim").unwrap()),
            "it's tim beaver"
        );
    }

    #[test]
    fn insert_inside_delete_splits_it() {
        let other = Request::insert(DOC, 2, "x").unwrap();
        let mut req = Request::delete(DOC, 1, 4);
        let Transform::Split(remainder) = req.apply_transform(&other) else {
            panic!("expected a split");
        };
        assert_eq!((req.start(), req.end()), (1, 2));
        assert_eq!((remainder.start(), remainder.end()), (3, 5));
        assert_eq!(remainder.kind, RequestKind::Delete);
        assert_eq!(remainder.document(), DOC);
        assert_ne!(remainder.id(), req.id());
    }

    #[test]
    fn split_remainder_ignores_the_insert_it_came_from() {
        let other = Request::insert(DOC, 2, "x").unwrap();
        let mut req = Request::delete(DOC, 1, 4);
        let Transform::Split(mut remainder) = req.apply_transform(&other) else {
            panic!("expected a split");
        };
        assert_eq!(remainder.apply_transform(&other), Transform::Unchanged);
        assert_eq!((remainder.start(), remainder.end()), (3, 5));
        assert_eq!(
            resolve_pair("abcde", Request::insert(DOC, 2, "x").unwrap(), Request::delete(DOC, 1, 4)),
            "axe"
        );
    }

    #[test]
    fn insert_at_delete_start_shifts_the_whole_delete() {
        let other = Request::insert(DOC, 3, "XY").unwrap();
        let mut req = Request::delete(DOC, 3, 5);
        assert_eq!(req.apply_transform(&other), Transform::Shifted);
        assert_eq!((req.start(), req.end()), (5, 7));
    }

    #[test]
    fn concurrent_pairs_converge_in_either_order() {
        // (initial, a, b) where both orders must agree
        let cases = [
            ("cd", Request::insert(DOC, 2, "ef").unwrap(), Request::insert(DOC, 0, "ab").unwrap()),
            ("hello world", Request::delete(DOC, 0, 2), Request::delete(DOC, 6, 8)),
            ("jar of lava", Request::delete(DOC, 2, 6), Request::delete(DOC, 4, 9)),
            ("eclipse", Request::delete(DOC, 2, 5), Request::delete(DOC, 1, 6)),
            ("reminder", Request::delete(DOC, 2, 6), Request::insert(DOC, 4, "joind").unwrap()),
            ("abcde", Request::insert(DOC, 2, "x").unwrap(), Request::delete(DOC, 1, 4)),
        ];
        for (initial, a, b) in cases {
            let ab = resolve_pair(initial, a.clone(), b.clone());
            let ba = resolve_pair(initial, b, a);
            assert_eq!(ab, ba, "divergence on {initial:?}");
        }
    }
}
