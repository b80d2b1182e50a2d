use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use super::error::DocumentError;
use super::queue::ResolutionQueue;
use super::request::{Request, RequestId};
use super::style::Style;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc-{}", self.0)
    }
}

/// Longest text a document may hold unless configured otherwise, in characters.
pub const DEFAULT_MAX_DOCUMENT_LENGTH: usize = 16 * 1024 * 1024;

/// Live text of a document. Positions are counted in Unicode scalar values.
///
/// No edit may grow the text past `max_len`; the check runs before anything
/// is allocated.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    text: String,
    max_len: usize,
}

impl TextBuffer {
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            text: String::new(),
            max_len,
        }
    }

    fn check_length(&self, length: usize) -> Result<(), DocumentError> {
        if length > self.max_len {
            return Err(DocumentError::TooLong {
                length,
                limit: self.max_len,
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    fn byte_offset(&self, pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(pos)
            .map(|(offset, _)| offset)
            .unwrap_or(self.text.len())
    }

    /// Splices `text` in at `pos`. Past the end, the gap is filled with spaces first.
    pub fn insert(&mut self, pos: usize, text: &str) -> Result<(), DocumentError> {
        let len = self.len();
        let added = text.chars().count();
        self.check_length(pos.max(len).saturating_add(added))?;

        if pos <= len {
            let at = self.byte_offset(pos);
            self.text.insert_str(at, text);
        } else {
            self.text.extend(std::iter::repeat(' ').take(pos - len));
            self.text.push_str(text);
        }
        Ok(())
    }

    /// Removes `[begin, end)` and returns the end actually used.
    ///
    /// `end` is clamped to the current length. An empty or inverted range is a no-op.
    pub fn delete(&mut self, begin: usize, end: usize) -> Result<usize, DocumentError> {
        let len = self.len();
        if begin > len {
            return Err(DocumentError::DeleteOutOfRange { begin, len });
        }
        let end = end.min(len);
        if begin >= end {
            return Ok(begin.max(end));
        }
        let from = self.byte_offset(begin);
        let to = self.byte_offset(end);
        self.text.replace_range(from..to, "");
        Ok(end)
    }

    fn replace_with(&mut self, replaced: String) {
        self.text = replaced;
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
            max_len: DEFAULT_MAX_DOCUMENT_LENGTH,
        }
    }
}

impl PartialEq for TextBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for TextBuffer {}

impl Hash for TextBuffer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

/// Detached copy of a document's identity and content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentSnapshot {
    pub name: String,
    pub text: String,
}

/// A shared named document: text, style, its resolution queue, and the
/// sessions currently attached to it.
///
/// All access goes through the per-document mutex held by the store, so every
/// method here runs under mutual exclusion for this document only.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    name: String,
    buffer: TextBuffer,
    style: Style,
    queue: ResolutionQueue,
    attached: HashSet<Uuid>,
}

impl Document {
    pub fn new(id: DocumentId, name: impl Into<String>) -> Self {
        Self::with_max_length(id, name, DEFAULT_MAX_DOCUMENT_LENGTH)
    }

    pub fn with_max_length(id: DocumentId, name: impl Into<String>, max_length: usize) -> Self {
        Self {
            id,
            name: name.into(),
            buffer: TextBuffer::with_max_len(max_length),
            style: Style::default(),
            queue: ResolutionQueue::new(id),
            attached: HashSet::new(),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Uniqueness is enforced by the store, which is the only caller.
    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn text(&self) -> String {
        self.buffer.as_str().to_string()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            name: self.name.clone(),
            text: self.text(),
        }
    }

    pub fn insert(&mut self, pos: usize, text: &str) -> Result<(), DocumentError> {
        self.buffer.insert(pos, text)
    }

    pub fn delete(&mut self, begin: usize, end: usize) -> Result<(), DocumentError> {
        self.buffer.delete(begin, end).map(|_| ())
    }

    /// Upper bound on the length after substituting `replacement` for `matches`.
    /// Each `$` group reference expands to at most the whole match.
    fn replaced_length_bound<'t>(
        &self,
        matches: impl Iterator<Item = regex::Match<'t>>,
        replacement: &str,
    ) -> usize {
        let literal = replacement.chars().count();
        let references = replacement.matches('$').count();
        matches.fold(self.buffer.len(), |bound, found| {
            let matched = found.as_str().chars().count();
            bound
                .saturating_sub(matched)
                .saturating_add(literal)
                .saturating_add(references.saturating_mul(matched))
        })
    }

    /// Replaces the first match of `pattern`. Returns whether anything matched.
    pub fn replace_one(&mut self, pattern: &Regex, replacement: &str) -> Result<bool, DocumentError> {
        let Some(found) = pattern.find(self.buffer.as_str()) else {
            return Ok(false);
        };
        let bound = self.replaced_length_bound(std::iter::once(found), replacement);
        self.buffer.check_length(bound)?;

        let replaced = pattern.replace(self.buffer.as_str(), replacement).into_owned();
        self.buffer.replace_with(replaced);
        Ok(true)
    }

    /// Replaces every match of `pattern`. Returns the number of matches.
    pub fn replace_all(&mut self, pattern: &Regex, replacement: &str) -> Result<usize, DocumentError> {
        let count = pattern.find_iter(self.buffer.as_str()).count();
        if count == 0 {
            return Ok(0);
        }
        let bound = self.replaced_length_bound(pattern.find_iter(self.buffer.as_str()), replacement);
        self.buffer.check_length(bound)?;

        let replaced = pattern.replace_all(self.buffer.as_str(), replacement).into_owned();
        self.buffer.replace_with(replaced);
        Ok(count)
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn queue(&self) -> &ResolutionQueue {
        &self.queue
    }

    /// Queues an edit behind everything already pending on this document.
    pub fn submit(&mut self, request: Request) -> Result<RequestId, DocumentError> {
        self.queue.add_request(request)
    }

    /// Resolves the request at the head of the queue against the live text.
    pub fn resolve_request(&mut self) -> Result<Option<Request>, DocumentError> {
        self.queue.resolve_request(&mut self.buffer)
    }

    /// Queues `request` and drains the queue, returning the resulting text.
    pub fn edit(&mut self, request: Request) -> Result<String, DocumentError> {
        self.submit(request)?;
        while !self.queue.is_empty() {
            self.resolve_request()?;
        }
        Ok(self.text())
    }

    pub fn attach(&mut self, session: Uuid) {
        self.attached.insert(session);
    }

    pub fn detach(&mut self, session: Uuid) {
        self.attached.remove(&session);
    }

    pub fn attached_sessions(&self) -> impl Iterator<Item = &Uuid> {
        self.attached.iter()
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.buffer == other.buffer
    }
}

impl Eq for Document {}

impl Hash for Document {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.buffer.hash(state);
    }
}
