use std::collections::VecDeque;

use tracing::debug;

use super::document::{DocumentId, TextBuffer};
use super::error::DocumentError;
use super::request::{Request, RequestId, Transform};

/// Pending edits for exactly one document, resolved strictly in arrival order.
///
/// Resolving the head applies it to the text and rebases every request still
/// waiting behind it, left to right, in a single pass.
#[derive(Debug)]
pub struct ResolutionQueue {
    document: DocumentId,
    pending: VecDeque<Request>,
}

impl ResolutionQueue {
    pub fn new(document: DocumentId) -> Self {
        Self {
            document,
            pending: VecDeque::new(),
        }
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.pending.iter()
    }

    fn check_owner(&self, request: &Request) -> Result<(), DocumentError> {
        if request.document() != self.document {
            return Err(DocumentError::ForeignRequest {
                request: request.document(),
                queue: self.document,
            });
        }
        Ok(())
    }

    pub fn add_request(&mut self, request: Request) -> Result<RequestId, DocumentError> {
        self.check_owner(&request)?;
        let id = request.id();
        self.pending.push_back(request);
        Ok(id)
    }

    /// Inserts at `index`, or at the back when `index` is past the end.
    pub fn add_request_at_index(&mut self, index: usize, request: Request) -> Result<(), DocumentError> {
        self.check_owner(&request)?;
        let index = index.min(self.pending.len());
        self.pending.insert(index, request);
        Ok(())
    }

    pub fn find_request(&self, id: RequestId) -> Option<usize> {
        self.pending.iter().position(|request| request.id() == id)
    }

    pub fn remove_request(&mut self, id: RequestId) -> Option<Request> {
        let index = self.find_request(id)?;
        self.pending.remove(index)
    }

    /// Pops the head, applies it, then transforms every remaining request
    /// against it. Split remainders spliced in during the pass are visited too.
    ///
    /// Returns the resolved request, or `None` if the queue was empty. If the
    /// head fails to apply it is dropped and nothing else changes.
    pub fn resolve_request(&mut self, buffer: &mut TextBuffer) -> Result<Option<Request>, DocumentError> {
        let Some(mut head) = self.pending.pop_front() else {
            return Ok(None);
        };
        head.apply_edit(buffer)?;
        debug!("Resolved {} on {}", head, self.document);

        let mut index = 0;
        while index < self.pending.len() {
            match self.pending[index].apply_transform(&head) {
                Transform::Redundant => {
                    let id = self.pending[index].id();
                    self.remove_request(id);
                    debug!("Dropped redundant request {} on {}", id, self.document);
                    continue;
                }
                Transform::Split(remainder) => {
                    debug!("Split pending delete on {}: remainder {}", self.document, remainder);
                    self.add_request_at_index(index + 1, remainder)?;
                }
                Transform::Unchanged | Transform::Shifted => {}
            }
            index += 1;
        }

        Ok(Some(head))
    }
}
