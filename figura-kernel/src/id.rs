/// The identifier of an entity in a document: a point, segment, circle,
/// arc or constraint. Stable for the lifetime of the document.
pub type Id = u32;

/// Generates an incrementing sequence of IDs starting from 0.
/// Ids are never reused, even after the entity they named is deleted.
/// ```
/// use figura_kernel::IdGenerator;
/// let mut ids = IdGenerator::default();
/// assert_eq!(ids.next_id(), 0);
/// assert_eq!(ids.next_id(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    next: Id,
}

impl IdGenerator {
    /// Hand out the next fresh id.
    pub fn next_id(&mut self) -> Id {
        let out = self.next;
        self.next += 1;
        out
    }
}
