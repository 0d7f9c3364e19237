use foundation::handles::Handle;

/// Row in the world's component columns. Entities are never despawned, so
/// the generation stays zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntityId(pub Handle);

impl EntityId {
    pub(crate) fn from_row(row: usize) -> Self {
        EntityId(Handle::new(row as u32, 0))
    }

    pub fn index(&self) -> u32 {
        self.0.index()
    }

    pub(crate) fn row(&self) -> usize {
        self.0.index() as usize
    }
}
