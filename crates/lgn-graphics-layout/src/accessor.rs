use std::ops::Range;
use std::sync::Arc;

use crate::{Row, StructLayout};

/// A byte buffer seen as an array of `layout` structs.
///
/// The accessor does not own the memory behind `S` in any special way: a
/// mapped GPU buffer works as well as a `Vec<u8>`, keeping it alive and
/// fenced is up to the caller. The element count is
/// `storage.len() / layout.stride()`, trailing bytes are ignored.
#[derive(Debug, Clone)]
pub struct Accessor<S> {
    layout: Arc<StructLayout>,
    storage: S,
}

impl<S: AsRef<[u8]>> Accessor<S> {
    pub fn new(layout: Arc<StructLayout>, storage: S) -> Self {
        Self { layout, storage }
    }

    pub fn layout(&self) -> &Arc<StructLayout> {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.storage.as_ref().len() / self.layout.stride()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.storage.as_ref()
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Read view of element `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn get(&self, index: usize) -> Row<'_, &[u8]> {
        let range = self.row_range(index);
        Row::new(&self.layout, &self.storage.as_ref()[range])
    }

    pub fn iter(&self) -> impl Iterator<Item = Row<'_, &[u8]>> + '_ {
        (0..self.len()).map(move |index| self.get(index))
    }

    fn row_range(&self, index: usize) -> Range<usize> {
        let len = self.len();
        assert!(
            index < len,
            "index {} out of range for '{}' accessor of {} elements",
            index,
            self.layout.key(),
            len
        );
        let start = index * self.layout.stride();
        start..start + self.layout.size()
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> Accessor<S> {
    /// In place write view of element `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn get_mut(&mut self, index: usize) -> Row<'_, &mut [u8]> {
        let range = self.row_range(index);
        Row::new(&self.layout, &mut self.storage.as_mut()[range])
    }

    /// Replaces the bytes of element `index` with `row`, padding untouched.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()` or if `row` was built for another
    /// layout.
    pub fn set<B: AsRef<[u8]>>(&mut self, index: usize, row: &Row<'_, B>) {
        let range = self.row_range(index);
        assert!(
            std::ptr::eq(row.layout(), &*self.layout) || *row.layout() == *self.layout,
            "row of struct '{}' does not match the '{}' layout",
            row.layout().key(),
            self.layout.key()
        );
        self.storage.as_mut()[range].copy_from_slice(row.as_bytes());
    }
}

impl Accessor<Vec<u8>> {
    /// Allocates `count` zeroed elements.
    pub fn with_count(layout: Arc<StructLayout>, count: usize) -> Self {
        let storage = vec![0; layout.buffer_size(count)];
        Self { layout, storage }
    }

    /// Appends `row` as a new last element.
    ///
    /// # Panics
    ///
    /// Panics if `row` was built for another layout.
    pub fn push<B: AsRef<[u8]>>(&mut self, row: &Row<'_, B>) {
        let index = self.len();
        self.resize(index + 1);
        self.set(index, row);
    }

    /// Grows with zeroed elements or truncates to `count` elements.
    pub fn resize(&mut self, count: usize) {
        let size = self.layout.buffer_size(count);
        self.storage.resize(size, 0);
    }
}
