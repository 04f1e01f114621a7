/// Indices of the particles still being simulated.
#[derive(Clone, Debug, Default)]
pub struct ActiveIndexSet {
    indices: Vec<usize>,
}

impl ActiveIndexSet {
    /// All indices `0..n`, in order.
    pub fn new(n: usize) -> ActiveIndexSet {
        ActiveIndexSet {
            indices: (0..n).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &usize> {
        self.indices.iter()
    }

    /// Visit every index exactly once, dropping those for which `keep` returns false.
    /// Returns the number of indices removed.
    pub fn retain_pass<F: FnMut(usize) -> bool>(&mut self, mut keep: F) -> usize {
        let mut cursor = 0;
        let mut removed = 0;

        while cursor < self.indices.len() {
            if keep(self.indices[cursor]) {
                cursor += 1;
            } else {
                //The former last index now sits at the cursor and has not been visited yet
                self.indices.swap_remove(cursor);
                removed += 1;
            }
        }

        removed
    }
}
