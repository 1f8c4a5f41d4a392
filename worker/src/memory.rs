use std::num::NonZeroUsize;

use ndarray::{Array2, ArrayView2, Axis, s};
use rand::Rng;

use crate::{Result, WorkerErr};

/// A fixed capacity ring buffer of transition rows.
///
/// Once full, every new row overwrites the oldest one.
#[derive(Debug, Clone)]
pub struct Memory {
    rows: Array2<f32>,
    pointer: usize,
    len: usize,
}

impl Memory {
    /// Creates a new, zeroed, `Memory`.
    ///
    /// # Arguments
    /// * `capacity` - The amount of rows kept.
    /// * `width` - The width of every row.
    pub fn new(capacity: NonZeroUsize, width: usize) -> Self {
        Self {
            rows: Array2::zeros((capacity.get(), width)),
            pointer: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.rows.nrows()
    }

    pub fn width(&self) -> usize {
        self.rows.ncols()
    }

    /// The index the next row will be written at.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// The amount of rows written so far, up to the capacity.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The rows written so far, in storage order.
    pub fn rows(&self) -> ArrayView2<'_, f32> {
        self.rows.slice(s![..self.len, ..])
    }

    /// Appends a batch of rows, wrapping around the end of the buffer.
    ///
    /// A batch longer than the capacity only keeps its last `capacity` rows, as if
    /// it had been written one row at a time.
    ///
    /// # Arguments
    /// * `batch` - The rows to store.
    ///
    /// # Returns
    /// A `WorkerErr::RowWidthMismatch` if the rows don't have the memory's width.
    pub fn store_batch(&mut self, batch: ArrayView2<f32>) -> Result<()> {
        if batch.ncols() != self.width() {
            return Err(WorkerErr::RowWidthMismatch {
                got: batch.ncols(),
                expected: self.width(),
            });
        }

        let capacity = self.capacity();
        let skipped = batch.nrows().saturating_sub(capacity);
        let batch = batch.slice(s![skipped.., ..]);
        let start = (self.pointer + skipped) % capacity;
        let n = batch.nrows();

        let space_left = capacity - start;
        if n > space_left {
            let (head, tail) = batch.split_at(Axis(0), space_left);
            self.rows.slice_mut(s![start.., ..]).assign(&head);
            self.rows.slice_mut(s![..tail.nrows(), ..]).assign(&tail);
        } else {
            self.rows.slice_mut(s![start..start + n, ..]).assign(&batch);
        }

        self.pointer = (start + n) % capacity;
        self.len = (self.len + batch.nrows() + skipped).min(capacity);
        Ok(())
    }

    /// Draws `n` rows uniformly, with replacement, from the rows written so far.
    ///
    /// # Returns
    /// The sampled rows or `WorkerErr::EmptyMemory` if nothing was stored yet.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Array2<f32>> {
        if self.is_empty() {
            return Err(WorkerErr::EmptyMemory);
        }

        let indices: Vec<usize> = (0..n).map(|_| rng.random_range(0..self.len)).collect();
        Ok(self.rows.select(Axis(0), &indices))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn rows(from: usize, n: usize) -> Array2<f32> {
        Array::from_shape_fn((n, 2), |(i, j)| ((from + i) * 10 + j) as f32)
    }

    fn memory(capacity: usize) -> Memory {
        Memory::new(NonZeroUsize::new(capacity).unwrap(), 2)
    }

    #[test]
    fn pointer_advances_until_it_wraps() {
        let mut memory = memory(5);

        memory.store_batch(rows(0, 3).view()).unwrap();
        assert_eq!(memory.pointer(), 3);
        assert_eq!(memory.len(), 3);

        memory.store_batch(rows(3, 2).view()).unwrap();
        assert_eq!(memory.pointer(), 0);
        assert_eq!(memory.len(), 5);
        assert_eq!(memory.rows(), rows(0, 5));
    }

    #[test]
    fn batch_splits_across_the_boundary() {
        let mut memory = memory(5);
        memory.store_batch(rows(0, 4).view()).unwrap();
        memory.store_batch(rows(4, 3).view()).unwrap();

        assert_eq!(memory.pointer(), 2);
        assert_eq!(memory.rows().row(0), rows(5, 1).row(0));
        assert_eq!(memory.rows().row(1), rows(6, 1).row(0));
        assert_eq!(memory.rows().row(2), rows(2, 1).row(0));
        assert_eq!(memory.rows().row(4), rows(4, 1).row(0));
    }

    #[test]
    fn oversized_batch_keeps_its_tail() {
        let mut memory = memory(4);
        memory.store_batch(rows(0, 1).view()).unwrap();
        memory.store_batch(rows(1, 9).view()).unwrap();

        // rows 6..10 written one at a time starting at pointer 1
        assert_eq!(memory.pointer(), 2);
        assert_eq!(memory.len(), 4);
        for (slot, row) in [(2, 6), (3, 7), (0, 8), (1, 9)] {
            assert_eq!(memory.rows().row(slot), rows(row, 1).row(0));
        }
    }

    #[test]
    fn samples_only_written_rows() {
        let mut memory = memory(500);
        let mut rng = StdRng::seed_from_u64(0);

        memory
            .store_batch(Array2::ones((7, 2)).view())
            .unwrap();

        let sample = memory.sample(100, &mut rng).unwrap();
        assert_eq!(sample.dim(), (100, 2));
        assert!(sample.iter().all(|&x| x == 1.));
    }

    #[test]
    fn empty_memory_cannot_be_sampled() {
        let memory = memory(3);
        let mut rng = StdRng::seed_from_u64(0);

        assert!(matches!(
            memory.sample(1, &mut rng),
            Err(WorkerErr::EmptyMemory)
        ));
    }

    #[test]
    fn rejects_rows_of_the_wrong_width() {
        let mut memory = memory(3);

        assert!(matches!(
            memory.store_batch(Array2::zeros((1, 3)).view()),
            Err(WorkerErr::RowWidthMismatch { got: 3, expected: 2 })
        ));
    }
}
