//! Parallelization helpers for pixel loops
//!
//! Generic wrappers that dispatch between rayon and sequential execution
//! based on data size, so small test images do not pay thread-pool overhead.

use rayon::prelude::*;

/// Minimum number of pixels to trigger parallel processing
pub(crate) const PARALLEL_THRESHOLD: usize = 30_000;

/// Parallel fold/reduce over chunks with automatic threshold-based dispatch
///
/// `chunk_size` is the number of elements per item (3 for interleaved RGB).
pub(crate) fn parallel_fold_reduce<T, A, I, F, R>(
    data: &[T],
    chunk_size: usize,
    init: I,
    fold_fn: F,
    reduce_fn: R,
) -> A
where
    T: Sync,
    A: Send + Clone,
    I: Fn() -> A + Sync,
    F: Fn(A, &[T]) -> A + Sync,
    R: Fn(A, A) -> A + Sync,
{
    let num_elements = data.len() / chunk_size;

    if num_elements >= PARALLEL_THRESHOLD {
        data.par_chunks_exact(chunk_size)
            .fold(&init, &fold_fn)
            .reduce(&init, &reduce_fn)
    } else {
        let mut acc = init();
        for chunk in data.chunks_exact(chunk_size) {
            acc = fold_fn(acc, chunk);
        }
        acc
    }
}

/// Parallel for-each over enumerated mutable chunks
///
/// The closure receives the chunk index so callers can look up per-pixel
/// data held in separate planes.
pub(crate) fn parallel_for_each_chunk_mut<T, F>(data: &mut [T], chunk_size: usize, f: F)
where
    T: Send + Sync,
    F: Fn(usize, &mut [T]) + Sync,
{
    let num_elements = data.len() / chunk_size;

    if num_elements >= PARALLEL_THRESHOLD {
        data.par_chunks_exact_mut(chunk_size)
            .enumerate()
            .for_each(|(i, chunk)| f(i, chunk));
    } else {
        for (i, chunk) in data.chunks_exact_mut(chunk_size).enumerate() {
            f(i, chunk)
        }
    }
}

/// Parallel for-each over enumerated mutable rows with a caller-chosen
/// threshold
///
/// Stages whose per-pixel cost dwarfs the dispatch overhead (the non-local
/// means filter) pass a much lower threshold than `PARALLEL_THRESHOLD`.
pub(crate) fn parallel_for_each_row_mut<T, F>(
    data: &mut [T],
    row_len: usize,
    min_pixels: usize,
    f: F,
) where
    T: Send + Sync,
    F: Fn(usize, &mut [T]) + Sync,
{
    if data.len() >= min_pixels {
        data.par_chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    } else {
        for (y, row) in data.chunks_exact_mut(row_len).enumerate() {
            f(y, row)
        }
    }
}
