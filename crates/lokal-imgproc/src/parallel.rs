use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// Input and output sizes do not match.
    #[error("source and destination slices must have the same length")]
    SizeMismatch,
}

/// Controls how the planes and rows of an operator are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Process planes and rows in parallel on the global Rayon thread pool.
    ///
    /// Rows of a plane never depend on each other's output, so this is always safe.
    #[default]
    ParallelRows,

    /// Process planes in parallel, the rows of each plane sequentially.
    ///
    /// Useful for stacks of many small planes.
    ParallelPlanes,

    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),
}

impl ExecutionStrategy {
    fn parallel_planes(&self) -> bool {
        !matches!(self, ExecutionStrategy::Serial)
    }

    fn parallel_rows(&self) -> bool {
        matches!(
            self,
            ExecutionStrategy::ParallelRows | ExecutionStrategy::Fixed(_)
        )
    }
}

/// Apply `f` to every source plane together with the matching plane of `dst`.
///
/// `dst` holds one consecutive block of `plane_len` samples per entry of `planes`. `f`
/// receives the plane index, the source plane and the destination plane; destination planes
/// are disjoint, so no synchronization is needed beyond the split.
///
/// # Errors
///
/// Returns an error if `dst` does not hold exactly one block per source plane, or if a local
/// thread pool cannot be built.
pub fn par_iter_planes<P, O, F>(
    planes: &[P],
    dst: &mut [O],
    plane_len: usize,
    strategy: ExecutionStrategy,
    f: F,
) -> Result<(), ParallelError>
where
    P: Sync,
    O: Send,
    F: Fn(usize, &P, &mut [O]) + Sync + Send,
{
    if planes.len() * plane_len != dst.len() {
        return Err(ParallelError::SizeMismatch);
    }

    if plane_len == 0 {
        return Ok(());
    }

    let run = |dst: &mut [O]| {
        if strategy.parallel_planes() {
            planes
                .par_iter()
                .zip(dst.par_chunks_exact_mut(plane_len))
                .enumerate()
                .for_each(|(index, (src_plane, dst_plane))| f(index, src_plane, dst_plane));
        } else {
            planes
                .iter()
                .zip(dst.chunks_exact_mut(plane_len))
                .enumerate()
                .for_each(|(index, (src_plane, dst_plane))| f(index, src_plane, dst_plane));
        }
    };

    match strategy {
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            pool.install(|| run(dst));
        }
        _ => run(dst),
    }

    Ok(())
}

/// Apply `f` to every row of a destination plane.
///
/// `f` receives the row index and the mutable row of `width` samples.
pub fn par_iter_rows<O, F>(dst: &mut [O], width: usize, strategy: ExecutionStrategy, f: F)
where
    O: Send,
    F: Fn(usize, &mut [O]) + Sync + Send,
{
    if width == 0 {
        return;
    }

    if strategy.parallel_rows() {
        dst.par_chunks_exact_mut(width)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    } else {
        dst.chunks_exact_mut(width)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn double_planes(strategy: ExecutionStrategy) -> Result<Vec<i32>, ParallelError> {
        let src = vec![[1, 2], [3, 4], [5, 6]];
        let mut dst = vec![0; 6];
        par_iter_planes(&src, &mut dst, 2, strategy, |index, s, d| {
            for (s, d) in s.iter().zip(d.iter_mut()) {
                *d = *s * 2 + index as i32 * 100;
            }
        })?;
        Ok(dst)
    }

    #[test]
    fn test_planes_serial() -> Result<(), ParallelError> {
        assert_eq!(
            double_planes(ExecutionStrategy::Serial)?,
            vec![2, 4, 106, 108, 210, 212]
        );
        Ok(())
    }

    #[test]
    fn test_planes_parallel() -> Result<(), ParallelError> {
        let expected = vec![2, 4, 106, 108, 210, 212];
        assert_eq!(double_planes(ExecutionStrategy::ParallelPlanes)?, expected);
        assert_eq!(double_planes(ExecutionStrategy::ParallelRows)?, expected);
        Ok(())
    }

    #[test]
    fn test_planes_fixed_success() -> Result<(), ParallelError> {
        assert_eq!(
            double_planes(ExecutionStrategy::Fixed(2))?,
            vec![2, 4, 106, 108, 210, 212]
        );
        Ok(())
    }

    #[test]
    fn test_planes_fixed_error() {
        let res = double_planes(ExecutionStrategy::Fixed(0));
        assert!(matches!(res, Err(ParallelError::InvalidThreadCount(0))));
    }

    #[test]
    fn test_planes_size_mismatch() {
        let src: Vec<[i32; 1]> = vec![[1], [2], [3]];
        let mut dst = vec![0; 2];
        let res = par_iter_planes(&src, &mut dst, 1, ExecutionStrategy::Serial, |_, _, _| {});
        assert_eq!(res, Err(ParallelError::SizeMismatch));
    }

    #[test]
    fn test_rows() {
        for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::ParallelRows] {
            let mut dst = vec![0usize; 6];
            par_iter_rows(&mut dst, 3, strategy, |y, row| {
                row.iter_mut().enumerate().for_each(|(x, v)| *v = y * 10 + x);
            });
            assert_eq!(dst, vec![0, 1, 2, 10, 11, 12]);
        }
    }
}
