use {super::*, rayon::prelude::*};

/// A fixed-size thread pool that processes items in partitions. Partitions run one after
/// another; every job of a partition runs to completion before errors are looked at, and the
/// error with the lowest index wins.
pub(crate) struct WorkerPool {
  pool: rayon::ThreadPool,
  partition_size: usize,
}

impl WorkerPool {
  pub(crate) fn new(workers: usize, partition_size: usize) -> Result<Self> {
    Ok(Self {
      pool: rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|index| format!("ledger-worker-{index}"))
        .build()
        .context("failed to build worker pool")?,
      partition_size: partition_size.max(1),
    })
  }

  pub(crate) fn run<T, R, F>(&self, items: &[T], job: F) -> Result<Vec<R>>
  where
    T: Sync,
    R: Send,
    F: Fn(&T) -> Result<R> + Sync,
  {
    let mut output = Vec::with_capacity(items.len());

    for partition in items.chunks(self.partition_size) {
      let results = self
        .pool
        .install(|| partition.par_iter().map(&job).collect::<Vec<Result<R>>>());

      for result in results {
        output.push(result?);
      }
    }

    Ok(output)
  }
}

#[cfg(test)]
mod tests {
  use {
    super::*,
    std::sync::atomic::{AtomicUsize, Ordering},
  };

  #[test]
  fn preserves_order() {
    let pool = WorkerPool::new(4, 3).unwrap();
    let items = (0..10u64).collect::<Vec<_>>();
    assert_eq!(
      pool.run(&items, |n| Ok(n * 2)).unwrap(),
      (0..10u64).map(|n| n * 2).collect::<Vec<_>>()
    );
  }

  #[test]
  fn lowest_index_error_wins_and_partition_is_drained() {
    let pool = WorkerPool::new(4, 5).unwrap();
    let calls = AtomicUsize::new(0);
    let items = (0..20).collect::<Vec<usize>>();

    let err = pool
      .run(&items, |n| {
        calls.fetch_add(1, Ordering::SeqCst);
        if *n == 6 || *n == 8 {
          bail!("job {n} failed");
        }
        Ok(*n)
      })
      .unwrap_err();

    assert_eq!(err.to_string(), "job 6 failed");
    // the second partition ran to completion, later partitions never started
    assert_eq!(calls.load(Ordering::SeqCst), 10);
  }

  #[test]
  fn empty_input() {
    let pool = WorkerPool::new(2, 20).unwrap();
    assert!(pool.run(&Vec::<u8>::new(), |n| Ok(*n)).unwrap().is_empty());
  }
}
