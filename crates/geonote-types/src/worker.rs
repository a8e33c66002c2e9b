//! Worker pool for CPU-bound work (password hashing) that must stay off the async executor.
//!
//! Two queues: `run_immed` jobs (login checks, a user is waiting) are always taken before
//! `run` jobs (registration hashing).

use flume::{Receiver, Sender};
use futures::channel::oneshot;
use std::{future::Future, sync::Arc, thread};

use crate::prelude::*;

type Job = Box<dyn FnOnce() + Send>;
type JobQueue = Arc<Receiver<Job>>;

#[derive(Debug)]
pub struct WorkerPool {
	high: Sender<Job>,
	normal: Sender<Job>,
}

impl WorkerPool {
	/// Spawns `n_high` threads serving only the high priority queue and `n_normal`
	/// threads serving both queues.
	pub fn new(n_high: usize, n_normal: usize) -> Self {
		let (high, rx_high) = flume::unbounded();
		let (normal, rx_normal) = flume::unbounded();

		let rx_high: JobQueue = Arc::new(rx_high);
		let rx_normal: JobQueue = Arc::new(rx_normal);

		for _ in 0..n_high {
			let rx_high = Arc::clone(&rx_high);
			thread::spawn(move || worker_loop(&[rx_high]));
		}

		for _ in 0..n_normal {
			let rx_high = Arc::clone(&rx_high);
			let rx_normal = Arc::clone(&rx_normal);
			thread::spawn(move || worker_loop(&[rx_high, rx_normal]));
		}

		Self { high, normal }
	}

	fn submit<F, T>(queue: &Sender<Job>, f: F) -> impl Future<Output = GnResult<T>> + use<F, T>
	where
		F: FnOnce() -> T + Send + 'static,
		T: Send + 'static,
	{
		let (res_tx, res_rx) = oneshot::channel();

		let job: Job = Box::new(move || {
			let result = f();
			let _ignore = res_tx.send(result);
		});

		if queue.send(job).is_err() {
			error!("Failed to send job to worker queue");
		}

		async move {
			res_rx.await.map_err(|_| {
				error!("Worker dropped result channel (task may have panicked)");
				Error::Internal("worker task failed".into())
			})
		}
	}

	pub fn run<F, T>(&self, f: F) -> impl Future<Output = GnResult<T>> + use<F, T>
	where
		F: FnOnce() -> T + Send + 'static,
		T: Send + 'static,
	{
		Self::submit(&self.normal, f)
	}

	pub fn run_immed<F, T>(&self, f: F) -> impl Future<Output = GnResult<T>> + use<F, T>
	where
		F: FnOnce() -> T + Send + 'static,
		T: Send + 'static,
	{
		Self::submit(&self.high, f)
	}

	/// Like `run`, but flattens `GnResult<GnResult<T>>` into `GnResult<T>`.
	pub fn try_run<F, T>(&self, f: F) -> impl Future<Output = GnResult<T>> + use<F, T>
	where
		F: FnOnce() -> GnResult<T> + Send + 'static,
		T: Send + 'static,
	{
		let fut = self.run(f);
		async move { fut.await? }
	}

	/// Like `run_immed`, but flattens `GnResult<GnResult<T>>` into `GnResult<T>`.
	pub fn try_run_immed<F, T>(&self, f: F) -> impl Future<Output = GnResult<T>> + use<F, T>
	where
		F: FnOnce() -> GnResult<T> + Send + 'static,
		T: Send + 'static,
	{
		let fut = self.run_immed(f);
		async move { fut.await? }
	}
}

fn worker_loop(queues: &[JobQueue]) {
	loop {
		// Try higher-priority queues first (non-blocking)
		let mut job = None;
		for rx in queues {
			if let Ok(j) = rx.try_recv() {
				job = Some(j);
				break;
			}
		}

		let job = match job {
			Some(job) => job,
			None => {
				let mut selector = flume::Selector::new();
				for rx in queues {
					selector = selector.recv(rx, |res| res);
				}
				match selector.wait() {
					Ok(job) => job,
					// All senders dropped: the pool is gone
					Err(flume::RecvError::Disconnected) => return,
				}
			}
		};

		if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)) {
			error!("Worker thread caught panic: {:?}", e);
		}
	}
}


// vim: ts=4
