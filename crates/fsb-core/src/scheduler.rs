//! One-shot delayed jobs.
//!
//! A job fires at most once and cannot be cancelled. Nothing survives a
//! restart.

use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::time::sleep;

pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub trait OnceScheduler: Send + Sync {
    /// Run `job` once, `delay` from now.
    fn schedule_once(&self, delay: Duration, job: Job);

    /// Jobs scheduled but not yet fired.
    fn outstanding(&self) -> usize;
}

/// Scheduler backed by one tokio task per job.
///
/// Must be used from within a tokio runtime.
#[derive(Clone, Default)]
pub struct TokioScheduler {
    outstanding: Arc<AtomicUsize>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OnceScheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, job: Job) {
        let outstanding = self.outstanding.clone();
        outstanding.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            sleep(delay).await;
            outstanding.fetch_sub(1, Ordering::SeqCst);
            job.await;
        });
    }

    fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}
