// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};

use crate::LayoutConfig;

/// A unit of background layout work.
pub type LayoutTask = Box<dyn FnOnce() + Send + 'static>;

/// Scheduling class of a [`LayoutTask`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Priority {
    /// Work for content that is not on screen.
    #[default]
    Background,
    /// Work for content that was painted recently; runs first.
    Visible,
}

/// Queue of layout tasks served by worker threads.
///
/// Workers always take visible work before background work. A queue without workers
/// only runs tasks when [`LayoutQueue::run_pending`] is called, which makes scheduling
/// deterministic for callers that drive it themselves. Dropping the last handle
/// disconnects the channels; workers finish the task in hand and exit.
pub struct LayoutQueue {
    visible: (Sender<LayoutTask>, Receiver<LayoutTask>),
    background: (Sender<LayoutTask>, Receiver<LayoutTask>),
    workers: usize,
}

impl fmt::Debug for LayoutQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutQueue")
            .field("workers", &self.workers)
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

impl LayoutQueue {
    /// Creates a queue served by `worker_threads` threads.
    ///
    /// Threads that fail to start are logged and skipped.
    pub fn new(worker_threads: usize) -> Arc<Self> {
        let visible = unbounded();
        let background = unbounded();
        let mut workers = 0;
        for index in 0..worker_threads {
            let urgent = visible.1.clone();
            let rest = background.1.clone();
            let spawned = thread::Builder::new()
                .name(format!("flowbox-layout-{index}"))
                .spawn(move || work(&urgent, &rest));
            match spawned {
                Ok(_) => workers += 1,
                Err(err) => {
                    tracing::error!(target: "flowbox.queue", index, %err, "failed to start layout worker");
                }
            }
        }
        tracing::debug!(target: "flowbox.queue", workers, "layout queue started");
        Arc::new(Self {
            visible,
            background,
            workers,
        })
    }

    /// Creates a queue with [`LayoutConfig::worker_threads`] workers.
    pub fn from_config(config: &LayoutConfig) -> Arc<Self> {
        Self::new(config.worker_threads)
    }

    /// Creates a queue without workers.
    pub fn manual() -> Arc<Self> {
        Self::new(0)
    }

    /// Number of running worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queues a background task.
    pub fn add_task(&self, task: LayoutTask) {
        self.submit(Priority::Background, task);
    }

    /// Queues a task at `priority`.
    pub fn submit(&self, priority: Priority, task: LayoutTask) {
        let sender = match priority {
            Priority::Visible => &self.visible.0,
            Priority::Background => &self.background.0,
        };
        // The receivers live as long as `self`, so sending cannot fail here.
        if sender.send(task).is_err() {
            tracing::warn!(target: "flowbox.queue", "layout task dropped");
        }
    }

    /// Number of tasks waiting.
    pub fn pending(&self) -> usize {
        self.visible.1.len() + self.background.1.len()
    }

    /// Runs queued tasks on the calling thread until none are left, including tasks
    /// queued by the tasks themselves. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self
            .visible
            .1
            .try_recv()
            .or_else(|_| self.background.1.try_recv())
            .ok()
        {
            task();
            ran += 1;
        }
        ran
    }
}

fn work(visible: &Receiver<LayoutTask>, background: &Receiver<LayoutTask>) {
    loop {
        let task = match visible.try_recv() {
            Ok(task) => Some(task),
            Err(TryRecvError::Disconnected) => None,
            Err(TryRecvError::Empty) => crossbeam_channel::select! {
                recv(visible) -> task => task.ok(),
                recv(background) -> task => task.ok(),
            },
        };
        let Some(task) = task else {
            break;
        };
        task();
    }
    tracing::debug!(target: "flowbox.queue", "layout worker stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn visible_tasks_run_first() {
        let queue = LayoutQueue::manual();
        let order = Arc::new(Mutex::new(Vec::new()));
        for (name, priority) in [("a", Priority::Background), ("b", Priority::Visible)] {
            let order = order.clone();
            queue.submit(priority, Box::new(move || order.lock().unwrap().push(name)));
        }
        assert_eq!(queue.pending(), 2);
        assert_eq!(queue.run_pending(), 2);
        assert_eq!(*order.lock().unwrap(), ["b", "a"]);
    }

    #[test]
    fn tasks_queued_while_draining_also_run() {
        let queue = LayoutQueue::manual();
        let inner = queue.clone();
        let hits = Arc::new(Mutex::new(0));
        let counter = hits.clone();
        queue.add_task(Box::new(move || {
            let counter = counter.clone();
            inner.add_task(Box::new(move || *counter.lock().unwrap() += 1));
        }));
        assert_eq!(queue.run_pending(), 2);
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn config_sets_worker_count() {
        let queue = LayoutQueue::from_config(&LayoutConfig::default().with_worker_threads(0));
        assert_eq!(queue.workers(), 0);
        queue.add_task(Box::new(|| {}));
        assert_eq!(queue.pending(), 1);
    }

    #[test]
    fn workers_run_tasks() {
        let queue = LayoutQueue::new(2);
        assert_eq!(queue.workers(), 2);
        let (tx, rx) = mpsc::channel();
        for i in 0..4 {
            let tx = tx.clone();
            queue.add_task(Box::new(move || tx.send(i).unwrap()));
        }
        let mut seen: Vec<i32> = (0..4)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, [0, 1, 2, 3]);
    }
}
