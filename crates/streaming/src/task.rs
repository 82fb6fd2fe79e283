//! Units of background work with explicit poll and join.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

/// Where tile jobs run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Executor {
    /// One named OS thread per job.
    #[default]
    Threaded,
    /// Run the job to completion inside `spawn`. Deterministic; for tests and hosts
    /// without threads.
    Inline,
}

enum TaskState<T> {
    Running(JoinHandle<T>),
    Finished(thread::Result<T>),
}

/// Handle to a job started with [`TaskHandle::spawn`].
///
/// Dropping a running handle detaches the thread; owners that must not outlive the
/// job call [`TaskHandle::join`].
pub struct TaskHandle<T> {
    name: String,
    state: TaskState<T>,
}

impl<T: Send + 'static> TaskHandle<T> {
    pub fn spawn<F>(executor: Executor, name: impl Into<String>, job: F) -> io::Result<Self>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let name = name.into();
        let state = match executor {
            Executor::Threaded => {
                TaskState::Running(thread::Builder::new().name(name.clone()).spawn(job)?)
            }
            Executor::Inline => TaskState::Finished(panic::catch_unwind(AssertUnwindSafe(job))),
        };
        Ok(Self { name, state })
    }
}

impl<T> TaskHandle<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the job has completed (successfully or by panicking). Never blocks.
    pub fn is_finished(&self) -> bool {
        match &self.state {
            TaskState::Running(handle) => handle.is_finished(),
            TaskState::Finished(_) => true,
        }
    }

    /// Take the result if the job has completed, otherwise hand the task back.
    pub fn try_join(self) -> Result<thread::Result<T>, Self> {
        if self.is_finished() {
            Ok(self.join())
        } else {
            Err(self)
        }
    }

    /// Wait for the job and take its result. `Err` carries the panic payload.
    pub fn join(self) -> thread::Result<T> {
        match self.state {
            TaskState::Running(handle) => handle.join(),
            TaskState::Finished(result) => result,
        }
    }
}

impl<T> std::fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("name", &self.name)
            .field("finished", &self.is_finished())
            .finish()
    }
}
