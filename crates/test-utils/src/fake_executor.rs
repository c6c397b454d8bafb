use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http_cmd::exec::{ExecutorBackend, Harvest};

/// A fake executor that:
/// - records which command lines were "run" (with their timeout)
/// - optionally takes `delay` before finishing, then records completion
/// - reports a successful `Harvest` echoing the command.
#[derive(Clone, Default)]
pub struct FakeExecutor {
    executed: Arc<Mutex<Vec<(String, Duration)>>>,
    completed: Arc<Mutex<Vec<String>>>,
    delay: Duration,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every run sleeps for `delay` before it completes.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Command lines whose run finished, in completion order.
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    /// Snapshot of everything executed so far, in call order.
    pub fn executed(&self) -> Vec<(String, Duration)> {
        self.executed.lock().unwrap().clone()
    }
}

impl ExecutorBackend for FakeExecutor {
    fn run<'a>(
        &'a self,
        cmdline: &'a str,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Harvest> + Send + 'a>> {
        Box::pin(async move {
            {
                let mut guard = self.executed.lock().unwrap();
                guard.push((cmdline.to_string(), timeout));
            }

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.completed.lock().unwrap().push(cmdline.to_string());

            Harvest {
                original_command: cmdline.to_string(),
                executed_command: cmdline.to_string(),
                return_code: 0,
                timeout_reached: false,
                pid: 4242,
                stdout: format!("fake: {cmdline}\n"),
                stderr: String::new(),
            }
        })
    }
}
