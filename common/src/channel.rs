//! Progress queries between the coordinator and a single copy worker
//!
//! The protocol has two messages: the coordinator sends a [`Request`] and the worker answers it
//! with a [`Report`] carrying the number of bytes copied so far. Workers never report unsolicited
//! and never wait for a request; they poll between blocks. Each direction is a bounded channel of
//! capacity one and the coordinator end tracks whether a request is outstanding, so at most one
//! request/report pair is in flight per worker.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};

/// Coordinator -> worker: "report current progress".
#[derive(Debug)]
pub struct Request;

/// Worker -> coordinator: cumulative bytes copied when the request was seen.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Report {
    pub bytes_copied: u64,
}

#[must_use]
pub fn progress_channel() -> (CoordinatorEnd, WorkerEnd) {
    let (request_tx, request_rx) = mpsc::channel(1);
    let (report_tx, report_rx) = mpsc::channel(1);
    (
        CoordinatorEnd {
            requests: request_tx,
            reports: report_rx,
            outstanding: false,
        },
        WorkerEnd {
            requests: request_rx,
            reports: report_tx,
        },
    )
}

#[derive(Debug)]
pub struct CoordinatorEnd {
    requests: mpsc::Sender<Request>,
    reports: mpsc::Receiver<Report>,
    outstanding: bool,
}

impl CoordinatorEnd {
    /// Sends a request unless one is already waiting for an answer. Returns `true` if sent.
    pub fn request(&mut self) -> bool {
        if self.outstanding {
            return false;
        }
        match self.requests.try_send(Request) {
            Ok(()) => {
                self.outstanding = true;
                true
            }
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Closed(_)) => {
                tracing::trace!("worker end is gone, not sending a progress request");
                false
            }
        }
    }

    /// Returns the answer to the outstanding request if it already arrived.
    pub fn try_report(&mut self) -> Option<Report> {
        match self.reports.try_recv() {
            Ok(report) => {
                self.outstanding = false;
                Some(report)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    #[must_use]
    pub fn is_outstanding(&self) -> bool {
        self.outstanding
    }
}

#[derive(Debug)]
pub struct WorkerEnd {
    requests: mpsc::Receiver<Request>,
    reports: mpsc::Sender<Report>,
}

impl WorkerEnd {
    /// Answers a pending request, if any, without blocking. Returns `true` if a report was sent.
    pub fn answer_pending(&mut self, bytes_copied: u64) -> bool {
        match self.requests.try_recv() {
            Ok(Request) => match self.reports.try_send(Report { bytes_copied }) {
                Ok(()) => true,
                Err(error) => {
                    // the coordinator stopped listening, the copy itself is unaffected
                    tracing::trace!("dropping progress report: {error}");
                    false
                }
            },
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => false,
        }
    }
}
