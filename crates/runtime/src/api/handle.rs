//! Tick-side end of the planner channels.
//!
//! [`PlannerHandle`] hides channel plumbing behind non-blocking calls so the
//! fixed-timestep loop can talk to the worker without ever awaiting.
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

use super::errors::{Result, RuntimeError};
use crate::workers::{PlanJob, PlanResponse};

pub struct PlannerHandle {
    request_tx: mpsc::Sender<PlanJob>,
    response_rx: mpsc::Receiver<PlanResponse>,
}

impl PlannerHandle {
    pub(crate) fn new(
        request_tx: mpsc::Sender<PlanJob>,
        response_rx: mpsc::Receiver<PlanResponse>,
    ) -> Self {
        Self {
            request_tx,
            response_rx,
        }
    }

    /// Queues a job without waiting.
    pub fn try_submit(&self, job: PlanJob) -> Result<()> {
        self.request_tx.try_send(job).map_err(|err| match err {
            TrySendError::Full(_) => RuntimeError::PlannerBusy,
            TrySendError::Closed(_) => RuntimeError::RequestChannelClosed,
        })
    }

    /// Next finished response, if any.
    pub fn try_recv(&mut self) -> Option<PlanResponse> {
        match self.response_rx.try_recv() {
            Ok(response) => Some(response),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// True once the worker has gone away.
    pub fn is_closed(&self) -> bool {
        self.request_tx.is_closed()
    }
}
