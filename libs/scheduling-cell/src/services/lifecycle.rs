// libs/scheduling-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{BookingStatus, SchedulingError};

pub struct BookingLifecycle;

impl BookingLifecycle {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed.
    pub fn validate_transition(
        &self,
        current: &BookingStatus,
        next: &BookingStatus,
    ) -> Result<(), SchedulingError> {
        debug!("Validating status transition {} -> {}", current, next);

        if !self.valid_transitions(current).contains(next) {
            warn!("Invalid status transition attempted: {} -> {}", current, next);
            return Err(SchedulingError::InvalidTransition(*current));
        }

        Ok(())
    }

    /// All valid next statuses for a given current status. Completed and
    /// Cancelled are terminal.
    pub fn valid_transitions(&self, current: &BookingStatus) -> Vec<BookingStatus> {
        match current {
            BookingStatus::Pending => vec![BookingStatus::Confirmed, BookingStatus::Cancelled],
            BookingStatus::Confirmed => vec![BookingStatus::Completed, BookingStatus::Cancelled],
            BookingStatus::Completed => vec![],
            BookingStatus::Cancelled => vec![],
        }
    }
}

impl Default for BookingLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
