pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::scheduling_routes;
pub use services::calendar::BusinessCalendar;
pub use services::ledger::BookingLedger;
pub use services::slots::SlotGenerator;
