//! Rent reconciliation: coverage checks, revenue sums, payment history, and
//! payment logging. Stored payments are never modified.

mod engine;
mod export;
mod notifier;
pub mod period;


pub use engine::{rent_due_from, BillingEngine, BillingError, RecordedPayment};
pub use notifier::{
    receipt_message, LogNotifier, NotificationError, NotificationStatus, PaymentNotifier,
};
pub use period::format_period;
