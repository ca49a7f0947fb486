//! Background job scheduler and job implementations.

mod scheduled_export;
mod scheduler;

pub use scheduled_export::ScheduledExportJob;
pub use scheduler::JobScheduler;
