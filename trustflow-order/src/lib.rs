pub mod carrier;
pub mod escrow;
pub mod fees;
pub mod models;
pub mod repository;
pub mod workflow;

pub use carrier::{Carrier, CarrierAssignmentPolicy, CarrierDirectory, FirstAvailablePolicy};
pub use escrow::{EscrowCommand, EscrowStateMachine};
pub use fees::{CommissionRates, FeeBreakdown, FeeScheduler};
pub use models::{Actor, Arbitration, EscrowEvent, EscrowStatus, HistoryEntry, Order};
pub use repository::OrderRepository;
pub use workflow::OrderWorkflow;
