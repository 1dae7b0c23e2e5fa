// Read views
pub mod dashboard;
pub mod verification;
pub mod vessels;

// Writes against work orders and their line items
pub mod work_orders;

// Snapshot buffering shared by the read views
pub mod views;

pub use dashboard::DashboardService;
pub use verification::VerificationService;
pub use vessels::VesselService;
pub use work_orders::WorkOrderService;
pub use views::ViewEnvelope;
