pub mod dashboard;
pub mod domain;
pub mod filter;
pub mod ports;
pub mod series;
pub mod status;

pub use dashboard::{build_dashboard, DashboardView};
pub use domain::{
    NewNightTail, NewTempLog, NightTail, PurgeAnswer, ShiftKey, TailStatus, TempValue,
    TemperatureLog,
};
pub use filter::{apply_filters, FilterOutcome, FilterState, SnapshotCounts, RECENT_LOGS_LIMIT};
pub use ports::{NightOpsStore, PortError, PortResult};
pub use series::{build_series, SeriesPoint};
pub use status::{PurgeCategory, TempStatus};
