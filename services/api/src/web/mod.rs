pub mod rest;
pub mod state;

pub use rest::{
    clear_night_handler, create_night_tail_handler, create_temp_log_handler, dashboard_handler,
    list_night_tails_handler, list_temp_logs_handler, mark_in_handler, record_purge_handler,
    update_heat_source_handler,
};
