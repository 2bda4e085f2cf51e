//! The initial balance setting and the running balance.

mod core;
mod endpoints;

pub use core::{
    BalanceSetting, BalanceSummary, create_balance_setting_table, get_balance_setting,
    get_balance_summary, set_balance_setting,
};
pub use endpoints::{get_balance_endpoint, get_balance_total_endpoint, set_balance_endpoint};
