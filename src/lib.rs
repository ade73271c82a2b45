//! Hospital bed-availability bot: polls a shared spreadsheet of bed reports,
//! normalizes the rows into canonical records, and answers zone/pincode
//! queries with the latest counts per hospital. A scheduler thread pushes a
//! periodic summary to a fixed broadcast channel.

pub mod bot;
pub mod cli;
pub mod config;
pub mod data;
pub mod export;
pub mod report;
pub mod server;
pub mod sheet;
