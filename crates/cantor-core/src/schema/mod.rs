mod db;
pub mod migrations;

pub use db::{format_timestamp, Database};
