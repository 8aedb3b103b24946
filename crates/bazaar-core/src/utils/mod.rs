//! Display formatting for prices, phone numbers and dates.

pub mod format;

pub use format::{format_date, format_paise, format_phone, format_price, truncate_string};
