//! Raw SQL operations. Free functions over `&Connection` so callers
//! choose the connection and the transaction.

pub mod history_log;
pub mod live_table;
pub mod relationship_ops;
