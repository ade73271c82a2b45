//! Raw row retrieval from the shared sheet.

pub mod feed;
pub mod source;

use std::collections::HashMap;

/// One sheet row as fetched: column name -> cell string, no typing applied.
pub type RawRow = HashMap<String, String>;
