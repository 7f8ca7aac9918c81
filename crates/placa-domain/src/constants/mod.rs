//! Static domain tables

pub mod correction;
