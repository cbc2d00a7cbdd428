/*-------------------------------------------------------------------------------------------------
  Core Modules
-------------------------------------------------------------------------------------------------*/

pub mod cidr;
pub mod client;
pub mod compound_name;
pub mod config;
pub mod errors;
pub mod network_ranges;
pub mod prefix_type;
pub mod publish;
pub mod redundancy;
pub mod storage;
pub mod validate;
