pub mod health;
pub mod snmp;

pub use health::health;
pub use snmp::{list_disk_readings, list_scalar_readings};
