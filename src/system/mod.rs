pub mod cpu;
pub mod helper;
pub mod profiles;
pub mod sensors;
pub mod state;
pub mod sysfs;
