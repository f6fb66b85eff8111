pub mod nopenv;
pub mod nopy;
pub mod npip;
