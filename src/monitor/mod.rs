pub mod cycle;
pub mod idle;
