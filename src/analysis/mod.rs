pub mod ela;
pub mod regions;
