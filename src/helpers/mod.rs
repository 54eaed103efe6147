pub mod amount;
pub mod chart;
pub mod formatter;
pub mod share;
pub mod status;
