pub mod deviation;
pub mod grouping;
pub mod pipeline;
pub mod series;
pub mod statistics;
