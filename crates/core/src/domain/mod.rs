pub mod currency;
pub mod history;
pub mod moving_average;
pub mod recommendation;
pub mod summary;
