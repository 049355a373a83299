pub mod dashboard;
pub mod players;
pub mod refresh;
