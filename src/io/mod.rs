pub mod trajectory_csv;

pub use trajectory_csv::{export_trajectory, write_trajectory_csv};
