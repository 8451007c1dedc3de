pub mod help_rotation;
pub mod inactivity;

pub use help_rotation::spawn_help_rotation_task;
pub use inactivity::{spawn_inactivity_task, ActivityClock, InactivityMedia};
