mod definition;
mod scheduler;

pub use definition::{AlarmDefinition, DayTag, TimeOfDay};
pub use scheduler::{AlarmScheduler, MinuteKey};
