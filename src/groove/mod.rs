// Groove Engine - Meter, grid, quantization, and scheduling
// Turns loosely-timed note events into tick-accurate, ordered events

pub mod grid;
pub mod quantize;
pub mod scheduler;

pub use grid::{normalize, GridDivision, GridError, TimeSignature};
pub use quantize::{beat_to_ticks, quantize_beat};
pub use scheduler::{ScheduleReport, ScheduleWarning, Scheduler};
