//! Attendance session lifecycle engine
//!
//! Three components over the session/attendance stores:
//! - `SessionMaterializer`: expands today's weekly schedule templates into
//!   concrete SCHEDULED sessions, exactly once per (class, date, subject)
//! - `SessionClock`: advances session status from wall-clock time and
//!   carries the manual start/end path
//! - `AttendanceRecorder`: the single gate through which a scan becomes a
//!   persisted attendance record
//!
//! Every operation takes the current date/time as an explicit parameter;
//! nothing in this crate reads the system clock.

mod clock;
mod materializer;
mod recorder;

pub use clock::*;
pub use materializer::*;
pub use recorder::*;
