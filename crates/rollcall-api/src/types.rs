//! Domain entities and status enums

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Weekday};
use rollcall_util::{ClassId, RecordId, SessionId, StudentId};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an attendance session.
///
/// Transitions are monotonic: SCHEDULED -> ACTIVE -> COMPLETED, with
/// CANCELLED reachable from SCHEDULED or ACTIVE. Nothing moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Scheduled,
    Active,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SCHEDULED" => Some(Self::Scheduled),
            "ACTIVE" => Some(Self::Active),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether moving from `self` to `to` is a legal (forward) transition
    pub fn can_transition_to(&self, to: SessionStatus) -> bool {
        matches!(
            (self, to),
            (Self::Scheduled, Self::Active)
                | (Self::Scheduled, Self::Cancelled)
                | (Self::Active, Self::Completed)
                | (Self::Active, Self::Cancelled)
        )
    }

    /// Whether this state admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Attendance outcome recorded for a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "PRESENT",
            Self::Late => "LATE",
            Self::Absent => "ABSENT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PRESENT" => Some(Self::Present),
            "LATE" => Some(Self::Late),
            "ABSENT" => Some(Self::Absent),
            _ => None,
        }
    }

    /// PRESENT and LATE both count as attended for summary purposes
    pub fn is_attended(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

/// How a record entered the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanMethod {
    Qr,
    Manual,
}

impl ScanMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qr => "QR",
            Self::Manual => "MANUAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "QR" => Some(Self::Qr),
            "MANUAL" => Some(Self::Manual),
            _ => None,
        }
    }
}

/// A concrete, dated class meeting open to attendance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub class_id: ClassId,
    pub date: NaiveDate,
    pub scheduled_start: NaiveTime,
    pub scheduled_end: NaiveTime,
    pub actual_start: Option<NaiveTime>,
    pub actual_end: Option<NaiveTime>,
    pub subject: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Local>,
}

impl Session {
    /// Whether a time-of-day falls inside the scheduled window (inclusive)
    pub fn contains_time(&self, time: NaiveTime) -> bool {
        self.scheduled_start <= time && time <= self.scheduled_end
    }
}

/// A persisted attendance record.
///
/// Student name and grade are snapshots taken at scan time so history
/// stays stable if the student is later renamed or reassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub student_id: StudentId,
    pub student_name: String,
    pub grade: String,
    pub attendance_date: NaiveDate,
    pub scan_time: DateTime<Local>,
    pub status: AttendanceStatus,
    pub scan_method: ScanMethod,
    pub session_id: Option<SessionId>,
    pub created_at: DateTime<Local>,
}

/// One recurring weekly slot from a class's schedule template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: i64,
    pub class_id: ClassId,
    #[serde(with = "weekday_name")]
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub subject: String,
}

/// Read-only projection of a student, as the recorder needs it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub student_id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub grade: String,
    pub class_id: Option<ClassId>,
}

impl StudentProfile {
    /// Name snapshot format used on records
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Serialize weekdays the way the schedule table stores them (`MONDAY`..)
mod weekday_name {
    use chrono::Weekday;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &Weekday, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(rollcall_util::weekday_name(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Weekday, D::Error> {
        let s = String::deserialize(de)?;
        rollcall_util::parse_weekday(&s)
            .ok_or_else(|| D::Error::custom(format!("invalid day of week: {s}")))
    }
}
