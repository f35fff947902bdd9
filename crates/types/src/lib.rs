use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use utoipa::ToSchema;

mod config;
mod result;

pub use config::{GaConfig, SolveEnvelope, SolveParams, SolverKind, ViolationKind, ViolationWeights};
pub use result::{Assignment, AssignmentRow, SolveResult, SolveStatus, StopReason, Violation};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone,
            Debug,
            Serialize,
            Deserialize,
            ToSchema,
            JsonSchema,
            Eq,
            PartialEq,
            Hash,
            PartialOrd,
            Ord,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}
id_newtype!(InstructorId);
id_newtype!(StudentId);
id_newtype!(RoomId);
id_newtype!(CourseId);
id_newtype!(TimeslotId);

#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    #[default]
    Classroom,
    Lab,
    ComputerLab,
    Seminar,
    Tutorial,
    Other,
}

/// NEP-2020 course categories.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum CourseCategory {
    #[default]
    Major,
    Minor,
    SkillBased,
    Aec,
    Vac,
    Other,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    #[serde(default)]
    pub credits: u32,
    #[serde(default)]
    pub theory_hours: u32,
    #[serde(default)]
    pub lab_hours: u32,
    #[serde(default)]
    pub tutorial_hours: u32,
    #[serde(default)]
    pub category: CourseCategory,
    #[serde(default)]
    pub enrollment: u32,
    #[serde(default, deserialize_with = "id_list")]
    #[schemars(with = "Vec<InstructorId>")]
    pub qualified_instructors: Vec<InstructorId>,
    #[serde(default)]
    pub required_room_type: Option<RoomType>,
}

impl Course {
    pub fn total_weekly_hours(&self) -> u32 {
        self.theory_hours + self.lab_hours + self.tutorial_hours
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: InstructorId,
    #[serde(default, deserialize_with = "id_list")]
    #[schemars(with = "Vec<CourseId>")]
    pub qualifications: Vec<CourseId>,
    pub max_load: u32,
    /// Empty means available in every slot.
    #[serde(default, deserialize_with = "id_list")]
    #[schemars(with = "Vec<TimeslotId>")]
    pub availability: Vec<TimeslotId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    #[serde(default)]
    pub room_type: RoomType,
    pub capacity: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct TimeSlot {
    pub id: TimeslotId,
    pub day: DayOfWeek,
    /// Start label, `HH:MM`.
    pub start: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub student_id: StudentId,
    #[serde(default, deserialize_with = "id_list")]
    #[schemars(with = "Vec<CourseId>")]
    pub courses: Vec<CourseId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Instance {
    pub courses: Vec<Course>,
    pub instructors: Vec<Instructor>,
    pub rooms: Vec<Room>,
    pub timeslots: Vec<TimeSlot>,
    #[serde(default)]
    pub registrations: Vec<Registration>,
}

/// Accepts either a JSON array of ids or the stringified lists spreadsheet
/// imports produce (`"['C1', 'C2']"`, `"C1;C2"`, `"C1, C2"`).
fn id_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String> + Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        List(Vec<T>),
        Text(String),
        Null(()),
    }
    Ok(match Raw::<T>::deserialize(deserializer)? {
        Raw::List(v) => v,
        Raw::Text(s) => parse_id_list(&s)
            .into_iter()
            .map(|x| T::from(x.to_string()))
            .collect(),
        Raw::Null(()) => Vec::new(),
    })
}

/// Splits a stringified id collection into its trimmed, unquoted items.
pub fn parse_id_list(raw: &str) -> Vec<&str> {
    let inner = raw
        .trim()
        .trim_start_matches(['[', '(', '{'])
        .trim_end_matches([']', ')', '}']);
    inner
        .split([',', ';'])
        .map(|s| s.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|s| !s.is_empty())
        .collect()
}
