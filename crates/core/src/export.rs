//! Flat tabular export of a timetable, one row per assignment.

use std::collections::HashMap;
use std::io::{self, Write};
use types::{Assignment, AssignmentRow, Instance, TimeSlot, TimeslotId};

pub const CSV_HEADER: [&str; 6] = [
    "course_id",
    "time_slot_id",
    "day",
    "start",
    "room_id",
    "instructor_id",
];

pub fn to_rows(inst: &Instance, assignments: &[Assignment]) -> Vec<AssignmentRow> {
    let slots: HashMap<&TimeslotId, &TimeSlot> =
        inst.timeslots.iter().map(|t| (&t.id, t)).collect();
    assignments
        .iter()
        .map(|a| {
            let slot = slots.get(&a.time_slot_id);
            AssignmentRow {
                course_id: a.course_id.0.clone(),
                time_slot_id: a.time_slot_id.0.clone(),
                day: slot.map(|t| t.day),
                start: slot.map(|t| t.start.clone()).unwrap_or_default(),
                room_id: a.room_id.0.clone(),
                instructor_id: a
                    .instructor_id
                    .as_ref()
                    .map(|t| t.0.clone())
                    .unwrap_or_default(),
            }
        })
        .collect()
}

fn field(s: &str) -> std::borrow::Cow<'_, str> {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\"")).into()
    } else {
        s.into()
    }
}

pub fn write_csv<W: Write>(mut out: W, rows: &[AssignmentRow]) -> io::Result<()> {
    writeln!(out, "{}", CSV_HEADER.join(","))?;
    for r in rows {
        let day = r
            .day
            .and_then(|d| serde_json::to_value(d).ok())
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        writeln!(
            out,
            "{},{},{},{},{},{}",
            field(&r.course_id),
            field(&r.time_slot_id),
            day,
            field(&r.start),
            field(&r.room_id),
            field(&r.instructor_id),
        )?;
    }
    out.flush()
}

pub fn to_csv_string(inst: &Instance, assignments: &[Assignment]) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_csv(&mut buf, &to_rows(inst, assignments));
    String::from_utf8_lossy(&buf).into_owned()
}
