//! Index-based, read-only view of an [`Instance`] built once per run.
//!
//! Genes refer to courses, slots, rooms and instructors by their position in
//! the instance tables so the evaluator and the operators never hash strings.

use std::collections::HashMap;
use tracing::warn;
use types::{Assignment, CourseId, Instance, InstructorId, RoomId, RoomType, TimeslotId};

use crate::EngineError;

/// One course's placement. `course` never changes once the gene is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Gene {
    pub course: usize,
    pub slot: usize,
    pub room: usize,
    pub instructor: Option<usize>,
}

#[derive(Debug)]
pub struct Problem {
    instance: Instance,
    course_hours: Vec<u32>,
    qualified: Vec<Vec<usize>>,
    available: Vec<Option<Vec<bool>>>,
    registrations: Vec<Vec<usize>>,
    slot_order: Vec<usize>,
    course_index: HashMap<CourseId, usize>,
    slot_index: HashMap<TimeslotId, usize>,
    room_index: HashMap<RoomId, usize>,
    instructor_index: HashMap<InstructorId, usize>,
}

impl Problem {
    pub fn new(instance: Instance) -> Result<Self, EngineError> {
        if instance.courses.is_empty() {
            return Err(EngineError::EmptyInput("courses"));
        }
        if instance.rooms.is_empty() {
            return Err(EngineError::EmptyInput("rooms"));
        }
        if instance.timeslots.is_empty() {
            return Err(EngineError::EmptyInput("timeslots"));
        }
        if instance.instructors.is_empty() {
            return Err(EngineError::EmptyInput("instructors"));
        }
        let duplicates = crate::uniqueness_errors(&instance);
        if !duplicates.is_empty() {
            return Err(EngineError::InvalidInstance(duplicates));
        }

        let course_index: HashMap<CourseId, usize> = instance
            .courses
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        let slot_index: HashMap<TimeslotId, usize> = instance
            .timeslots
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        let room_index: HashMap<RoomId, usize> = instance
            .rooms
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
        let instructor_index: HashMap<InstructorId, usize> = instance
            .instructors
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();

        let mut qualified: Vec<Vec<usize>> = vec![Vec::new(); instance.courses.len()];
        for (ti, t) in instance.instructors.iter().enumerate() {
            for c in &t.qualifications {
                match course_index.get(c) {
                    Some(&ci) => qualified[ci].push(ti),
                    None => warn!(instructor = %t.id, course = %c, "qualification for unknown course"),
                }
            }
        }
        for (ci, c) in instance.courses.iter().enumerate() {
            for t in &c.qualified_instructors {
                match instructor_index.get(t) {
                    Some(&ti) => qualified[ci].push(ti),
                    None => warn!(course = %c.id, instructor = %t, "unknown qualified instructor"),
                }
            }
        }
        for q in &mut qualified {
            q.sort_unstable();
            q.dedup();
        }

        let available = instance
            .instructors
            .iter()
            .map(|t| {
                if t.availability.is_empty() {
                    return None;
                }
                let mut mask = vec![false; instance.timeslots.len()];
                for s in &t.availability {
                    if let Some(&si) = slot_index.get(s) {
                        mask[si] = true;
                    }
                }
                Some(mask)
            })
            .collect();

        let registrations = instance
            .registrations
            .iter()
            .map(|r| {
                let mut cs: Vec<usize> = r
                    .courses
                    .iter()
                    .filter_map(|c| course_index.get(c).copied())
                    .collect();
                cs.sort_unstable();
                cs.dedup();
                cs
            })
            .filter(|cs| cs.len() > 1)
            .collect();

        let mut slot_order: Vec<usize> = (0..instance.timeslots.len()).collect();
        slot_order.sort_by(|&a, &b| {
            let (x, y) = (&instance.timeslots[a], &instance.timeslots[b]);
            (x.day, &x.start).cmp(&(y.day, &y.start))
        });

        let course_hours = instance.courses.iter().map(|c| c.total_weekly_hours()).collect();

        Ok(Self {
            instance,
            course_hours,
            qualified,
            available,
            registrations,
            slot_order,
            course_index,
            slot_index,
            room_index,
            instructor_index,
        })
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn course_count(&self) -> usize {
        self.instance.courses.len()
    }

    pub fn slot_count(&self) -> usize {
        self.instance.timeslots.len()
    }

    pub fn room_count(&self) -> usize {
        self.instance.rooms.len()
    }

    pub fn instructor_count(&self) -> usize {
        self.instance.instructors.len()
    }

    pub fn course_hours(&self, course: usize) -> u32 {
        self.course_hours[course]
    }

    pub fn enrollment(&self, course: usize) -> u32 {
        self.instance.courses[course].enrollment
    }

    pub fn room_capacity(&self, room: usize) -> u32 {
        self.instance.rooms[room].capacity
    }

    pub fn max_load(&self, instructor: usize) -> u32 {
        self.instance.instructors[instructor].max_load
    }

    /// Instructors allowed to teach `course`, ascending by input position.
    pub fn qualified(&self, course: usize) -> &[usize] {
        &self.qualified[course]
    }

    pub fn is_available(&self, instructor: usize, slot: usize) -> bool {
        match &self.available[instructor] {
            None => true,
            Some(mask) => mask[slot],
        }
    }

    pub fn room_fits(&self, course: usize, room: usize) -> bool {
        self.room_capacity(room) >= self.enrollment(course) && self.room_type_ok(course, room)
    }

    pub fn room_type_ok(&self, course: usize, room: usize) -> bool {
        let have = self.instance.rooms[room].room_type;
        match self.instance.courses[course].required_room_type {
            None => true,
            Some(RoomType::Lab) => matches!(have, RoomType::Lab | RoomType::ComputerLab),
            Some(want) => want == have,
        }
    }

    /// Course lists of students registered for two or more courses.
    pub fn registrations(&self) -> &[Vec<usize>] {
        &self.registrations
    }

    /// Slot indices sorted by (day, start).
    pub fn canonical_slots(&self) -> &[usize] {
        &self.slot_order
    }

    /// Courses nobody is qualified to teach.
    pub fn unqualified_courses(&self) -> Vec<usize> {
        (0..self.course_count())
            .filter(|&ci| self.qualified[ci].is_empty())
            .collect()
    }

    pub fn course_id(&self, course: usize) -> &CourseId {
        &self.instance.courses[course].id
    }

    pub fn to_assignment(&self, g: &Gene) -> Assignment {
        Assignment {
            course_id: self.instance.courses[g.course].id.clone(),
            time_slot_id: self.instance.timeslots[g.slot].id.clone(),
            room_id: self.instance.rooms[g.room].id.clone(),
            instructor_id: g.instructor.map(|t| self.instance.instructors[t].id.clone()),
        }
    }

    pub fn to_gene(&self, a: &Assignment) -> Result<Gene, EngineError> {
        let unknown = |kind: &'static str, id: &dyn std::fmt::Display| EngineError::UnknownReference {
            kind,
            id: id.to_string(),
        };
        let course = *self
            .course_index
            .get(&a.course_id)
            .ok_or_else(|| unknown("course", &a.course_id))?;
        let slot = *self
            .slot_index
            .get(&a.time_slot_id)
            .ok_or_else(|| unknown("timeslot", &a.time_slot_id))?;
        let room = *self
            .room_index
            .get(&a.room_id)
            .ok_or_else(|| unknown("room", &a.room_id))?;
        let instructor = match &a.instructor_id {
            None => None,
            Some(t) => Some(
                *self
                    .instructor_index
                    .get(t)
                    .ok_or_else(|| unknown("instructor", t))?,
            ),
        };
        Ok(Gene {
            course,
            slot,
            room,
            instructor,
        })
    }
}
