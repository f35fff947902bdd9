use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::Instance;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    RoomDoubleBooking,
    InstructorDoubleBooking,
    StudentClash,
    RoomCapacity,
    UnassignedInstructor,
    InstructorOverload,
    InstructorUnavailable,
    RoomTypeMismatch,
}

impl ViolationKind {
    pub const ALL: [ViolationKind; 8] = [
        ViolationKind::RoomDoubleBooking,
        ViolationKind::InstructorDoubleBooking,
        ViolationKind::StudentClash,
        ViolationKind::RoomCapacity,
        ViolationKind::UnassignedInstructor,
        ViolationKind::InstructorOverload,
        ViolationKind::InstructorUnavailable,
        ViolationKind::RoomTypeMismatch,
    ];

    pub fn is_hard(self) -> bool {
        !matches!(
            self,
            ViolationKind::InstructorUnavailable | ViolationKind::RoomTypeMismatch
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct ViolationWeights {
    pub room_double_booking: u32,
    pub instructor_double_booking: u32,
    pub student_clash: u32,
    pub room_capacity: u32,
    pub unassigned_instructor: u32,
    /// Charged per hour above the instructor's max load.
    pub instructor_overload: u32,
    pub instructor_unavailable: u32,
    pub room_type_mismatch: u32,
}

impl Default for ViolationWeights {
    fn default() -> Self {
        Self {
            room_double_booking: 10,
            instructor_double_booking: 10,
            student_clash: 5,
            room_capacity: 5,
            unassigned_instructor: 20,
            instructor_overload: 3,
            instructor_unavailable: 2,
            room_type_mismatch: 2,
        }
    }
}

impl ViolationWeights {
    pub fn weight(&self, kind: ViolationKind) -> u32 {
        match kind {
            ViolationKind::RoomDoubleBooking => self.room_double_booking,
            ViolationKind::InstructorDoubleBooking => self.instructor_double_booking,
            ViolationKind::StudentClash => self.student_clash,
            ViolationKind::RoomCapacity => self.room_capacity,
            ViolationKind::UnassignedInstructor => self.unassigned_instructor,
            ViolationKind::InstructorOverload => self.instructor_overload,
            ViolationKind::InstructorUnavailable => self.instructor_unavailable,
            ViolationKind::RoomTypeMismatch => self.room_type_mismatch,
        }
    }
}

/// Options for the evolutionary engine. Every field has a default so partial
/// JSON bodies are accepted.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct GaConfig {
    pub population_size: usize,
    pub generations: usize,
    pub elite_count: usize,
    pub tournament_pool: usize,
    pub mutation_rate: f64,
    pub violation_weights: ViolationWeights,
    pub random_seed: Option<u64>,
    /// Stop after this many generations without a better best individual.
    pub stall_generations: Option<usize>,
    /// Evaluate offspring on the rayon pool.
    pub parallel: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            elite_count: 10,
            tournament_pool: 20,
            mutation_rate: 0.1,
            violation_weights: ViolationWeights::default(),
            random_seed: None,
            stall_generations: None,
            parallel: true,
        }
    }
}

impl GaConfig {
    /// Smaller run used when the population already holds a greedy seed.
    pub fn seeded() -> Self {
        Self {
            population_size: 20,
            generations: 30,
            elite_count: 4,
            tournament_pool: 10,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    #[default]
    Genetic,
    Greedy,
    /// Greedy plan seeds the genetic population.
    Hybrid,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Default)]
pub struct SolveParams {
    #[serde(default)]
    pub solver: SolverKind,
    /// Absent means the preset for `solver`.
    #[serde(default)]
    pub config: Option<GaConfig>,
}

impl SolveParams {
    /// Supplied engine options, or [`GaConfig::seeded`] for a hybrid run and
    /// [`GaConfig::default`] otherwise.
    pub fn ga_config(&self) -> GaConfig {
        match (&self.config, self.solver) {
            (Some(cfg), _) => cfg.clone(),
            (None, SolverKind::Hybrid) => GaConfig::seeded(),
            (None, _) => GaConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SolveEnvelope {
    pub instance: Instance,
    #[serde(default)]
    pub params: SolveParams,
}
