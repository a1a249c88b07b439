//! Scenario definitions: classrooms sharing one bottleneck.
//!
//! A scenario names the participating classrooms (population, professor
//! flexibility, base end time, subject metadata) and the bottleneck capacity
//! in people per minute. Scenarios load from JSON or come from the built-in
//! set; either way they are validated before a run starts, and validation
//! reports every violated invariant at once.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::time::TimeOfDay;

/// Scenario validation failure listing all violated invariants
#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("scenario '{name}' is invalid: {}", .violations.join("; "))]
    Invalid {
        name: String,
        violations: Vec<String>,
    },

    #[error("unknown scenario '{0}'")]
    Unknown(String),
}

/// One classroom entry in a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassroomConfig {
    /// Stable identifier (e.g., "C101")
    pub id: String,

    /// Students exiting through the bottleneck
    pub students: u32,

    /// Professor flexibility in [-1.0, 1.0]
    pub professor_flexibility: f64,

    /// Scheduled end time ("HH:MM")
    pub base_end_time: TimeOfDay,

    /// Subject taught (report metadata)
    #[serde(default)]
    pub subject: String,

    /// Professor name (report metadata)
    #[serde(default)]
    pub professor_name: String,
}

/// A named coordination scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub classrooms: Vec<ClassroomConfig>,

    /// Bottleneck throughput in people per minute (positive)
    pub bottleneck_capacity: u32,
}

impl ScenarioConfig {
    /// Validate every invariant, collecting all violations.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut violations = Vec::new();

        if self.bottleneck_capacity == 0 {
            violations.push("bottleneck capacity must be positive".to_string());
        }
        if self.classrooms.is_empty() {
            violations.push("scenario must have at least one classroom".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for classroom in &self.classrooms {
            if !seen.insert(&classroom.id) {
                violations.push(format!("duplicate classroom id '{}'", classroom.id));
            }
            if classroom.students == 0 {
                violations.push(format!("{}: student count must be positive", classroom.id));
            }
            if !(-1.0..=1.0).contains(&classroom.professor_flexibility) {
                violations.push(format!(
                    "{}: flexibility must be between -1.0 and 1.0",
                    classroom.id
                ));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ScenarioError::Invalid {
                name: self.name.clone(),
                violations,
            })
        }
    }

    /// Look up a built-in scenario by name.
    pub fn builtin(name: &str) -> Result<ScenarioConfig, ScenarioError> {
        match name {
            "demo" => Ok(Self::demo()),
            "stress" => Ok(Self::stress()),
            "balanced" => Ok(Self::balanced()),
            "extreme" => Ok(Self::extreme()),
            other => Err(ScenarioError::Unknown(other.to_string())),
        }
    }

    /// Names of all built-in scenarios.
    pub fn builtin_names() -> &'static [&'static str] {
        &["demo", "stress", "balanced", "extreme"]
    }

    /// Basic demonstration: three classrooms, one shared exit time.
    pub fn demo() -> ScenarioConfig {
        ScenarioConfig {
            name: "demo".to_string(),
            description: "Basic demonstration with 3 classrooms".to_string(),
            classrooms: vec![
                classroom("C101", 80, 0.3, "Mathematics", "Dr. Smith"),
                classroom("C102", 95, -0.2, "Chemistry", "Prof. Johnson"),
                classroom("C103", 60, 0.5, "Literature", "Dr. Davis"),
            ],
            bottleneck_capacity: 150,
        }
    }

    /// High congestion: four large classrooms against a tight corridor.
    pub fn stress() -> ScenarioConfig {
        ScenarioConfig {
            name: "stress".to_string(),
            description: "High congestion scenario with 4 large classrooms".to_string(),
            classrooms: vec![
                classroom("C201", 120, -0.7, "Engineering", "Dr. Wilson"),
                classroom("C202", 110, 0.8, "Philosophy", "Prof. Martinez"),
                classroom("C203", 95, 0.2, "Biology", "Dr. Chen"),
                classroom("C204", 85, -0.5, "History", "Prof. Thompson"),
            ],
            bottleneck_capacity: 100,
        }
    }

    /// Well-distributed load with mixed flexibility.
    pub fn balanced() -> ScenarioConfig {
        ScenarioConfig {
            name: "balanced".to_string(),
            description: "Well-distributed load with mixed flexibility".to_string(),
            classrooms: vec![
                classroom("C301", 70, 0.4, "Computer Science", "Dr. Lee"),
                classroom("C302", 75, -0.1, "Psychology", "Prof. Garcia"),
                classroom("C303", 65, 0.6, "Art History", "Dr. Brown"),
                classroom("C304", 80, -0.3, "Economics", "Prof. Taylor"),
            ],
            bottleneck_capacity: 120,
        }
    }

    /// Maximum stress: very high congestion, rigid preferences.
    pub fn extreme() -> ScenarioConfig {
        ScenarioConfig {
            name: "extreme".to_string(),
            description: "Maximum stress test with very high congestion".to_string(),
            classrooms: vec![
                classroom("C401", 150, -0.9, "Lecture Hall A", "Dr. Anderson"),
                classroom("C402", 140, 0.9, "Lecture Hall B", "Prof. White"),
                classroom("C403", 130, 0.1, "Lecture Hall C", "Dr. Miller"),
            ],
            bottleneck_capacity: 80,
        }
    }
}

fn classroom(
    id: &str,
    students: u32,
    flexibility: f64,
    subject: &str,
    professor: &str,
) -> ClassroomConfig {
    ClassroomConfig {
        id: id.to_string(),
        students,
        professor_flexibility: flexibility,
        base_end_time: TimeOfDay::new(12, 30),
        subject: subject.to_string(),
        professor_name: professor.to_string(),
    }
}
