//! Static team/employee routing tables.
//!
//! The directory maps a dialed phone number to a named team and the
//! employees that should be assigned resulting tasks. It is loaded once
//! at startup, validated, and shared read-only for the life of the
//! process — request handling never mutates it.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use crate::error::DirectoryError;
use crate::phone;

/// The canonical table shipped with the binary. Deployments can override
/// it with `RELAY_DIRECTORY_PATH`.
const EMBEDDED_TABLE: &str = include_str!("../data/directory.json");

/// A task assignee as known to the project-management system.
#[derive(Debug, Clone, Deserialize)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub email: String,
}

/// One routing entry: a dialed number, a team name, and member ids.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamRecord {
    pub number: String,
    pub name: String,
    pub member_ids: Vec<u64>,
}

/// On-disk shape of the directory table.
#[derive(Debug, Deserialize)]
struct DirectoryFile {
    employees: Vec<Employee>,
    teams: Vec<TeamRecord>,
}

/// A lookup result: the team name plus its resolved members, in
/// registration order.
#[derive(Debug, Clone)]
pub struct TeamInfo {
    pub name: String,
    pub employees: Vec<Employee>,
}

/// Immutable phone-number → team routing table.
pub struct TeamDirectory {
    employees: HashMap<u64, Employee>,
    teams: Vec<TeamRecord>,
}

impl TeamDirectory {
    /// Load the table embedded in the binary.
    pub fn builtin() -> Result<Self, DirectoryError> {
        Self::from_json_str(EMBEDDED_TABLE)
    }

    /// Parse and validate a directory table from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, DirectoryError> {
        let file: DirectoryFile = serde_json::from_str(json)?;
        if file.teams.is_empty() {
            return Err(DirectoryError::Empty("no teams defined".to_string()));
        }
        Ok(Self::from_records(file.employees, file.teams))
    }

    /// Build a directory from in-memory records.
    ///
    /// Team numbers are normalized once here so lookups are a plain
    /// string compare. Cross-reference problems (member ids with no
    /// employee record, several teams sharing one number) are known
    /// data-quality issues in the source tables — they are reported as
    /// warnings at load time, not treated as errors.
    pub fn from_records(employees: Vec<Employee>, mut teams: Vec<TeamRecord>) -> Self {
        let employees: HashMap<u64, Employee> =
            employees.into_iter().map(|e| (e.id, e)).collect();

        let mut seen_numbers: HashMap<String, String> = HashMap::new();
        for team in &mut teams {
            team.number = phone::normalize(&team.number);

            for id in &team.member_ids {
                if !employees.contains_key(id) {
                    warn!(
                        team = %team.name,
                        member_id = id,
                        "team references unknown employee id; it will be skipped"
                    );
                }
            }

            if let Some(first) = seen_numbers.get(&team.number) {
                warn!(
                    number = %team.number,
                    first = %first,
                    shadowed = %team.name,
                    "duplicate team number; first registration wins"
                );
            } else {
                seen_numbers.insert(team.number.clone(), team.name.clone());
            }
        }

        Self { employees, teams }
    }

    /// Look up the team for a canonical phone number.
    ///
    /// Linear scan, first match in registration order. Member ids without
    /// an employee record are dropped from the resolved list. Returns
    /// `None` on a miss — the caller treats that as a terminal routing
    /// failure for the event.
    pub fn lookup(&self, canonical: &str) -> Option<TeamInfo> {
        let team = self.teams.iter().find(|t| t.number == canonical)?;
        let employees = team
            .member_ids
            .iter()
            .filter_map(|id| self.employees.get(id).cloned())
            .collect();
        Some(TeamInfo {
            name: team.name.clone(),
            employees,
        })
    }

    /// Number of routing entries (including duplicates).
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Number of known employees.
    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }
}
