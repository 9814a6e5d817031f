//! Scenario loading from JSON documents and plain-text process tables.
//!
//! JSON input carries the quanta and the process list:
//!
//! ```json
//! {
//!   "config": { "quantum_q0": 5, "quantum_q1": 15 },
//!   "processes": [
//!     { "name": "P1", "cpu_burst": 10, "io_time": 5, "total_cpu_time": 50, "priority": 1 }
//!   ],
//!   "max_ticks": 10000
//! }
//! ```
//!
//! The quanta may also sit at the top level (`"quantum_q0": 5, ...`) and
//! `priority` defaults to 0. Numbers are read as signed integers so that a
//! negative value is reported as a validation error rather than a JSON type
//! error.
//!
//! Text tables list one process per line as
//! `name cpu_burst io_time total_cpu_time priority`, separated by whitespace
//! or commas. Blank lines and `#` comments are ignored, and a leading header
//! row whose first column is `name` is skipped, so CSV files load as-is.

use std::path::Path;

use serde::Deserialize;

use crate::error::SimError;
use crate::scenario::{Scenario, ScenarioBuilder, SchedulerConfig};
use crate::task::ProcessSpec;
use crate::types::Tick;

/// Values that take precedence over whatever the input file says.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub quantum_q0: Option<Tick>,
    pub quantum_q1: Option<Tick>,
    pub max_ticks: Option<Tick>,
    pub record_queues: bool,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    quantum_q0: Option<i64>,
    quantum_q1: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawProcess {
    name: String,
    cpu_burst: i64,
    io_time: i64,
    total_cpu_time: i64,
    #[serde(default)]
    priority: i64,
}

#[derive(Debug, Deserialize)]
struct RawScenario {
    config: Option<RawConfig>,
    quantum_q0: Option<i64>,
    quantum_q1: Option<i64>,
    processes: Vec<RawProcess>,
    max_ticks: Option<i64>,
}

fn non_negative(owner: &str, field: &str, value: i64) -> Result<Tick, SimError> {
    Tick::try_from(value)
        .map_err(|_| SimError::Validation(format!("{owner}: {field} must be >= 0, got {value}")))
}

/// Range checks happen in `Scenario::validate`; only the sign is checked here.
fn config_value(field: &str, value: i64) -> Result<Tick, SimError> {
    Tick::try_from(value)
        .map_err(|_| SimError::Config(format!("{field} must be positive, got {value}")))
}

impl RawProcess {
    fn into_spec(self) -> Result<ProcessSpec, SimError> {
        let name = self.name.as_str();
        let priority = u32::try_from(self.priority).map_err(|_| {
            SimError::Validation(format!(
                "{name}: priority must be within 0..={}, got {}",
                u32::MAX,
                self.priority
            ))
        })?;
        Ok(ProcessSpec::new(
            name,
            non_negative(name, "cpu_burst", self.cpu_burst)?,
            non_negative(name, "io_time", self.io_time)?,
            non_negative(name, "total_cpu_time", self.total_cpu_time)?,
            priority,
        ))
    }
}

/// Parse a JSON scenario document.
pub fn from_json_str(input: &str, overrides: &Overrides) -> Result<Scenario, SimError> {
    let raw: RawScenario = serde_json::from_str(input)?;

    let nested = raw.config.as_ref();
    let mut config = SchedulerConfig::default();
    if let Some(q0) = nested.and_then(|c| c.quantum_q0).or(raw.quantum_q0) {
        config.quantum_q0 = config_value("quantum_q0", q0)?;
    }
    if let Some(q1) = nested.and_then(|c| c.quantum_q1).or(raw.quantum_q1) {
        config.quantum_q1 = config_value("quantum_q1", q1)?;
    }

    let processes = raw
        .processes
        .into_iter()
        .map(RawProcess::into_spec)
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder = Scenario::builder().config(config).processes(processes);
    if let Some(max_ticks) = raw.max_ticks {
        builder = builder.max_ticks(config_value("max_ticks", max_ticks)?);
    }
    apply_overrides(builder, overrides).build()
}

/// Parse a whitespace- or comma-separated process table.
pub fn parse_table(input: &str) -> Result<Vec<ProcessSpec>, SimError> {
    let mut specs = Vec::new();
    let mut seen_row = false;

    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();

        let is_first = !seen_row;
        seen_row = true;
        if is_first && fields.first().is_some_and(|f| f.eq_ignore_ascii_case("name")) {
            continue;
        }

        let &[name, cpu_burst, io_time, total, priority] = fields.as_slice() else {
            return Err(SimError::Parse(format!(
                "line {line_no}: expected 5 fields (name cpu_burst io_time total_cpu_time priority), got {}",
                fields.len()
            )));
        };
        let num = |field: &str, value: &str| -> Result<i64, SimError> {
            value.parse::<i64>().map_err(|_| {
                SimError::Parse(format!("line {line_no}: {field} is not an integer: {value:?}"))
            })
        };
        let raw = RawProcess {
            name: name.to_string(),
            cpu_burst: num("cpu_burst", cpu_burst)?,
            io_time: num("io_time", io_time)?,
            total_cpu_time: num("total_cpu_time", total)?,
            priority: num("priority", priority)?,
        };
        specs.push(raw.into_spec()?);
    }

    Ok(specs)
}

/// Build a scenario from a text table. Quanta and limits come from
/// `overrides`, falling back to the defaults.
pub fn from_table_str(input: &str, overrides: &Overrides) -> Result<Scenario, SimError> {
    let builder = Scenario::builder().processes(parse_table(input)?);
    apply_overrides(builder, overrides).build()
}

/// Load a scenario from disk. `.json` files are parsed as JSON; anything
/// else is read as a process table.
pub fn load_path(path: &Path, overrides: &Overrides) -> Result<Scenario, SimError> {
    let input = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        from_json_str(&input, overrides)
    } else {
        from_table_str(&input, overrides)
    }
}

fn apply_overrides(mut builder: ScenarioBuilder, overrides: &Overrides) -> ScenarioBuilder {
    builder = builder.record_queues(overrides.record_queues);
    if let Some(ticks) = overrides.max_ticks {
        builder = builder.max_ticks(ticks);
    }
    if overrides.quantum_q0.is_some() || overrides.quantum_q1.is_some() {
        let current = builder.current_config();
        builder = builder.quanta(
            overrides.quantum_q0.unwrap_or(current.quantum_q0),
            overrides.quantum_q1.unwrap_or(current.quantum_q1),
        );
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_nested_config() {
        let input = r#"{
            "config": { "quantum_q0": 3, "quantum_q1": 12 },
            "processes": [
                { "name": "A", "cpu_burst": 2, "io_time": 1, "total_cpu_time": 6, "priority": 1 },
                { "name": "B", "cpu_burst": 0, "io_time": 0, "total_cpu_time": 4 }
            ]
        }"#;
        let scenario = from_json_str(input, &Overrides::default()).unwrap();
        assert_eq!(scenario.config, SchedulerConfig::new(3, 12));
        assert_eq!(scenario.processes.len(), 2);
        assert_eq!(scenario.processes[1].priority, 0);
        assert_eq!(scenario.max_ticks, crate::scenario::DEFAULT_MAX_TICKS);
    }

    #[test]
    fn test_json_flat_config_and_overrides() {
        let input = r#"{
            "quantum_q0": 4,
            "quantum_q1": 14,
            "max_ticks": 50,
            "processes": [
                { "name": "A", "cpu_burst": 2, "io_time": 1, "total_cpu_time": 6, "priority": 0 }
            ]
        }"#;
        let scenario = from_json_str(input, &Overrides::default()).unwrap();
        assert_eq!(scenario.config, SchedulerConfig::new(4, 14));
        assert_eq!(scenario.max_ticks, 50);

        let overrides = Overrides {
            quantum_q1: Some(20),
            max_ticks: Some(99),
            record_queues: true,
            ..Overrides::default()
        };
        let scenario = from_json_str(input, &overrides).unwrap();
        assert_eq!(scenario.config, SchedulerConfig::new(4, 20));
        assert_eq!(scenario.max_ticks, 99);
        assert!(scenario.record_queues);
    }

    #[test]
    fn test_json_negative_field_is_validation_error() {
        let input = r#"{
            "config": { "quantum_q0": 3, "quantum_q1": 12 },
            "processes": [
                { "name": "A", "cpu_burst": -1, "io_time": 1, "total_cpu_time": 6, "priority": 0 }
            ]
        }"#;
        let err = from_json_str(input, &Overrides::default()).unwrap_err();
        assert!(err.is_validation(), "{err}");
    }

    #[test]
    fn test_json_syntax_error() {
        let err = from_json_str("{ not json", &Overrides::default()).unwrap_err();
        assert!(matches!(err, SimError::Json(_)));
    }

    #[test]
    fn test_table_whitespace_and_csv() {
        let txt = "# name burst io total prio\nP1 10 5 50 1\n\n  P2 15 3 40 2  \n";
        let specs = parse_table(txt).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0], ProcessSpec::new("P1", 10, 5, 50, 1));

        let csv = "name,cpu_burst,io_time,total_cpu_time,priority\nP1,10,5,50,1\nP2, 15, 3, 40, 2\n";
        assert_eq!(parse_table(csv).unwrap(), specs);
    }

    #[test]
    fn test_table_errors() {
        let err = parse_table("P1 10 5 50\n").unwrap_err();
        assert!(matches!(err, SimError::Parse(_)), "{err}");

        let err = parse_table("P1 10 5 50 1\nP2 x 3 40 2\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");

        let err = parse_table("P1 10 -5 50 1\n").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_table_bad_first_row_is_not_a_header() {
        let err = parse_table("P1 x 5 50 1\nP2 15 3 40 2\n").unwrap_err();
        assert!(matches!(err, SimError::Parse(_)), "{err}");
        assert!(err.to_string().contains("line 1"), "{err}");

        let specs = parse_table("NAME burst io total prio\nP2 15 3 40 2\n").unwrap();
        assert_eq!(specs, vec![ProcessSpec::new("P2", 15, 3, 40, 2)]);
    }
}
