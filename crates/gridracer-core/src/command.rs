//! Steering to actuator command mapping
//!
//! A physical car takes single-letter drive commands over a line-based link
//! and reports its distance sensors as comma-separated lines. Only the
//! mapping and the line formats live here; the transport is external.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Turn threshold used in simulation
pub const SIMULATION_THRESHOLD: f32 = 0.35;

/// Turn threshold used when relaying to hardware
pub const HARDWARE_THRESHOLD: f32 = 0.2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown drive command {0:?}")]
    UnknownCommand(String),
    #[error("sensor line has {found} values, expected {expected}")]
    FieldCount { expected: usize, found: usize },
    #[error("sensor value {0:?} is not a number")]
    InvalidNumber(String),
}

/// Command understood by the car firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveCommand {
    Left,
    Right,
    Forward,
    Stop,
}

impl DriveCommand {
    /// Map a steering value with the same rule the simulated car uses
    pub fn from_steering(steering: f32, threshold: f32) -> Self {
        if steering >= threshold {
            DriveCommand::Left
        } else if steering <= -threshold {
            DriveCommand::Right
        } else {
            DriveCommand::Forward
        }
    }

    /// Wire form, without line terminator
    pub fn encode(self) -> &'static str {
        match self {
            DriveCommand::Left => "L,0",
            DriveCommand::Right => "R,0",
            DriveCommand::Forward => "F,0",
            DriveCommand::Stop => "S,0",
        }
    }
}

impl fmt::Display for DriveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.encode())
    }
}

impl FromStr for DriveCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "L,0" => Ok(DriveCommand::Left),
            "R,0" => Ok(DriveCommand::Right),
            "F,0" => Ok(DriveCommand::Forward),
            "S,0" | "STOP" => Ok(DriveCommand::Stop),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }
}

/// Parse one comma-separated sensor report.
///
/// Empty fields are dropped, so trailing commas are fine. The line is only
/// accepted with exactly `expected` values.
pub fn parse_sensor_line(line: &str, expected: usize) -> Result<Vec<f32>, CommandError> {
    let values = line
        .trim()
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| {
            field
                .parse::<f32>()
                .map_err(|_| CommandError::InvalidNumber(field.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if values.len() != expected {
        return Err(CommandError::FieldCount {
            expected,
            found: values.len(),
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_steering_thresholds() {
        assert_eq!(DriveCommand::from_steering(0.35, SIMULATION_THRESHOLD), DriveCommand::Left);
        assert_eq!(DriveCommand::from_steering(-0.35, SIMULATION_THRESHOLD), DriveCommand::Right);
        assert_eq!(DriveCommand::from_steering(0.3, SIMULATION_THRESHOLD), DriveCommand::Forward);
        assert_eq!(DriveCommand::from_steering(0.3, HARDWARE_THRESHOLD), DriveCommand::Left);
        assert_eq!(DriveCommand::from_steering(0.0, HARDWARE_THRESHOLD), DriveCommand::Forward);
    }

    #[test]
    fn test_encoding() {
        assert_eq!(DriveCommand::Left.encode(), "L,0");
        assert_eq!(DriveCommand::Right.to_string(), "R,0");
        assert_eq!(DriveCommand::Forward.encode(), "F,0");
        assert_eq!(DriveCommand::Stop.encode(), "S,0");
    }

    #[test]
    fn test_parse_command() {
        assert_eq!("F,0\n".parse::<DriveCommand>(), Ok(DriveCommand::Forward));
        assert_eq!("STOP".parse::<DriveCommand>(), Ok(DriveCommand::Stop));
        assert!(matches!("X,1".parse::<DriveCommand>(), Err(CommandError::UnknownCommand(_))));
    }

    #[test]
    fn test_parse_sensor_line() {
        assert_eq!(parse_sensor_line("0.5,0.25,1\n", 3), Ok(vec![0.5, 0.25, 1.0]));
        assert_eq!(parse_sensor_line("12,40,7,", 3), Ok(vec![12.0, 40.0, 7.0]));
    }

    #[test]
    fn test_parse_sensor_line_rejects_wrong_count() {
        assert_eq!(
            parse_sensor_line("1,2", 3),
            Err(CommandError::FieldCount {
                expected: 3,
                found: 2
            })
        );
        assert!(parse_sensor_line("", 3).is_err());
        assert!(matches!(
            parse_sensor_line("1,abc,3", 3),
            Err(CommandError::InvalidNumber(_))
        ));
    }
}
