//! Servo calibration ownership
//!
//! [`CalibrationSet`] is the single place calibrations are mutated. Every
//! mutation is checked against `min <= mid <= max` before it is stored, so the
//! pulse mapper can assume it is always given a valid calibration.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeMap;
use std::path::Path;
use log::{debug, info};
use serde::{Serialize, Deserialize};

use super::ServoCalibration;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of calibrated actuator channels.
pub const NUM_SERVO_CHANNELS: usize = 4;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The calibrated actuator channels of the robot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ServoChannel {
    LeftDrive,
    RightDrive,
    LeftAux,
    RightAux
}

#[derive(thiserror::Error, Debug)]
pub enum CalibError {
    #[error(
        "Calibration for {channel:?} would be invalid (min {min}, mid {mid}, max {max}), \
        expected min <= mid <= max"
    )]
    InvalidRange {
        channel: ServoChannel,
        min: i32,
        mid: i32,
        max: i32
    },

    #[error("Cannot access the calibration file: {0}")]
    FileError(std::io::Error),

    #[error("Cannot parse the calibration file: {0}")]
    ParseError(serde_json::Error)
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The calibrations of every actuator channel.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSet {
    cals: [ServoCalibration; NUM_SERVO_CHANNELS]
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ServoChannel {
    pub const ALL: [ServoChannel; NUM_SERVO_CHANNELS] = [
        ServoChannel::LeftDrive,
        ServoChannel::RightDrive,
        ServoChannel::LeftAux,
        ServoChannel::RightAux
    ];

    fn index(self) -> usize {
        match self {
            ServoChannel::LeftDrive => 0,
            ServoChannel::RightDrive => 1,
            ServoChannel::LeftAux => 2,
            ServoChannel::RightAux => 3
        }
    }
}

impl Default for CalibrationSet {
    /// Nominal 1000/1500/2000 us for every channel, with the right side mounted mirrored and
    /// therefore reversed.
    fn default() -> Self {
        let fwd = ServoCalibration::default();
        let rev = ServoCalibration { reversed: true, ..fwd };

        Self {
            cals: [fwd, rev, fwd, rev]
        }
    }
}

impl CalibrationSet {

    /// Get a snapshot of the calibration of a channel.
    pub fn get(&self, channel: ServoChannel) -> ServoCalibration {
        self.cals[channel.index()]
    }

    /// Replace the calibration of a channel.
    pub fn set(&mut self, channel: ServoChannel, cal: ServoCalibration) -> Result<(), CalibError> {
        if !cal.is_valid() {
            return Err(CalibError::InvalidRange {
                channel,
                min: cal.min,
                mid: cal.mid,
                max: cal.max
            })
        }

        self.cals[channel.index()] = cal;
        debug!("Calibration of {:?} set to {:?}", channel, cal);

        Ok(())
    }

    /// Widen (positive `delta`) or narrow (negative `delta`) the channel's range symmetrically
    /// about its midpoint.
    pub fn adjust_range(&mut self, channel: ServoChannel, delta: i32) -> Result<(), CalibError> {
        let cal = self.get(channel);
        self.set(channel, ServoCalibration {
            min: cal.min - delta,
            max: cal.max + delta,
            ..cal
        })
    }

    pub fn set_min(&mut self, channel: ServoChannel, min: i32) -> Result<(), CalibError> {
        let cal = self.get(channel);
        self.set(channel, ServoCalibration { min, ..cal })
    }

    pub fn set_mid(&mut self, channel: ServoChannel, mid: i32) -> Result<(), CalibError> {
        let cal = self.get(channel);
        self.set(channel, ServoCalibration { mid, ..cal })
    }

    pub fn set_max(&mut self, channel: ServoChannel, max: i32) -> Result<(), CalibError> {
        let cal = self.get(channel);
        self.set(channel, ServoCalibration { max, ..cal })
    }

    pub fn set_reversed(&mut self, channel: ServoChannel, reversed: bool) {
        self.cals[channel.index()].reversed = reversed;
    }

    /// Parse a calibration set from its JSON representation.
    ///
    /// Channels missing from the JSON keep their default calibration.
    pub fn from_json(json: &str) -> Result<Self, CalibError> {
        let map: BTreeMap<ServoChannel, ServoCalibration> = serde_json::from_str(json)
            .map_err(CalibError::ParseError)?;

        let mut set = Self::default();
        for (channel, cal) in map {
            set.set(channel, cal)?;
        }

        Ok(set)
    }

    /// Get the JSON representation of this calibration set.
    pub fn to_json(&self) -> Result<String, CalibError> {
        let map: BTreeMap<ServoChannel, ServoCalibration> = ServoChannel::ALL
            .iter()
            .map(|c| (*c, self.get(*c)))
            .collect();

        serde_json::to_string_pretty(&map).map_err(CalibError::ParseError)
    }

    /// Load a calibration set from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CalibError> {
        let json = std::fs::read_to_string(path.as_ref()).map_err(CalibError::FileError)?;
        let set = Self::from_json(&json)?;

        info!("Calibration loaded from {:?}", path.as_ref());

        Ok(set)
    }

    /// Save this calibration set into a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CalibError> {
        std::fs::write(path.as_ref(), self.to_json()?).map_err(CalibError::FileError)?;

        info!("Calibration saved to {:?}", path.as_ref());

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_adjust_range() {
        let mut set = CalibrationSet::default();

        set.adjust_range(ServoChannel::LeftDrive, 5).unwrap();
        assert_eq!(
            set.get(ServoChannel::LeftDrive),
            ServoCalibration::new(995, 1500, 2005, false)
        );

        set.adjust_range(ServoChannel::LeftDrive, -105).unwrap();
        assert_eq!(
            set.get(ServoChannel::LeftDrive),
            ServoCalibration::new(1100, 1500, 1900, false)
        );

        // Other channels untouched
        assert_eq!(set.get(ServoChannel::LeftAux), ServoCalibration::default());
    }

    #[test]
    fn test_adjust_range_rejects_inverted() {
        let mut set = CalibrationSet::default();
        let before = set.get(ServoChannel::RightDrive);

        assert!(matches!(
            set.adjust_range(ServoChannel::RightDrive, -600),
            Err(CalibError::InvalidRange { channel: ServoChannel::RightDrive, .. })
        ));

        // Rejected adjustments leave the stored calibration unchanged
        assert_eq!(set.get(ServoChannel::RightDrive), before);
    }

    #[test]
    fn test_setters_validate() {
        let mut set = CalibrationSet::default();

        set.set_mid(ServoChannel::LeftAux, 1450).unwrap();
        assert_eq!(set.get(ServoChannel::LeftAux).mid, 1450);

        assert!(set.set_min(ServoChannel::LeftAux, 1460).is_err());
        assert!(set.set_max(ServoChannel::LeftAux, 1449).is_err());
        assert!(set.set_mid(ServoChannel::LeftAux, 2001).is_err());

        set.set_reversed(ServoChannel::LeftAux, true);
        assert!(set.get(ServoChannel::LeftAux).reversed);
    }

    #[test]
    fn test_json_partial() {
        let json = r#"{
            "left_drive": { "min": 1100, "mid": 1490, "max": 1900 }
        }"#;

        let set = CalibrationSet::from_json(json).unwrap();
        assert_eq!(
            set.get(ServoChannel::LeftDrive),
            ServoCalibration::new(1100, 1490, 1900, false)
        );
        assert_eq!(set.get(ServoChannel::RightDrive), CalibrationSet::default().get(ServoChannel::RightDrive));
    }

    #[test]
    fn test_json_rejects_invalid() {
        let json = r#"{ "right_aux": { "min": 1600, "mid": 1500, "max": 2000 } }"#;
        assert!(matches!(
            CalibrationSet::from_json(json),
            Err(CalibError::InvalidRange { channel: ServoChannel::RightAux, .. })
        ));

        assert!(matches!(
            CalibrationSet::from_json("{ \"front_drive\": {} }"),
            Err(CalibError::ParseError(_))
        ));
    }

    #[test]
    fn test_save_load() {
        let path = std::env::temp_dir().join("tito_calib_test.json");

        let mut set = CalibrationSet::default();
        set.adjust_range(ServoChannel::RightAux, 20).unwrap();
        set.set_mid(ServoChannel::LeftDrive, 1510).unwrap();
        set.save(&path).unwrap();

        assert_eq!(CalibrationSet::load(&path).unwrap(), set);
    }
}
