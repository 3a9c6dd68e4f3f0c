//! Trouble code tables
//!
//! Two read-only mappings drive trouble code rendering: the leading hex digit of a raw code to
//! its two character category prefix (`'0'` → `"P0"`), and the rendered code to a human
//! description.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::info;

use crate::{Error, Result};

/// Lookups used when rendering raw trouble codes
pub trait DtcLookup {
    /// Category prefix (letter and first digit) for the leading hex digit of a raw code
    fn prefix_of(&self, digit: char) -> Option<&str>;

    /// Description of a rendered code such as `P0301`
    fn description_of(&self, code: &str) -> Option<&str>;
}

/// SAE J2012 mapping of the first hex digit to category letter and first decimal digit
const STANDARD_PREFIXES: [(char, &str); 16] = [
    ('0', "P0"),
    ('1', "P1"),
    ('2', "P2"),
    ('3', "P3"),
    ('4', "C0"),
    ('5', "C1"),
    ('6', "C2"),
    ('7', "C3"),
    ('8', "B0"),
    ('9', "B1"),
    ('A', "B2"),
    ('B', "B3"),
    ('C', "U0"),
    ('D', "U1"),
    ('E', "U2"),
    ('F', "U3"),
];

const COMMON_DESCRIPTIONS: &[(&str, &str)] = &[
    ("P0100", "Mass or Volume Air Flow Circuit Malfunction"),
    ("P0101", "Mass or Volume Air Flow Circuit Range/Performance Problem"),
    ("P0113", "Intake Air Temperature Circuit High Input"),
    ("P0128", "Coolant Thermostat (Coolant Temperature Below Thermostat Regulating Temperature)"),
    ("P0171", "System too Lean (Bank 1)"),
    ("P0172", "System too Rich (Bank 1)"),
    ("P0174", "System too Lean (Bank 2)"),
    ("P0175", "System too Rich (Bank 2)"),
    ("P0300", "Random/Multiple Cylinder Misfire Detected"),
    ("P0301", "Cylinder 1 Misfire Detected"),
    ("P0302", "Cylinder 2 Misfire Detected"),
    ("P0303", "Cylinder 3 Misfire Detected"),
    ("P0304", "Cylinder 4 Misfire Detected"),
    ("P0305", "Cylinder 5 Misfire Detected"),
    ("P0306", "Cylinder 6 Misfire Detected"),
    ("P0307", "Cylinder 7 Misfire Detected"),
    ("P0308", "Cylinder 8 Misfire Detected"),
    ("P0335", "Crankshaft Position Sensor A Circuit Malfunction"),
    ("P0340", "Camshaft Position Sensor Circuit Malfunction"),
    ("P0401", "Exhaust Gas Recirculation Flow Insufficient Detected"),
    ("P0420", "Catalyst System Efficiency Below Threshold (Bank 1)"),
    ("P0430", "Catalyst System Efficiency Below Threshold (Bank 2)"),
    ("P0440", "Evaporative Emission Control System Malfunction"),
    ("P0442", "Evaporative Emission Control System Leak Detected (small leak)"),
    ("P0455", "Evaporative Emission Control System Leak Detected (no purge flow or large leak)"),
    ("P0500", "Vehicle Speed Sensor Malfunction"),
    ("P0505", "Idle Control System Malfunction"),
    ("P0562", "System Voltage Low"),
    ("P0700", "Transmission Control System Malfunction"),
    ("U0100", "Lost Communication With ECM/PCM"),
];

/// In-memory prefix and description tables
#[derive(Debug, Clone, Default)]
pub struct CodeTables {
    prefixes: HashMap<char, String>,
    descriptions: HashMap<String, String>,
}

impl CodeTables {
    pub fn new(prefixes: HashMap<char, String>, descriptions: HashMap<String, String>) -> Self {
        Self {
            prefixes,
            descriptions,
        }
    }

    /// Standard prefix table with descriptions for a set of common powertrain codes
    pub fn standard() -> Self {
        Self {
            prefixes: STANDARD_PREFIXES
                .iter()
                .map(|(d, p)| (*d, p.to_string()))
                .collect(),
            descriptions: COMMON_DESCRIPTIONS
                .iter()
                .map(|(c, d)| (c.to_string(), d.to_string()))
                .collect(),
        }
    }

    /// Add descriptions from a JSON object of `"CODE": "description"` pairs
    ///
    /// Entries replace existing descriptions for the same code.
    pub fn extend_descriptions_json(&mut self, json: &str) -> Result<usize> {
        let table: HashMap<String, String> = serde_json::from_str(json)?;
        let count = table.len();
        self.descriptions
            .extend(table.into_iter().map(|(c, d)| (c.to_uppercase(), d)));
        Ok(count)
    }

    /// Like [extend_descriptions_json](Self::extend_descriptions_json), reading from a file
    pub fn load_descriptions(&mut self, path: &Path) -> Result<usize> {
        let json = fs::read_to_string(path)
            .map_err(|e| Error::Table(format!("reading {}: {}", path.display(), e)))?;
        let count = self.extend_descriptions_json(&json)?;
        info!("Loaded {} descriptions from {}", count, path.display());
        Ok(count)
    }
}

impl DtcLookup for CodeTables {
    fn prefix_of(&self, digit: char) -> Option<&str> {
        self.prefixes
            .get(&digit.to_ascii_uppercase())
            .map(String::as_str)
    }

    fn description_of(&self, code: &str) -> Option<&str> {
        self.descriptions.get(code).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn standard_prefixes() {
        let tables = CodeTables::standard();
        assert_eq!(tables.prefix_of('0'), Some("P0"));
        assert_eq!(tables.prefix_of('7'), Some("C3"));
        assert_eq!(tables.prefix_of('a'), Some("B2"));
        assert_eq!(tables.prefix_of('C'), Some("U0"));
        assert_eq!(tables.prefix_of('G'), None);
    }

    #[test]
    fn missing_description_is_none() {
        let tables = CodeTables::standard();
        assert_eq!(
            tables.description_of("P0301"),
            Some("Cylinder 1 Misfire Detected")
        );
        assert_eq!(tables.description_of("P1234"), None);
    }

    #[test]
    fn json_descriptions_override() {
        let mut tables = CodeTables::standard();
        let n = tables
            .extend_descriptions_json(r#"{"p1234": "Custom", "P0301": "Misfire, cylinder 1"}"#)
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(tables.description_of("P1234"), Some("Custom"));
        assert_eq!(tables.description_of("P0301"), Some("Misfire, cylinder 1"));
    }

    #[test]
    fn bad_json_is_table_error() {
        let mut tables = CodeTables::default();
        assert!(matches!(
            tables.extend_descriptions_json("[1, 2]"),
            Err(Error::Table(_))
        ));
    }

    #[test]
    fn loads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"B1000": "ECU Malfunction"}}"#).unwrap();

        let mut tables = CodeTables::standard();
        assert_eq!(tables.load_descriptions(file.path()).unwrap(), 1);
        assert_eq!(tables.description_of("B1000"), Some("ECU Malfunction"));

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            tables.load_descriptions(&missing),
            Err(Error::Table(_))
        ));
    }
}
