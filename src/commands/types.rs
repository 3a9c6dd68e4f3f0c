use std::fmt;

/// Shown in place of a description the tables do not have
pub const DESCRIPTION_NOT_FOUND: &str = "[DESCRIPTION NOT FOUND]";

/// Which set of trouble codes to request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtcMode {
    /// Service 0x03, codes that have matured and lit the malfunction indicator
    Stored,
    /// Service 0x07, codes detected during the current or last drive cycle
    Pending,
}

impl DtcMode {
    pub fn service(self) -> u8 {
        match self {
            Self::Stored => 0x03,
            Self::Pending => 0x07,
        }
    }

    /// The OBD request sent to the adapter
    pub fn command(self) -> String {
        format!("{:02X}", self.service())
    }
}

/// System a trouble code belongs to, from its leading letter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Powertrain, represented with `'P'`
    Powertrain,
    /// Chassis, represented with `'C'`
    Chassis,
    /// Body, represented with `'B'`
    Body,
    /// Network, represented with `'U'` likely due to previously being the "unknown" category
    Network,
}

/// An individual trouble code from an ECU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dtc {
    raw: u16,
    code: String,
}

impl Dtc {
    pub fn new(raw: u16, code: String) -> Self {
        Self { raw, code }
    }

    /// The two bytes as reported on the bus
    pub fn raw(&self) -> u16 {
        self.raw
    }

    /// Rendered code, e.g. `P0301`
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn category(&self) -> Option<Category> {
        match self.code.chars().next()? {
            'P' => Some(Category::Powertrain),
            'C' => Some(Category::Chassis),
            'B' => Some(Category::Body),
            'U' => Some(Category::Network),
            _ => None,
        }
    }
}

impl fmt::Display for Dtc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// A trouble code with its description, if one is known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtcEntry {
    pub dtc: Dtc,
    pub description: Option<String>,
}

impl DtcEntry {
    /// The description, or [DESCRIPTION_NOT_FOUND]
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(DESCRIPTION_NOT_FOUND)
    }
}

/// Trouble codes in the order the vehicle reported them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DtcReport {
    entries: Vec<DtcEntry>,
}

impl DtcReport {
    pub fn new(entries: Vec<DtcEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[DtcEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rendered codes, in report order
    pub fn codes(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.dtc.code()).collect()
    }
}

impl fmt::Display for DtcReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{} : {}", entry.dtc, entry.description())?;
        }
        Ok(())
    }
}

impl IntoIterator for DtcReport {
    type Item = DtcEntry;
    type IntoIter = std::vec::IntoIter<DtcEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
