//! High level OBD-II interface

mod decode;
pub use decode::{decode_trouble_codes, decode_vin, prune};

mod types;
pub use types::{Category, Dtc, DtcEntry, DtcMode, DtcReport, DESCRIPTION_NOT_FOUND};

use log::debug;

use crate::{lookup::DtcLookup, obd2_device::Response, Obd2Device, Result};

/// Bytes ahead of the codes on each line of a service 0x03/0x07 response
const DTC_PRUNE_BYTES: usize = 1;

/// Bytes ahead of the VIN characters on each line of a service 0x09 PID 0x02 response
const VIN_PRUNE_BYTES: usize = 3;

/// Trait for devices that can retrieve data over OBD-II
///
/// Automatically implemented for implementors of [Obd2Device](crate::Obd2Device).
pub trait Obd2DataRetrieval: private::Sealed {
    /// Retrieve the VIN (vehicle identification number)
    ///
    /// Service 0x09, PID 0x02. `None` when the vehicle does not report one.
    fn get_vin(&mut self) -> Result<Option<String>>;

    /// Get the trouble codes of one kind, with descriptions from `lookup`
    fn get_dtcs<L: DtcLookup + ?Sized>(&mut self, mode: DtcMode, lookup: &L) -> Result<DtcReport>;

    /// Get the stored trouble codes (service 0x03)
    fn get_stored_dtcs<L: DtcLookup + ?Sized>(&mut self, lookup: &L) -> Result<DtcReport> {
        self.get_dtcs(DtcMode::Stored, lookup)
    }

    /// Get the pending trouble codes (service 0x07)
    fn get_pending_dtcs<L: DtcLookup + ?Sized>(&mut self, lookup: &L) -> Result<DtcReport> {
        self.get_dtcs(DtcMode::Pending, lookup)
    }

    /// The adapter's device description (`AT @1`)
    fn get_device_description(&mut self) -> Result<String>;

    /// The user-settable device identifier (`AT @2`)
    fn get_user_description(&mut self) -> Result<String>;

    /// Voltage at the OBD-II connector as printed by the adapter (`AT RV`)
    fn get_voltage(&mut self) -> Result<String>;

    /// Protocol in use on the vehicle's bus (`AT DP`)
    fn get_protocol(&mut self) -> Result<String>;
}

impl<T: Obd2Device> Obd2DataRetrieval for T {
    fn get_vin(&mut self) -> Result<Option<String>> {
        let response = self.data_command("0902")?;
        if Response::classify(&response) == Response::NoData {
            return Ok(None);
        }
        decode_vin(&prune(&response, VIN_PRUNE_BYTES)).map(Some)
    }

    fn get_dtcs<L: DtcLookup + ?Sized>(&mut self, mode: DtcMode, lookup: &L) -> Result<DtcReport> {
        let response = self.data_command(&mode.command())?;
        if Response::classify(&response) == Response::NoData {
            debug!("get_dtcs: no data for {:?}", mode);
            return Ok(DtcReport::default());
        }
        let report = decode_trouble_codes(&prune(&response, DTC_PRUNE_BYTES), lookup)?;
        debug!("get_dtcs: {:?} -> {:?}", mode, report.codes());
        Ok(report)
    }

    fn get_device_description(&mut self) -> Result<String> {
        info_text(self, "AT @1")
    }

    fn get_user_description(&mut self) -> Result<String> {
        info_text(self, "AT @2")
    }

    fn get_voltage(&mut self) -> Result<String> {
        info_text(self, "AT RV")
    }

    fn get_protocol(&mut self) -> Result<String> {
        info_text(self, "AT DP")
    }
}

fn info_text<T: Obd2Device>(device: &mut T, command: &str) -> Result<String> {
    Ok(device.data_command(command)?.trim().to_owned())
}

mod private {
    pub trait Sealed {}
    impl<T: crate::Obd2Device> Sealed for T {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{device::mock::MockTransport, lookup::CodeTables, Error, Obd2};

    #[test]
    fn stored_and_pending_codes() {
        let mut obd = Obd2::new(MockTransport::from_script(&[
            ("03", "0143000301710000\r\r>"),
            ("07", "0147000420000000\r\r>"),
        ]));
        let tables = CodeTables::standard();
        assert_eq!(
            obd.get_stored_dtcs(&tables).unwrap().codes(),
            vec!["C0300", "P0301", "C3100"]
        );
        let pending = obd.get_pending_dtcs(&tables).unwrap();
        assert_eq!(pending.codes(), vec!["C0700", "P0420"]);
    }

    #[test]
    fn no_data_is_empty_report() {
        let mut obd = Obd2::new(MockTransport::from_script(&[("07", "NO DATA\r\r>")]));
        assert!(obd
            .get_pending_dtcs(&CodeTables::standard())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let mut obd = Obd2::new(MockTransport::from_script(&[("03", "01BUS ERROR\r\r>")]));
        assert!(matches!(
            obd.get_stored_dtcs(&CodeTables::standard()),
            Err(Error::MalformedToken(_))
        ));
    }

    #[test]
    fn vin() {
        let mut obd = Obd2::new(MockTransport::from_script(&[(
            "0902",
            "49020100000031\r4902024847434D\r49020338323633\r49020433413030\r49020534333532\r\r>",
        )]));
        assert_eq!(obd.get_vin().unwrap().as_deref(), Some("   1HGCM82633A004352"));

        let mut obd = Obd2::new(MockTransport::from_script(&[("0902", "NO DATA\r\r>")]));
        assert_eq!(obd.get_vin().unwrap(), None);
    }

    #[test]
    fn adapter_info_is_trimmed() {
        let mut obd = Obd2::new(MockTransport::from_script(&[
            ("AT @1", "OBDII to RS232 Interpreter\r\r>"),
            ("AT RV", "12.6V\r\r>"),
            ("AT DP", "ISO 9141-2\r\r>"),
        ]));
        assert_eq!(obd.get_device_description().unwrap(), "OBDII to RS232 Interpreter");
        assert_eq!(obd.get_voltage().unwrap(), "12.6V");
        assert_eq!(obd.get_protocol().unwrap(), "ISO 9141-2");
        assert_eq!(obd.get_user_description().unwrap(), "?");
    }
}
