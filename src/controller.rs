//! Keyboard discovery and report transmission.

use std::ffi::CString;
use std::fmt::{self, Display, Formatter};

use hidapi::{HidApi, HidDevice, HidError};
use tracing::{debug, warn};

use crate::aura::{self, Message};
use crate::error::Error;

/// HID device attached to the host.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DeviceEntry {
    pub vendor_id: u16,
    pub product_id: u16,
    pub product: String,
    pub path: CString,
}

impl DeviceEntry {
    /// Check if this is a supported ROG Aura keyboard.
    pub fn is_aura_keyboard(&self) -> bool {
        self.vendor_id == aura::VENDOR_ID && aura::PRODUCT_IDS.contains(&self.product_id)
    }
}

impl Display for DeviceEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:04x}:{:04x})", self.product, self.vendor_id, self.product_id)
    }
}

/// Host HID subsystem.
pub trait HidBus {
    type Device: ReportSink;

    /// List all attached HID devices.
    fn devices(&self) -> Vec<DeviceEntry>;

    /// Open a device for writing.
    fn open(&self, entry: &DeviceEntry) -> Result<Self::Device, HidError>;
}

/// Opened HID device.
pub trait ReportSink {
    /// Write a feature report, its first byte being the report ID.
    fn write_report(&mut self, report: &[u8]) -> Result<(), HidError>;
}

/// HID access through hidapi.
pub struct HidApiBus {
    api: HidApi,
}

impl HidApiBus {
    pub fn new() -> Result<Self, Error> {
        Ok(Self { api: HidApi::new()? })
    }
}

impl HidBus for HidApiBus {
    type Device = HidDevice;

    fn devices(&self) -> Vec<DeviceEntry> {
        self.api
            .device_list()
            .map(|info| DeviceEntry {
                vendor_id: info.vendor_id(),
                product_id: info.product_id(),
                product: info.product_string().unwrap_or_default().to_owned(),
                path: info.path().to_owned(),
            })
            .collect()
    }

    fn open(&self, entry: &DeviceEntry) -> Result<HidDevice, HidError> {
        self.api.open_path(&entry.path)
    }
}

impl ReportSink for HidDevice {
    fn write_report(&mut self, report: &[u8]) -> Result<(), HidError> {
        self.send_feature_report(report)
    }
}

/// Outcome of updating all matched keyboards.
#[derive(Default, Debug)]
pub struct Summary {
    /// Keyboards which received the full report sequence.
    pub updated: usize,

    /// Keyboards which could not be opened or written to.
    pub failures: Vec<Error>,
}

/// Get all attached ROG Aura keyboards.
pub fn select<B: HidBus>(bus: &B) -> Vec<DeviceEntry> {
    bus.devices().into_iter().filter(DeviceEntry::is_aura_keyboard).collect()
}

/// Write a lighting change to a single keyboard.
///
/// The keyboard only shows the new state after the "set" and "apply" reports, so these are always
/// sent last and in this order.
pub fn transmit<S: ReportSink>(device: &mut S, messages: &[Message]) -> Result<(), HidError> {
    let trailer = [Message::set(), Message::apply()];

    for message in messages.iter().chain(&trailer) {
        debug!("writing report {:#04x}: {}", message.report_id(), message);
        device.write_report(message.as_bytes())?;
    }

    Ok(())
}

/// Write a lighting change to every attached ROG Aura keyboard.
pub fn update<B: HidBus>(bus: &B, messages: &[Message]) -> Result<Summary, Error> {
    let keyboards = select(bus);
    if keyboards.is_empty() {
        return Err(Error::NoCompatibleDeviceFound);
    }

    let mut summary = Summary::default();

    for keyboard in keyboards {
        println!("Found ROG Aura keyboard: {}", keyboard.path.to_string_lossy());
        println!("  VendorID: {:04x}", keyboard.vendor_id);
        println!("  ProductID: {:04x}", keyboard.product_id);
        println!("  Product: {}", keyboard.product);

        // Device handle is closed before the next keyboard is opened.
        let result = bus.open(&keyboard).and_then(|mut device| transmit(&mut device, messages));

        match result {
            Ok(()) => summary.updated += 1,
            Err(source) => {
                warn!("skipping {}: {}", keyboard, source);
                let device = keyboard.to_string();
                summary.failures.push(Error::DeviceWriteFailure { device, source });
            },
        }
    }

    Ok(summary)
}
