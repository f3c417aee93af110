//! Testing utilities for RenameDisk workspace
//!
//! Shared fixtures (a simulated AHCI storage stack) and tracing setup.

#![allow(missing_docs)]

use rdisk_host::sim::{SimPlane, SimService};
use rdisk_host::{Service, ServiceRef};
use rdisk_props::PropertyValue;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub const TARGET_CLASS: &str = "IOAHCIBlockStorageDriver";
pub const DRIVER_CLASS: &str = "NewIOBlockStorageDriver";

pub const DEFAULT_MODEL: &str = "ST1000DM003-1CH162";
pub const DEFAULT_REVISION: &str = "CC43";
pub const DEFAULT_SERIAL: &str = "Z1D5K2QX";

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `warn`)
///
/// Safe to call from every test; only the first call wins.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Identity a simulated disk publishes every time it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskIdentity {
    pub model: String,
    pub revision: String,
    pub serial: String,
}

impl DiskIdentity {
    pub fn with_model(model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..Self::default()
        }
    }
}

impl Default for DiskIdentity {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            revision: DEFAULT_REVISION.to_string(),
            serial: DEFAULT_SERIAL.to_string(),
        }
    }
}

fn publish_identity(node: &SimService, identity: &DiskIdentity) {
    let entries = [
        ("Model", identity.model.as_str()),
        ("Revision", identity.revision.as_str()),
        ("Serial Number", identity.serial.as_str()),
    ];
    for (key, value) in entries {
        if let Err(err) = node.set_property(key, PropertyValue::from(value)) {
            tracing::warn!("fixture: could not publish {key} on {}: {err}", node.name());
        }
    }
}

/// Register the storage classes used by the fixtures
///
/// `with_target` controls whether the AHCI disk driver class (and its
/// subclasses) is loaded at all.
pub fn register_storage_classes(plane: &SimPlane, with_target: bool) {
    let classes: &[(&str, &str)] = &[
        ("AppleAHCIPort", "IOService"),
        ("IOAHCIDevice", "IOService"),
        ("IOSCSIPeripheralDeviceNub", "IOService"),
        ("IOBlockStorageDevice", "IOService"),
        ("IOAHCIBlockStorageDevice", "IOBlockStorageDevice"),
        ("IOBlockStorageDriver", "IOService"),
        (DRIVER_CLASS, "IOBlockStorageDriver"),
    ];

    plane.register_class("IOService", None).unwrap();
    for (name, superclass) in classes {
        plane.register_class(name, Some(superclass)).unwrap();
    }
    if with_target {
        plane.register_class(TARGET_CLASS, Some("IOService")).unwrap();
        plane
            .register_class("AppleAHCIDiskDriver", Some(TARGET_CLASS))
            .unwrap();
    }
}

/// Simulated AHCI stack
///
/// ```text
/// Root
///  └─ port        AppleAHCIPort
///      └─ device  IOAHCIDevice          (held open by disk)
///          └─ disk          <disk class>    publishes Model on start
///              └─ block_device  IOAHCIBlockStorageDevice
///                  └─ driver    NewIOBlockStorageDriver
/// ```
#[derive(Debug)]
pub struct AhciStack {
    pub plane: Arc<SimPlane>,
    pub port: Arc<SimService>,
    pub device: Arc<SimService>,
    pub disk: Arc<SimService>,
    pub block_device: Arc<SimService>,
    pub driver: Arc<SimService>,
}

impl AhciStack {
    /// Stack whose disk is an `IOAHCIBlockStorageDriver`
    pub fn new() -> Self {
        Self::build(TARGET_CLASS, true, DiskIdentity::default())
    }

    /// Stack whose disk node has class `disk_class`
    pub fn with_disk_class(disk_class: &str) -> Self {
        Self::build(disk_class, true, DiskIdentity::default())
    }

    /// Stack whose disk reports `identity`
    pub fn with_identity(identity: DiskIdentity) -> Self {
        Self::build(TARGET_CLASS, true, identity)
    }

    /// Stack in which the AHCI disk driver class was never loaded
    pub fn without_target_class() -> Self {
        Self::build("IOSCSIPeripheralDeviceNub", false, DiskIdentity::default())
    }

    fn build(disk_class: &str, with_target: bool, identity: DiskIdentity) -> Self {
        let plane = Arc::new(SimPlane::new());
        register_storage_classes(&plane, with_target);

        let port = plane.attach("port", "AppleAHCIPort", plane.root()).unwrap();
        let device = plane.attach("device", "IOAHCIDevice", &port).unwrap();
        let disk = plane.attach("disk", disk_class, &device).unwrap();
        let block_device = plane
            .attach("block_device", "IOAHCIBlockStorageDevice", &disk)
            .unwrap();
        let driver = plane.attach("driver", DRIVER_CLASS, &block_device).unwrap();

        device.open(&*disk);
        publish_identity(&disk, &identity);
        disk.set_on_start(Arc::new(move |node: &SimService| {
            publish_identity(node, &identity);
        }));

        Self {
            plane,
            port,
            device,
            disk,
            block_device,
            driver,
        }
    }

    pub fn driver_ref(&self) -> ServiceRef {
        self.driver.as_service_ref()
    }

    /// The driver's provider, i.e. what `start`/`stop` receive
    pub fn provider_ref(&self) -> ServiceRef {
        self.block_device.as_service_ref()
    }

    pub fn disk_ref(&self) -> ServiceRef {
        self.disk.as_service_ref()
    }

    /// Current `Model` of the disk, if it is a string
    pub fn disk_model(&self) -> Option<String> {
        match self.disk.property("Model") {
            Some(PropertyValue::String(model)) => Some(model),
            _ => None,
        }
    }
}

impl Default for AhciStack {
    fn default() -> Self {
        Self::new()
    }
}
