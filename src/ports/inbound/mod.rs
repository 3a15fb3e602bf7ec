/// Inbound ports (Driving ports) - Use case interfaces
///
/// These ports define the interfaces that external adapters (e.g., CLI)
/// use to interact with the application core.
pub mod export_port;

pub use export_port::{ExportRequest, ExportResponse, SbomExportPort};
