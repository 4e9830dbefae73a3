//! Barcode scanning.
//!
//! [`ScanSession`] is the synchronous state machine; [`ScanDriver`] runs it
//! against a stream of [`ScanCommand`]s and a [`ProductSource`](crate::lookup::ProductSource).

mod driver;
mod event;
mod session;

pub use driver::{ScanCommand, ScanDriver, ScanUpdate};
pub use event::{CameraPermission, ScanEvent};
pub use session::{
    LookupTicket, ScanError, ScanMode, ScanNotice, ScanPhase, ScanSession, ScannedItem,
};
