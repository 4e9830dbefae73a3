//! Scan session state machine.
//!
//! # Phases
//!
//! ```text
//! Idle ──start──▶ Scanning ──decode──▶ AwaitingLookup ──complete──▶ ShowingResult
//!  ▲                 ▲                                                  │
//!  └─────dismiss─────┴──────────dismiss (continuous mode)───────────────┘
//! ```
//!
//! `AwaitingLookup` is the re-entrancy guard: once a decode has been accepted,
//! every further decode is dropped until the result has been shown and
//! dismissed. Each accepted decode gets a [`LookupTicket`]; a result is only
//! applied if its ticket still matches the current phase, so a lookup that
//! resolves after the session was stopped has no effect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use super::event::{CameraPermission, ScanEvent};
use crate::ledger::NutritionLedger;
use crate::lookup::LookupError;
use crate::models::Product;

/// What happens after a result is dismissed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Return to idle; the user presses scan again for the next item
    #[default]
    Single,
    /// Re-arm immediately to accumulate several items
    Continuous,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Single => write!(f, "single"),
            ScanMode::Continuous => write!(f, "continuous"),
        }
    }
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(ScanMode::Single),
            "continuous" | "accumulate" => Ok(ScanMode::Continuous),
            _ => Err(format!(
                "Invalid scan mode: '{}'. Valid options: single, continuous",
                s
            )),
        }
    }
}

/// Handle for the single lookup a session has in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    id: u64,
    barcode: String,
}

impl LookupTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn barcode(&self) -> &str {
        &self.barcode
    }
}

/// Dismissible message shown once a lookup resolves.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanNotice {
    Added(Product),
    NotFound { barcode: String },
    Failed { barcode: String, cause: String },
}

impl ScanNotice {
    pub fn is_success(&self) -> bool {
        matches!(self, ScanNotice::Added(_))
    }
}

impl fmt::Display for ScanNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanNotice::Added(product) => write!(f, "Added {}", product),
            ScanNotice::NotFound { barcode } => {
                write!(f, "No product found for barcode {}", barcode)
            }
            ScanNotice::Failed { barcode, cause } => {
                write!(f, "Lookup for {} failed: {}", barcode, cause)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanPhase {
    Idle,
    Scanning,
    AwaitingLookup(LookupTicket),
    ShowingResult(ScanNotice),
}

impl ScanPhase {
    pub fn name(&self) -> &'static str {
        match self {
            ScanPhase::Idle => "idle",
            ScanPhase::Scanning => "scanning",
            ScanPhase::AwaitingLookup(_) => "awaiting_lookup",
            ScanPhase::ShowingResult(_) => "showing_result",
        }
    }
}

/// A product scanned during this session.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScannedItem {
    pub product: Product,
    pub barcode: String,
    pub scanned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("Camera permission has not been granted yet")]
    PermissionRequired,
    #[error("Camera permission denied. Grant access to scan barcodes.")]
    PermissionDenied,
    #[error("A lookup is already in progress")]
    LookupInFlight,
    #[error("Dismiss the current result before scanning again")]
    ResultPending,
}

/// Per-screen scan state. Owned exclusively by the scanner that created it.
#[derive(Debug)]
pub struct ScanSession {
    id: Uuid,
    phase: ScanPhase,
    permission: CameraPermission,
    mode: ScanMode,
    ledger: NutritionLedger,
    items: Vec<ScannedItem>,
    next_ticket: u64,
}

impl ScanSession {
    pub fn new(ledger: NutritionLedger, mode: ScanMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: ScanPhase::Idle,
            permission: CameraPermission::Undetermined,
            mode,
            ledger,
            items: Vec::new(),
            next_ticket: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> &ScanPhase {
        &self.phase
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn permission(&self) -> CameraPermission {
        self.permission
    }

    pub fn ledger(&self) -> &NutritionLedger {
        &self.ledger
    }

    /// Products added during this session, oldest first.
    pub fn items(&self) -> &[ScannedItem] {
        &self.items
    }

    /// True while decode callbacks are accepted.
    pub fn is_armed(&self) -> bool {
        self.phase == ScanPhase::Scanning
    }

    /// The result currently on screen, if any.
    pub fn notice(&self) -> Option<&ScanNotice> {
        match &self.phase {
            ScanPhase::ShowingResult(notice) => Some(notice),
            _ => None,
        }
    }

    pub fn set_permission(&mut self, permission: CameraPermission) {
        if permission != CameraPermission::Granted && self.phase != ScanPhase::Idle {
            self.stop();
        }
        self.permission = permission;
    }

    /// Arms the decode callback.
    pub fn start_scanning(&mut self) -> Result<(), ScanError> {
        match self.permission {
            CameraPermission::Granted => {}
            CameraPermission::Undetermined => return Err(ScanError::PermissionRequired),
            CameraPermission::Denied => return Err(ScanError::PermissionDenied),
        }

        match &self.phase {
            ScanPhase::Idle => self.transition(ScanPhase::Scanning),
            ScanPhase::Scanning => {}
            ScanPhase::AwaitingLookup(_) => return Err(ScanError::LookupInFlight),
            ScanPhase::ShowingResult(_) => match self.mode {
                ScanMode::Continuous => self.transition(ScanPhase::Scanning),
                ScanMode::Single => return Err(ScanError::ResultPending),
            },
        }
        Ok(())
    }

    /// Accepts a decode event if the session is armed.
    ///
    /// Returns the ticket for the lookup the caller must now run. Events that
    /// arrive while not armed, or that carry no payload, are dropped.
    pub fn on_decode(&mut self, event: &ScanEvent) -> Option<LookupTicket> {
        if !self.is_armed() {
            tracing::debug!(
                session = %self.id,
                phase = self.phase.name(),
                "Dropping decode event"
            );
            return None;
        }
        if !event.has_payload() {
            tracing::debug!(session = %self.id, "Dropping decode event without payload");
            return None;
        }

        self.next_ticket += 1;
        let ticket = LookupTicket {
            id: self.next_ticket,
            barcode: event.data.clone(),
        };
        tracing::info!(
            session = %self.id,
            kind = %event.kind,
            barcode = %ticket.barcode,
            "Barcode scanned"
        );
        self.transition(ScanPhase::AwaitingLookup(ticket.clone()));
        Some(ticket)
    }

    /// Applies a lookup result.
    ///
    /// Returns `None` without side effects when the ticket is stale.
    pub fn complete(
        &mut self,
        ticket: &LookupTicket,
        outcome: Result<Product, LookupError>,
    ) -> Option<&ScanNotice> {
        match &self.phase {
            ScanPhase::AwaitingLookup(current) if current == ticket => {}
            _ => {
                tracing::debug!(
                    session = %self.id,
                    ticket = ticket.id,
                    phase = self.phase.name(),
                    "Discarding stale lookup result"
                );
                return None;
            }
        }

        let notice = match outcome {
            Ok(product) => {
                self.ledger.add_nutrition(product.delta());
                self.items.push(ScannedItem {
                    product: product.clone(),
                    barcode: ticket.barcode.clone(),
                    scanned_at: Utc::now(),
                });
                ScanNotice::Added(product)
            }
            Err(LookupError::NotFound(barcode)) => ScanNotice::NotFound { barcode },
            Err(e) => {
                tracing::warn!(
                    session = %self.id,
                    barcode = %ticket.barcode,
                    "Lookup failed: {}",
                    e
                );
                ScanNotice::Failed {
                    barcode: ticket.barcode.clone(),
                    cause: e.to_string(),
                }
            }
        };

        self.transition(ScanPhase::ShowingResult(notice));
        self.notice()
    }

    /// Acknowledges the current result. Returns false if nothing was shown.
    pub fn dismiss(&mut self) -> bool {
        if self.notice().is_none() {
            return false;
        }

        let next = match self.mode {
            ScanMode::Continuous if self.permission.is_granted() => ScanPhase::Scanning,
            _ => ScanPhase::Idle,
        };
        self.transition(next);
        true
    }

    /// Returns to idle from any phase. An in-flight lookup becomes stale.
    pub fn stop(&mut self) {
        if self.phase != ScanPhase::Idle {
            self.transition(ScanPhase::Idle);
        }
    }

    fn transition(&mut self, next: ScanPhase) {
        tracing::debug!(
            session = %self.id,
            from = self.phase.name(),
            to = next.name(),
            "Scan phase change"
        );
        self.phase = next;
    }
}
