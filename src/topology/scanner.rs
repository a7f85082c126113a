/*!
 * Topology Scanner
 * Periodic directory walk with reconnect-on-failure and report delivery
 */

use super::directory::{DirectoryConnector, NamingContext};
use super::entry::{NamingEntry, NamingReport};
use super::walk::walk;
use crate::config::MonitorConfig;
use crate::core::{DirectoryError, ScheduleError};
use crate::delivery::Transport;
use crate::schedule::{JobHandle, Schedule};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Walks the naming directory on a schedule and reports it
pub struct TopologyScanner {
    connector: Arc<dyn DirectoryConnector>,
    transport: Arc<dyn Transport>,
    report_url: String,
    corbaloc: String,
    enabled: bool,
    interval: Duration,
    root: Mutex<Option<Arc<dyn NamingContext>>>,
    job: Mutex<Option<JobHandle>>,
    last_report: Mutex<Option<Vec<NamingEntry>>>,
}

impl TopologyScanner {
    pub fn new(
        config: &MonitorConfig,
        connector: Arc<dyn DirectoryConnector>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            connector,
            transport,
            report_url: config.nameserver_report_endpoint(),
            corbaloc: config.nameserver_corbaloc(),
            enabled: config.scan_enabled,
            interval: config.scan_interval,
            root: Mutex::new(None),
            job: Mutex::new(None),
            last_report: Mutex::new(None),
        }
    }

    /// Connect and schedule scans, the first one immediately
    ///
    /// A failed initial connection is retried by the first scan.
    pub fn start(self: &Arc<Self>, schedule: &Schedule) -> Result<(), ScheduleError> {
        if !self.enabled {
            info!("Nameserver scanning disabled");
            return Ok(());
        }
        if let Err(e) = self.connect() {
            warn!(error = %e, "Initial nameserver connection failed");
        }

        let scanner = Arc::clone(self);
        let handle = schedule.every("scan", Duration::ZERO, self.interval, move || scanner.scan())?;
        *self.job.lock() = Some(handle);
        info!(
            interval_secs = self.interval.as_secs(),
            nameserver = %self.corbaloc,
            "Nameserver scanner started"
        );
        Ok(())
    }

    /// Cancel future scans
    pub fn stop(&self) {
        if let Some(job) = self.job.lock().take() {
            job.cancel();
            info!("Nameserver scanner stopped");
        }
    }

    /// One scan cycle
    pub fn scan(&self) {
        let cached = self.root.lock().clone();
        let root = match cached {
            Some(root) => root,
            None => match self.connect() {
                Ok(root) => root,
                Err(e) => {
                    warn!(error = %e, "Cannot connect to nameserver, skipping scan");
                    return;
                }
            },
        };

        match walk(root) {
            Ok(entries) => {
                info!(entries = entries.len(), "Nameserver scan complete");
                self.report(&entries);
                *self.last_report.lock() = Some(entries);
            }
            Err(e) => {
                error!(error = %e, "Nameserver scan failed, reconnecting next cycle");
                *self.root.lock() = None;
            }
        }
    }

    /// Entries of the most recent successful walk
    pub fn last_report(&self) -> Option<Vec<NamingEntry>> {
        self.last_report.lock().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.root.lock().is_some()
    }

    /// Primary initial reference, then the corbaloc fallback
    fn connect(&self) -> Result<Arc<dyn NamingContext>, DirectoryError> {
        let root = match self.connector.resolve_initial() {
            Ok(root) => {
                info!("Connected to naming service via initial references");
                root
            }
            Err(e) => {
                debug!(error = %e, corbaloc = %self.corbaloc, "Initial reference failed, trying corbaloc");
                let root = self.connector.resolve_str(&self.corbaloc)?;
                info!(corbaloc = %self.corbaloc, "Connected to naming service via corbaloc");
                root
            }
        };
        *self.root.lock() = Some(Arc::clone(&root));
        Ok(root)
    }

    fn report(&self, entries: &[NamingEntry]) {
        let body = match serde_json::to_vec(&NamingReport::new(entries)) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to encode nameserver report");
                return;
            }
        };

        match self.transport.post_json(&self.report_url, body) {
            Ok(status) if (200..300).contains(&status) => {
                info!(entries = entries.len(), "Reported nameserver entries");
            }
            Ok(status) => warn!(status, "Nameserver report rejected"),
            Err(e) => error!(error = %e, "Failed to report nameserver entries"),
        }
    }
}
