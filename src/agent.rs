/*!
 * Monitor Agent
 *
 * Builds every component once and wires them together explicitly:
 * correlator and sink into the interceptors, pipeline and scanner onto one
 * schedule. The RPC runtime adapter registers the interceptors it gets here.
 */

use crate::config::MonitorConfig;
use crate::core::limits::CORRELATION_SWEEP_INTERVAL;
use crate::core::AgentResult;
use crate::correlation::TimingCorrelator;
use crate::delivery::{DeliveryPipeline, DeliveryStats, EventSink, Transport};
use crate::interceptor::{
    CaptureSettings, ClientInterceptor, InterceptorContext, ServerInterceptor,
};
use crate::schedule::{JobHandle, Schedule};
use crate::topology::{DirectoryConnector, TopologyScanner};
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Running agent
pub struct Agent {
    config: MonitorConfig,
    correlator: TimingCorrelator,
    pipeline: DeliveryPipeline,
    schedule: Schedule,
    client: ClientInterceptor,
    server: ServerInterceptor,
    scanner: Option<Arc<TopologyScanner>>,
    sweep: JobHandle,
    stopped: AtomicBool,
}

impl Agent {
    /// Start delivery, correlation sweeping and (with a connector) topology scanning
    pub fn start(
        config: MonitorConfig,
        transport: Arc<dyn Transport>,
        connector: Option<Arc<dyn DirectoryConnector>>,
    ) -> AgentResult<Self> {
        info!(config = %config, "Starting monitor agent");

        let schedule = Schedule::start()?;
        let correlator = TimingCorrelator::new();
        let pipeline = DeliveryPipeline::new(&config, Arc::clone(&transport))?;
        pipeline.start(&schedule)?;

        let sweep = {
            let correlator = correlator.clone();
            let ttl = config.correlation_ttl;
            schedule.every(
                "correlation-sweep",
                CORRELATION_SWEEP_INTERVAL,
                CORRELATION_SWEEP_INTERVAL,
                move || {
                    let removed = correlator.sweep(ttl, Instant::now());
                    if removed > 0 {
                        debug!(removed, "Swept unmatched correlation entries");
                    }
                },
            )?
        };

        let sink: Arc<dyn EventSink> = Arc::new(pipeline.clone());
        let ctx = Arc::new(InterceptorContext::new(
            correlator.clone(),
            sink,
            CaptureSettings::from_config(&config),
            detect_local_address(),
        ));

        let scanner = match connector {
            Some(connector) => {
                let scanner = Arc::new(TopologyScanner::new(&config, connector, transport));
                scanner.start(&schedule)?;
                Some(scanner)
            }
            None => None,
        };

        info!(local_host = %ctx.local_host, "Monitor agent started");
        Ok(Self {
            config,
            correlator,
            pipeline,
            schedule,
            client: ClientInterceptor::new(Arc::clone(&ctx)),
            server: ServerInterceptor::new(ctx),
            scanner,
            sweep,
            stopped: AtomicBool::new(false),
        })
    }

    pub fn client_interceptor(&self) -> &ClientInterceptor {
        &self.client
    }

    pub fn server_interceptor(&self) -> &ServerInterceptor {
        &self.server
    }

    pub fn pipeline(&self) -> &DeliveryPipeline {
        &self.pipeline
    }

    pub fn correlator(&self) -> &TimingCorrelator {
        &self.correlator
    }

    pub fn scanner(&self) -> Option<&Arc<TopologyScanner>> {
        self.scanner.as_ref()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn health_check(&self) -> bool {
        self.pipeline.health_check()
    }

    pub fn stats(&self) -> DeliveryStats {
        self.pipeline.stats()
    }

    /// Stop scanning, drain delivery, stop the schedule; idempotent
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("Shutting down monitor agent");
        if let Some(scanner) = &self.scanner {
            scanner.stop();
        }
        self.sweep.cancel();
        self.pipeline.shutdown();
        self.schedule.shutdown();
        info!(stats = %self.pipeline.stats(), "Monitor agent stopped");
    }
}

impl Drop for Agent {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Address of the interface used for outbound traffic, else loopback
///
/// Connecting a UDP socket sends nothing; it only selects a route.
pub fn detect_local_address() -> String {
    let routed = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .and_then(|socket| {
            socket.connect((Ipv4Addr::new(192, 0, 2, 1), 9))?;
            socket.local_addr()
        })
        .map(|addr| addr.ip())
        .ok()
        .filter(|ip| !ip.is_unspecified());

    routed
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
        .to_string()
}
