use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::model::link::LinkTable;
use crate::model::message::{decode_message, encode_message, Message};
use crate::model::routing::RoutingTable;
use crate::runtime::advertiser;
use crate::runtime::cli::{self, read_startup_commands, spawn_stdin_reader, Command};
use crate::runtime::dispatch::{dispatch, forward_or_notify, Delivered};
use crate::runtime::transport::UdpTransport;

/// Owns the process-wide singletons (spec §5, §9) and runs the event loop
/// that interleaves the network receiver, the periodic advertiser, and
/// the operator interface.
pub struct Router {
    self_address: String,
    period: Duration,
    transport: UdpTransport,
    links: LinkTable,
    routes: RoutingTable,
    running: Arc<AtomicBool>,
    stdin_rx: Receiver<String>,
}

impl Router {
    pub fn new(self_address: String, period: Duration) -> Result<Self> {
        let transport = UdpTransport::bind(&self_address)?;
        let (tx, stdin_rx) = mpsc::channel();
        spawn_stdin_reader(tx);

        Ok(Self {
            routes: RoutingTable::new(self_address.clone()),
            self_address,
            period,
            transport,
            links: LinkTable::new(),
            running: Arc::new(AtomicBool::new(true)),
            stdin_rx,
        })
    }

    /// Executes every command in `path`'s contents, in order, before the
    /// event loop starts (spec §4.7, §6).
    pub fn load_startup_file(&mut self, path: &std::path::Path) -> Result<()> {
        let file = std::fs::File::open(path)?;
        for line in read_startup_commands(file)? {
            self.run_command(&line);
        }
        Ok(())
    }

    pub fn run_forever(&mut self) -> Result<()> {
        self.install_signal_handler()?;
        info!(
            self_address = %self.self_address,
            period_s = self.period.as_secs_f64(),
            "udpripd starting"
        );

        let mut next_tick = Instant::now() + self.period;

        while self.running.load(Ordering::Relaxed) {
            let now = Instant::now();
            let timeout = next_tick.saturating_duration_since(now).max(Duration::from_millis(1));

            match self.transport.recv(timeout) {
                Ok(Some((payload, addr))) => self.handle_datagram(&payload, addr.ip().to_string()),
                Ok(None) => {}
                Err(err) => warn!("recv error: {err}"),
            }

            while let Ok(line) = self.stdin_rx.try_recv() {
                self.run_command(&line);
                if !self.running.load(Ordering::Relaxed) {
                    break;
                }
            }

            if Instant::now() >= next_tick {
                self.advertise();
                next_tick = Instant::now() + self.period;
            }
        }

        info!("udpripd stopped");
        Ok(())
    }

    fn install_signal_handler(&self) -> Result<()> {
        let running = Arc::clone(&self.running);
        ctrlc::set_handler(move || {
            running.store(false, Ordering::Relaxed);
        })?;
        Ok(())
    }

    fn handle_datagram(&mut self, payload: &[u8], from: String) {
        let message = match decode_message(payload) {
            Ok(message) => message,
            Err(err) => {
                warn!(from = %from, "drop malformed datagram: {err}");
                return;
            }
        };

        let outcome = dispatch(
            &mut self.links,
            &mut self.routes,
            &self.self_address,
            message,
            Instant::now(),
        );
        self.apply_outbound(outcome.outbound);

        match outcome.delivered {
            Some(Delivered::Data(payload)) => println!("{payload}"),
            Some(Delivered::Control { reason, original }) => {
                println!("control: {reason} original={original:?}");
            }
            None => {}
        }
    }

    fn advertise(&mut self) {
        let outbound = advertiser::tick(
            &mut self.links,
            &mut self.routes,
            &self.self_address,
            Instant::now(),
            self.period,
        );
        self.apply_outbound(outbound);
    }

    fn apply_outbound(&mut self, outbound: Vec<(String, Message)>) {
        for (to, message) in outbound {
            match encode_message(&message) {
                Ok(payload) => {
                    if let Err(err) = self.transport.send(&payload, &to) {
                        warn!(to = %to, "send failed: {err}");
                    }
                }
                Err(err) => warn!("encode failed, dropping outbound message: {err}"),
            }
        }
    }

    /// Runs one operator command with the same semantics whether it came
    /// from a startup file or from interactive stdin (spec §4.7).
    fn run_command(&mut self, line: &str) {
        match cli::parse_command(line) {
            Command::Add { ip, weight } => {
                self.links.add(&ip, weight, Instant::now());
                self.routes.add_direct(&ip, weight);
                debug!(ip = %ip, weight, "neighbor added");
            }
            Command::Del { ip } => {
                self.links.remove(&ip);
                self.routes.purge_hop(&ip);
                debug!(ip = %ip, "neighbor removed");
            }
            Command::Trace { ip } => {
                let trace = Message::Trace {
                    source: self.self_address.clone(),
                    destination: ip,
                    routers: vec![self.self_address.clone()],
                };
                let outcome = forward_or_notify(&self.routes, &self.self_address, trace);
                self.apply_outbound(outcome.outbound);
            }
            Command::Quit => {
                self.running.store(false, Ordering::Relaxed);
            }
            Command::Unknown => {
                eprintln!("{}", cli::usage_line());
            }
        }
    }
}
