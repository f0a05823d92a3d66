//! The FloorLink API client
//!
//! Owns the credentials and transport, verifies them once at construction,
//! and exposes one thin method per supported endpoint. Every method is a
//! deterministic parameter-assembly wrapper around the two transport
//! primitives; no state outlives a single call.

use floorlink_domain::{
    AreaFilter, ClientConfig, DispatchRequest, Envelope, FloorLinkError, LineFilter, LineRef,
    MachineFilter, Params, PitchCounts, Result, SiteFilter,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::datetime::{normalize, DateTimeInput};
use crate::transport::Transport;

const INTEGRATION_NAME: &str = "floorlink-gateway-client";
const INTEGRATION_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Synchronous client for the FloorLink cloud API.
///
/// Immutable after [`connect`](Self::connect): concurrent endpoint calls
/// from multiple threads are fine (the underlying HTTP client is
/// `Send + Sync`), but construction itself is not re-entrant.
#[derive(Debug)]
pub struct FloorLinkClient {
    config: ClientConfig,
    transport: Transport,
}

impl FloorLinkClient {
    /// Connect to the API and verify the credentials against the configured
    /// site. Fails with [`FloorLinkError::Connection`] when verification
    /// does not succeed.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let gateway = hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .unwrap_or_else(|| "unknown-gateway".to_string());
        let user_agent =
            format!("{INTEGRATION_NAME}, version: {INTEGRATION_VERSION}, gateway: {gateway}");

        let transport = Transport::new(config.api_base(), config.auth_key.clone(), &user_agent)?;
        let client = Self { config, transport };

        let site_record = client.verify_connection()?;
        info!(site = client.config.site, "connected and verified site access");
        debug!(?site_record, "verified site record");

        Ok(client)
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Verify the credentials are valid for the configured site and return
    /// the matching site record.
    pub fn verify_connection(&self) -> Result<Value> {
        let params: Params = [("site", self.config.site)].into_iter().collect();
        let envelope = match self.transport.get("sites/", params) {
            Ok(envelope) => envelope,
            Err(FloorLinkError::Request(message)) => {
                return Err(FloorLinkError::Connection(message));
            }
            Err(err) => return Err(err),
        };

        let record = envelope
            .records()
            .ok()
            .and_then(|records| records.first())
            .ok_or_else(|| {
                FloorLinkError::Connection(
                    "site not found or no permission for the configured site".to_string(),
                )
            })?;

        if !site_matches(record.get("site"), self.config.site) {
            return Err(FloorLinkError::Connection(format!(
                "sites endpoint returned record for site {:?}, configured site is {}",
                record.get("site"),
                self.config.site
            )));
        }

        Ok(record.clone())
    }

    /// List sites, optionally filtered to one site number.
    pub fn get_sites(&self, filter: SiteFilter) -> Result<Envelope> {
        let mut params = filter.extra;
        params.set_opt("site", filter.site);
        self.transport.get("sites/", params)
    }

    /// List areas of the configured site, optionally filtered by area code
    /// or external id.
    pub fn get_areas(&self, filter: AreaFilter) -> Result<Envelope> {
        let mut params = filter.extra;
        params.set_default("site", self.config.site);
        params.set_opt("areacode", filter.areacode);
        params.set_opt("externalid", filter.externalid);
        self.transport.get("areas/", params)
    }

    /// List lines of the configured site, optionally filtered by area code,
    /// line code, or external id.
    pub fn get_lines(&self, filter: LineFilter) -> Result<Envelope> {
        let mut params = filter.extra;
        params.set_default("site", self.config.site);
        params.set_opt("areacode", filter.areacode);
        params.set_opt("code", filter.linecode);
        params.set_opt("externalid", filter.externalid);
        self.transport.get("lines/", params)
    }

    /// List machines of the configured site, optionally filtered by area,
    /// line, machine code, or external id.
    pub fn get_machines(&self, filter: MachineFilter) -> Result<Envelope> {
        let mut params = filter.extra;
        params.set_default("site", self.config.site);
        params.set_opt("areacode", filter.areacode);
        params.set_opt("linecode", filter.linecode);
        params.set_opt("code", filter.machinecode);
        params.set_opt("externalid", filter.externalid);
        self.transport.get("machines/", params)
    }

    /// Increment a machine's cycle count by `delta`.
    ///
    /// Intended for aggregated counts on a schedule, not per-cycle tag
    /// events; the endpoint is rate-unfriendly at tag-change frequency.
    pub fn increment_cycle_count(&self, machine_code: &str, delta: i64) -> Result<Envelope> {
        self.transport.post(
            "machines/increment_cycle_count/",
            self.cycle_count_params(machine_code, delta),
        )
    }

    /// Set a machine's cycle count to an absolute value.
    pub fn set_cycle_count(&self, machine_code: &str, value: i64) -> Result<Envelope> {
        self.transport
            .post("machines/set_cycle_count/", self.cycle_count_params(machine_code, value))
    }

    fn cycle_count_params(&self, machine_code: &str, count: i64) -> Params {
        let mut params = Params::new();
        params.set("site", self.config.site);
        params.set("code", machine_code);
        params.set("cyclecount", count);
        // Cycle counts flow continuously; do not touch the machine's
        // lastupdated marker on every report.
        params.set("skip_lastupdated", 1);
        params
    }

    /// Record production/scrap/operator counts for one reporting interval
    /// on a line.
    ///
    /// Returns `Ok(None)` without touching the network when `counts` is
    /// empty: there is nothing to record and the server would only create a
    /// zero row. Fails with [`FloorLinkError::Validation`] when the interval
    /// ends before it starts.
    pub fn record_pitch_details(
        &self,
        line: LineRef,
        start: impl Into<DateTimeInput>,
        end: impl Into<DateTimeInput>,
        product_code: &str,
        counts: PitchCounts,
    ) -> Result<Option<Envelope>> {
        if counts.is_empty() {
            debug!("record_pitch_details: no counts supplied, nothing to record");
            return Ok(None);
        }

        let start = normalize(start, None)?;
        let end = normalize(end, None)?;
        // Both sides share the fixed-width wire format, so the string
        // comparison is a chronological comparison.
        if start > end {
            warn!(%start, %end, "pitch interval rejected");
            return Err(FloorLinkError::Validation(format!(
                "pitch interval start {start} must not be after end {end}"
            )));
        }

        let mut params = Params::new();
        params.set("site", self.config.site);
        params.set("start", start);
        params.set("end", end);
        params.set("productcode", product_code);
        match line {
            LineRef::Code(code) => params.set("linecode", code),
            LineRef::ExternalId(id) => params.set("line_externalid", id),
        }
        params.set_opt("actual", counts.actual);
        params.set_opt("scrap", counts.scrap);
        params.set_opt("operator_count", counts.operator_count);

        self.transport.get("pitchdetails/record_details/", params).map(Some)
    }

    /// Open a maintenance dispatch against a machine.
    pub fn open_dispatch(&self, request: DispatchRequest) -> Result<Envelope> {
        let mut params = Params::new();
        params.set("site", self.config.site);
        params.set("dispatchtypecode", request.dispatchtypecode);
        params.set("description", request.description);
        params.set("machinecode", request.machinecode);
        params.set_opt("tradecode", request.tradecode);
        // Let the server fall back to its default trade when the supplied
        // one is invalid.
        params.set("trade_required", false);
        params.set("user", request.username.unwrap_or_else(|| self.config.username.clone()));

        self.transport.post("dispatches/open/", params)
    }
}

/// The sites endpoint is inconsistent about the `site` field's JSON type;
/// accept both the string and the number rendering.
fn site_matches(value: Option<&Value>, site: u32) -> bool {
    match value {
        Some(Value::String(s)) => *s == site.to_string(),
        Some(Value::Number(n)) => n.as_u64() == Some(u64::from(site)),
        _ => false,
    }
}
