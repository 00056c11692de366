//! Nested report types handed to consumers.
//!
//! Every mapping in a [`FreewayCtmState`] is independently optional: `None`
//! means no data of that kind was collected, which is different from a
//! collected-but-empty mapping only in memory.  Rows cannot represent an
//! empty mapping, so decoding always yields `None` for one.

use std::collections::BTreeMap;

use ctm_core::{LinkId, NetworkId, RunId, Timestamp};

// ── Per-link records ──────────────────────────────────────────────────────────

/// Fundamental-diagram parameters of one link.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fd {
    pub free_flow_speed:       Option<f64>,
    pub critical_speed:        Option<f64>,
    pub congestion_wave_speed: Option<f64>,
    pub capacity:              Option<f64>,
    pub jam_density:           Option<f64>,
    pub capacity_drop:         Option<f64>,
}

impl Fd {
    /// `true` when no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.free_flow_speed.is_none()
            && self.critical_speed.is_none()
            && self.congestion_wave_speed.is_none()
            && self.capacity.is_none()
            && self.jam_density.is_none()
            && self.capacity_drop.is_none()
    }

    /// Overwrite the parameters that are set in `other`, keep the rest.
    pub fn merge(&mut self, other: &Fd) {
        merge_field(&mut self.free_flow_speed, other.free_flow_speed);
        merge_field(&mut self.critical_speed, other.critical_speed);
        merge_field(&mut self.congestion_wave_speed, other.congestion_wave_speed);
        merge_field(&mut self.capacity, other.capacity);
        merge_field(&mut self.jam_density, other.jam_density);
        merge_field(&mut self.capacity_drop, other.capacity_drop);
    }
}

/// Density and speed of a non-origin link.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FreewayLinkState {
    pub density: Option<f64>,
    pub speed:   Option<f64>,
}

impl FreewayLinkState {
    pub fn new(density: f64, speed: f64) -> Self {
        Self { density: Some(density), speed: Some(speed) }
    }

    pub fn is_empty(&self) -> bool {
        self.density.is_none() && self.speed.is_none()
    }

    pub fn merge(&mut self, other: &FreewayLinkState) {
        merge_field(&mut self.density, other.density);
        merge_field(&mut self.speed, other.speed);
    }
}

/// Inflow and outflow of a non-origin link.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FreewayLinkFlowState {
    pub in_flow:  Option<f64>,
    pub out_flow: Option<f64>,
}

impl FreewayLinkFlowState {
    pub fn new(in_flow: f64, out_flow: f64) -> Self {
        Self { in_flow: Some(in_flow), out_flow: Some(out_flow) }
    }

    pub fn is_empty(&self) -> bool {
        self.in_flow.is_none() && self.out_flow.is_none()
    }

    pub fn merge(&mut self, other: &FreewayLinkFlowState) {
        merge_field(&mut self.in_flow, other.in_flow);
        merge_field(&mut self.out_flow, other.out_flow);
    }
}

#[inline]
fn merge_field(dst: &mut Option<f64>, src: Option<f64>) {
    if src.is_some() {
        *dst = src;
    }
}

// ── FreewayCtmState ───────────────────────────────────────────────────────────

/// Freeway state for one moment and one statistical role (mean or standard
/// deviation).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FreewayCtmState {
    /// Density/speed of non-origin links.
    pub link_state_map:      Option<BTreeMap<LinkId, FreewayLinkState>>,
    /// In/out flow of non-origin links.
    pub link_flow_state_map: Option<BTreeMap<LinkId, FreewayLinkFlowState>>,
    /// Queue length of origin links.
    pub queue_length:        Option<BTreeMap<LinkId, f64>>,
}

impl FreewayCtmState {
    /// `true` when no mapping holds any entry.
    pub fn is_empty(&self) -> bool {
        self.link_state_map.as_ref().is_none_or(BTreeMap::is_empty)
            && self.link_flow_state_map.as_ref().is_none_or(BTreeMap::is_empty)
            && self.queue_length.as_ref().is_none_or(BTreeMap::is_empty)
    }

    /// Upsert the density/speed entry of `link`, keeping fields `state` leaves
    /// unset.
    pub fn merge_link_state(&mut self, link: LinkId, state: FreewayLinkState) {
        self.link_state_map
            .get_or_insert_with(BTreeMap::new)
            .entry(link)
            .or_default()
            .merge(&state);
    }

    /// Upsert the flow entry of `link`, keeping fields `flow` leaves unset.
    pub fn merge_link_flow_state(&mut self, link: LinkId, flow: FreewayLinkFlowState) {
        self.link_flow_state_map
            .get_or_insert_with(BTreeMap::new)
            .entry(link)
            .or_default()
            .merge(&flow);
    }

    /// Set the queue length of origin link `link`.
    pub fn set_queue_length(&mut self, link: LinkId, queue: f64) {
        self.queue_length
            .get_or_insert_with(BTreeMap::new)
            .insert(link, queue);
    }
}

// ── Reports ───────────────────────────────────────────────────────────────────

/// Single-estimate freeway report for one timestamp.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FreewayCtmReport {
    pub time:       Timestamp,
    pub network_id: NetworkId,
    pub run_id:     RunId,
    pub mean:       Option<FreewayCtmState>,
    pub std_dev:    Option<FreewayCtmState>,
    /// Fundamental diagrams, mean perspective only.
    pub fd:         Option<BTreeMap<LinkId, Fd>>,
}

impl FreewayCtmReport {
    /// An empty report with no state and no FD data.
    pub fn new(network_id: NetworkId, run_id: RunId, time: Timestamp) -> Self {
        Self { time, network_id, run_id, mean: None, std_dev: None, fd: None }
    }

    /// Upsert the FD entry of `link`, keeping parameters `fd` leaves unset.
    pub fn merge_fd(&mut self, link: LinkId, fd: &Fd) {
        self.fd
            .get_or_insert_with(BTreeMap::new)
            .entry(link)
            .or_default()
            .merge(fd);
    }
}

/// The members of an ensemble at one timestamp.  A member's index is its
/// position in `states`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FreewayCtmEnsembleState {
    pub time:   Timestamp,
    pub states: Vec<FreewayCtmState>,
}

impl FreewayCtmEnsembleState {
    pub fn new(time: Timestamp) -> Self {
        Self { time, states: Vec::new() }
    }

    pub fn member_count(&self) -> usize {
        self.states.len()
    }
}

/// Ensemble report: every member is a mean snapshot of one ensemble draw.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FreewayCtmEnsembleReport {
    pub network_id:     NetworkId,
    pub run_id:         RunId,
    pub ensemble_state: FreewayCtmEnsembleState,
}

impl FreewayCtmEnsembleReport {
    pub fn new(network_id: NetworkId, run_id: RunId, time: Timestamp) -> Self {
        Self { network_id, run_id, ensemble_state: FreewayCtmEnsembleState::new(time) }
    }

    #[inline]
    pub fn time(&self) -> Timestamp {
        self.ensemble_state.time
    }
}
