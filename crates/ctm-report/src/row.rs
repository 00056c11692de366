//! The flat row contract shared by the storage backend and the pivot engine.
//!
//! # Columns
//!
//! | Column          | Type    | Nullable | Meaning                            |
//! |-----------------|---------|----------|------------------------------------|
//! | `network_id`    | integer | no       | network                            |
//! | `app_run_id`    | integer | no       | application run                    |
//! | `ts`            | integer | no       | timestamp, epoch millis            |
//! | `link_id`       | integer | no       | link                               |
//! | `agg_type`      | integer | no       | aggregation code (raw = 1)         |
//! | `qty_type`      | integer | no       | quantity code (mean 2, std-dev 4)  |
//! | `ctm_id`        | integer | no       | ensemble member, debug table only  |
//! | `in_flow` … `queue_len`             | real | yes | link state           |
//! | `ff_speed` … `capacity_drop`        | real | yes | fundamental diagram  |
//!
//! Column names are matched case-insensitively.

use ctm_core::{AggregationType, LinkId, NetworkId, QuantityType, RunId, Timestamp};

use crate::cursor::Row;
use crate::error::CursorError;
use crate::model::{Fd, FreewayLinkFlowState, FreewayLinkState};

// ── Column ────────────────────────────────────────────────────────────────────

/// Every column a report row may carry.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Column {
    NetworkId,
    RunId,
    Timestamp,
    LinkId,
    AggregationType,
    QuantityType,
    /// Ensemble member index (`ctm_id`).  Present only in the debug table.
    EnsembleIndex,
    InFlow,
    OutFlow,
    Density,
    Speed,
    QueueLength,
    FreeFlowSpeed,
    CriticalSpeed,
    CongestionWaveSpeed,
    Capacity,
    JamDensity,
    CapacityDrop,
}

impl Column {
    /// Columns of the standard report table, in storage order.
    pub const STANDARD: [Column; 17] = [
        Column::NetworkId,
        Column::RunId,
        Column::Timestamp,
        Column::LinkId,
        Column::AggregationType,
        Column::QuantityType,
        Column::InFlow,
        Column::OutFlow,
        Column::Density,
        Column::Speed,
        Column::QueueLength,
        Column::FreeFlowSpeed,
        Column::CriticalSpeed,
        Column::CongestionWaveSpeed,
        Column::Capacity,
        Column::JamDensity,
        Column::CapacityDrop,
    ];

    /// Columns of the debug/ensemble report table, in storage order.
    pub const DEBUG: [Column; 18] = [
        Column::NetworkId,
        Column::RunId,
        Column::Timestamp,
        Column::LinkId,
        Column::AggregationType,
        Column::QuantityType,
        Column::EnsembleIndex,
        Column::InFlow,
        Column::OutFlow,
        Column::Density,
        Column::Speed,
        Column::QueueLength,
        Column::FreeFlowSpeed,
        Column::CriticalSpeed,
        Column::CongestionWaveSpeed,
        Column::Capacity,
        Column::JamDensity,
        Column::CapacityDrop,
    ];

    /// The six fundamental-diagram columns.
    pub const FD: [Column; 6] = [
        Column::FreeFlowSpeed,
        Column::CriticalSpeed,
        Column::CongestionWaveSpeed,
        Column::Capacity,
        Column::JamDensity,
        Column::CapacityDrop,
    ];

    /// Storage name of the column.
    pub const fn name(self) -> &'static str {
        match self {
            Column::NetworkId           => "network_id",
            Column::RunId               => "app_run_id",
            Column::Timestamp           => "ts",
            Column::LinkId              => "link_id",
            Column::AggregationType     => "agg_type",
            Column::QuantityType        => "qty_type",
            Column::EnsembleIndex       => "ctm_id",
            Column::InFlow              => "in_flow",
            Column::OutFlow             => "out_flow",
            Column::Density             => "density",
            Column::Speed               => "speed",
            Column::QueueLength         => "queue_len",
            Column::FreeFlowSpeed       => "ff_speed",
            Column::CriticalSpeed       => "crit_speed",
            Column::CongestionWaveSpeed => "cong_speed",
            Column::Capacity            => "capacity",
            Column::JamDensity          => "jam_density",
            Column::CapacityDrop        => "capacity_drop",
        }
    }

    /// `true` for integer key columns; `false` for the nullable real data
    /// columns.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Column::NetworkId
                | Column::RunId
                | Column::Timestamp
                | Column::LinkId
                | Column::AggregationType
                | Column::QuantityType
                | Column::EnsembleIndex
        )
    }

    /// Case-insensitive lookup by storage name.
    pub fn from_name(name: &str) -> Option<Column> {
        Column::DEBUG
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── ReportRow ─────────────────────────────────────────────────────────────────

/// One flat report row: one link, one quantity role, one timestamp and, in
/// the debug table, one ensemble member.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportRow {
    pub network_id:     NetworkId,
    pub run_id:         RunId,
    pub time:           Timestamp,
    pub link_id:        LinkId,
    pub aggregation:    AggregationType,
    pub quantity:       QuantityType,
    /// `Some` only for rows of the debug/ensemble table.
    pub ensemble_index: Option<i64>,
    pub fd:             Fd,
    pub flow:           FreewayLinkFlowState,
    pub state:          FreewayLinkState,
    pub queue_length:   Option<f64>,
}

impl ReportRow {
    /// A row with every nullable data column unset.
    pub fn new(
        network_id:  NetworkId,
        run_id:      RunId,
        time:        Timestamp,
        link_id:     LinkId,
        aggregation: AggregationType,
        quantity:    QuantityType,
    ) -> Self {
        Self {
            network_id,
            run_id,
            time,
            link_id,
            aggregation,
            quantity,
            ensemble_index: None,
            fd:             Fd::default(),
            flow:           FreewayLinkFlowState::default(),
            state:          FreewayLinkState::default(),
            queue_length:   None,
        }
    }

    /// Nullable real value of a data column; `None` for key columns.
    pub fn real(&self, column: Column) -> Option<f64> {
        match column {
            Column::InFlow              => self.flow.in_flow,
            Column::OutFlow             => self.flow.out_flow,
            Column::Density             => self.state.density,
            Column::Speed               => self.state.speed,
            Column::QueueLength         => self.queue_length,
            Column::FreeFlowSpeed       => self.fd.free_flow_speed,
            Column::CriticalSpeed       => self.fd.critical_speed,
            Column::CongestionWaveSpeed => self.fd.congestion_wave_speed,
            Column::Capacity            => self.fd.capacity,
            Column::JamDensity          => self.fd.jam_density,
            Column::CapacityDrop        => self.fd.capacity_drop,
            _                           => None,
        }
    }

    /// Integer value of a key column; `None` for data columns and for the
    /// ensemble index of a standard row.
    pub fn integer(&self, column: Column) -> Option<i64> {
        match column {
            Column::NetworkId       => Some(self.network_id.0),
            Column::RunId           => Some(self.run_id.0),
            Column::Timestamp       => Some(self.time.0),
            Column::LinkId          => Some(self.link_id.0),
            Column::AggregationType => Some(self.aggregation.code()),
            Column::QuantityType    => Some(self.quantity.code()),
            Column::EnsembleIndex   => self.ensemble_index,
            _                       => None,
        }
    }
}

impl Row for ReportRow {
    fn get_i64(&self, column: Column) -> Result<Option<i64>, CursorError> {
        if !column.is_integer() {
            return Err(CursorError::type_mismatch(column, "integer"));
        }
        Ok(self.integer(column))
    }

    fn get_f64(&self, column: Column) -> Result<Option<f64>, CursorError> {
        if column.is_integer() {
            return Ok(self.integer(column).map(|v| v as f64));
        }
        Ok(self.real(column))
    }
}
