//! Report → rows.
//!
//! Encoding is a pure function of the report and the aggregation type.  Rows
//! come out bucket by bucket (non-origin mean, non-origin std-dev, origin
//! mean, origin std-dev), ascending link id within each bucket.

use ctm_core::{AggregationType, LinkId, NetworkId, QuantityType, RunId, Timestamp};

use crate::classify::LinkBuckets;
use crate::model::{FreewayCtmEnsembleReport, FreewayCtmReport, FreewayCtmState};
use crate::row::ReportRow;

/// Key columns shared by every row of one report (or ensemble member).
#[derive(Clone, Copy)]
struct RowTemplate {
    network_id:     NetworkId,
    run_id:         RunId,
    time:           Timestamp,
    aggregation:    AggregationType,
    ensemble_index: Option<i64>,
}

impl RowTemplate {
    fn row(&self, link: LinkId, quantity: QuantityType) -> ReportRow {
        let mut row = ReportRow::new(
            self.network_id,
            self.run_id,
            self.time,
            link,
            self.aggregation,
            quantity,
        );
        row.ensemble_index = self.ensemble_index;
        row
    }
}

/// Encode a single-estimate report.
///
/// Rows carry no ensemble index; a writer targeting the debug table stores
/// them as member 0.
pub fn encode_report(report: &FreewayCtmReport, aggregation: AggregationType) -> Vec<ReportRow> {
    let template = RowTemplate {
        network_id:     report.network_id,
        run_id:         report.run_id,
        time:           report.time,
        aggregation,
        ensemble_index: None,
    };
    let buckets = LinkBuckets::for_report(report);
    let mut rows = Vec::with_capacity(buckets.row_count());

    for &link in &buckets.non_origin_mean {
        let mut row = non_origin_row(&template, link, QuantityType::Mean, report.mean.as_ref());
        if let Some(fd) = report.fd.as_ref().and_then(|m| m.get(&link)) {
            row.fd = *fd;
        }
        rows.push(row);
    }
    for &link in &buckets.non_origin_std_dev {
        rows.push(non_origin_row(&template, link, QuantityType::StdDev, report.std_dev.as_ref()));
    }
    for &link in &buckets.origin_mean {
        rows.push(origin_row(&template, link, QuantityType::Mean, report.mean.as_ref()));
    }
    for &link in &buckets.origin_std_dev {
        rows.push(origin_row(&template, link, QuantityType::StdDev, report.std_dev.as_ref()));
    }

    rows
}

/// Encode an ensemble report into debug-table rows.  The member at position
/// `p` is written with ensemble index `p`; FD columns are always NULL.
pub fn encode_ensemble(
    report:      &FreewayCtmEnsembleReport,
    aggregation: AggregationType,
) -> Vec<ReportRow> {
    let mut rows = Vec::new();

    for (position, state) in report.ensemble_state.states.iter().enumerate() {
        let template = RowTemplate {
            network_id:     report.network_id,
            run_id:         report.run_id,
            time:           report.ensemble_state.time,
            aggregation,
            ensemble_index: Some(position as i64),
        };
        let buckets = LinkBuckets::for_member(state);
        rows.reserve(buckets.row_count());

        for &link in &buckets.non_origin_mean {
            rows.push(non_origin_row(&template, link, QuantityType::Mean, Some(state)));
        }
        for &link in &buckets.origin_mean {
            rows.push(origin_row(&template, link, QuantityType::Mean, Some(state)));
        }
    }

    rows
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn non_origin_row(
    template: &RowTemplate,
    link:     LinkId,
    quantity: QuantityType,
    state:    Option<&FreewayCtmState>,
) -> ReportRow {
    let mut row = template.row(link, quantity);
    if let Some(state) = state {
        if let Some(s) = state.link_state_map.as_ref().and_then(|m| m.get(&link)) {
            row.state = *s;
        }
        if let Some(f) = state.link_flow_state_map.as_ref().and_then(|m| m.get(&link)) {
            row.flow = *f;
        }
    }
    row
}

fn origin_row(
    template: &RowTemplate,
    link:     LinkId,
    quantity: QuantityType,
    state:    Option<&FreewayCtmState>,
) -> ReportRow {
    let mut row = template.row(link, quantity);
    row.queue_length = state
        .and_then(|s| s.queue_length.as_ref())
        .and_then(|m| m.get(&link))
        .copied();
    row
}
