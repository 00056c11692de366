//! Link classification for encoding.
//!
//! A report references links through up to seven mappings (three per state
//! role plus the FD map).  Before writing, those links are partitioned into
//! four buckets; each bucket produces one row per link with only the columns
//! that bucket owns.  A link may appear in several buckets.

use std::collections::{BTreeMap, BTreeSet};

use ctm_core::LinkId;

use crate::model::{Fd, FreewayCtmReport, FreewayCtmState};

/// Link ids grouped by the kind of row they produce.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkBuckets {
    /// Links with mean density/speed, mean flow, or FD data.
    pub non_origin_mean:    BTreeSet<LinkId>,
    /// Links with standard-deviation density/speed or flow data.
    pub non_origin_std_dev: BTreeSet<LinkId>,
    /// Origin links with a mean queue length.
    pub origin_mean:        BTreeSet<LinkId>,
    /// Origin links with a standard-deviation queue length.
    pub origin_std_dev:     BTreeSet<LinkId>,
}

impl LinkBuckets {
    /// Buckets of a single-estimate report.
    pub fn for_report(report: &FreewayCtmReport) -> Self {
        classify_links(report.mean.as_ref(), report.std_dev.as_ref(), report.fd.as_ref())
    }

    /// Buckets of one ensemble member.  Members have no standard-deviation
    /// role and no FD, so only the two mean buckets can be populated.
    pub fn for_member(state: &FreewayCtmState) -> Self {
        classify_links(Some(state), None, None)
    }

    /// Number of rows these buckets encode to.
    pub fn row_count(&self) -> usize {
        self.non_origin_mean.len()
            + self.non_origin_std_dev.len()
            + self.origin_mean.len()
            + self.origin_std_dev.len()
    }
}

/// Partition the links referenced by `mean`, `std_dev` and `fd`.
pub fn classify_links(
    mean:    Option<&FreewayCtmState>,
    std_dev: Option<&FreewayCtmState>,
    fd:      Option<&BTreeMap<LinkId, Fd>>,
) -> LinkBuckets {
    let mut buckets = LinkBuckets::default();

    if let Some(mean) = mean {
        buckets.non_origin_mean.extend(non_origin_links(mean));
        buckets.origin_mean.extend(origin_links(mean));
    }
    if let Some(fd) = fd {
        buckets.non_origin_mean.extend(fd.keys().copied());
    }
    if let Some(std_dev) = std_dev {
        buckets.non_origin_std_dev.extend(non_origin_links(std_dev));
        buckets.origin_std_dev.extend(origin_links(std_dev));
    }

    buckets
}

fn non_origin_links(state: &FreewayCtmState) -> impl Iterator<Item = LinkId> + '_ {
    let density = state.link_state_map.iter().flat_map(|m| m.keys().copied());
    let flow = state.link_flow_state_map.iter().flat_map(|m| m.keys().copied());
    density.chain(flow)
}

fn origin_links(state: &FreewayCtmState) -> impl Iterator<Item = LinkId> + '_ {
    state.queue_length.iter().flat_map(|m| m.keys().copied())
}
