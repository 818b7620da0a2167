//! Device list paging
//!
//! The controller returns at most `api_record_limit` devices per call and
//! numbers devices from 1, so page `n` starts at `n * limit + 1`.

use serde::Serialize;

/// Default number of records per device list call
pub const DEFAULT_RECORD_LIMIT: u32 = 500;

/// One device list request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    /// 1-based index of the first device
    pub offset: u64,
    pub limit: u32,
}

/// Requests needed to fetch `device_count` devices, `limit` at a time
///
/// Returns an empty plan when there are no devices or the limit is zero.
pub fn page_plan(device_count: u64, limit: u32) -> Vec<PageRequest> {
    if limit == 0 {
        return Vec::new();
    }
    let pages = device_count.div_ceil(u64::from(limit));
    (0..pages)
        .map(|page| PageRequest {
            offset: page * u64::from(limit) + 1,
            limit,
        })
        .collect()
}

/// Device list call with the source's filters applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceListQuery {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub family: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
}
