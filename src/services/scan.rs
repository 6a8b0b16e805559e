//! Channel scan parameters and recommendation policy

use crate::driver::{DriverClient, DriverResult, ScanSort};
use log::{info, warn};

pub const SCAN_CANDIDATES: u32 = 10;

/// Fixed parameters of one scan request
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanRequest {
    pub sort: ScanSort,
    pub count: u32,
    pub bandwidth: f32,
}

impl ScanRequest {
    /// Rank by quality, up to ten candidates, at the given bandwidth
    pub fn at_bandwidth(bandwidth: f32) -> Self {
        ScanRequest {
            sort: ScanSort::Quality,
            count: SCAN_CANDIDATES,
            bandwidth,
        }
    }
}

pub struct ScanService;

impl ScanService {
    /// Run the scan. Blocks for as long as the driver scans.
    pub fn run<D: DriverClient + ?Sized>(driver: &D, request: ScanRequest) -> DriverResult<Vec<i32>> {
        info!(
            "scanning for {} channels at {} MHz",
            request.count, request.bandwidth
        );

        let result = driver.scan_channels(request.sort, request.count, request.bandwidth);

        match &result {
            Ok(candidates) => info!("scan returned {} candidates", candidates.len()),
            Err(e) => warn!("scan failed: {e}"),
        }

        result
    }

    /// The driver ranks candidates, so the first one is the best.
    pub fn recommend(candidates: &[i32]) -> Option<i32> {
        candidates.first().copied()
    }

    /// A recommendation is only usable if the radio supports it. An unknown
    /// supported list accepts everything.
    pub fn is_applicable(frequency: i32, supported: &[i32]) -> bool {
        supported.is_empty() || supported.contains(&frequency)
    }
}
