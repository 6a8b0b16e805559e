use log::{debug, info, warn};

use crate::app::{Command, ConfigField, Model};
use crate::driver::DriverResult;
use crate::services::scan::{ScanRequest, ScanService};

/// Handle a scan request - marks the model busy and hands the scan to the surface
pub fn handle_scan_requested(model: &mut Model) -> Command {
    if model.is_scanning {
        debug!("scan already in flight");
        return Command::Done;
    }

    let Some(working) = model.working.as_ref().filter(|_| model.lifecycle.is_interactive())
    else {
        return model.notice_and_render("Radio is not ready");
    };

    let request = ScanRequest::at_bandwidth(working.bandwidth);
    model.is_scanning = true;
    model.recommendation = None;

    Command::Scan(request)
}

/// Handle scan completion - always clears the busy indicator
pub fn handle_scan_completed(result: DriverResult<Vec<i32>>, model: &mut Model) -> Command {
    model.is_scanning = false;

    match result {
        Ok(candidates) => match ScanService::recommend(&candidates) {
            Some(frequency) if model.working.is_some() => {
                info!("recommending {frequency} MHz");
                model.recommendation = Some(frequency);
            }
            Some(_) => {
                model.set_notice("Radio is not ready");
            }
            None => {
                model.set_notice("No channels found.");
            }
        },
        Err(e) => {
            warn!("scan failed: {e}");
            model.set_notice("Channel scan failed");
        }
    }

    Command::Render
}

/// Handle accepting the recommendation - updates the working frequency only
pub fn handle_recommendation_accepted(model: &mut Model) -> Command {
    let Some(frequency) = model.recommendation.take() else {
        return Command::Done;
    };

    if !ScanService::is_applicable(frequency, &model.supported_frequencies) {
        warn!("recommended frequency {frequency} MHz is not supported");
        return model.notice_and_render(format!("Frequency {frequency} is not supported"));
    }

    let Some(working) = model.working.as_mut() else {
        return model.notice_and_render("Radio is not ready");
    };

    working.frequency = frequency;
    model.invalid_fields.retain(|f| *f != ConfigField::Frequency);

    model.notice_and_render(format!("Frequency set to {frequency}"))
}

pub fn handle_recommendation_declined(model: &mut Model) -> Command {
    update_field!(model.recommendation, None)
}
