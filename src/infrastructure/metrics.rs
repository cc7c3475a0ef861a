// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::config::settings::MetricsSettings;

pub const AUDITS_SUBMITTED: &str = "audits_submitted_total";
pub const AUDITS_COMPLETED: &str = "audits_completed_total";
pub const AUDITS_FAILED: &str = "audits_failed_total";
pub const PROMPTS_TOTAL: &str = "audit_prompts_total";
pub const AUDIT_DURATION: &str = "audit_duration_seconds";
pub const JOBS_REAPED: &str = "audit_jobs_reaped_total";

/// 初始化指标系统
///
/// 未启用时不安装导出器，`metrics` 宏在没有记录器时为空操作
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", settings.listen_addr, e);
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}", e);
        return;
    }

    describe_counter!(AUDITS_SUBMITTED, "Total number of audits submitted");
    describe_counter!(AUDITS_COMPLETED, "Total number of audits completed");
    describe_counter!(AUDITS_FAILED, "Total number of audits failed");
    describe_counter!(
        PROMPTS_TOTAL,
        "Prompts sent to the search provider, labelled by outcome"
    );
    describe_histogram!(AUDIT_DURATION, "Duration of audit runs in seconds");
    describe_counter!(JOBS_REAPED, "Jobs failed by the stalled-job reaper");

    info!("Metrics exporter listening on {}", addr);
}
