//! Column names of the history table.

use mrkit_store::TableLayout;

pub const INFO_FAMILY: &str = "info";
pub const EXTENDED_FAMILY: &str = "extended";

pub const JOB_NAME: &str = "jobName";
pub const JOB_ID: &str = "jobId";
pub const START_TIME: &str = "startTime";
pub const END_TIME: &str = "endTime";
pub const END_STATUS: &str = "jobEndStatus";
pub const COUNTERS: &str = "counters";
pub const CONFIGURATION: &str = "configuration";

pub fn history_layout(table_name: &str) -> TableLayout {
    TableLayout::new(table_name, &[INFO_FAMILY, EXTENDED_FAMILY])
        .with_description("Job execution history: one row per job id.")
}
