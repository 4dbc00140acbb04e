pub mod stage1_summary;
pub mod stage2_density;
pub mod stage3_report;
pub mod stage4_chart;
pub mod stage5_export;

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/fixtures.rs"]
pub mod fixtures;
