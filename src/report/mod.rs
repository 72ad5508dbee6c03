//! 举报模块：用户误判举报的校验与存储
pub mod sink;
pub mod service;

pub use self::sink::{JsonFileReportSink, Report, ReportSink};
pub use self::service::{ReportService, REPORT_ACCEPTED_TEXT, REPORT_FAILED_TEXT, REPORT_USAGE_TEXT};
