//! Cost query payloads and the row formats they come back in.
//!
//! Every report is one of four fixed kinds. The builder and the normalizer
//! each keep a per-kind table (payload shape, row layout) keyed by
//! [`ReportKind`].

pub mod builder;
pub mod normalizer;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    DailyCost,
    Forecast,
    ByService,
    ByLocation,
}

impl ReportKind {
    #[cfg(test)]
    pub const ALL: [ReportKind; 4] = [
        ReportKind::DailyCost,
        ReportKind::Forecast,
        ReportKind::ByService,
        ReportKind::ByLocation,
    ];

    /// Last path segment of the Cost Management operation this kind targets.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Forecast => "forecast",
            Self::DailyCost | Self::ByService | Self::ByLocation => "query",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DailyCost => write!(f, "daily cost"),
            Self::Forecast => write!(f, "forecast"),
            Self::ByService => write!(f, "cost by service"),
            Self::ByLocation => write!(f, "cost by location"),
        }
    }
}
