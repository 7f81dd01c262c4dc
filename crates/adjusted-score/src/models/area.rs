//! Research area tags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse research area a venue belongs to.
///
/// Serialized as the snake_case tag used as a key throughout the result tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    ComputerArchitecture,
    ComputerNetworks,
    ComputerSecurity,
    Databases,
    /// Design automation (DAC, ICCAD), tagged `sys_design` in output documents.
    #[serde(rename = "sys_design")]
    DesignAutomation,
    EmbeddedAndRealTime,
    HighPerformanceComputing,
    MobileComputing,
    MeasurementAndPerformanceAnalysis,
    OperatingSystems,
    ProgrammingLanguages,
    SoftwareEngineering,
    DistributedSystemsAndDependability,
}

impl Area {
    /// All areas, in tag order.
    pub const ALL: [Self; 13] = [
        Self::ComputerArchitecture,
        Self::ComputerNetworks,
        Self::ComputerSecurity,
        Self::Databases,
        Self::DesignAutomation,
        Self::EmbeddedAndRealTime,
        Self::HighPerformanceComputing,
        Self::MobileComputing,
        Self::MeasurementAndPerformanceAnalysis,
        Self::OperatingSystems,
        Self::ProgrammingLanguages,
        Self::SoftwareEngineering,
        Self::DistributedSystemsAndDependability,
    ];

    /// The tag used as a map key in output documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ComputerArchitecture => "computer_architecture",
            Self::ComputerNetworks => "computer_networks",
            Self::ComputerSecurity => "computer_security",
            Self::Databases => "databases",
            Self::DesignAutomation => "sys_design",
            Self::EmbeddedAndRealTime => "embedded_and_real_time",
            Self::HighPerformanceComputing => "high_performance_computing",
            Self::MobileComputing => "mobile_computing",
            Self::MeasurementAndPerformanceAnalysis => "measurement_and_performance_analysis",
            Self::OperatingSystems => "operating_systems",
            Self::ProgrammingLanguages => "programming_languages",
            Self::SoftwareEngineering => "software_engineering",
            Self::DistributedSystemsAndDependability => "distributed_systems_and_dependability",
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
