//! Venue name -> research area classification.

use crate::models::Area;

/// Accepted venue spellings per area, as DBLP prints them.
///
/// A spelling must not appear under more than one area.
pub const AREA_VENUES: &[(Area, &[&str])] = &[
    (
        Area::ComputerArchitecture,
        &[
            "ASPLOS",
            "ASPLOS (1)",
            "ASPLOS (2)",
            "ASPLOS (3)",
            "ISCA",
            "MICRO",
            "MICRO (1)",
            "MICRO (2)",
            "HPCA",
        ],
    ),
    (Area::ComputerNetworks, &["SIGCOMM", "NSDI", "CoNEXT"]),
    (
        Area::ComputerSecurity,
        &[
            "CCS",
            "ACM CCS",
            "ACM Conference on Computer and Communications Security",
            "USENIX Security",
            "USENIX Security Symposium",
            "NDSS",
            "IEEE Symposium on Security and Privacy",
            "IEEE Security and Privacy",
            "SP",
            "S&P",
            "Oakland",
        ],
    ),
    (
        Area::Databases,
        &["SIGMOD", "SIGMOD Conference", "VLDB", "PVLDB", "Proc. VLDB Endow.", "ICDE", "PODS"],
    ),
    (Area::DesignAutomation, &["DAC", "ICCAD"]),
    (Area::EmbeddedAndRealTime, &["EMSOFT", "RTAS", "RTSS"]),
    (Area::HighPerformanceComputing, &["Supercomputing", "SC", "HPDC", "ICS"]),
    (Area::MobileComputing, &["MobiSys", "MobiCom", "SenSys", "IPSN"]),
    (
        Area::MeasurementAndPerformanceAnalysis,
        &[
            "IMC",
            "Internet Measurement Conference",
            "SIGMETRICS",
            "Proc. ACM Meas. Anal. Comput. Syst.",
        ],
    ),
    (
        Area::OperatingSystems,
        &[
            "SOSP",
            "OSDI",
            "EuroSys",
            "USENIX Annual Technical Conference",
            "USENIX Annual Technical Conference, General Track",
            "USENIX ATC",
            "USENIX FAST",
            "FAST",
        ],
    ),
    (Area::ProgrammingLanguages, &["PLDI", "POPL", "ICFP", "OOPSLA", "OOPSLA/ECOOP"]),
    (
        Area::SoftwareEngineering,
        &["ASE", "FSE", "SIGSOFT FSE", "ESEC/SIGSOFT FSE", "ICSE", "ICSE (1)", "ICSE (2)", "ISSTA"],
    ),
    (Area::DistributedSystemsAndDependability, &["DISC", "DSN", "ICDCS", "PODC"]),
];

/// Classify a venue name, case-insensitively.
///
/// Returns `None` for empty or unknown venues.
#[must_use]
pub fn classify(venue: &str) -> Option<Area> {
    let venue = venue.trim();
    if venue.is_empty() {
        return None;
    }
    let folded = venue.to_lowercase();

    AREA_VENUES
        .iter()
        .find(|(_, names)| names.iter().any(|name| name.to_lowercase() == folded))
        .map(|(area, _)| *area)
}
