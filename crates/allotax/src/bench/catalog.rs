//! Known benchmark scenarios.
//!
//! Raw benchmark names carry parametrization noise (`test_x[Large files (1968+2018)]`), so
//! each is matched by substring against an ordered table; the first hit wins. The same entry
//! names the two input files whose size and record counts are recorded with the run.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub pattern: &'static str,
    pub description: &'static str,
    pub file1: &'static str,
    pub file2: &'static str,
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        pattern: "Large files",
        description: "Large files (1968+2018)",
        file1: "example_data/boys_1968.json",
        file2: "example_data/boys_2018.json",
    },
    Scenario {
        pattern: "Small vs Large",
        description: "Small vs Large (1895+2018)",
        file1: "example_data/boys_1895.json",
        file2: "example_data/boys_2018.json",
    },
    Scenario {
        pattern: "Small vs Medium",
        description: "Small vs Medium (1895+1968)",
        file1: "example_data/boys_1895.json",
        file2: "example_data/boys_1968.json",
    },
];

pub fn scenario_for_name(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| name.contains(s.pattern))
}

/// Human-readable description for a raw benchmark name; unknown names pass through.
pub fn classify(name: &str) -> String {
    scenario_for_name(name)
        .map(|s| s.description.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Input files for a description. Unknown descriptions get empty paths.
pub fn file_paths(description: &str) -> (&'static str, &'static str) {
    SCENARIOS
        .iter()
        .find(|s| s.description == description)
        .map_or(("", ""), |s| (s.file1, s.file2))
}
