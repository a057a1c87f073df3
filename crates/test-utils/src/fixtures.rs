//! Shared fixtures: layer boundaries and run-control documents.

/// Lower boundaries (m) of the 15 ParFlow soil layers, deepest first.
pub const PARFLOW_BOUNDS: [f64; 15] = [
    60.0, 42.0, 27.0, 17.0, 7.0, 3.0, 2.0, 1.3, 0.8, 0.5, 0.3, 0.17, 0.1, 0.05, 0.02,
];

/// A run-control document with one depth-resolved and one surface station.
///
/// `indicator` and `data` are substituted for the indicator and data file
/// paths.
pub fn sample_run_control(indicator: &str, data: &str) -> String {
    format!(
        r#"{{
    "IndicatorPath": "{indicator}",
    "locations": [
        {{
            "stationID": "DE-Jue",
            "stationLat": 50.91,
            "stationLon": 6.41,
            "ParFlowData": "{data}",
            "Depth": 0.5
        }},
        {{
            "stationID": "DE-Seh",
            "stationLat": 50.87,
            "stationLon": 6.45,
            "ParFlowData": "{data}"
        }}
    ]
}}"#
    )
}
