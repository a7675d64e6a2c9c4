// Google Trends JSON payload parsing
use crate::model::{FetchError, RawObservation, TrendsFrame};
use crate::utils::parse_epoch_seconds;
use serde::Deserialize;

/// Token and request body of the interest-over-time widget.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesWidget {
    pub token: String,
    pub request: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    id: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct MultilineResponse {
    default: MultilineDefault,
}

#[derive(Debug, Deserialize)]
struct MultilineDefault {
    #[serde(rename = "timelineData", default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    time: String,
    #[serde(default)]
    value: Vec<f64>,
    #[serde(rename = "isPartial", default)]
    is_partial: Option<bool>,
}

/// Removes the anti-XSSI prefix (`)]}'` and friends) in front of the JSON body.
fn strip_guard(body: &str) -> Result<&str, FetchError> {
    body.find('{')
        .map(|start| &body[start..])
        .ok_or_else(|| FetchError::Parse("no JSON object in response".into()))
}

/// Pulls the `TIMESERIES` widget out of an explore response.
pub fn parse_explore(body: &str) -> Result<TimeseriesWidget, FetchError> {
    let json = strip_guard(body)?;
    let resp: ExploreResponse =
        serde_json::from_str(json).map_err(|e| FetchError::Parse(e.to_string()))?;

    let widget = resp
        .widgets
        .into_iter()
        .find(|w| w.id == "TIMESERIES")
        .ok_or_else(|| FetchError::Parse("TIMESERIES widget missing".into()))?;

    match (widget.token, widget.request) {
        (Some(token), Some(request)) => Ok(TimeseriesWidget { token, request }),
        _ => Err(FetchError::Parse("TIMESERIES widget has no token/request".into())),
    }
}

/// Turns a multiline (interest over time) response into a frame with one
/// column per keyword. An empty timeline gives an empty frame.
pub fn parse_multiline(body: &str, keywords: &[String]) -> Result<TrendsFrame, FetchError> {
    let json = strip_guard(body)?;
    let resp: MultilineResponse =
        serde_json::from_str(json).map_err(|e| FetchError::Parse(e.to_string()))?;

    let mut rows = Vec::with_capacity(resp.default.timeline_data.len());
    for point in resp.default.timeline_data {
        let timestamp = parse_epoch_seconds(&point.time)
            .ok_or_else(|| FetchError::Parse(format!("bad timestamp '{}'", point.time)))?;
        rows.push(RawObservation {
            timestamp,
            values: point.value,
            is_partial: point.is_partial.unwrap_or(false),
        });
    }

    Ok(TrendsFrame {
        columns: keywords.to_vec(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPLORE: &str = r#")]}'
{"widgets":[
  {"id":"TIMESERIES","token":"tok-1","request":{"time":"2020-10-18 2025-10-18","resolution":"WEEK"}},
  {"id":"GEO_MAP","token":"tok-2","request":{}}
]}"#;

    const MULTILINE: &str = r#")]}',
{"default":{"timelineData":[
  {"time":"1602979200","formattedTime":"Oct 18 - 24, 2020","value":[55],"hasData":[true]},
  {"time":"1603584000","formattedTime":"Oct 25 - 31, 2020","value":[61],"hasData":[true]},
  {"time":"1604188800","formattedTime":"Nov 1 - 7, 2020","value":[40],"hasData":[true],"isPartial":true}
],"averages":[]}}"#;

    #[test]
    fn explore_finds_timeseries_widget() {
        let widget = parse_explore(EXPLORE).unwrap();
        assert_eq!(widget.token, "tok-1");
        assert_eq!(widget.request["resolution"], "WEEK");
    }

    #[test]
    fn explore_without_timeseries_fails() {
        let body = r#")]}'{"widgets":[{"id":"GEO_MAP","token":"t","request":{}}]}"#;
        assert!(matches!(parse_explore(body), Err(FetchError::Parse(_))));
    }

    #[test]
    fn multiline_rows_and_flags() {
        let kws = vec!["rocket stove".to_string()];
        let frame = parse_multiline(MULTILINE, &kws).unwrap();
        assert_eq!(frame.columns, kws);
        assert_eq!(frame.rows.len(), 3);
        assert_eq!(frame.rows[1].values, vec![61.0]);
        assert!(!frame.rows[0].is_partial);
        assert!(frame.rows[2].is_partial);
    }

    #[test]
    fn empty_timeline_is_empty_frame() {
        let body = r#")]}',{"default":{"timelineData":[],"averages":[]}}"#;
        let frame = parse_multiline(body, &["x".to_string()]).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn garbage_is_parse_error() {
        assert!(matches!(
            parse_multiline("<html>blocked</html>", &[]),
            Err(FetchError::Parse(_))
        ));
    }
}
