// quickchart.io chart encoding.
//
// The chart description is not JSON: quickchart accepts a relaxed
// dialect with unquoted or single-quoted keys, and this firmware has
// always shipped it with quotes pre-encoded as %27 and spaces as %20.
// That byte-for-byte shape is a compatibility contract with the
// service; do not normalize it.
//
// Both encoders are pure string builders.  The network side lives in
// `render` (POST + shortened-link round trip) and in the command
// dispatch (the direct URL is sent to the operator as-is).

use std::fmt::Write as _;

use crate::history::TempHistory;

pub const CHART_ENDPOINT: &str = "https://quickchart.io/chart";
pub const CREATE_ENDPOINT: &str = "https://quickchart.io/chart/create";

/// Fixed y-axis padding in degrees around the recorded range.
const AXIS_PAD: f32 = 2.0;

/// Pseudo-range for a history with no recorded samples: the chart
/// renders empty with ticks at -2..2 instead of folding over nothing.
const EMPTY_RANGE: (f32, f32) = (0.0, 0.0);

/// Self-contained chart URL the operator can open directly.
pub fn direct_url(history: &TempHistory) -> String {
    let series = history.series();
    let (lo, hi) = history.min_max().unwrap_or(EMPTY_RANGE);

    let mut url = String::with_capacity(256 + series.len() * 10);
    url.push_str(CHART_ENDPOINT);
    url.push_str("?c={type:%27line%27,data:{labels:[");
    push_labels(&mut url, &series);
    url.push_str("],%20datasets:[{label:%27Temperatura%27,data:[");
    push_values(&mut url, &series);
    url.push_str("]}]},options:{scales:{yAxes:[{ticks:{min:");
    let _ = write!(url, "{:.2},max:{:.2}", lo - AXIS_PAD, hi + AXIS_PAD);
    url.push_str(",stepSize:1}}]}}}");
    url
}

/// POST body for the server-side render endpoint, which answers with
/// a shortened viewable link.  Same skip/renumber policy as
/// [`direct_url`]: labels and data drop the same sentinel slots.
pub fn render_request_body(history: &TempHistory) -> String {
    let series = history.series();

    let mut body = String::with_capacity(128 + series.len() * 10);
    body.push_str("{%27chart%27:{%27type%27:%27line%27,%27data%27:{%27labels%27:[");
    push_labels(&mut body, &series);
    body.push_str("],%20%27datasets%27:[{%27label%27:%27Temperatura%27,%27data%27:[");
    push_values(&mut body, &series);
    body.push_str("]}]}}}");
    body
}

fn push_labels(out: &mut String, series: &[(usize, f32)]) {
    for (i, (pos, _)) in series.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{}", pos);
    }
}

fn push_values(out: &mut String, series: &[(usize, f32)]) {
    for (i, (_, v)) in series.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{:.2}", v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::NO_TEMP;

    #[test]
    fn empty_history_gives_empty_lists() {
        let url = direct_url(&TempHistory::new());
        assert!(url.contains("labels:[]"));
        assert!(url.contains("data:[]"));
        assert!(url.contains("min:-2.00,max:2.00"));
    }

    #[test]
    fn direct_url_matches_service_contract() {
        let mut h = TempHistory::new();
        h.push(28.31);
        h.push(28.31);
        assert_eq!(
            direct_url(&h),
            "https://quickchart.io/chart?c={type:%27line%27,data:{labels:[1,2],\
             %20datasets:[{label:%27Temperatura%27,data:[28.31,28.31]}]},\
             options:{scales:{yAxes:[{ticks:{min:26.31,max:30.31,stepSize:1}}]}}}"
        );
    }

    #[test]
    fn render_body_matches_service_contract() {
        let mut h = TempHistory::new();
        h.push(27.69);
        h.push(27.75);
        assert_eq!(
            render_request_body(&h),
            "{%27chart%27:{%27type%27:%27line%27,%27data%27:{%27labels%27:[1,2],\
             %20%27datasets%27:[{%27label%27:%27Temperatura%27,%27data%27:[27.69,27.75]}]}}}"
        );
    }

    #[test]
    fn sentinels_are_skipped_in_both_lists() {
        let mut h = TempHistory::new();
        h.push(20.0);
        h.push(21.5);
        h.push(19.0);
        let url = direct_url(&h);
        assert!(url.contains("labels:[1,2,3]"));
        assert!(url.contains("data:[20.00,21.50,19.00]"));
        assert!(url.contains("min:17.00,max:23.50"));

        let body = render_request_body(&h);
        assert!(body.contains("%27labels%27:[1,2,3]"));
        assert!(body.contains("%27data%27:[20.00,21.50,19.00]"));
    }

    #[test]
    fn gap_in_the_middle_keeps_lists_paired() {
        let mut h = TempHistory::new();
        h.push(20.0);
        h.push(NO_TEMP);
        h.push(19.0);
        let url = direct_url(&h);
        assert!(url.contains("labels:[1,2]"));
        assert!(url.contains("data:[20.00,19.00]"));
    }
}
