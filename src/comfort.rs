// Derived air-comfort metrics from the temperature/humidity pair.
// Pure math; inputs are degrees Celsius and %RH.

// ── Classification flags ────────────────────────────────────────────

pub const TOO_HOT: u8 = 1;
pub const TOO_COLD: u8 = 2;
pub const TOO_DRY: u8 = 4;
pub const TOO_HUMID: u8 = 8;

// ── Comfort band ────────────────────────────────────────────────────
// Temperature edges fall slightly as humidity rises (humid air feels
// warmer); humidity edges are flat.

const RH_DRY_EDGE: f32 = 20.0;
const RH_HUMID_EDGE: f32 = 70.0;

fn hot_edge(rh: f32) -> f32 {
    32.0 - 0.06 * rh
}

fn cold_edge(rh: f32) -> f32 {
    19.0 - 0.02 * rh
}

/// Classification code (bit combination of the `TOO_*` flags) plus
/// how deep inside the comfort band the reading sits: 1.0 at the
/// center, 0.0 at or beyond any edge.
pub fn classify(temp_c: f32, rh: f32) -> (u8, f32) {
    let hot = hot_edge(rh);
    let cold = cold_edge(rh);

    let mut code = 0u8;
    if temp_c > hot {
        code |= TOO_HOT;
    } else if temp_c < cold {
        code |= TOO_COLD;
    }
    if rh < RH_DRY_EDGE {
        code |= TOO_DRY;
    } else if rh > RH_HUMID_EDGE {
        code |= TOO_HUMID;
    }
    if code != 0 {
        return (code, 0.0);
    }

    let t_span = hot - cold;
    let rh_span = RH_HUMID_EDGE - RH_DRY_EDGE;
    let margin = [
        (hot - temp_c) / t_span,
        (temp_c - cold) / t_span,
        (RH_HUMID_EDGE - rh) / rh_span,
        (rh - RH_DRY_EDGE) / rh_span,
    ]
    .into_iter()
    .fold(f32::INFINITY, f32::min);

    (0, (margin * 2.0).clamp(0.0, 1.0))
}

/// Text for a classification code.  Codes the flags cannot actually
/// combine into (hot and cold at once) answer "Unknown" rather than
/// being left undefined.
pub fn describe(code: u8) -> &'static str {
    match code {
        0 => "OK",
        1 => "Too Hot",
        2 => "Too Cold",
        4 => "Too Dry",
        5 => "Hot And Dry",
        6 => "Cold And Dry",
        8 => "Too Humid",
        9 => "Hot And Humid",
        10 => "Cold And Humid",
        _ => "Unknown",
    }
}

/// Heat index in Celsius.  Rothfusz regression, computed in
/// Fahrenheit like the reference tables it was fitted against.
pub fn heat_index(temp_c: f32, rh: f32) -> f32 {
    let t = temp_c * 9.0 / 5.0 + 32.0;
    let mut hi = 0.5 * (t + 61.0 + (t - 68.0) * 1.2 + rh * 0.094);

    if hi >= 79.0 {
        hi = -42.379 + 2.049_015_2 * t + 10.143_331 * rh
            - 0.224_755_41 * t * rh
            - 0.006_837_83 * t * t
            - 0.054_817_17 * rh * rh
            + 0.001_228_74 * t * t * rh
            + 0.000_852_82 * t * rh * rh
            - 0.000_001_99 * t * t * rh * rh;

        if rh < 13.0 && (80.0..=112.0).contains(&t) {
            hi -= (13.0 - rh) * 0.25 * ((17.0 - (t - 95.0).abs()) / 17.0).sqrt();
        } else if rh > 85.0 && (80.0..=87.0).contains(&t) {
            hi += (rh - 85.0) * 0.1 * (87.0 - t) * 0.2;
        }
    }

    (hi - 32.0) * 5.0 / 9.0
}

/// Magnus-formula dew point in Celsius.
pub fn dew_point(temp_c: f32, rh: f32) -> f32 {
    const A: f32 = 17.62;
    const B: f32 = 243.12;
    let gamma = (rh / 100.0).ln() + A * temp_c / (B + temp_c);
    B * gamma / (A - gamma)
}

/// Water vapor mass per cubic meter of air, g/m3.
pub fn absolute_humidity(temp_c: f32, rh: f32) -> f32 {
    216.7 * (rh / 100.0 * 6.112 * (17.62 * temp_c / (243.12 + temp_c)).exp())
        / (273.15 + temp_c)
}

/// Human perception label, banded on dew point.
pub fn perception(temp_c: f32, rh: f32) -> &'static str {
    match dew_point(temp_c, rh) {
        d if d < 10.0 => "Dry",
        d if d < 13.0 => "Very comfortable",
        d if d < 16.0 => "Comfortable",
        d if d < 18.0 => "Ok for most",
        d if d < 21.0 => "Somewhat uncomfortable",
        d if d < 24.0 => "Quite uncomfortable",
        d if d < 26.0 => "Very uncomfortable",
        _ => "Severely uncomfortable",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_maps_every_reachable_code() {
        assert_eq!(describe(0), "OK");
        assert_eq!(describe(1), "Too Hot");
        assert_eq!(describe(2), "Too Cold");
        assert_eq!(describe(4), "Too Dry");
        assert_eq!(describe(5), "Hot And Dry");
        assert_eq!(describe(6), "Cold And Dry");
        assert_eq!(describe(8), "Too Humid");
        assert_eq!(describe(9), "Hot And Humid");
        assert_eq!(describe(10), "Cold And Humid");
    }

    #[test]
    fn describe_falls_back_on_impossible_codes() {
        assert_eq!(describe(3), "Unknown");
        assert_eq!(describe(7), "Unknown");
        assert_eq!(describe(255), "Unknown");
    }

    #[test]
    fn classify_comfortable_room() {
        let (code, ratio) = classify(25.0, 45.0);
        assert_eq!(code, 0);
        assert!(ratio > 0.0 && ratio <= 1.0);
    }

    #[test]
    fn classify_hot_and_humid() {
        let (code, ratio) = classify(35.0, 90.0);
        assert_eq!(code, TOO_HOT | TOO_HUMID);
        assert_eq!(describe(code), "Hot And Humid");
        assert_eq!(ratio, 0.0);
    }

    #[test]
    fn classify_cold_and_dry() {
        let (code, _) = classify(15.0, 10.0);
        assert_eq!(code, TOO_COLD | TOO_DRY);
        assert_eq!(describe(code), "Cold And Dry");
    }

    #[test]
    fn heat_index_tracks_temperature_when_mild() {
        let hi = heat_index(25.0, 50.0);
        assert!((hi - 25.0).abs() < 1.0, "hi = {}", hi);
    }

    #[test]
    fn heat_index_exceeds_temperature_when_muggy() {
        let hi = heat_index(33.0, 80.0);
        assert!(hi > 38.0, "hi = {}", hi);
    }

    #[test]
    fn dew_point_at_saturation_is_the_temperature() {
        let dp = dew_point(20.0, 100.0);
        assert!((dp - 20.0).abs() < 0.1, "dp = {}", dp);
    }

    #[test]
    fn absolute_humidity_reference_point() {
        // ~11.5 g/m3 at 25 C / 50 %RH.
        let ah = absolute_humidity(25.0, 50.0);
        assert!((ah - 11.5).abs() < 0.5, "ah = {}", ah);
    }

    #[test]
    fn perception_bands() {
        assert_eq!(perception(20.0, 20.0), "Dry");
        assert_eq!(perception(29.0, 75.0), "Very uncomfortable");
        assert_eq!(perception(34.0, 90.0), "Severely uncomfortable");
    }
}
