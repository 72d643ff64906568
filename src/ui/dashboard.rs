use crate::telemetry::{RollingWindow, TelemetrySample};

const GAUGE_WIDTH: usize = 20;
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the telemetry window as a text dashboard: gauges for the latest
/// sample plus utilization and temperature trend strips over the window.
pub fn render(window: &RollingWindow<TelemetrySample>) -> String {
    let Some(latest) = window.latest() else {
        return "GPU dashboard: no samples yet".into();
    };

    let g = &latest.gpu;
    let mut out = String::new();
    out.push_str(&format!(
        "GPU dashboard — {} samples, last at {}\n",
        window.len(),
        latest.at.format("%H:%M:%S")
    ));
    out.push_str(&gauge("util", g.utilization, 100.0, "%"));
    out.push_str(&gauge("mem ", g.memory_used, g.memory_total, "MB"));
    out.push_str(&gauge("temp", g.temperature, 100.0, "°C"));
    out.push_str(&gauge("pwr ", g.power_usage, g.power_limit, "W"));
    out.push_str(&gauge("fan ", g.fan_speed, 100.0, "%"));
    out.push_str(&format!(
        "util {}\n",
        trend(window.iter().map(|s| s.gpu.utilization))
    ));
    out.push_str(&format!(
        "temp {}\n",
        trend(window.iter().map(|s| s.gpu.temperature))
    ));
    out
}

/// One `label [#####---] value/max unit` line. A zero or negative max
/// renders an empty bar rather than dividing by it.
fn gauge(label: &str, value: f64, max: f64, unit: &str) -> String {
    let ratio = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * GAUGE_WIDTH as f64).round() as usize;
    let bar: String = "#".repeat(filled) + &"-".repeat(GAUGE_WIDTH - filled);
    format!("{label} [{bar}] {value:.0}/{max:.0} {unit}\n")
}

/// Sparkline over the window, scaled to its own min/max.
fn trend(values: impl Iterator<Item = f64>) -> String {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return String::new();
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values
        .iter()
        .map(|v| {
            let idx = if span > 0.0 {
                (((v - min) / span) * (SPARKS.len() - 1) as f64).round() as usize
            } else {
                0
            };
            SPARKS[idx.min(SPARKS.len() - 1)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::GpuSample;

    fn sample(util: f64, temp: f64) -> TelemetrySample {
        TelemetrySample::now(GpuSample {
            utilization: util,
            memory_used: 1024.0,
            memory_total: 8192.0,
            temperature: temp,
            power_usage: 150.0,
            power_limit: 300.0,
            fan_speed: 45.0,
        })
    }

    #[test]
    fn empty_window_renders_a_placeholder() {
        let window: RollingWindow<TelemetrySample> = RollingWindow::bounded(10);
        assert_eq!(render(&window), "GPU dashboard: no samples yet");
    }

    #[test]
    fn render_shows_gauges_for_the_latest_sample() {
        let mut window = RollingWindow::bounded(10);
        window.push(sample(10.0, 50.0));
        window.push(sample(80.0, 66.0));
        let out = render(&window);
        assert!(out.contains("2 samples"));
        assert!(out.contains("80/100 %"));
        assert!(out.contains("1024/8192 MB"));
        assert!(out.contains("150/300 W"));
    }

    #[test]
    fn gauge_is_clamped_and_fixed_width() {
        let line = gauge("x", 250.0, 100.0, "%");
        assert!(line.contains(&"#".repeat(GAUGE_WIDTH)));
        let empty = gauge("x", 5.0, 0.0, "%");
        assert!(empty.contains(&"-".repeat(GAUGE_WIDTH)));
    }

    #[test]
    fn trend_has_one_glyph_per_sample() {
        let strip = trend([1.0, 2.0, 3.0, 2.0].into_iter());
        assert_eq!(strip.chars().count(), 4);
    }
}
