use tubedeck_core::{AppViewModel, DownloadMetrics};

/// Turns view models into terminal lines, printing only what changed.
#[derive(Debug, Default)]
pub struct Renderer {
    last_import_status: String,
    last_metrics: Option<String>,
    show_metrics: bool,
}

impl Renderer {
    pub fn new(show_metrics: bool) -> Self {
        Self {
            show_metrics,
            ..Self::default()
        }
    }

    pub fn render(&mut self, view: &AppViewModel) -> Vec<String> {
        let mut lines = Vec::new();

        let status = &view.import.status;
        if !status.is_empty() && *status != self.last_import_status {
            lines.push(status.clone());
            self.last_import_status = status.clone();
        }

        if self.show_metrics {
            let metrics = metrics_line(&view.metrics);
            if self.last_metrics.as_ref() != Some(&metrics) {
                lines.push(metrics.clone());
                self.last_metrics = Some(metrics);
            }
        }

        lines
    }
}

pub fn metrics_line(metrics: &DownloadMetrics) -> String {
    format!(
        "Active: {} | Queued: {} | Completed: {} | Failed: {} | Speed: {}",
        metrics.active,
        metrics.queued,
        metrics.completed,
        metrics.failed,
        format_speed(metrics.total_speed)
    )
}

/// Formats bytes per second with binary units.
pub fn format_speed(bytes_per_sec: f64) -> String {
    const UNITS: [&str; 4] = ["B/s", "KiB/s", "MiB/s", "GiB/s"];
    if !bytes_per_sec.is_finite() || bytes_per_sec <= 0.0 {
        return "0 B/s".to_string();
    }
    let mut value = bytes_per_sec;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{value:.0} {}", UNITS[unit])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubedeck_core::ImportView;

    fn view_with_status(status: &str) -> AppViewModel {
        AppViewModel {
            import: ImportView {
                status: status.to_string(),
                ..ImportView::default()
            },
            ..AppViewModel::default()
        }
    }

    #[test]
    fn status_lines_are_printed_once() {
        let mut renderer = Renderer::new(false);
        let view = view_with_status("Importing URL 1 of 2: https://a");
        assert_eq!(renderer.render(&view), vec!["Importing URL 1 of 2: https://a"]);
        assert!(renderer.render(&view).is_empty());
        assert!(renderer.render(&view_with_status("")).is_empty());
    }

    #[test]
    fn metrics_line_follows_counters() {
        let mut renderer = Renderer::new(true);
        let view = AppViewModel {
            metrics: DownloadMetrics {
                active: 1,
                queued: 2,
                completed: 3,
                failed: 4,
                total_speed: 2048.0,
            },
            ..AppViewModel::default()
        };
        assert_eq!(
            renderer.render(&view),
            vec!["Active: 1 | Queued: 2 | Completed: 3 | Failed: 4 | Speed: 2.0 KiB/s"]
        );
        assert!(renderer.render(&view).is_empty());
    }

    #[test]
    fn speed_units() {
        assert_eq!(format_speed(0.0), "0 B/s");
        assert_eq!(format_speed(100.0), "100 B/s");
        assert_eq!(format_speed(1536.0), "1.5 KiB/s");
        assert_eq!(format_speed(5.0 * 1024.0 * 1024.0), "5.0 MiB/s");
        assert_eq!(format_speed(f64::NAN), "0 B/s");
    }
}
