/// Logs a trace message indented by the search depth. Compiled out unless the `detailed-logs`
/// feature is enabled, as the search emits one message per search node.
macro_rules! dbg_trace_indent {
    ($depth:expr, $s:expr) => (
        #[cfg(feature = "detailed-logs")]
        {
            log::log!(log::Level::Trace, concat!("{}[depth={}] ", $s),
                "\t".repeat($depth), $depth);
        }
    );
    ($depth:expr, $s:expr, $($arg:tt)+) => (
        #[cfg(feature = "detailed-logs")]
        {
            log::log!(log::Level::Trace, concat!("{}[depth={}] ", $s),
                "\t".repeat($depth), $depth, $($arg)+);
        }
    )
}

/// Formats a duration as `1h 2m 3.456s`, leaving out leading zero units.
pub fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    let hours = secs / 3600;
    let mins = (secs / 60) % 60;
    let rest = (secs % 60) as f64 + f64::from(d.subsec_millis()) / 1000.0;

    if hours > 0 {
        format!("{}h {}m {:.3}s", hours, mins, rest)
    } else if mins > 0 {
        format!("{}m {:.3}s", mins, rest)
    } else {
        format!("{:.3}s", rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.500s");
        assert_eq!(format_duration(Duration::from_secs(61)), "1m 1.000s");
        assert_eq!(format_duration(Duration::from_secs(3723)), "1h 2m 3.000s");
    }
}
