use super::types::{CheckResult, ProbeOutcome, SiteStatus};

/// Codes treated as healthy: 2xx and 3xx
pub const OK_STATUS_RANGE: std::ops::RangeInclusive<u16> = 200..=399;

pub fn is_ok_status(code: u16) -> bool {
    OK_STATUS_RANGE.contains(&code)
}

/// Map a probe outcome onto the status taxonomy.
///
/// Timeouts fold into the connection-error bucket; without a response the
/// elapsed time is reported as 0.
pub fn classify(outcome: &ProbeOutcome) -> CheckResult {
    match outcome {
        ProbeOutcome::Response { status, elapsed } => {
            let status = if is_ok_status(*status) {
                SiteStatus::Ok(*status)
            } else {
                SiteStatus::HttpError(*status)
            };
            CheckResult { status, elapsed_seconds: elapsed.as_secs_f64(), detail: None }
        }
        ProbeOutcome::Timeout => CheckResult {
            status: SiteStatus::ConnectionError,
            elapsed_seconds: 0.0,
            detail: Some("timed out".into()),
        },
        ProbeOutcome::Transport(error) => CheckResult {
            status: SiteStatus::ConnectionError,
            elapsed_seconds: 0.0,
            detail: Some(error.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn response(status: u16) -> ProbeOutcome {
        ProbeOutcome::Response { status, elapsed: Duration::from_millis(120) }
    }

    #[test]
    fn test_ok_range_boundaries() {
        assert!(!is_ok_status(199));
        assert!(is_ok_status(200));
        assert!(is_ok_status(399));
        assert!(!is_ok_status(400));
    }

    #[test]
    fn test_classify_success() {
        let result = classify(&response(200));
        assert_eq!(result.status_label(), "200 OK");
        assert!(!result.is_failure());
        assert_eq!(result.elapsed_seconds, 0.12);
    }

    #[test]
    fn test_classify_http_error_keeps_elapsed() {
        let result = classify(&response(500));
        assert_eq!(result.status_label(), "Error 500");
        assert!(result.is_failure());
        assert_eq!(result.elapsed_seconds, 0.12);
    }

    #[test]
    fn test_classify_informational_is_failure() {
        assert!(classify(&response(101)).is_failure());
    }

    #[test]
    fn test_classify_timeout_and_transport() {
        for outcome in [ProbeOutcome::Timeout, ProbeOutcome::Transport("refused".into())] {
            let result = classify(&outcome);
            assert_eq!(result.status_label(), "Error Conexión");
            assert!(result.is_failure());
            assert_eq!(result.elapsed_seconds, 0.0);
        }
    }
}
