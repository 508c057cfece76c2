use crate::monitoring::types::SiteFailure;

pub const ALERT_HEADER: &str = "🚨 ¡Alerta! Se detectaron fallos en los siguientes sitios:";
pub const ALERT_SUBJECT: &str = "🚨 Alerta de Monitoreo: Sitios web con fallos";

/// The single aggregated alert of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

impl AlertMessage {
    /// One line per failure, in tick order. `None` when nothing failed.
    pub fn from_failures(failures: &[SiteFailure]) -> Option<Self> {
        if failures.is_empty() {
            return None;
        }

        let lines: Vec<String> =
            failures.iter().map(|f| format!("- {}: {}", f.url, f.reason)).collect();

        Some(Self {
            subject: ALERT_SUBJECT.to_string(),
            body: format!("{ALERT_HEADER}\n\n{}", lines.join("\n")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_failures_no_alert() {
        assert!(AlertMessage::from_failures(&[]).is_none());
    }

    #[test]
    fn test_body_lists_failures_in_order() {
        let alert = AlertMessage::from_failures(&[
            SiteFailure { url: "https://a.example".into(), reason: "Error 500".into() },
            SiteFailure { url: "https://b.example".into(), reason: "Error Conexión".into() },
        ])
        .unwrap();

        assert_eq!(alert.subject, "🚨 Alerta de Monitoreo: Sitios web con fallos");
        assert_eq!(
            alert.body,
            "🚨 ¡Alerta! Se detectaron fallos en los siguientes sitios:\n\n\
             - https://a.example: Error 500\n\
             - https://b.example: Error Conexión"
        );
    }
}
