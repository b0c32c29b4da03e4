use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct PaymentMetrics {
    pub registry: Registry,
    pub payment_submissions: IntCounterVec,
    pub webhook_verifications: IntCounterVec,
    pub webhook_states: IntCounterVec,
}

impl PaymentMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let payment_submissions = IntCounterVec::new(
            Opts::new("payment_submissions_total", "Signed payment requests submitted to the gateway"),
            &["result"],
        )?;
        let webhook_verifications = IntCounterVec::new(
            Opts::new("webhook_verifications_total", "Gateway notifications grouped by verification outcome"),
            &["result"],
        )?;
        let webhook_states = IntCounterVec::new(
            Opts::new("webhook_transaction_states_total", "Verified notifications grouped by mapped transaction state"),
            &["state"],
        )?;
        registry.register(Box::new(payment_submissions.clone()))?;
        registry.register(Box::new(webhook_verifications.clone()))?;
        registry.register(Box::new(webhook_states.clone()))?;
        Ok(Self { registry, payment_submissions, webhook_verifications, webhook_states })
    }

    pub fn record_submission(&self, result: &str) {
        self.payment_submissions.with_label_values(&[result]).inc();
    }

    pub fn record_verification(&self, result: &str) {
        self.webhook_verifications.with_label_values(&[result]).inc();
    }

    pub fn record_state(&self, state: &str) {
        self.webhook_states.with_label_values(&[state]).inc();
    }

    /// Text exposition of every registered metric.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_appear_in_exposition() {
        let metrics = PaymentMetrics::new().expect("metrics");
        metrics.record_submission("accepted");
        metrics.record_verification("invalid_hash");
        metrics.record_state("complete");
        let text = metrics.render().expect("render");
        assert!(text.contains("payment_submissions_total{result=\"accepted\"} 1"), "{text}");
        assert!(text.contains("webhook_verifications_total{result=\"invalid_hash\"} 1"));
        assert!(text.contains("webhook_transaction_states_total{state=\"complete\"} 1"));
    }
}
