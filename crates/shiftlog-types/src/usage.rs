use serde::{Deserialize, Serialize};

/// Per-transcript token totals. Fields default to zero when an agent does
/// not report a given metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetrics {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: u64,
}

impl UsageMetrics {
    pub fn add(&mut self, other: &UsageMetrics) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.cache_creation_input_tokens += other.cache_creation_input_tokens;
        self.cache_read_input_tokens += other.cache_read_input_tokens;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_accumulates_each_field() {
        let mut total = UsageMetrics::default();
        total.add(&UsageMetrics {
            input_tokens: 10,
            output_tokens: 5,
            cache_creation_input_tokens: 1,
            cache_read_input_tokens: 2,
        });
        total.add(&UsageMetrics {
            input_tokens: 3,
            output_tokens: 1,
            cache_creation_input_tokens: 0,
            cache_read_input_tokens: 4,
        });
        assert_eq!(total.input_tokens, 13);
        assert_eq!(total.output_tokens, 6);
        assert_eq!(total.cache_creation_input_tokens, 1);
        assert_eq!(total.cache_read_input_tokens, 6);
    }
}
