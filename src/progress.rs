use std::time::Duration;

const DEFAULT_MESSAGES: [&str; 5] = [
  "Uploading your design...",
  "Predicting where eyes land first...",
  "Mapping visual hierarchy...",
  "Scoring clutter and focus...",
  "Writing your report...",
];

/// Progress text shown while an analysis runs, rotated on a fixed interval.
#[derive(Debug, Clone)]
pub struct LoadingMessages {
  messages: Vec<String>,
  interval: Duration,
}

impl Default for LoadingMessages {
  fn default() -> Self {
    Self::new(
      DEFAULT_MESSAGES.iter().map(|m| m.to_string()).collect(),
      Duration::from_millis(2500),
    )
  }
}

impl LoadingMessages {
  pub fn new(messages: Vec<String>, interval: Duration) -> Self {
    Self {
      messages,
      interval: interval.max(Duration::from_millis(1)),
    }
  }

  pub fn index_at(&self, elapsed: Duration) -> usize {
    if self.messages.is_empty() {
      return 0;
    }
    let step = elapsed.as_millis() / self.interval.as_millis();
    (step % self.messages.len() as u128) as usize
  }

  pub fn message_at(&self, elapsed: Duration) -> &str {
    self
      .messages
      .get(self.index_at(elapsed))
      .map(String::as_str)
      .unwrap_or("Working...")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rotates_and_wraps() {
    let messages = LoadingMessages::new(
      vec!["a".to_string(), "b".to_string(), "c".to_string()],
      Duration::from_secs(1),
    );
    assert_eq!(messages.message_at(Duration::ZERO), "a");
    assert_eq!(messages.message_at(Duration::from_millis(999)), "a");
    assert_eq!(messages.message_at(Duration::from_millis(1000)), "b");
    assert_eq!(messages.message_at(Duration::from_secs(3)), "a");
    assert_eq!(messages.message_at(Duration::from_secs(5)), "c");
  }

  #[test]
  fn empty_list_has_fallback() {
    let messages = LoadingMessages::new(Vec::new(), Duration::ZERO);
    assert_eq!(messages.message_at(Duration::from_secs(10)), "Working...");
  }
}
