use crate::domain::model::ValidationResult;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[async_trait]
pub trait Validator: Send + Sync + 'static {
    async fn check(&self, ip_address: &str) -> Result<ValidationResult>;
}

/// 輸入框旁顯示的驗證狀態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationState {
    Idle,
    Valid(String),
    Invalid(String),
    Unavailable(String),
}

impl ValidationState {
    pub fn message(&self) -> &str {
        match self {
            ValidationState::Idle => "",
            ValidationState::Valid(m)
            | ValidationState::Invalid(m)
            | ValidationState::Unavailable(m) => m,
        }
    }
}

/// 防抖動的即時驗證。
///
/// 每次輸入都會重設計時器；每個請求都帶著送出時的輸入序號，
/// 回應回來時若已經有更新的輸入，就直接丟棄，避免舊回應覆蓋新狀態。
pub struct LiveValidator {
    input_tx: mpsc::UnboundedSender<(u64, String)>,
    state_rx: watch::Receiver<ValidationState>,
    sequence: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl LiveValidator {
    pub fn spawn<V: Validator>(validator: Arc<V>, delay: Duration) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ValidationState::Idle);
        let sequence = Arc::new(AtomicU64::new(0));

        let task = tokio::spawn(run(validator, delay, input_rx, state_tx, sequence.clone()));

        Self {
            input_tx,
            state_rx,
            sequence,
            task,
        }
    }

    pub fn input(&self, text: &str) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        if self.input_tx.send((seq, text.to_string())).is_err() {
            tracing::warn!("Live validation task has stopped; input ignored");
        }
    }

    pub fn state(&self) -> ValidationState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ValidationState> {
        self.state_rx.clone()
    }
}

impl Drop for LiveValidator {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<V: Validator>(
    validator: Arc<V>,
    delay: Duration,
    mut input_rx: mpsc::UnboundedReceiver<(u64, String)>,
    state_tx: watch::Sender<ValidationState>,
    sequence: Arc<AtomicU64>,
) {
    let state_tx = Arc::new(state_tx);

    while let Some(mut latest) = input_rx.recv().await {
        // 等到輸入安靜 `delay` 之後才送出
        loop {
            match tokio::time::timeout(delay, input_rx.recv()).await {
                Ok(Some(newer)) => latest = newer,
                Ok(None) => return,
                Err(_) => break,
            }
        }

        let (seq, text) = latest;
        let text = text.trim().to_string();
        if text.is_empty() {
            state_tx.send_replace(ValidationState::Idle);
            continue;
        }

        let validator = validator.clone();
        let state_tx = state_tx.clone();
        let sequence = sequence.clone();
        tokio::spawn(async move {
            let state = match validator.check(&text).await {
                Ok(result) if result.valid => ValidationState::Valid(result.message),
                Ok(result) => ValidationState::Invalid(result.message),
                Err(e) => {
                    tracing::error!("Validation error: {}", e);
                    ValidationState::Unavailable("Unable to validate IP address".to_string())
                }
            };

            if sequence.load(Ordering::SeqCst) == seq {
                state_tx.send_replace(state);
            } else {
                tracing::debug!("Dropping stale validation response for {}", text);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::validate_ip;
    use crate::utils::error::ScannerError;
    use std::sync::Mutex;

    /// 以本地驗證模擬伺服器，並依輸入決定回應延遲
    struct SlowValidator {
        calls: Mutex<Vec<String>>,
        slow_input: &'static str,
    }

    impl SlowValidator {
        fn new(slow_input: &'static str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                slow_input,
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Validator for SlowValidator {
        async fn check(&self, ip_address: &str) -> Result<ValidationResult> {
            self.calls.lock().unwrap().push(ip_address.to_string());
            let latency = if ip_address == self.slow_input { 500 } else { 10 };
            tokio::time::sleep(Duration::from_millis(latency)).await;
            if ip_address == "offline" {
                return Err(ScannerError::invalid_input("connection refused"));
            }
            Ok(validate_ip(ip_address))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_are_debounced() {
        let validator = SlowValidator::new("");
        let live = LiveValidator::spawn(validator.clone(), DEFAULT_DEBOUNCE);

        for text in ["8", "8.8", "8.8.8", "8.8.8.8"] {
            live.input(text);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(validator.calls(), vec!["8.8.8.8"]);
        assert_eq!(
            live.state(),
            ValidationState::Valid("Valid IPv4 address: 8.8.8.8".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_does_not_overwrite_newer_input() {
        let validator = SlowValidator::new("1.1.1.1");
        let live = LiveValidator::spawn(validator.clone(), DEFAULT_DEBOUNCE);

        live.input("1.1.1.1");
        // the slow request is in flight when the next input arrives
        tokio::time::sleep(Duration::from_millis(350)).await;
        live.input("1.1.1.bad");
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(validator.calls(), vec!["1.1.1.1", "1.1.1.bad"]);
        assert!(matches!(live.state(), ValidationState::Invalid(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_clears_without_request() {
        let validator = SlowValidator::new("");
        let live = LiveValidator::spawn(validator.clone(), DEFAULT_DEBOUNCE);

        live.input("10.0.0.0/8");
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(matches!(live.state(), ValidationState::Valid(_)));

        live.input("   ");
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(live.state(), ValidationState::Idle);
        assert_eq!(validator.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_is_reported() {
        let validator = SlowValidator::new("");
        let live = LiveValidator::spawn(validator, DEFAULT_DEBOUNCE);
        let mut updates = live.subscribe();

        live.input("offline");
        updates.changed().await.unwrap();

        assert_eq!(
            *updates.borrow(),
            ValidationState::Unavailable("Unable to validate IP address".to_string())
        );
        assert_eq!(live.state().message(), "Unable to validate IP address");
    }
}
