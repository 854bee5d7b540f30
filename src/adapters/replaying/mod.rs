//! Replaying adapters that serve recorded interactions.

pub mod clock;
pub mod filesystem;
pub mod llm;

pub use clock::ReplayingClock;
pub use filesystem::ReplayingFileSystem;
pub use llm::ReplayingLlmClient;

use serde::de::DeserializeOwned;

use crate::cassette::config::SharedReplayer;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Take the output of the next recorded `port::method` interaction.
///
/// # Panics
///
/// Panics when the cassette has been exhausted.
pub(crate) fn next_output(replayer: &SharedReplayer, port: &str, method: &str) -> serde_json::Value {
    let mut guard = replayer.lock().expect("replayer lock poisoned");
    guard.next_interaction(port, method).output.clone()
}

/// Decode a recorded `{"ok": value}` / `{"err": "message"}` output.
///
/// Outputs without either key are decoded directly as the ok value.
pub(crate) fn replay_result<T: DeserializeOwned>(output: serde_json::Value) -> Result<T, BoxError> {
    if let Some(err) = output.get("err") {
        let msg = err.as_str().map_or_else(|| err.to_string(), str::to_string);
        return Err(msg.into());
    }
    let value = match output {
        serde_json::Value::Object(mut map) if map.contains_key("ok") => {
            map.remove("ok").unwrap_or_default()
        }
        other => other,
    };
    serde_json::from_value(value).map_err(|e| format!("failed to decode recorded output: {e}").into())
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replay_result_unwraps_ok_and_err() {
        let ok: String = replay_result(json!({"ok": "value"})).unwrap();
        assert_eq!(ok, "value");

        let bare: bool = replay_result(json!(true)).unwrap();
        assert!(bare);

        let err = replay_result::<String>(json!({"err": "disk full"})).unwrap_err();
        assert_eq!(err.to_string(), "disk full");
    }
}
