//! Normalization of download manager responses.
//!
//! Different manager versions (and compatible implementations) report the same value under
//! different keys. Each field has one ordered alias list and one accessor; nothing outside
//! this module should look at raw keys.

use crate::types::{HistorySlot, JobId, JobStatus};
use serde_json::Value;

/// Aliases for the job id returned by `addurl`
pub const SUBMITTED_JOB_ID: &[&str] = &["nzo_ids", "nzoIds", "nzo_id", "nzoId", "id"];

/// Aliases for the job id of a history slot
pub const SLOT_JOB_ID: &[&str] = &["nzo_id", "nzoId", "id"];

/// Aliases for the output directory name of a history slot
pub const SLOT_JOB_NAME: &[&str] = &["name", "job_name", "jobName", "nzb_name"];

/// Aliases for the category of a history slot
pub const SLOT_CATEGORY: &[&str] = &["category", "cat"];

/// Aliases for the failure reason of a history slot
pub const SLOT_FAILURE: &[&str] = &["fail_message", "failMessage", "error"];

/// Aliases for the status of a history slot
pub const SLOT_STATUS: &[&str] = &["status"];

/// First non-empty string value found under any alias, in alias order
///
/// Numbers are rendered as strings; arrays yield their first element.
pub fn string_field(value: &Value, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|alias| value.get(*alias))
        .find_map(scalar_string)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.first().and_then(scalar_string),
        _ => None,
    }
}

/// Job id from a submission response
pub fn submitted_job_id(response: &Value) -> Option<JobId> {
    string_field(response, SUBMITTED_JOB_ID).map(JobId)
}

/// Rejection message if the response reports an explicit failure
///
/// A response is a rejection when `status` is `false` or a non-empty `error` is present.
pub fn rejection(response: &Value) -> Option<String> {
    let error = string_field(response, &["error"]);
    let explicitly_failed = matches!(response.get("status"), Some(Value::Bool(false)));

    match (explicitly_failed, error) {
        (_, Some(error)) => Some(error),
        (true, None) => Some("manager reported status=false".to_string()),
        (false, None) => None,
    }
}

/// Raw history slots, whether wrapped in `history` or not
pub fn history_slots(response: &Value) -> &[Value] {
    response
        .get("history")
        .and_then(|h| h.get("slots"))
        .or_else(|| response.get("slots"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Normalize one history slot; slots without a job id are dropped
pub fn history_slot(slot: &Value) -> Option<HistorySlot> {
    let job_id = string_field(slot, SLOT_JOB_ID)?;
    let status = string_field(slot, SLOT_STATUS)
        .map(|s| JobStatus::from_manager(&s))
        .unwrap_or(JobStatus::Running);

    Some(HistorySlot {
        job_id: JobId(job_id),
        status,
        job_name: string_field(slot, SLOT_JOB_NAME),
        category: string_field(slot, SLOT_CATEGORY),
        failure_reason: string_field(slot, SLOT_FAILURE),
    })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_submitted_job_id_aliases_in_order() {
        let cases = [
            (json!({"status": true, "nzo_ids": ["SABnzbd_nzo_a"]}), "SABnzbd_nzo_a"),
            (json!({"nzoIds": ["b", "c"]}), "b"),
            (json!({"nzo_id": "c"}), "c"),
            (json!({"nzoId": "d"}), "d"),
            (json!({"id": 42}), "42"),
            // Earlier alias wins even if a later one is present
            (json!({"nzo_id": "first", "id": "second"}), "first"),
            // Empty values fall through to the next alias
            (json!({"nzo_ids": [], "nzo_id": "e"}), "e"),
        ];

        for (response, expected) in cases {
            assert_eq!(
                submitted_job_id(&response),
                Some(JobId::new(expected)),
                "{response}"
            );
        }
        assert_eq!(submitted_job_id(&json!({"status": true})), None);
        assert_eq!(submitted_job_id(&json!({"nzo_ids": [""]})), None);
    }

    #[test]
    fn test_rejection() {
        assert_eq!(rejection(&json!({"status": true, "nzo_ids": ["a"]})), None);
        assert_eq!(
            rejection(&json!({"status": false, "error": "API Key Incorrect"})),
            Some("API Key Incorrect".to_string())
        );
        assert!(rejection(&json!({"status": false})).is_some());
        assert!(rejection(&json!({"error": "bad url"})).is_some());
    }

    #[test]
    fn test_history_slot_normalization() {
        let response = json!({
            "history": {
                "slots": [
                    {
                        "nzo_id": "SABnzbd_nzo_1",
                        "status": "Failed",
                        "name": "Broken.Release",
                        "category": "movies",
                        "fail_message": "Aborted, cannot be completed"
                    },
                    {
                        "nzoId": "SABnzbd_nzo_2",
                        "status": "Completed",
                        "jobName": "My.Movie.2024",
                        "cat": "Movies"
                    },
                    { "status": "Completed" }
                ]
            }
        });

        let slots: Vec<_> = history_slots(&response)
            .iter()
            .filter_map(history_slot)
            .collect();
        assert_eq!(slots.len(), 2);

        assert_eq!(slots[0].status, JobStatus::Failed);
        assert_eq!(
            slots[0].failure_reason.as_deref(),
            Some("Aborted, cannot be completed")
        );

        assert_eq!(slots[1].job_id, JobId::new("SABnzbd_nzo_2"));
        assert_eq!(slots[1].status, JobStatus::Completed);
        assert_eq!(slots[1].job_name.as_deref(), Some("My.Movie.2024"));
        assert_eq!(slots[1].category.as_deref(), Some("Movies"));
    }

    #[test]
    fn test_history_slots_unwrapped_and_missing() {
        let response = json!({"slots": [{"id": "x", "status": "Queued"}]});
        assert_eq!(history_slots(&response).len(), 1);
        assert!(history_slots(&json!({"history": {}})).is_empty());
    }
}
