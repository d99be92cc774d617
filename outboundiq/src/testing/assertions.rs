//! Test assertions for attributed calls.

use super::TrackedCall;

/// Asserts that the call was attributed to the given subject ID.
pub fn assert_attributed_to(call: &TrackedCall, subject_id: &str) {
    let actual = call
        .user_context
        .as_ref()
        .and_then(|ctx| ctx.subject_id());
    assert_eq!(
        actual,
        Some(subject_id),
        "Expected call to '{}' to be attributed to '{}', got {:?}",
        call.url,
        subject_id,
        call.user_context
    );
}

/// Asserts that the call carries no user context.
pub fn assert_unattributed(call: &TrackedCall) {
    assert!(
        call.user_context.is_none(),
        "Expected call to '{}' to be unattributed, got {:?}",
        call.url,
        call.user_context
    );
}

/// Asserts that every call was attributed to the given subject ID.
pub fn assert_all_attributed_to(calls: &[TrackedCall], subject_id: &str) {
    for call in calls {
        assert_attributed_to(call, subject_id);
    }
}
