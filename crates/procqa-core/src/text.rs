//! Fixed user-facing strings.
//!
//! The assistant serves a Vietnamese-speaking audience; these strings are
//! rendered verbatim in the transcript and notifications.

/// Title given to a conversation before its first message names it.
pub const DEFAULT_TITLE: &str = "Cuộc trò chuyện mới";

/// Assistant reply used when a successful response carries no answer text.
pub const FALLBACK_REPLY: &str = "Xin lỗi, tôi không thể trả lời câu hỏi này.";

/// Transcript message shown in place of an assistant reply when a send fails.
pub const SEND_FAILURE_APOLOGY: &str =
    "Xin lỗi, có lỗi xảy ra khi kết nối với AI. Vui lòng thử lại.";

/// Transient notification text when an error carries no message of its own.
pub const GENERIC_ERROR_NOTICE: &str = "Có lỗi xảy ra";
