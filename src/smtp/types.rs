/// A raw SMTP reply, preserving the numeric status code and message text.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

/// How a `RCPT TO` answer is read by the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyClass {
    /// `250` or `251`.
    Accepted,
    /// 4xx, e.g. greylisting. Still reported as not accepted.
    Deferred,
    /// 5xx.
    Refused,
    Other,
}

impl SmtpReply {
    pub fn class(&self) -> ReplyClass {
        match self.code {
            250 | 251 => ReplyClass::Accepted,
            400..=499 => ReplyClass::Deferred,
            500..=599 => ReplyClass::Refused,
            _ => ReplyClass::Other,
        }
    }

    /// `250` (ok) or `251` (user not local, will forward) to `RCPT TO`.
    pub fn accepts_recipient(&self) -> bool {
        self.class() == ReplyClass::Accepted
    }
}
