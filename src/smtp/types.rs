use std::fmt;

/// A raw SMTP reply, preserving the numeric status code and message text.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStage {
    Greeting,
    Helo,
    MailFrom,
    RcptTo,
    Quit,
}

impl fmt::Display for ProbeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Greeting => f.write_str("greeting"),
            Self::Helo => f.write_str("HELO"),
            Self::MailFrom => f.write_str("MAIL FROM"),
            Self::RcptTo => f.write_str("RCPT TO"),
            Self::Quit => f.write_str("QUIT"),
        }
    }
}

/// The reply that ended the dialogue. `stage` is [`ProbeStage::RcptTo`]
/// unless the server refused an earlier step.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub stage: ProbeStage,
    pub reply: SmtpReply,
}

impl ProbeResponse {
    pub fn new(stage: ProbeStage, reply: SmtpReply) -> Self {
        Self { stage, reply }
    }

    pub fn reached_rcpt(&self) -> bool {
        self.stage == ProbeStage::RcptTo
    }
}
