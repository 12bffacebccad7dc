// src/error.rs

use std::fmt;

pub type FormResult<T> = Result<T, FormError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserMsgKind {
    Success,
    Warn,
    Error,
    Info,
}

#[derive(Clone, Debug)]
pub struct UserMsg {
    pub kind: UserMsgKind,
    pub short: &'static str,
    pub detail: Option<String>,
}

#[derive(Debug)]
pub enum FormError {
    // --------------------------------------------------
    // generic / plumbing
    // --------------------------------------------------
    Io(std::io::Error),

    // --------------------------------------------------
    // input
    // --------------------------------------------------
    InvalidInputKind { got: &'static str },
    UnknownField(String),
    UnknownReason(String),
    Busy,

    // --------------------------------------------------
    // configuration (field table / rules / template)
    // --------------------------------------------------
    Parse(json5::Error),
    DefinitionProblem(String),
    RuleCompile(String),
    TemplateLoad(String),

    // --------------------------------------------------
    // generation / delivery
    // --------------------------------------------------
    GenerationFailure(String),
    DownloadFailed(String),
}

impl FormError {
    pub fn user_msg(&self) -> UserMsg {
        use FormError::*;

        let mut kind = UserMsgKind::Error;
        let detail = Some(self.to_string());

        let short: &'static str = match self {
            Io(_) => "File operation failed.",

            InvalidInputKind { .. } => "Field value must be text.",
            UnknownField(_) => "Unknown form field.",
            UnknownReason(_) => "Unknown reason.",
            Busy => {
                kind = UserMsgKind::Warn;
                "A document is already being generated."
            }

            Parse(_) => "Form definition is not valid JSON5.",
            DefinitionProblem(_) => "Form definition is inconsistent.",
            RuleCompile(_) => "Validation rule is invalid.",
            TemplateLoad(_) => "Failed to load the document template.",

            GenerationFailure(_) => "Document generation failed. Please try again.",
            DownloadFailed(_) => "Failed to save the document.",
        };

        UserMsg {
            kind,
            short,
            detail,
        }
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use FormError::*;

        match self {
            Io(e) => write!(f, "io error: {e}"),

            InvalidInputKind { got } => write!(f, "expected a string value, got {got}"),
            UnknownField(id) => write!(f, "unknown field: {id}"),
            UnknownReason(code) => write!(f, "unknown reason code: {code}"),
            Busy => write!(f, "generation already in progress"),

            Parse(e) => write!(f, "form definition parse error: {e}"),
            DefinitionProblem(s) => write!(f, "form definition problem: {s}"),
            RuleCompile(s) => write!(f, "rule compile failed: {s}"),
            TemplateLoad(s) => write!(f, "template load failed: {s}"),

            GenerationFailure(s) => write!(f, "document generation failed: {s}"),
            DownloadFailed(s) => write!(f, "download failed: {s}"),
        }
    }
}

impl std::error::Error for FormError {}

impl From<std::io::Error> for FormError {
    fn from(e: std::io::Error) -> Self {
        FormError::Io(e)
    }
}

impl From<json5::Error> for FormError {
    fn from(e: json5::Error) -> Self {
        FormError::Parse(e)
    }
}
