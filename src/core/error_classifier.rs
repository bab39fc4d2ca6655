//! Classification of provider failures into user-facing error messages.
//!
//! Structured generation failures map one-to-one onto an [`ErrorKind`].
//! Unstructured failures only carry a description, so they are sorted by
//! keyword as a best-effort fallback; provider wording is not a stable
//! contract and the structured reasons take precedence whenever a provider
//! can supply them.

use std::error::Error as StdError;
use std::fmt;

/// Reasons a provider reports for a failed generation.
///
/// `Other` carries reasons this crate does not know about yet, so adding a
/// reason upstream never breaks classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailureReason {
    AssetsUnavailable,
    DecodingFailure,
    ExceededContextWindowSize,
    GuardrailViolation,
    UnsupportedGuide,
    UnsupportedLanguageOrLocale,
    Other(String),
}

impl GenerationFailureReason {
    pub fn as_str(&self) -> &str {
        match self {
            GenerationFailureReason::AssetsUnavailable => "assets_unavailable",
            GenerationFailureReason::DecodingFailure => "decoding_failure",
            GenerationFailureReason::ExceededContextWindowSize => "exceeded_context_window_size",
            GenerationFailureReason::GuardrailViolation => "guardrail_violation",
            GenerationFailureReason::UnsupportedGuide => "unsupported_guide",
            GenerationFailureReason::UnsupportedLanguageOrLocale => {
                "unsupported_language_or_locale"
            }
            GenerationFailureReason::Other(raw) => raw,
        }
    }
}

/// A failure surfaced by a provider's snapshot stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    /// The provider identified why generation failed.
    Generation {
        reason: GenerationFailureReason,
        description: String,
    },
    /// Anything else; only a human-readable description is available.
    Unstructured { description: String },
}

impl ProviderFailure {
    pub fn generation(reason: GenerationFailureReason, description: impl Into<String>) -> Self {
        ProviderFailure::Generation {
            reason,
            description: description.into(),
        }
    }

    pub fn unstructured(description: impl Into<String>) -> Self {
        ProviderFailure::Unstructured {
            description: description.into(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            ProviderFailure::Generation { description, .. } => description,
            ProviderFailure::Unstructured { description } => description,
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderFailure::Generation {
                reason,
                description,
            } => write!(f, "generation failed ({}): {}", reason.as_str(), description),
            ProviderFailure::Unstructured { description } => f.write_str(description),
        }
    }
}

impl StdError for ProviderFailure {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    AssetsUnavailable,
    DecodingFailure,
    ContextWindowExceeded,
    GuardrailViolation,
    UnsupportedGuide,
    UnsupportedLocale,
    ContentFiltered,
    ModelUnavailable,
    NetworkError,
    QuotaExceeded,
    ServerError,
    Timeout,
    UnknownModelError,
    Generic(String),
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::AssetsUnavailable => "assets-unavailable",
            ErrorKind::DecodingFailure => "decoding-failure",
            ErrorKind::ContextWindowExceeded => "context-window-exceeded",
            ErrorKind::GuardrailViolation => "guardrail-violation",
            ErrorKind::UnsupportedGuide => "unsupported-guide",
            ErrorKind::UnsupportedLocale => "unsupported-locale",
            ErrorKind::ContentFiltered => "content-filtered",
            ErrorKind::ModelUnavailable => "model-unavailable",
            ErrorKind::NetworkError => "network-error",
            ErrorKind::QuotaExceeded => "quota-exceeded",
            ErrorKind::ServerError => "server-error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::UnknownModelError => "unknown-model-error",
            ErrorKind::Generic(_) => "generic",
        }
    }
}

/// Result of classifying a [`ProviderFailure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    /// Multi-line text shown in place of the reply.
    pub message: String,
    /// Every classified error offers a retry; kept explicit for callers.
    pub retryable: bool,
}

struct Template {
    summary: &'static str,
    suggestions: [&'static str; 3],
}

const TRY_LATER: &str = "Try again in a moment";
const CONTACT_SUPPORT: &str = "If the problem persists, contact support";
const REPHRASE: &str = "Try rephrasing your question";
const CHECK_NETWORK: &str = "Check your network connection";
const NEUTRAL_WORDING: &str = "Avoid wording that could be mistaken for inappropriate content";

fn template_for(kind: &ErrorKind) -> Template {
    match kind {
        ErrorKind::AssetsUnavailable => Template {
            summary: "Sorry, the resources the language model needs are unavailable right now.",
            suggestions: [TRY_LATER, CHECK_NETWORK, CONTACT_SUPPORT],
        },
        ErrorKind::DecodingFailure => Template {
            summary: "Sorry, the response could not be decoded.",
            suggestions: [TRY_LATER, REPHRASE, CONTACT_SUPPORT],
        },
        ErrorKind::ContextWindowExceeded => Template {
            summary: "Sorry, your question is longer than the model can handle.",
            suggestions: [
                "Simplify your question",
                "Split a complex question into several smaller ones",
                "Shorten the text you send",
            ],
        },
        ErrorKind::GuardrailViolation => Template {
            summary: "Sorry, your question triggered the model's safety guardrails.",
            suggestions: [REPHRASE, NEUTRAL_WORDING, "Use more neutral phrasing"],
        },
        ErrorKind::UnsupportedGuide => Template {
            summary: "Sorry, the request used a generation guide the model does not support.",
            suggestions: [TRY_LATER, "Try expressing the request differently", CONTACT_SUPPORT],
        },
        ErrorKind::UnsupportedLocale => Template {
            summary: "Sorry, the model does not support the requested language or locale.",
            suggestions: [
                "Try asking in English",
                "Check your language settings",
                CONTACT_SUPPORT,
            ],
        },
        ErrorKind::ContentFiltered => Template {
            summary: "Sorry, your question was blocked by the content filter.",
            suggestions: [REPHRASE, NEUTRAL_WORDING, "Use more neutral phrasing"],
        },
        ErrorKind::ModelUnavailable => Template {
            summary: "Sorry, the language model is unavailable right now.",
            suggestions: [TRY_LATER, CHECK_NETWORK, CONTACT_SUPPORT],
        },
        ErrorKind::NetworkError => Template {
            summary: "Sorry, a network problem interrupted the reply.",
            suggestions: [
                CHECK_NETWORK,
                "Try switching between Wi-Fi and mobile data",
                "Verify your proxy and network settings",
            ],
        },
        ErrorKind::QuotaExceeded => Template {
            summary: "Sorry, the usage quota has been reached.",
            suggestions: [
                TRY_LATER,
                "Consider upgrading your plan",
                "Review your usage statistics",
            ],
        },
        ErrorKind::ServerError => Template {
            summary: "Sorry, the server ran into an error.",
            suggestions: [TRY_LATER, CONTACT_SUPPORT, "Check the service status page"],
        },
        ErrorKind::Timeout => Template {
            summary: "Sorry, the reply timed out.",
            suggestions: [TRY_LATER, "Simplify your question", "Check your connection speed"],
        },
        ErrorKind::UnknownModelError => Template {
            summary: "Sorry, an unknown language model error occurred.",
            suggestions: [TRY_LATER, "Restart the application", CONTACT_SUPPORT],
        },
        ErrorKind::Generic(_) => Template {
            summary: "Sorry, something went wrong.",
            suggestions: [TRY_LATER, "Restart the application", CONTACT_SUPPORT],
        },
    }
}

fn kind_for_reason(reason: &GenerationFailureReason) -> ErrorKind {
    match reason {
        GenerationFailureReason::AssetsUnavailable => ErrorKind::AssetsUnavailable,
        GenerationFailureReason::DecodingFailure => ErrorKind::DecodingFailure,
        GenerationFailureReason::ExceededContextWindowSize => ErrorKind::ContextWindowExceeded,
        GenerationFailureReason::GuardrailViolation => ErrorKind::GuardrailViolation,
        GenerationFailureReason::UnsupportedGuide => ErrorKind::UnsupportedGuide,
        GenerationFailureReason::UnsupportedLanguageOrLocale => ErrorKind::UnsupportedLocale,
        GenerationFailureReason::Other(_) => ErrorKind::UnknownModelError,
    }
}

/// Sorts a free-form description by keyword. First match wins.
pub fn kind_for_description(description: &str) -> ErrorKind {
    let lower = description.to_lowercase();
    let has = |needle: &str| lower.contains(needle);

    if has("content") && has("filter") {
        ErrorKind::ContentFiltered
    } else if has("model") && has("unavailable") {
        ErrorKind::ModelUnavailable
    } else if has("network") || has("connection") {
        ErrorKind::NetworkError
    } else if has("quota") || has("limit") {
        ErrorKind::QuotaExceeded
    } else if has("server") || has("service") {
        ErrorKind::ServerError
    } else if has("timeout") || has("timed out") {
        ErrorKind::Timeout
    } else {
        ErrorKind::Generic(description.to_string())
    }
}

pub fn classify(failure: &ProviderFailure) -> ClassifiedError {
    let (kind, details) = match failure {
        ProviderFailure::Generation {
            reason,
            description,
        } => (kind_for_reason(reason), Some(description.as_str())),
        ProviderFailure::Unstructured { description } => (kind_for_description(description), None),
    };

    ClassifiedError {
        message: render_message(&kind, details),
        kind,
        retryable: true,
    }
}

fn render_message(kind: &ErrorKind, details: Option<&str>) -> String {
    let template = template_for(kind);
    let mut message = match kind {
        ErrorKind::Generic(description) => {
            format!("Sorry, something went wrong: {description}")
        }
        _ => template.summary.to_string(),
    };

    message.push_str("\n\n💡 Suggestions:");
    for suggestion in template.suggestions {
        message.push_str("\n• ");
        message.push_str(suggestion);
    }

    if let Some(details) = details.filter(|text| !text.trim().is_empty()) {
        message.push_str("\n\nDetails: ");
        message.push_str(details.trim());
    }

    message
}
