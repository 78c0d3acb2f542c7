//! GPU debug-message formatting.
//!
//! wgpu reports validation failures through an uncaptured-error handler and
//! shader compiler output through `ShaderModule::get_compilation_info`. Both are
//! normalized into a [`GpuMessage`] and written to the log, which goes to
//! standard error. Nothing here attempts recovery.

use std::fmt;

/// Which part of the stack produced a message.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MessageSource {
    Api,
    ShaderCompiler,
}

/// Message category.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MessageKind {
    Error,
    OutOfMemory,
    Other,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    Notification,
    Medium,
    High,
}

/// A single normalized GPU message.
#[derive(Debug, Clone, PartialEq)]
pub struct GpuMessage {
    pub source: MessageSource,
    pub kind: MessageKind,
    pub severity: Severity,
    pub text: String,
}

impl GpuMessage {
    pub fn from_error(err: &wgpu::Error) -> Self {
        match err {
            wgpu::Error::Validation { description, .. } => Self {
                source: MessageSource::Api,
                kind: MessageKind::Error,
                severity: Severity::High,
                text: description.trim_end().to_string(),
            },
            wgpu::Error::OutOfMemory { .. } => Self {
                source: MessageSource::Api,
                kind: MessageKind::OutOfMemory,
                severity: Severity::High,
                text: err.to_string(),
            },
            other => Self {
                source: MessageSource::Api,
                kind: MessageKind::Other,
                severity: Severity::Medium,
                text: other.to_string(),
            },
        }
    }

    pub fn from_compilation(stage_label: &str, msg: &wgpu::CompilationMessage) -> Self {
        compiler_message(
            stage_label,
            &msg.message,
            msg.message_type,
            msg.location.as_ref().map(|l| (l.line_number, l.line_position)),
        )
    }

    /// Log level the message is emitted at.
    pub fn level(&self) -> log::Level {
        match self.severity {
            Severity::High => log::Level::Error,
            Severity::Medium => log::Level::Warn,
            Severity::Notification => log::Level::Debug,
        }
    }
}

fn compiler_message(
    stage_label: &str,
    text: &str,
    message_type: wgpu::CompilationMessageType,
    location: Option<(u32, u32)>,
) -> GpuMessage {
    let (kind, severity) = match message_type {
        wgpu::CompilationMessageType::Error => (MessageKind::Error, Severity::High),
        wgpu::CompilationMessageType::Warning => (MessageKind::Other, Severity::Medium),
        wgpu::CompilationMessageType::Info => (MessageKind::Other, Severity::Notification),
    };

    let text = match location {
        Some((line, col)) => format!("{stage_label}:{line}:{col}: {text}"),
        None => format!("{stage_label}: {text}"),
    };

    GpuMessage {
        source: MessageSource::ShaderCompiler,
        kind,
        severity,
        text,
    }
}

impl fmt::Display for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MessageSource::Api => "API",
            MessageSource::ShaderCompiler => "Shader Compiler",
        })
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MessageKind::Error => "Error",
            MessageKind::OutOfMemory => "Out Of Memory",
            MessageKind::Other => "Other",
        })
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Notification => "notification",
        })
    }
}

impl fmt::Display for GpuMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GPU message: {}\nSource: {}\nType: {}\nSeverity: {}",
            self.text, self.source, self.kind, self.severity
        )
    }
}

/// Writes `msg` to the log at its severity's level.
pub fn report(msg: &GpuMessage) {
    log::log!(msg.level(), "{msg}");
}

/// Handler installed with `Device::on_uncaptured_error`.
pub(crate) fn report_uncaptured(err: wgpu::Error) {
    report(&GpuMessage::from_error(&err));
}

/// Reports every compiler message for a shader module.
///
/// Returns `false` if the compiler emitted at least one error.
pub fn report_compilation(stage_label: &str, info: &wgpu::CompilationInfo) -> bool {
    let mut ok = true;
    for m in &info.messages {
        let msg = GpuMessage::from_compilation(stage_label, m);
        if msg.kind == MessageKind::Error {
            ok = false;
        }
        report(&msg);
    }
    ok
}

/// Blocks on the compiler output of `module` and reports it.
pub fn check_shader(stage_label: &str, module: &wgpu::ShaderModule) -> bool {
    let info = pollster::block_on(module.get_compilation_info());
    let ok = report_compilation(stage_label, &info);
    if !ok {
        log::error!("{stage_label}: shader compilation failed");
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_every_field_on_its_own_line() {
        let msg = GpuMessage {
            source: MessageSource::Api,
            kind: MessageKind::Error,
            severity: Severity::High,
            text: "buffer is destroyed".to_string(),
        };

        assert_eq!(
            msg.to_string(),
            "GPU message: buffer is destroyed\nSource: API\nType: Error\nSeverity: high"
        );
    }

    #[test]
    fn validation_error_is_high_severity_api_error() {
        let err = wgpu::Error::Validation {
            source: Box::new(std::io::Error::other("inner")),
            description: "Validation Error\n".to_string(),
        };

        let msg = GpuMessage::from_error(&err);
        assert_eq!(msg.source, MessageSource::Api);
        assert_eq!(msg.kind, MessageKind::Error);
        assert_eq!(msg.severity, Severity::High);
        assert_eq!(msg.text, "Validation Error");
        assert_eq!(msg.level(), log::Level::Error);
    }

    #[test]
    fn compiler_error_includes_location() {
        let msg = compiler_message(
            "square shader",
            "unknown identifier `rotaton`",
            wgpu::CompilationMessageType::Error,
            Some((7, 12)),
        );

        assert_eq!(msg.source, MessageSource::ShaderCompiler);
        assert_eq!(msg.kind, MessageKind::Error);
        assert_eq!(msg.text, "square shader:7:12: unknown identifier `rotaton`");
        assert!(msg.to_string().contains("Source: Shader Compiler"));
    }

    #[test]
    fn compiler_warning_and_info_are_not_errors() {
        let warn = compiler_message("s", "unused", wgpu::CompilationMessageType::Warning, None);
        assert_eq!(warn.kind, MessageKind::Other);
        assert_eq!(warn.level(), log::Level::Warn);
        assert_eq!(warn.text, "s: unused");

        let info = compiler_message("s", "note", wgpu::CompilationMessageType::Info, None);
        assert_eq!(info.severity, Severity::Notification);
        assert_eq!(info.level(), log::Level::Debug);
    }

    #[test]
    fn empty_compilation_info_is_success() {
        let info = wgpu::CompilationInfo { messages: Vec::new() };
        assert!(report_compilation("square shader", &info));
    }

    fn compiler_output(kinds: &[wgpu::CompilationMessageType]) -> wgpu::CompilationInfo {
        wgpu::CompilationInfo {
            messages: kinds
                .iter()
                .map(|&message_type| wgpu::CompilationMessage {
                    message: format!("{message_type:?} from compiler"),
                    message_type,
                    location: None,
                })
                .collect(),
        }
    }

    #[test]
    fn any_compiler_error_fails_compilation() {
        let info = compiler_output(&[
            wgpu::CompilationMessageType::Warning,
            wgpu::CompilationMessageType::Error,
        ]);
        assert!(!report_compilation("square shader", &info));
    }

    #[test]
    fn warnings_and_notes_do_not_fail_compilation() {
        let info = compiler_output(&[
            wgpu::CompilationMessageType::Warning,
            wgpu::CompilationMessageType::Info,
        ]);
        assert!(report_compilation("square shader", &info));
    }
}
