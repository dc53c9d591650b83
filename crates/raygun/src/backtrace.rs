// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack trace capture for crash reports.

use std::backtrace::Backtrace;

use raygun_core::RaygunStackTraceLine;
use rustc_demangle::demangle;

/// Captures the current call stack and converts it into report frames.
///
/// Frames from the standard library, the async runtime, and this crate are
/// dropped so the report leads with application code. Symbol availability
/// depends on how the binary was built, so the result may be empty.
pub fn capture_stack_trace() -> Vec<RaygunStackTraceLine> {
	let backtrace = Backtrace::force_capture();
	parse_backtrace(&backtrace)
}

/// Converts a captured backtrace into report frames.
pub fn parse_backtrace(backtrace: &Backtrace) -> Vec<RaygunStackTraceLine> {
	parse_backtrace_string(&format!("{:#?}", backtrace))
}

/// Parses the structured backtrace format into frames.
///
/// The alternate debug form prints one entry per line:
/// `{ fn: "name", file: "path", line: N },` where `file` and `line` are
/// optional and `fn` may be unresolved.
fn parse_backtrace_string(bt_string: &str) -> Vec<RaygunStackTraceLine> {
	let mut frames = Vec::new();

	for line in bt_string.lines() {
		let line = line.trim();

		// Skip the "Backtrace [" header and the closing bracket.
		if !line.starts_with('{') {
			continue;
		}

		if let Some(frame) = parse_frame_line(line) {
			frames.push(frame);
		}
	}

	frames
}

/// Parses a single backtrace entry into a frame.
fn parse_frame_line(line: &str) -> Option<RaygunStackTraceLine> {
	let raw_name = extract_quoted(line, "fn: \"")?;

	// Symbol names are usually pre-demangled, but a raw mangled name can
	// come through when upstream symbolication gave up on it.
	let demangled = format!("{:#}", demangle(&raw_name));

	if !is_in_app_frame(&demangled) {
		return None;
	}

	// Split "my_app::handlers::process" into the module path and the
	// function name, mirroring class and method on the wire.
	let (class_name, method_name) = match demangled.rfind("::") {
		Some(idx) => (Some(demangled[..idx].to_string()), demangled[idx + 2..].to_string()),
		None => (None, demangled),
	};

	Some(RaygunStackTraceLine {
		file_name: extract_quoted(line, "file: \""),
		line_number: extract_line_number(line),
		class_name,
		method_name: Some(method_name),
	})
}

/// Returns the quoted value following `key`, if present.
fn extract_quoted(line: &str, key: &str) -> Option<String> {
	let start = line.find(key)? + key.len();
	let rest = &line[start..];
	let end = rest.find('"')?;
	Some(rest[..end].to_string())
}

/// Returns the line number following `line: `, if present.
fn extract_line_number(line: &str) -> Option<u32> {
	let start = line.find("line: ")? + "line: ".len();
	let digits: String = line[start..].chars().take_while(|c| c.is_ascii_digit()).collect();
	digits.parse().ok()
}

/// Determines if a frame is from user application code vs runtime plumbing.
fn is_in_app_frame(function: &str) -> bool {
	// System/std library prefixes to exclude
	const SYSTEM_PREFIXES: &[&str] = &[
		"std::",
		"core::",
		"alloc::",
		"<std::",
		"<core::",
		"<alloc::",
		"tokio::",
		"<tokio::",
		"futures::",
		"<futures::",
		"tracing::",
		"<tracing::",
		"backtrace::",
		"<backtrace::",
		"panic_unwind::",
		"<panic_unwind::",
		"raygun::",
		"raygun_core::",
		"rust_begin_unwind",
		"rust_panic",
		"__rust_",
		"_rust_",
	];

	// Also exclude common runtime functions
	const SYSTEM_CONTAINS: &[&str] = &[
		"::panic::",
		"::panicking::",
		"::thread::",
		"::rt::",
		"::runtime::",
		"::sys_common::",
	];

	for prefix in SYSTEM_PREFIXES {
		if function.starts_with(prefix) {
			return false;
		}
	}

	for contains in SYSTEM_CONTAINS {
		if function.contains(contains) {
			return false;
		}
	}

	true
}
