//! Payload builder
//!
//! Assembles the wire request from the resolved settings and the live
//! buffer contents. A pure function of its inputs: no settings store, no
//! network. If any configured companion file has no matching open
//! buffer, the whole compile is aborted — a partial payload is never
//! sent.

use crate::api::{CompanionSource, CompileRequest};
use crate::config::ResolvedOptions;
use crate::host::Document;
use crate::types::{Result, WandboxError};
use serde_json::json;

/// Build the request for one compile invocation.
///
/// Companion names are matched against the base names of the currently
/// open buffers; when several open buffers share a base name the last
/// match wins. The primary `code` field is always the live text of the
/// active buffer.
pub fn build_request(
    compiler: &str,
    primary: &Document,
    resolved: &ResolvedOptions,
    open_documents: &[Document],
    save: bool,
) -> Result<CompileRequest> {
    let mut companions = Vec::new();
    let mut missing = Vec::new();

    for name in &resolved.companion_files {
        match open_documents.iter().filter(|d| d.file_name() == name).last() {
            Some(document) => companions.push(CompanionSource {
                file: name.clone(),
                code: document.text.clone(),
            }),
            None => missing.push(name.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(WandboxError::CompanionFileNotOpen(missing));
    }

    Ok(CompileRequest {
        compiler: compiler.to_string(),
        code: primary.text.clone(),
        codes: (!companions.is_empty()).then_some(companions),
        options: resolved.options.clone(),
        stdin: resolved.stdin.clone(),
        compiler_option_raw: resolved.compiler_option_raw.clone(),
        runtime_option_raw: resolved.runtime_option_raw.clone(),
        save: save.then_some(true),
    })
}

/// The simplified display form of the request, logged before file
/// contents are resolved when the simplify flag is on: the primary code
/// is replaced by its file name and the companion codes by a
/// comma-joined name list.
pub fn simplified_payload(
    compiler: &str,
    primary: &Document,
    resolved: &ResolvedOptions,
    save: bool,
) -> serde_json::Value {
    let mut object = serde_json::Map::new();
    object.insert("compiler".to_string(), json!(compiler));
    object.insert("code".to_string(), json!(primary.file_name()));

    if !resolved.companion_files.is_empty() {
        object.insert("codes".to_string(), json!(resolved.companion_files.join(",")));
    }
    if let Some(options) = &resolved.options {
        object.insert("options".to_string(), json!(options));
    }
    if let Some(stdin) = &resolved.stdin {
        object.insert("stdin".to_string(), json!(stdin));
    }
    if let Some(raw) = &resolved.compiler_option_raw {
        object.insert("compiler-option-raw".to_string(), json!(raw));
    }
    if let Some(raw) = &resolved.runtime_option_raw {
        object.insert("runtime-option-raw".to_string(), json!(raw));
    }
    if save {
        object.insert("save".to_string(), json!(true));
    }

    serde_json::Value::Object(object)
}
