use std::ffi::{CStr, CString};
use std::fmt::Display;
use std::os::raw::c_char;

use catalog::{Catalog, CourseInfo};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use workflow::{authoring_pipeline, Stage, WorkflowError, WorkflowState};

// Every function returns a JSON document owned by the caller, shaped either
// as {"<key>": payload} or {"error": {"kind": ..., "message": ...}}.
// Nothing is retained between calls; state travels in and out as JSON.

// ============================================================================
// String Management
// ============================================================================

/// Free a string that was allocated by Rust
#[no_mangle]
pub extern "C" fn traincraft_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            drop(CString::from_raw(ptr));
        }
    }
}

/// Helper to convert Rust string to C string
fn to_c_string(s: &str) -> *mut c_char {
    CString::new(s)
        .map(|cs| cs.into_raw())
        .unwrap_or(std::ptr::null_mut())
}

/// Helper to convert C string to Rust string
fn from_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe {
        CStr::from_ptr(ptr)
            .to_str()
            .ok()
            .map(|s| s.to_string())
    }
}

fn respond<T: Serialize>(key: &str, payload: T) -> *mut c_char {
    match serde_json::to_value(payload) {
        Ok(value) => {
            let mut body = Map::new();
            body.insert(key.to_string(), value);
            to_c_string(&Value::Object(body).to_string())
        }
        Err(e) => fail("serialization_error", e),
    }
}

fn fail(kind: &str, message: impl Display) -> *mut c_char {
    let message = message.to_string();
    debug!(kind, message = %message, "ffi call failed");
    let body = serde_json::json!({
        "error": { "kind": kind, "message": message }
    });
    to_c_string(&body.to_string())
}

fn fail_workflow(err: WorkflowError) -> *mut c_char {
    fail(err.kind(), err)
}

fn read_state(state_json: *const c_char) -> Result<WorkflowState, *mut c_char> {
    let json = from_c_string(state_json).ok_or_else(|| fail("invalid_argument", "invalid state JSON"))?;
    WorkflowState::from_json(&json).map_err(fail_workflow)
}

fn read_catalog(catalog_json: *const c_char) -> Result<Catalog, *mut c_char> {
    let json = from_c_string(catalog_json).ok_or_else(|| fail("invalid_argument", "invalid catalog JSON"))?;
    Catalog::from_json(&json).map_err(|e| fail(e.kind(), e))
}

fn read_stages(stages_json: *const c_char) -> Result<Vec<Stage>, *mut c_char> {
    let json = from_c_string(stages_json).ok_or_else(|| fail("invalid_argument", "invalid stages JSON"))?;
    serde_json::from_str(&json).map_err(|e| fail("serialization_error", e))
}

/// A null `stages_json` selects the default pipeline.
fn read_pipeline(stages_json: *const c_char) -> Result<Vec<Stage>, *mut c_char> {
    if stages_json.is_null() {
        Ok(authoring_pipeline())
    } else {
        read_stages(stages_json)
    }
}

fn transition<F>(state_json: *const c_char, op: F) -> *mut c_char
where
    F: FnOnce(&WorkflowState) -> Result<WorkflowState, WorkflowError>,
{
    let state = match read_state(state_json) {
        Ok(state) => state,
        Err(response) => return response,
    };

    match op(&state) {
        Ok(next) => respond("state", next),
        Err(e) => fail_workflow(e),
    }
}

// ============================================================================
// Workflow FFI
// ============================================================================

/// The default authoring pipeline as {"stages": [...]}
#[no_mangle]
pub extern "C" fn workflow_default_pipeline() -> *mut c_char {
    respond("stages", authoring_pipeline())
}

/// Build a workflow state from a stages array and a start stage
#[no_mangle]
pub extern "C" fn workflow_initialize(stages_json: *const c_char, start_stage_id: u32) -> *mut c_char {
    let stages = match read_stages(stages_json) {
        Ok(stages) => stages,
        Err(response) => return response,
    };

    match WorkflowState::initialize(stages, start_stage_id) {
        Ok(state) => respond("state", state),
        Err(e) => fail_workflow(e),
    }
}

/// "Next Stage"
#[no_mangle]
pub extern "C" fn workflow_advance(state_json: *const c_char) -> *mut c_char {
    transition(state_json, WorkflowState::advance)
}

/// "Previous"
#[no_mangle]
pub extern "C" fn workflow_retreat(state_json: *const c_char) -> *mut c_char {
    transition(state_json, WorkflowState::retreat)
}

#[no_mangle]
pub extern "C" fn workflow_jump_to(state_json: *const c_char, target_stage_id: u32) -> *mut c_char {
    transition(state_json, |state| state.jump_to(target_stage_id))
}

#[no_mangle]
pub extern "C" fn workflow_finish(state_json: *const c_char) -> *mut c_char {
    transition(state_json, WorkflowState::finish)
}

/// Progress indicator and navigation button state as {"view": ...}
#[no_mangle]
pub extern "C" fn workflow_progress(state_json: *const c_char) -> *mut c_char {
    match read_state(state_json) {
        Ok(state) => respond("view", state.progress()),
        Err(response) => response,
    }
}

// ============================================================================
// Catalog FFI
// ============================================================================

#[no_mangle]
pub extern "C" fn catalog_sample() -> *mut c_char {
    respond("catalog", Catalog::sample())
}

/// Dashboard stats and recent projects as {"dashboard": ...}, with each
/// status derived over the pipeline. A null `stages_json` selects the default.
#[no_mangle]
pub extern "C" fn catalog_dashboard(catalog_json: *const c_char, stages_json: *const c_char) -> *mut c_char {
    let catalog = match read_catalog(catalog_json) {
        Ok(catalog) => catalog,
        Err(response) => return response,
    };

    let pipeline = match read_pipeline(stages_json) {
        Ok(stages) => stages,
        Err(response) => return response,
    };

    match catalog.dashboard(&pipeline) {
        Ok(dashboard) => respond("dashboard", dashboard),
        Err(e) => fail(e.kind(), e),
    }
}

/// Open a project's workflow. A null `stages_json` selects the default pipeline.
#[no_mangle]
pub extern "C" fn catalog_open_project(
    catalog_json: *const c_char,
    project_id: *const c_char,
    stages_json: *const c_char,
) -> *mut c_char {
    let catalog = match read_catalog(catalog_json) {
        Ok(catalog) => catalog,
        Err(response) => return response,
    };

    let id = match from_c_string(project_id) {
        Some(s) => s,
        None => return fail("invalid_argument", "invalid project ID"),
    };

    let pipeline = match read_pipeline(stages_json) {
        Ok(stages) => stages,
        Err(response) => return response,
    };

    match catalog.open(&id, &pipeline) {
        Ok(state) => respond("state", state),
        Err(e) => fail(e.kind(), e),
    }
}

/// Validate course metadata; returns {"validation": {"valid", "errors"}}
#[no_mangle]
pub extern "C" fn catalog_validate_course(course_json: *const c_char) -> *mut c_char {
    let json = match from_c_string(course_json) {
        Some(s) => s,
        None => return fail("invalid_argument", "invalid course JSON"),
    };

    let course: CourseInfo = match serde_json::from_str(&json) {
        Ok(c) => c,
        Err(e) => return fail("serialization_error", e),
    };

    let errors = course.validate();
    respond(
        "validation",
        serde_json::json!({ "valid": errors.is_empty(), "errors": errors }),
    )
}
