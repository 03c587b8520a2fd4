//! FFI bindings for Lastseen Timeline
//!
//! This module provides C-compatible functions for calling the timeline from
//! other languages. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using
//! `timeline_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::TimelineConfig;
use crate::encoder::FrameEncoder;
use crate::error::ComputeError;
use crate::pipeline::{lastseen_to_timeline, parse_records, TimelineSession};
use crate::schema::parse_range;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Config from an optional JSON C string; NULL means defaults
unsafe fn config_from_ptr(config_json: *const c_char) -> Result<TimelineConfig, ComputeError> {
    if config_json.is_null() {
        return Ok(TimelineConfig::default());
    }
    match cstr_to_string(config_json) {
        Some(json) => TimelineConfig::from_json(&json),
        None => Err(ComputeError::ConfigError(
            "config is not valid UTF-8".to_string(),
        )),
    }
}

macro_rules! require_str {
    ($ptr:expr, $name:literal, $fail:expr) => {
        match cstr_to_string($ptr) {
            Some(s) => s,
            None => {
                set_last_error(concat!("Invalid ", $name, " string pointer"));
                return $fail;
            }
        }
    };
}

// ============================================================================
// Stateless API
// ============================================================================

/// Render a change log into timeline payload JSON.
///
/// # Safety
/// - `records`, `range_from` and `range_to` must be valid null-terminated C strings.
/// - `config_json` may be NULL for the default configuration.
/// - Returns a newly allocated string that must be freed with `timeline_free_string`.
/// - Returns NULL on error; call `timeline_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn timeline_render_json(
    records: *const c_char,
    range_from: *const c_char,
    range_to: *const c_char,
    width_hours: u32,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let records = require_str!(records, "records", ptr::null_mut());
    let from = require_str!(range_from, "range_from", ptr::null_mut());
    let to = require_str!(range_to, "range_to", ptr::null_mut());

    let result = config_from_ptr(config_json)
        .and_then(|config| lastseen_to_timeline(&records, &from, &to, width_hours, &config));

    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Session API
// ============================================================================

/// Opaque handle to a TimelineSession
pub struct TimelineSessionHandle {
    session: TimelineSession,
    encoder: FrameEncoder,
}

/// Create a new session.
///
/// # Safety
/// - `config_json` may be NULL for the default configuration.
/// - Must be freed with `timeline_session_free`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn timeline_session_new(
    config_json: *const c_char,
) -> *mut TimelineSessionHandle {
    clear_last_error();

    match config_from_ptr(config_json).and_then(TimelineSession::new) {
        Ok(session) => Box::into_raw(Box::new(TimelineSessionHandle {
            session,
            encoder: FrameEncoder::new(),
        })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a session.
///
/// # Safety
/// - `session` must be a valid pointer returned by `timeline_session_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn timeline_session_free(session: *mut TimelineSessionHandle) {
    if !session.is_null() {
        drop(Box::from_raw(session));
    }
}

/// Start a fetch and return its generation (0 on a NULL session).
///
/// # Safety
/// - `session` must be a valid pointer returned by `timeline_session_new`.
#[no_mangle]
pub unsafe extern "C" fn timeline_session_begin_fetch(session: *mut TimelineSessionHandle) -> u64 {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return 0;
    }
    (*session).session.begin_fetch()
}

/// Install the records fetched under `generation`.
///
/// # Safety
/// - `session` must be a valid pointer returned by `timeline_session_new`.
/// - `records`, `range_from` and `range_to` must be valid null-terminated C strings.
/// - Returns 1 when installed, 0 when superseded by a newer fetch, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn timeline_session_install(
    session: *mut TimelineSessionHandle,
    generation: u64,
    records: *const c_char,
    range_from: *const c_char,
    range_to: *const c_char,
) -> i32 {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return -1;
    }
    let handle = &mut *session;

    let records = require_str!(records, "records", -1);
    let from = require_str!(range_from, "range_from", -1);
    let to = require_str!(range_to, "range_to", -1);

    let parsed = parse_range(&from, &to)
        .and_then(|range| parse_records(&records).map(|raw| (range, raw)));

    match parsed {
        Ok((range, raw)) => i32::from(handle.session.install_records(generation, range, &raw)),
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Change the zoom level; the window snaps back to the range end.
///
/// # Safety
/// - `session` must be a valid pointer returned by `timeline_session_new`.
/// - Returns 0 on success, -1 on an unsupported width.
#[no_mangle]
pub unsafe extern "C" fn timeline_session_set_width(
    session: *mut TimelineSessionHandle,
    width_hours: u32,
) -> i32 {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return -1;
    }

    match (*session).session.set_width_hours(width_hours) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Pan the window by `delta_ms` (negative pans back in time).
///
/// # Safety
/// - `session` must be a valid pointer returned by `timeline_session_new`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn timeline_session_pan(session: *mut TimelineSessionHandle, delta_ms: i64) {
    if !session.is_null() {
        (*session).session.pan(delta_ms);
    }
}

/// Render the current snapshot as payload JSON.
///
/// # Safety
/// - `session` must be a valid pointer returned by `timeline_session_new`.
/// - Returns a newly allocated string that must be freed with `timeline_free_string`.
/// - Returns NULL when no snapshot is installed or on error; in the latter case
///   `timeline_last_error` holds the message.
#[no_mangle]
pub unsafe extern "C" fn timeline_session_render(
    session: *mut TimelineSessionHandle,
) -> *mut c_char {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return ptr::null_mut();
    }
    let handle = &*session;

    let Some(frame) = handle.session.render() else {
        return ptr::null_mut();
    };
    match handle.encoder.encode_to_json(&frame) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Tooltip readout for the row plotted at `t_ms` in the current frame, as JSON.
///
/// # Safety
/// - `session` must be a valid pointer returned by `timeline_session_new`.
/// - Returns a newly allocated string that must be freed with `timeline_free_string`.
/// - Returns NULL when nothing is plotted at `t_ms` or on error.
#[no_mangle]
pub unsafe extern "C" fn timeline_session_readout(
    session: *mut TimelineSessionHandle,
    t_ms: i64,
) -> *mut c_char {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return ptr::null_mut();
    }

    let Some(point) = (*session).session.readout_at(t_ms) else {
        return ptr::null_mut();
    };
    match serde_json::to_string(&point) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by timeline functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a timeline function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn timeline_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next timeline function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn timeline_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn timeline_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
