//! FFI bindings for Habitline
//!
//! This module provides C-compatible functions for calling Habitline from the
//! app shell. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using `habit_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::DateTime;

use crate::day::{normalize_day, DayInput};
use crate::error::TrackerError;
use crate::pipeline::{analyze_tracker_json, TrackerAnalyzer};

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

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Caller must free the result
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn finish(result: Result<String, TrackerError>) -> *mut c_char {
    match result {
        Ok(out) => string_to_cstr(&out),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Analyze a tracker against the local clock and return the report JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string holding a tracker input.
/// - Returns a newly allocated string that must be freed with `habit_free_string`.
/// - Returns NULL on error; call `habit_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn habit_analyze(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return ptr::null_mut();
    };

    finish(analyze_tracker_json(json_str))
}

/// Analyze a tracker at a fixed instant.
///
/// `now` is an RFC 3339 timestamp; its wall-clock time at the given offset
/// is used as the local "now".
///
/// # Safety
/// - `json` and `now` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `habit_free_string`.
/// - Returns NULL on error; call `habit_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn habit_analyze_at(json: *const c_char, now: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return ptr::null_mut();
    };

    let Some(now_str) = cstr_to_string(now) else {
        set_last_error("Invalid timestamp string pointer");
        return ptr::null_mut();
    };

    let now = match DateTime::parse_from_rfc3339(now_str.trim()) {
        Ok(instant) => instant.naive_local(),
        Err(_) => {
            set_last_error(&TrackerError::InvalidDate(now_str).to_string());
            return ptr::null_mut();
        }
    };

    finish(TrackerAnalyzer::at(now).analyze_json(&json_str))
}

/// Normalize a date to its `YYYY-MM-DD` key.
///
/// Accepts a date string, a JSON string, or a JSON number of epoch
/// milliseconds.
///
/// # Safety
/// - `input` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `habit_free_string`.
/// - Returns NULL on error; call `habit_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn habit_normalize_day(input: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(raw) = cstr_to_string(input) else {
        set_last_error("Invalid date string pointer");
        return ptr::null_mut();
    };

    let parsed = serde_json::from_str::<DayInput>(&raw).unwrap_or(DayInput::Text(raw));
    finish(normalize_day(parsed).map(|day| day.to_string()))
}

/// Free a string returned by Habitline functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Habitline function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn habit_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the last error message.
///
/// # Safety
/// - The returned pointer is valid until the next Habitline call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn habit_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the Habitline library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn habit_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn sample_input_json() -> CString {
        CString::new(
            r#"{
            "config": {
                "goalDirection": "target",
                "targetValue": 2000,
                "tolerance": 100,
                "aggregation": "sum",
                "goalPeriod": "daily",
                "enableStreak": true
            },
            "entries": [
                { "date": "2024-06-01", "value": 1200 },
                { "date": "2024-06-01", "value": 900 },
                { "date": "2024-06-02", "value": 2000 }
            ],
            "month": "2024-06"
        }"#,
        )
        .unwrap()
    }

    unsafe fn take(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let out = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        habit_free_string(ptr);
        out
    }

    #[test]
    fn test_ffi_analyze_at() {
        let json = sample_input_json();
        let now = CString::new("2024-06-02T18:30:00+02:00").unwrap();

        unsafe {
            let out = take(habit_analyze_at(json.as_ptr(), now.as_ptr()));
            let report: serde_json::Value = serde_json::from_str(&out).unwrap();
            assert_eq!(report["today"], "2024-06-02");
            assert_eq!(report["summary"]["streak"]["streak"], 2);
            assert_eq!(report["summary"]["goal"]["label"], "Target Hit");
            assert_eq!(report["calendar"]["cells"][0]["value"], 2100.0);
            assert!(habit_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_analyze_local_clock() {
        let json = sample_input_json();
        unsafe {
            let out = take(habit_analyze(json.as_ptr()));
            assert!(out.contains("\"summary\""));
        }
    }

    #[test]
    fn test_ffi_normalize_day() {
        unsafe {
            let key = CString::new("2024-03-10").unwrap();
            assert_eq!(take(habit_normalize_day(key.as_ptr())), "2024-03-10");

            let local = CString::new("2024-03-10T23:15:00").unwrap();
            assert_eq!(take(habit_normalize_day(local.as_ptr())), "2024-03-10");

            let quoted = CString::new("\"2024/03/10\"").unwrap();
            assert_eq!(take(habit_normalize_day(quoted.as_ptr())), "2024-03-10");
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid_json = CString::new("not json").unwrap();
            let result = habit_analyze(invalid_json.as_ptr());
            assert!(result.is_null());

            let error = habit_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.starts_with("Invalid JSON"));

            let bad_day = CString::new("2024-02-30").unwrap();
            assert!(habit_normalize_day(bad_day.as_ptr()).is_null());
            let error_str = CStr::from_ptr(habit_last_error()).to_str().unwrap();
            assert!(error_str.contains("2024-02-30"));

            let json = sample_input_json();
            let bad_now = CString::new("yesterday").unwrap();
            assert!(habit_analyze_at(json.as_ptr(), bad_now.as_ptr()).is_null());

            assert!(habit_analyze(ptr::null()).is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = habit_version();
            assert!(!version.is_null());
            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, env!("CARGO_PKG_VERSION"));
        }
    }
}
