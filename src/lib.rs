//! # Catalog Editor Core
//!
//! The state core of a product catalog editor. A host UI (browser, Flutter,
//! desktop) loads a JSON array of products, then drives the editor with user
//! intents: edit a cell, add, delete, sort, shuffle, bulk edit, filter,
//! select, undo and redo. After each intent it receives a fresh
//! [`RenderState`](editor_session::RenderState) to redraw from, and at any
//! time it can export the catalog as JSON or CSV.
//!
//! ## Features
//!
//! - **Whole-snapshot history**: every committed edit is one undo step, bulk edits included
//! - **Consistent views**: filters, options and selection are rebuilt after every mutation
//! - **Atomic intents**: a rejected intent changes nothing
//! - **Typed edits**: fields are a closed enum, prices are validated before anything is touched
//! - **FFI-ready**: every intent is also a C function returning a JSON response
//!
//! ## Quick Start
//!
//! ```rust
//! use catalog_editor_core::editor_session::EditorSession;
//! use catalog_editor_core::editable_field::ProductField;
//!
//! let mut editor = EditorSession::default();
//! editor.load_file(r#"[{"id":"a","name":"Foo","price":10}]"#, "shop.json")?;
//! editor.edit_field("a", ProductField::Price, "12.5")?;
//! assert!(editor.undo()?);
//! assert_eq!(editor.products()[0].price, Some(10.0));
//! assert_eq!(editor.csv_file_name(), "shop.csv");
//! # Ok::<(), catalog_editor_core::editor_error::EditorError>(())
//! ```
//!
//! ## FFI Functions
//!
//! - [`create_editor`] / [`close_editor`] - session lifecycle
//! - [`load_file`] - replace the catalog from a JSON buffer
//! - [`edit_field`], [`attach_image`], [`add_product`], [`delete_product`],
//!   [`delete_selected`], [`sort_products`], [`shuffle_products`], [`bulk_edit`] - mutations
//! - [`undo`], [`redo`], [`can_undo`], [`can_redo`] - history
//! - [`set_filters`], [`toggle_select`], [`select_all`] - view and selection
//! - [`get_render_state`], [`get_view`], [`get_filter_options`], [`get_selection`] - reads
//! - [`export_json`], [`export_csv`], [`csv_file_name`] - exports
//! - [`free_response`] - release any string returned by this library

pub mod app_response;
pub mod catalog_io;
pub mod editable_field;
pub mod editor_config;
pub mod editor_error;
pub mod editor_session;
pub mod history_manager;
pub mod image_attachment;
pub mod product_collection;
pub mod product_model;
pub mod selection_set;
pub mod snapshot_store;
pub mod view_engine;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};

use crate::app_response::AppResponse;
use crate::editable_field::ProductField;
use crate::editor_config::EditorConfig;
use crate::editor_error::EditorError;
use crate::editor_session::EditorSession;
use crate::view_engine::ViewFilters;

/// Creates a new editing session.
///
/// # Parameters
///
/// * `config_json` - Optional JSON [`EditorConfig`]; pass a null pointer for defaults
///
/// # Returns
///
/// A pointer to the session, or a null pointer if the configuration is not
/// valid UTF-8 or not a valid config object. Release it with [`close_editor`].
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use catalog_editor_core::{create_editor, close_editor};
///
/// let config = CString::new(r#"{"max_history": 200}"#).unwrap();
/// let editor = create_editor(config.as_ptr());
/// assert!(!editor.is_null());
/// close_editor(editor);
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_editor(config_json: *const c_char) -> *mut EditorSession {
    let config = if config_json.is_null() {
        EditorConfig::default()
    } else {
        let raw = match unsafe { CStr::from_ptr(config_json).to_str() } {
            Ok(s) => s,
            Err(e) => {
                warn!("Invalid UTF-8 in editor config: {e}");
                return std::ptr::null_mut();
            }
        };
        match serde_json::from_str::<EditorConfig>(raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("❌ Invalid editor config: {e}");
                return std::ptr::null_mut();
            }
        }
    };

    info!("✅ Editor session created (history cap: {:?})", config.max_history);
    Box::into_raw(Box::new(EditorSession::new(config)))
}

/// Ends a session and frees it. The pointer must not be used afterwards.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_editor(state: *mut EditorSession) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to close_editor".to_string());
        return response_to_c_string(&error);
    }

    drop(unsafe { Box::from_raw(state) });
    info!("Editor session closed");
    response_to_c_string(&AppResponse::success("Editor session closed"))
}

/// Frees a string previously returned by this library.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(response: *const c_char) {
    if !response.is_null() {
        drop(unsafe { CString::from_raw(response as *mut c_char) });
    }
}

/// Loads a catalog file, replacing the collection and restarting history.
///
/// # Parameters
///
/// * `state` - Pointer to the session
/// * `buffer` - File contents; must be a JSON array of product objects
/// * `file_name` - Name of the loaded file, reused for exports
///
/// # Returns
///
/// The render state on success, or an `ImportError` response, in which case
/// the previous catalog is kept.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use catalog_editor_core::{create_editor, load_file};
///
/// let editor = create_editor(std::ptr::null());
/// let buffer = CString::new(r#"[{"name":"Desk Lamp","brand":"Lumo"}]"#).unwrap();
/// let name = CString::new("lamps.json").unwrap();
/// let result = load_file(editor, buffer.as_ptr(), name.as_ptr());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn load_file(state: *mut EditorSession, buffer: *const c_char, file_name: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "load_file") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let buffer = match c_ptr_to_string(buffer, "buffer") {
        Ok(b) => b,
        Err(err) => return err,
    };
    let file_name = match c_ptr_to_string(file_name, "file_name") {
        Ok(n) => n,
        Err(err) => return err,
    };

    let outcome = session.load_file(&buffer, &file_name).map(|_| ());
    respond(session, outcome)
}

/// Returns the full render state without changing anything.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_render_state(state: *mut EditorSession) -> *const c_char {
    match session_from_ptr(state, "get_render_state") {
        Ok(session) => render_response(session),
        Err(err) => err,
    }
}

/// Returns the filtered, ordered products as a JSON array.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_view(state: *mut EditorSession) -> *const c_char {
    match session_from_ptr(state, "get_view") {
        Ok(session) => json_response(&session.view()),
        Err(err) => err,
    }
}

/// Returns `{"brands": [...], "categories": [...]}`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_filter_options(state: *mut EditorSession) -> *const c_char {
    match session_from_ptr(state, "get_filter_options") {
        Ok(session) => json_response(session.filter_options()),
        Err(err) => err,
    }
}

/// Returns the selected ids as a JSON array.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_selection(state: *mut EditorSession) -> *const c_char {
    match session_from_ptr(state, "get_selection") {
        Ok(session) => json_response(session.selection().ids()),
        Err(err) => err,
    }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn can_undo(state: *mut EditorSession) -> bool {
    unsafe { state.as_ref() }.is_some_and(EditorSession::can_undo)
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn can_redo(state: *mut EditorSession) -> bool {
    unsafe { state.as_ref() }.is_some_and(EditorSession::can_redo)
}

/// Edits one field of one product from raw cell text.
///
/// `field` is one of `id, name, brand, category, price, description, img,
/// specs, features`. Prices must be numeric; `specs` takes a JSON object and
/// `features` a JSON array.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use catalog_editor_core::{create_editor, edit_field};
///
/// let editor = create_editor(std::ptr::null());
/// let id = CString::new("prod-1").unwrap();
/// let field = CString::new("price").unwrap();
/// let value = CString::new("24.99").unwrap();
/// let result = edit_field(editor, id.as_ptr(), field.as_ptr(), value.as_ptr());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn edit_field(
    state: *mut EditorSession,
    id: *const c_char,
    field: *const c_char,
    value: *const c_char,
) -> *const c_char {
    let session = match session_from_ptr(state, "edit_field") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let id = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };
    let field = match parse_field(field) {
        Ok(f) => f,
        Err(err) => return err,
    };
    let value = match c_ptr_to_string(value, "value") {
        Ok(v) => v,
        Err(err) => return err,
    };

    let outcome = session.edit_field(&id, field, &value);
    respond(session, outcome)
}

/// Attaches image bytes to a product as an embedded `data:` URI.
///
/// `mime` may be null, in which case the type is sniffed from the bytes.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn attach_image(
    state: *mut EditorSession,
    id: *const c_char,
    bytes: *const u8,
    len: usize,
    mime: *const c_char,
) -> *const c_char {
    let session = match session_from_ptr(state, "attach_image") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let id = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };
    if bytes.is_null() && len > 0 {
        return response_to_c_string(&AppResponse::BadRequest("Null image pointer".to_string()));
    }
    let mime = if mime.is_null() {
        None
    } else {
        match c_ptr_to_string(mime, "mime") {
            Ok(m) => Some(m),
            Err(err) => return err,
        }
    };

    let data: &[u8] = if len == 0 { &[] } else { unsafe { std::slice::from_raw_parts(bytes, len) } };
    let outcome = session.attach_image(&id, data, mime.as_deref());
    respond(session, outcome)
}

/// Prepends a new blank product.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn add_product(state: *mut EditorSession) -> *const c_char {
    let session = match session_from_ptr(state, "add_product") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let outcome = session.add_product().map(|_| ());
    respond(session, outcome)
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_product(state: *mut EditorSession, id: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "delete_product") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let id = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };
    let outcome = session.delete_product(&id).map(|_| ());
    respond(session, outcome)
}

/// Deletes every selected product. Fails with `EmptySelectionError` when
/// nothing is selected.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_selected(state: *mut EditorSession) -> *const c_char {
    let session = match session_from_ptr(state, "delete_selected") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let outcome = session.delete_selected().map(|_| ());
    respond(session, outcome)
}

/// Sorts the whole collection, e.g. `price_asc` or `name_desc`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn sort_products(state: *mut EditorSession, sort_key: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "sort_products") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let key = match c_ptr_to_string(sort_key, "sort_key") {
        Ok(k) => k,
        Err(err) => return err,
    };
    let outcome = session.sort_by_key(&key);
    respond(session, outcome)
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn shuffle_products(state: *mut EditorSession) -> *const c_char {
    let session = match session_from_ptr(state, "shuffle_products") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let outcome = session.shuffle();
    respond(session, outcome)
}

/// Sets one field on every selected product as a single undo step.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn bulk_edit(state: *mut EditorSession, field: *const c_char, value: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "bulk_edit") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let field = match parse_field(field) {
        Ok(f) => f,
        Err(err) => return err,
    };
    let value = match c_ptr_to_string(value, "value") {
        Ok(v) => v,
        Err(err) => return err,
    };
    let outcome = session.bulk_edit(field, &value).map(|_| ());
    respond(session, outcome)
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn undo(state: *mut EditorSession) -> *const c_char {
    let session = match session_from_ptr(state, "undo") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let outcome = session.undo().map(|_| ());
    respond(session, outcome)
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn redo(state: *mut EditorSession) -> *const c_char {
    let session = match session_from_ptr(state, "redo") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let outcome = session.redo().map(|_| ());
    respond(session, outcome)
}

/// Replaces the active filters with `{"search": .., "brand": .., "category": ..}`.
/// Missing keys fall back to an empty search and "All".
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn set_filters(state: *mut EditorSession, filters_json: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "set_filters") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let raw = match c_ptr_to_string(filters_json, "filters") {
        Ok(r) => r,
        Err(err) => return err,
    };
    let filters: ViewFilters = match serde_json::from_str(&raw) {
        Ok(f) => f,
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid filters JSON: {e}"));
            return response_to_c_string(&error);
        }
    };
    session.set_filters(filters);
    render_response(session)
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn toggle_select(state: *mut EditorSession, id: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "toggle_select") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let id = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };
    let outcome = session.toggle_select(&id).map(|_| ());
    respond(session, outcome)
}

/// Selects (`true`) or deselects (`false`) every product in the current view.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn select_all(state: *mut EditorSession, selected: bool) -> *const c_char {
    let session = match session_from_ptr(state, "select_all") {
        Ok(s) => s,
        Err(err) => return err,
    };
    session.select_all(selected);
    render_response(session)
}

/// Returns the catalog as pretty-printed JSON inside an `Ok` response.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn export_json(state: *mut EditorSession) -> *const c_char {
    let session = match session_from_ptr(state, "export_json") {
        Ok(s) => s,
        Err(err) => return err,
    };
    match session.export_json() {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Returns the catalog as CSV text inside an `Ok` response.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn export_csv(state: *mut EditorSession) -> *const c_char {
    let session = match session_from_ptr(state, "export_csv") {
        Ok(s) => s,
        Err(err) => return err,
    };
    match session.export_csv() {
        Ok(csv) => response_to_c_string(&AppResponse::Ok(csv)),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Name to save the CSV export under, derived from the loaded file name.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn csv_file_name(state: *mut EditorSession) -> *const c_char {
    match session_from_ptr(state, "csv_file_name") {
        Ok(session) => response_to_c_string(&AppResponse::Ok(session.csv_file_name())),
        Err(err) => err,
    }
}

/// Resolves the session pointer or builds a `BadRequest` response.
fn session_from_ptr<'a>(state: *mut EditorSession, caller: &str) -> Result<&'a mut EditorSession, *const c_char> {
    match unsafe { state.as_mut() } {
        Some(session) => Ok(session),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {caller}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn parse_field(ptr: *const c_char) -> Result<ProductField, *const c_char> {
    let raw = c_ptr_to_string(ptr, "field")?;
    raw.parse::<ProductField>()
        .map_err(|e| response_to_c_string(&AppResponse::from(e)))
}

/// Render state on success, the mapped error otherwise.
fn respond(session: &EditorSession, outcome: Result<(), EditorError>) -> *const c_char {
    match outcome {
        Ok(()) => render_response(session),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

fn render_response(session: &EditorSession) -> *const c_char {
    json_response(&session.render_state())
}

fn json_response<T: serde::Serialize + ?Sized>(payload: &T) -> *const c_char {
    match serde_json::to_string(payload) {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Converts an [`AppResponse`] to a C-compatible string.
///
/// The response is serialized to JSON and handed over as a null-terminated
/// string owned by the caller, who must release it with [`free_response`].
/// Returns a null pointer if serialization or C string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a Rust String.
///
/// # Returns
///
/// * `Ok(String)` - If conversion was successful
/// * `Err(*const c_char)` - Pointer to a `BadRequest` response for null pointers or invalid UTF-8
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
