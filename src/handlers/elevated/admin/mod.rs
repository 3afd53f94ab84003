// handlers/elevated/admin/mod.rs - syllabus and content management
//
// Routes: /api/admin/{modules,chapters,materials}[/:id]
//         /api/admin/materials/:id/:kind[/:item_id]
// Middleware: jwt_auth_middleware -> validate_user_middleware -> require_admin_middleware

use crate::error::FieldErrors;

pub mod chapters;
pub mod items;
pub mod materials;
pub mod modules;

pub use chapters::{chapter_create, chapter_delete, chapter_update};
pub use items::{item_create, item_delete};
pub use materials::{material_create, material_delete, material_update};
pub use modules::{module_create, module_delete, module_update};

/// Trim optional text; blank strings are stored as NULL
pub(crate) fn optional_text(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn check_position(errors: &mut FieldErrors, position: Option<i32>) {
    if let Some(position) = position {
        errors.require_non_negative("position", position);
    }
}
