// handlers/public/mod.rs - Public handlers (no authentication)
//
// Route Prefix: /api/auth/{login,register}, /api/marking/*

pub mod auth; // Token acquisition
pub mod marking; // Score preview calculator
