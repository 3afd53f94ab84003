// handlers/elevated/mod.rs - Elevated handlers (admin role required)
//
// Security Level: JWT Authentication + stored role `admin`
// Route Prefix: /api/admin/*
// Middleware: jwt_auth_middleware -> validate_user_middleware -> require_admin_middleware

pub mod admin; // Syllabus and study content management
