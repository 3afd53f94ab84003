// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) -> Protected (JWT auth) -> Elevated (JWT auth + admin role)

pub mod elevated; // Tier 3: admin role required (/api/admin/*)
pub mod protected; // Tier 2: JWT authentication required (/api/*)
pub mod public; // Tier 1: No authentication required (/api/auth/*, /api/marking/*)
pub mod system; // Service info and health (/, /health)
