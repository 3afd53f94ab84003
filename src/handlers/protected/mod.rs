// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: JWT Authentication Required
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware -> validate_user_middleware
//
// Every handler here receives the loaded `CurrentUser` as a request
// extension and opens its own database connection through `DbConn`.

pub mod analytics; // Overview, performance trend, placeholder breakdowns
pub mod auth; // GET /api/auth/me
pub mod chapters; // Chapters, completion, skip tests
pub mod dashboard; // Aggregated home screen
pub mod friends; // Friend list and requests
pub mod leaderboard; // Ranked streak / study time / test scores
pub mod materials; // Study materials with their content items
pub mod modules; // Syllabus modules with progress
pub mod settings; // Daily goals, target percentile, exam date
pub mod streak; // Streak lookup and check-in
pub mod study_sessions; // Logged study time
pub mod test_results; // Mock, sectional and chapter tests
pub mod users; // User search
