pub mod material;
pub mod social;
pub mod study;
pub mod syllabus;
pub mod test_result;
pub mod user;

pub use material::{Example, Formula, MaterialContent, Pointer, PracticeProblem, StudyMaterial};
pub use social::{Friend, FriendRequest, IncomingFriendRequest};
pub use study::{StudySession, UserSettings};
pub use syllabus::{Chapter, ChapterWithProgress, Module, ModuleOverview};
pub use test_result::TestResult;
pub use user::{User, UserSummary};
