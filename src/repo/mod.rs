//! Repositories: thin diesel query wrappers, one per table cluster.

mod achievements;
mod guesses;
mod hints;
mod leaderboard;
mod moods;
mod puzzles;
mod users;

pub use achievements::AchievementRepository;
pub use guesses::GuessRepository;
pub use hints::HintRepository;
pub use leaderboard::LeaderboardRepository;
pub use moods::MoodRepository;
pub use puzzles::PuzzleRepository;
pub use users::UserRepository;
